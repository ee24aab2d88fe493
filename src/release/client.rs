use super::manifest::ReleaseManifest;
use crate::config::InstallerConfig;
use crate::error::InstallError;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use std::io::{self, IsTerminal, Write};
use std::time::Duration;
use tracing::{debug, info};

/// Where releases come from
pub trait ReleaseSource {
    /// Fetches the release for `tag`, or the latest release when `None`
    fn fetch_release(&self, tag: Option<&str>) -> Result<ReleaseManifest, InstallError>;

    /// Streams `url` into `dest`, returning the number of bytes written
    fn download(&self, url: &str, dest: &mut dyn Write) -> Result<u64, InstallError>;
}

/// GitHub releases API client
pub struct GitHubReleases {
    client: Client,
    base_url: String,
    token: Option<String>,
    show_progress: bool,
}

impl GitHubReleases {
    pub fn new(config: &InstallerConfig) -> Result<Self, InstallError> {
        let client = Client::builder()
            .timeout(config.http_timeout_secs.map(Duration::from_secs))
            .build()
            .map_err(|e| InstallError::Http {
                url: config.releases_url.clone(),
                source: e,
            })?;

        Ok(Self {
            client,
            base_url: config.releases_url.trim_end_matches('/').to_string(),
            token: config.github_token.clone(),
            show_progress: io::stderr().is_terminal(),
        })
    }

    pub fn release_url(&self, tag: Option<&str>) -> String {
        match tag {
            Some(tag) => format!("{}/tags/{}", self.base_url, tag),
            None => format!("{}/latest", self.base_url),
        }
    }

    fn get(&self, url: &str, accept: &str) -> Result<Response, InstallError> {
        let mut request = self
            .client
            .get(url)
            .header(USER_AGENT, format!("llamaup/{}", crate::VERSION))
            .header(ACCEPT, accept);

        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request.send().map_err(|e| InstallError::Http {
            url: url.to_string(),
            source: e,
        })?;

        if !response.status().is_success() {
            return Err(InstallError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response)
    }

    fn progress_bar(&self, total: Option<u64>) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        match total {
            Some(len) => {
                let bar = ProgressBar::new(len);
                if let Ok(style) = ProgressStyle::default_bar()
                    .template("{bar:40} {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")
                {
                    bar.set_style(style);
                }
                bar
            }
            None => ProgressBar::new_spinner(),
        }
    }
}

impl ReleaseSource for GitHubReleases {
    fn fetch_release(&self, tag: Option<&str>) -> Result<ReleaseManifest, InstallError> {
        let url = self.release_url(tag);
        info!(url = %url, "Fetching release manifest");

        let body = self
            .get(&url, "application/vnd.github+json")?
            .text()
            .map_err(|e| InstallError::Http {
                url: url.clone(),
                source: e,
            })?;

        let manifest = ReleaseManifest::from_json(&body)?;
        debug!(
            tag = %manifest.tag,
            assets = manifest.assets.len(),
            "Release manifest parsed"
        );
        Ok(manifest)
    }

    fn download(&self, url: &str, dest: &mut dyn Write) -> Result<u64, InstallError> {
        info!(url = %url, "Downloading archive");

        let response = self.get(url, "application/octet-stream")?;
        let bar = self.progress_bar(response.content_length());

        let mut reader = bar.wrap_read(response);
        let written = io::copy(&mut reader, dest).map_err(|e| InstallError::Io {
            path: url.into(),
            source: e,
        })?;
        bar.finish_and_clear();

        debug!(bytes = written, "Download finished");
        Ok(written)
    }
}
