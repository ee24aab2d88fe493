use crate::error::InstallError;
use serde::{Deserialize, Serialize};

/// One downloadable file of a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub name: String,
    #[serde(rename = "browser_download_url")]
    pub download_url: String,
    /// `algorithm:hex`, absent on older releases
    #[serde(default)]
    pub digest: Option<String>,
}

impl Asset {
    pub fn new(name: impl Into<String>, download_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            download_url: download_url.into(),
            digest: None,
        }
    }

    pub fn with_digest(mut self, digest: impl Into<String>) -> Self {
        self.digest = Some(digest.into());
        self
    }
}

/// A published release and its assets, in API order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseManifest {
    #[serde(rename = "tag_name")]
    pub tag: String,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl ReleaseManifest {
    pub fn new(tag: impl Into<String>, assets: Vec<Asset>) -> Self {
        Self {
            tag: tag.into(),
            assets,
        }
    }

    /// Parses the JSON body of a GitHub release
    pub fn from_json(body: &str) -> Result<Self, InstallError> {
        serde_json::from_str(body).map_err(|e| InstallError::Manifest(e.to_string()))
    }

    /// Looks an asset up by its exact name
    pub fn asset(&self, name: &str) -> Option<&Asset> {
        self.assets.iter().find(|asset| asset.name == name)
    }
}
