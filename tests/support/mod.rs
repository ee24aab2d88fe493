//! Shared fixtures for the integration tests
//!
//! `FakeReleases` serves a fixed manifest and in-memory archives, so the
//! full install flow runs without the network.

#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use llamaup::error::InstallError;
use llamaup::release::{Asset, ReleaseManifest, ReleaseSource};
use sha2::{Digest, Sha256};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

pub const TAG: &str = "b7426";
pub const BASE_URL: &str = "https://example.invalid/download";

#[derive(Default)]
pub struct FakeReleases {
    manifest: Option<ReleaseManifest>,
    bodies: HashMap<String, Vec<u8>>,
    pub requested_tags: RefCell<Vec<Option<String>>>,
    pub downloads: RefCell<Vec<String>>,
}

impl FakeReleases {
    pub fn new(manifest: ReleaseManifest) -> Self {
        Self {
            manifest: Some(manifest),
            ..Default::default()
        }
    }

    pub fn with_body(mut self, url: &str, body: Vec<u8>) -> Self {
        self.bodies.insert(url.to_string(), body);
        self
    }

    pub fn download_count(&self) -> usize {
        self.downloads.borrow().len()
    }
}

impl ReleaseSource for &FakeReleases {
    fn fetch_release(&self, tag: Option<&str>) -> Result<ReleaseManifest, InstallError> {
        self.requested_tags
            .borrow_mut()
            .push(tag.map(str::to_string));
        self.manifest
            .clone()
            .ok_or_else(|| InstallError::Manifest("no release".to_string()))
    }

    fn download(&self, url: &str, dest: &mut dyn Write) -> Result<u64, InstallError> {
        self.downloads.borrow_mut().push(url.to_string());
        let body = self.bodies.get(url).ok_or(InstallError::HttpStatus {
            url: url.to_string(),
            status: 404,
        })?;
        dest.write_all(body).map_err(|e| InstallError::Io {
            path: "download".into(),
            source: e,
        })?;
        Ok(body.len() as u64)
    }
}

pub fn url_for(name: &str) -> String {
    format!("{}/{}/{}", BASE_URL, TAG, name)
}

pub fn asset(name: &str) -> Asset {
    Asset::new(name, url_for(name))
}

pub fn asset_with_digest(name: &str, body: &[u8]) -> Asset {
    asset(name).with_digest(format!("sha256:{}", sha256_hex(body)))
}

pub fn sha256_hex(body: &[u8]) -> String {
    hex::encode(Sha256::digest(body))
}

/// Builds a `.tar.gz` with each file nested under `build/bin/`
pub fn tar_gz(files: &[(&str, &str)]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for (name, content) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(
                &mut header,
                format!("build/bin/{}", name),
                content.as_bytes(),
            )
            .unwrap();
    }

    builder.into_inner().unwrap().finish().unwrap()
}

/// Shell script that reports `build` the way llama.cpp does, on stderr
pub fn version_script(build: u64) -> String {
    format!(
        "#!/bin/sh\necho \"version: {} (0f1e2d3)\" >&2\necho \"built with cc for x86_64-linux-gnu\" >&2\n",
        build
    )
}

pub fn llama_archive(build: u64) -> Vec<u8> {
    let script = version_script(build);
    tar_gz(&[
        ("llama-cli", script.as_str()),
        ("llama-server", script.as_str()),
        ("libggml.so", "not an executable"),
    ])
}

#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

pub fn manifest(assets: Vec<Asset>) -> ReleaseManifest {
    ReleaseManifest::new(TAG, assets)
}
