//! Release manifests: fetching, parsing and digests

mod client;
mod digest;
mod manifest;

pub use client::{GitHubReleases, ReleaseSource};
pub use digest::{sha256_file, Digest};
pub use manifest::{Asset, ReleaseManifest};
