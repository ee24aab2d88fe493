//! Asset selection
//!
//! Picks the release archive that best fits a [`HostProfile`]. Matching is
//! plain substring containment on asset names, applied as a cascade of
//! progressively looser tiers; within a tier the first asset in manifest
//! order wins.

use crate::profile::{Gpu, HostProfile};
use crate::release::ReleaseManifest;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Marker carried by every prebuilt binary archive
pub const BINARY_MARKER: &str = "bin";

/// Prefix of the CUDA runtime DLL bundles published next to the builds
pub const CUDA_RUNTIME_PREFIX: &str = "cudart-";

/// Substrings that identify a GPU-specific build
pub const GPU_MARKERS: &[&str] = &[
    "cuda", "hip", "rocm", "vulkan", "metal", "sycl", "opencl", "kompute",
];

/// CUDA preference, most specific first; Vulkan also drives NVIDIA cards
const CUDA_PREFERENCE: &[&str] = &["cuda-12.4", "cuda-12", "cuda", "vulkan"];

/// Which cascade tier produced the match
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchTier {
    /// OS, arch and extension plus the GPU preference
    Preferred,
    /// OS, arch and extension
    Platform,
    /// OS and arch, any extension
    OsArch,
    /// OS only
    OsOnly,
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchTier::Preferred => write!(f, "preferred"),
            MatchTier::Platform => write!(f, "platform"),
            MatchTier::OsArch => write!(f, "os+arch"),
            MatchTier::OsOnly => write!(f, "os"),
        }
    }
}

/// The archive chosen for this host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub asset_name: String,
    pub download_url: String,
    pub expected_digest: Option<String>,
    pub tier: MatchTier,
    /// Host has CUDA but the chosen build is not a CUDA build
    pub cuda_fallback: bool,
}

/// Runs the matching cascade; `None` means nothing fits
pub fn select_asset(manifest: &ReleaseManifest, profile: &HostProfile) -> Option<Selection> {
    let os = profile.os.asset_tag();
    let arch = profile.arch.asset_tag();
    let ext = profile.os.archive_extension();

    let names: Vec<&str> = manifest
        .assets
        .iter()
        .map(|a| a.name.as_str())
        .filter(|name| is_binary_archive(name))
        .collect();

    let platform: Vec<&str> = names
        .iter()
        .copied()
        .filter(|name| name.contains(os) && name.contains(arch) && name.contains(ext))
        .collect();

    let (name, tier) = if let Some(name) = preferred(&platform, profile.gpu) {
        (name, MatchTier::Preferred)
    } else if let Some(name) = platform.first().copied() {
        (name, MatchTier::Platform)
    } else if let Some(name) = names
        .iter()
        .copied()
        .find(|name| name.contains(os) && name.contains(arch))
    {
        (name, MatchTier::OsArch)
    } else if let Some(name) = names
        .iter()
        .copied()
        .find(|name| name.contains(os))
    {
        (name, MatchTier::OsOnly)
    } else {
        debug!(profile = %profile, "No asset matched any tier");
        return None;
    };

    let asset = manifest.asset(name)?;
    let cuda_fallback = profile.gpu == Gpu::Cuda && !asset.name.contains("cuda");

    debug!(asset = %asset.name, tier = %tier, cuda_fallback, "Asset selected");

    Some(Selection {
        asset_name: asset.name.clone(),
        download_url: asset.download_url.clone(),
        expected_digest: asset.digest.clone(),
        tier,
        cuda_fallback,
    })
}

fn preferred<'a>(candidates: &[&'a str], gpu: Gpu) -> Option<&'a str> {
    let first_with = |marker: &str| candidates.iter().copied().find(|name| name.contains(marker));

    match gpu {
        Gpu::Cuda => CUDA_PREFERENCE.iter().find_map(|marker| first_with(*marker)),
        Gpu::Hip => first_with("hip"),
        Gpu::Vulkan => first_with("vulkan"),
        Gpu::Metal => first_with("metal"),
        Gpu::Cpu => candidates
            .iter()
            .copied()
            .find(|name| name.contains("cpu") || !has_gpu_marker(name)),
    }
}

/// A llama.cpp build archive, as opposed to a runtime-only bundle
pub fn is_binary_archive(name: &str) -> bool {
    name.contains(BINARY_MARKER) && !name.starts_with(CUDA_RUNTIME_PREFIX)
}

pub fn has_gpu_marker(name: &str) -> bool {
    GPU_MARKERS.iter().any(|marker| name.contains(marker))
}
