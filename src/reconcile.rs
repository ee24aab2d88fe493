//! Version reconciliation
//!
//! Compares the build number of the installed binary with the build number
//! encoded in a release tag. Comparison is numeric only; anything that
//! cannot be parsed is treated as stale so the run proceeds with an update.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

/// What the installed binary reported about itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "version", rename_all = "kebab-case")]
pub enum InstalledState {
    /// No executable in the install directory
    Absent,
    /// Executable present but its version output was not understood
    Unknown,
    Version(u64),
}

impl fmt::Display for InstalledState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstalledState::Absent => write!(f, "not installed"),
            InstalledState::Unknown => write!(f, "unknown version"),
            InstalledState::Version(n) => write!(f, "build {}", n),
        }
    }
}

/// Why an update is going ahead
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdateReason {
    Outdated { installed: u64, latest: u64 },
    UnknownInstalledVersion,
    UnparseableTag { tag: String },
    Forced,
}

/// Outcome of comparing installed and available versions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Decision {
    Install,
    Update(UpdateReason),
    Current { installed: u64, latest: u64 },
}

impl Decision {
    pub fn needs_download(&self) -> bool {
        !matches!(self, Decision::Current { .. })
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Install => write!(f, "install"),
            Decision::Update(UpdateReason::Outdated { installed, latest }) => {
                write!(f, "update {} -> {}", installed, latest)
            }
            Decision::Update(UpdateReason::UnknownInstalledVersion) => {
                write!(f, "update (installed version unknown)")
            }
            Decision::Update(UpdateReason::UnparseableTag { tag }) => {
                write!(f, "update (unrecognized tag {})", tag)
            }
            Decision::Update(UpdateReason::Forced) => write!(f, "update (forced)"),
            Decision::Current { installed, .. } => write!(f, "already at build {}", installed),
        }
    }
}

/// Decides whether the release tagged `latest_tag` should be installed
pub fn reconcile(installed: &InstalledState, latest_tag: &str) -> Decision {
    let installed = match installed {
        InstalledState::Absent => return Decision::Install,
        InstalledState::Unknown => return Decision::Update(UpdateReason::UnknownInstalledVersion),
        InstalledState::Version(n) => *n,
    };

    match parse_build_number(latest_tag) {
        None => Decision::Update(UpdateReason::UnparseableTag {
            tag: latest_tag.to_string(),
        }),
        Some(latest) if installed >= latest => Decision::Current { installed, latest },
        Some(latest) => Decision::Update(UpdateReason::Outdated { installed, latest }),
    }
}

/// Extracts the build number from a tag such as `b7426`
pub fn parse_build_number(tag: &str) -> Option<u64> {
    static TAG: OnceLock<Regex> = OnceLock::new();
    let re = TAG.get_or_init(|| Regex::new(r"^[^0-9]*([0-9]+)$").expect("valid tag regex"));

    re.captures(tag.trim())
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Extracts the build number from `--version` output (`version: 7426 (abc1234)`)
pub fn parse_version_output(output: &str) -> Option<u64> {
    static VERSION: OnceLock<Regex> = OnceLock::new();
    let re = VERSION.get_or_init(|| {
        Regex::new(r"version:\s*([0-9]+)\s*\(").expect("valid version regex")
    });

    output
        .lines()
        .find_map(|line| re.captures(line))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
