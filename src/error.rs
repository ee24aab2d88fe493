//! Error and warning types shared by every installer stage
//!
//! Fatal conditions are [`InstallError`] values; anything that only degrades
//! the result is an [`InstallWarning`] that travels with the outcome so the
//! caller can report it.

use crate::config::ConfigError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of fatal errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Environment,
    Network,
    Integrity,
    Selection,
    Archive,
    Io,
    Config,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::Environment => "environment",
            ErrorCategory::Network => "network",
            ErrorCategory::Integrity => "integrity",
            ErrorCategory::Selection => "selection",
            ErrorCategory::Archive => "archive",
            ErrorCategory::Io => "io",
            ErrorCategory::Config => "config",
        };
        write!(f, "{}", name)
    }
}

impl ErrorCategory {
    /// Short remediation advice printed after the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            ErrorCategory::Environment => Some(
                "Supported hosts: Linux (Ubuntu or generic), macOS and Windows on x64/arm64, \
                 and Linux on s390x.",
            ),
            ErrorCategory::Network => Some(
                "Check network access to api.github.com; set GITHUB_TOKEN if rate limited.",
            ),
            ErrorCategory::Integrity => {
                Some("The download was discarded and nothing was installed. Retry later.")
            }
            ErrorCategory::Selection => {
                Some("Run `llamaup profile` to see what was detected on this host.")
            }
            ErrorCategory::Config => {
                Some("Please check your environment variables and command-line arguments.")
            }
            ErrorCategory::Archive | ErrorCategory::Io => None,
        }
    }
}

/// Fatal installer errors
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("Unsupported operating system: {0}")]
    UnsupportedOs(String),

    #[error("Unsupported architecture: {0}")]
    UnsupportedArch(String),

    #[error("Failed to inspect host ({command}): {message}")]
    Probe { command: String, message: String },

    #[error("Request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to parse release manifest: {0}")]
    Manifest(String),

    #[error("Checksum mismatch for {asset}: expected {expected}, got {actual}")]
    DigestMismatch {
        asset: String,
        expected: String,
        actual: String,
    },

    #[error("Unsupported digest '{0}' (expected 'sha256:<hex>')")]
    UnsupportedDigest(String),

    #[error("No release asset matches host profile {profile}")]
    NoMatchingAsset { profile: String },

    #[error("Unsupported archive format: {0}")]
    UnsupportedArchive(String),

    #[error("Failed to read archive {path:?}: {message}")]
    Archive { path: PathBuf, message: String },

    #[error("Archive {0} contains none of the expected executables")]
    NoExecutables(String),

    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed update config {path:?}: {message}")]
    UpdateConfig { path: PathBuf, message: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl InstallError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            InstallError::UnsupportedOs(_)
            | InstallError::UnsupportedArch(_)
            | InstallError::Probe { .. }
            | InstallError::Config(ConfigError::NoInstallDir | ConfigError::NoConfigDir) => {
                ErrorCategory::Environment
            }
            InstallError::Http { .. }
            | InstallError::HttpStatus { .. }
            | InstallError::Manifest(_) => ErrorCategory::Network,
            InstallError::DigestMismatch { .. } | InstallError::UnsupportedDigest(_) => {
                ErrorCategory::Integrity
            }
            InstallError::NoMatchingAsset { .. } => ErrorCategory::Selection,
            InstallError::UnsupportedArchive(_)
            | InstallError::Archive { .. }
            | InstallError::NoExecutables(_) => ErrorCategory::Archive,
            InstallError::Io { .. } => ErrorCategory::Io,
            InstallError::UpdateConfig { .. } | InstallError::Config(_) => ErrorCategory::Config,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        InstallError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Non-fatal conditions surfaced alongside a successful outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallWarning {
    /// CUDA hardware was detected but no CUDA build matched
    CudaFallback { asset: String },
    /// The manifest carries no digest for the asset, so it was not verified
    MissingDigest { asset: String },
    /// The installed binary runs but its version could not be parsed
    UnknownInstalledVersion,
    /// The release tag does not end in a build number
    UnparseableTag { tag: String },
    /// The archive lacked one of the expected executables
    MissingExecutable { name: String },
}

impl fmt::Display for InstallWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallWarning::CudaFallback { asset } => write!(
                f,
                "CUDA GPU detected but no CUDA build is published for this platform; falling back to {}",
                asset
            ),
            InstallWarning::MissingDigest { asset } => {
                write!(f, "No checksum published for {}; skipping verification", asset)
            }
            InstallWarning::UnknownInstalledVersion => write!(
                f,
                "Installed version could not be determined; treating it as outdated"
            ),
            InstallWarning::UnparseableTag { tag } => write!(
                f,
                "Could not parse build number from release tag '{}'; updating anyway",
                tag
            ),
            InstallWarning::MissingExecutable { name } => {
                write!(f, "Archive does not contain {}", name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(
            InstallError::UnsupportedArch("riscv64".into()).category(),
            ErrorCategory::Environment
        );
        assert_eq!(
            InstallError::DigestMismatch {
                asset: "a".into(),
                expected: "x".into(),
                actual: "y".into(),
            }
            .category(),
            ErrorCategory::Integrity
        );
        assert_eq!(
            InstallError::NoMatchingAsset {
                profile: "ubuntu-x64-cpu".into()
            }
            .category(),
            ErrorCategory::Selection
        );
        assert_eq!(
            InstallError::HttpStatus {
                url: "u".into(),
                status: 404
            }
            .category(),
            ErrorCategory::Network
        );
    }

    #[test]
    fn test_warning_display() {
        let warning = InstallWarning::CudaFallback {
            asset: "llama-b1-bin-ubuntu-vulkan-x64.tar.gz".into(),
        };
        let text = warning.to_string();
        assert!(text.contains("CUDA"));
        assert!(text.contains("vulkan"));
    }

    #[test]
    fn test_integrity_hint_says_nothing_installed() {
        let hint = InstallError::DigestMismatch {
            asset: "a.tar.gz".into(),
            expected: "sha256:00".into(),
            actual: "sha256:11".into(),
        }
        .category()
        .hint()
        .unwrap();
        assert!(hint.contains("nothing was installed"));
        assert!(ErrorCategory::Io.hint().is_none());
    }

    #[test]
    fn test_config_errors_are_categorized() {
        let missing_home = InstallError::from(ConfigError::NoInstallDir);
        assert_eq!(missing_home.category(), ErrorCategory::Environment);
        assert!(missing_home.category().hint().is_some());

        let invalid = InstallError::from(ConfigError::ValidationFailed("bad".into()));
        assert_eq!(invalid.category(), ErrorCategory::Config);
        assert!(invalid.to_string().contains("bad"));
    }

    #[test]
    fn test_environment_hint_names_every_arch() {
        let hint = ErrorCategory::Environment.hint().unwrap();
        for arch in ["x64", "arm64", "s390x"] {
            assert!(hint.contains(arch), "{}", arch);
        }
    }
}
