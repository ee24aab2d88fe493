//! llamaup - installer and updater for prebuilt llama.cpp binaries
//!
//! The library detects the host platform, picks the best matching archive
//! from a llama.cpp GitHub release, verifies its SHA-256 digest and installs
//! `llama-cli` and `llama-server` into a directory of executables.
//!
//! # Core Concepts
//!
//! - **Host profile**: OS, architecture and GPU backend of the machine,
//!   detected through a [`profile::SystemProbe`]
//! - **Selection**: a tiered substring match of the profile against the
//!   release's asset names
//! - **Reconciliation**: comparing the installed build number with the
//!   release tag to decide between install, update or nothing
//!
//! # Example Usage
//!
//! ```no_run
//! use llamaup::profile::{detect_profile, RealProbe};
//! use llamaup::release::GitHubReleases;
//! use llamaup::{Installer, InstallerConfig};
//!
//! fn run() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = InstallerConfig::from_env()?;
//!     let profile = detect_profile(&RealProbe::new())?;
//!     let source = GitHubReleases::new(&config)?;
//!
//!     let report = Installer::new(&config, source, profile).run()?;
//!     for warning in &report.warnings {
//!         eprintln!("warning: {}", warning);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Project Structure
//!
//! - [`profile`]: host detection
//! - [`release`]: release manifest, digests and the GitHub client
//! - [`select`]: asset selection cascade
//! - [`reconcile`]: install/update decision
//! - [`install`]: verification, extraction and installed-version probing
//! - [`installer`]: the end-to-end flow
//! - [`schedule`]: recurring update check settings

pub mod cli;
pub mod config;
pub mod error;
pub mod install;
pub mod installer;
pub mod profile;
pub mod reconcile;
pub mod release;
pub mod schedule;
pub mod select;
pub mod util;

pub use config::{ConfigError, InstallerConfig};
pub use error::{ErrorCategory, InstallError, InstallWarning};
pub use installer::{InstallOutcome, InstallReport, Installer};
pub use profile::{Arch, Gpu, HostProfile, Os};
pub use reconcile::{Decision, InstalledState, UpdateReason};
pub use release::{Asset, ReleaseManifest, ReleaseSource};
pub use select::{select_asset, MatchTier, Selection};
pub use util::{init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
