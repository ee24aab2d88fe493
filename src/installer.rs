//! The install/update flow
//!
//! One run is strictly linear: fetch the manifest, ask the installed binary
//! for its version, reconcile, select an asset, then download, verify and
//! extract it. Nothing touches the install directory before the archive
//! digest has been checked.

use crate::config::InstallerConfig;
use crate::error::{InstallError, InstallWarning};
use crate::install::{
    executable_names, extract_executables, installed_state, verify_archive, ArchiveKind,
};
use crate::profile::HostProfile;
use crate::reconcile::{reconcile, Decision, InstalledState, UpdateReason};
use crate::release::ReleaseSource;
use crate::schedule::record_check_if_configured;
use crate::select::{select_asset, Selection};
use chrono::Utc;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// What a run ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Installed build is at least as new as the release
    AlreadyCurrent { tag: String, installed: u64 },
    /// Preview only; nothing was downloaded
    DryRun {
        tag: String,
        decision: Decision,
        selection: Selection,
    },
    Installed {
        tag: String,
        selection: Selection,
        paths: Vec<PathBuf>,
    },
}

/// Outcome plus every warning raised on the way
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub outcome: InstallOutcome,
    pub installed: InstalledState,
    pub warnings: Vec<InstallWarning>,
    /// Whether an update config file was stamped with this check
    pub check_recorded: bool,
}

pub struct Installer<'a, S: ReleaseSource> {
    config: &'a InstallerConfig,
    source: S,
    profile: HostProfile,
}

impl<'a, S: ReleaseSource> Installer<'a, S> {
    pub fn new(config: &'a InstallerConfig, source: S, profile: HostProfile) -> Self {
        Self {
            config,
            source,
            profile,
        }
    }

    pub fn run(&self) -> Result<InstallReport, InstallError> {
        let mut warnings = Vec::new();
        let executables = executable_names(self.profile.os);

        let manifest = self.source.fetch_release(self.config.version.as_deref())?;
        info!(tag = %manifest.tag, "Release found");

        let installed = installed_state(&self.config.install_dir, &executables);
        debug!(installed = %installed, "Installed state");

        let decision = if self.config.force {
            Decision::Update(UpdateReason::Forced)
        } else {
            reconcile(&installed, &manifest.tag)
        };

        match &decision {
            Decision::Update(UpdateReason::UnknownInstalledVersion) => {
                note(&mut warnings, InstallWarning::UnknownInstalledVersion)
            }
            Decision::Update(UpdateReason::UnparseableTag { tag }) => note(
                &mut warnings,
                InstallWarning::UnparseableTag { tag: tag.clone() },
            ),
            _ => {}
        }

        if let Decision::Current { installed: build, .. } = decision {
            info!(build, tag = %manifest.tag, "Already up to date");
            let check_recorded = !self.config.dry_run && self.record_check(&manifest.tag);
            return Ok(InstallReport {
                outcome: InstallOutcome::AlreadyCurrent {
                    tag: manifest.tag,
                    installed: build,
                },
                installed,
                warnings,
                check_recorded,
            });
        }

        let selection = select_asset(&manifest, &self.profile).ok_or_else(|| {
            InstallError::NoMatchingAsset {
                profile: self.profile.to_string(),
            }
        })?;
        info!(asset = %selection.asset_name, tier = %selection.tier, "Selected asset");

        if selection.cuda_fallback {
            note(
                &mut warnings,
                InstallWarning::CudaFallback {
                    asset: selection.asset_name.clone(),
                },
            );
        }

        if self.config.dry_run {
            info!(decision = %decision, "Dry run, nothing downloaded");
            return Ok(InstallReport {
                outcome: InstallOutcome::DryRun {
                    tag: manifest.tag,
                    decision,
                    selection,
                },
                installed,
                warnings,
                check_recorded: false,
            });
        }

        let kind = ArchiveKind::from_name(&selection.asset_name)?;

        let mut archive =
            NamedTempFile::new().map_err(|e| InstallError::io(std::env::temp_dir(), e))?;
        self.source
            .download(&selection.download_url, archive.as_file_mut())?;
        archive
            .as_file_mut()
            .flush()
            .map_err(|e| InstallError::io(archive.path(), e))?;

        if let Some(warning) = verify_archive(
            archive.path(),
            &selection.asset_name,
            selection.expected_digest.as_deref(),
        )? {
            warnings.push(warning);
        }

        let paths = extract_executables(
            archive.path(),
            kind,
            &executables,
            &self.config.install_dir,
        )?;
        if paths.is_empty() {
            return Err(InstallError::NoExecutables(selection.asset_name));
        }

        for name in &executables {
            if !paths.iter().any(|p| p.file_name().is_some_and(|f| f == name.as_str())) {
                note(
                    &mut warnings,
                    InstallWarning::MissingExecutable { name: name.clone() },
                );
            }
        }

        info!(
            tag = %manifest.tag,
            dir = %self.config.install_dir.display(),
            count = paths.len(),
            "Installed executables"
        );

        let check_recorded = self.record_check(&manifest.tag);

        Ok(InstallReport {
            outcome: InstallOutcome::Installed {
                tag: manifest.tag,
                selection,
                paths,
            },
            installed,
            warnings,
            check_recorded,
        })
    }

    /// A broken update config never fails an otherwise good run
    fn record_check(&self, tag: &str) -> bool {
        match record_check_if_configured(&self.config.update_config_path, Utc::now(), tag) {
            Ok(recorded) => recorded,
            Err(e) => {
                warn!(error = %e, "Failed to record update check");
                false
            }
        }
    }
}

fn note(warnings: &mut Vec<InstallWarning>, warning: InstallWarning) {
    warn!("{}", warning);
    warnings.push(warning);
}
