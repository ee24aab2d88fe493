//! Output formatting for command results
//!
//! Results go to stdout either as JSON or as short human-readable text;
//! logs stay on stderr.

use anyhow::{Context, Result};
use serde_json::json;
use std::path::Path;

use crate::installer::{InstallOutcome, InstallReport};
use crate::profile::HostProfile;
use crate::schedule::UpdateConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_profile(&self, profile: &HostProfile) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(profile).context("Failed to serialize profile")
            }
            OutputFormat::Human => Ok(format!(
                "OS:           {}\nArchitecture: {}\nGPU:          {}",
                profile.os, profile.arch, profile.gpu
            )),
        }
    }

    pub fn format_schedule(&self, path: &Path, config: Option<&UpdateConfig>) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let value = json!({
                    "path": path.display().to_string(),
                    "configured": config.is_some(),
                    "settings": config,
                });
                serde_json::to_string_pretty(&value).context("Failed to serialize schedule")
            }
            OutputFormat::Human => Ok(match config {
                None => format!("No recurring update check configured ({})", path.display()),
                Some(config) => {
                    let last_check = config
                        .last_check
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_else(|| "never".to_string());
                    format!(
                        "Settings:     {}\nEnabled:      {}\nInterval:     {}\nCommand:      {} install\n\
                         Last check:   {}\nLast release: {}\nTimer:        {}\nService:      {}",
                        path.display(),
                        config.enabled,
                        config.interval,
                        config.script_path.display(),
                        last_check,
                        config.last_version.as_deref().unwrap_or("-"),
                        config.timer_name,
                        config.service_name,
                    )
                }
            }),
        }
    }
}

/// One-line summary of an install run, printed regardless of log level
pub fn summarize(report: &InstallReport, install_dir: &Path) -> String {
    let mut lines = vec![match &report.outcome {
        InstallOutcome::AlreadyCurrent { tag, installed } => {
            format!("llama.cpp build {} is up to date (latest {})", installed, tag)
        }
        InstallOutcome::DryRun {
            tag,
            decision,
            selection,
        } => format!(
            "Dry run: would {} using {} from release {} into {}",
            decision,
            selection.asset_name,
            tag,
            install_dir.display()
        ),
        InstallOutcome::Installed { tag, paths, .. } => format!(
            "Installed llama.cpp {} ({} executables) into {}",
            tag,
            paths.len(),
            install_dir.display()
        ),
    }];

    for warning in &report.warnings {
        lines.push(format!("warning: {}", warning));
    }

    lines.join("\n")
}
