//! Recurring update check settings
//!
//! The settings live in a flat `KEY="value"` file. An external scheduler
//! (systemd timer, cron, launchd) re-runs `llamaup install`; each run
//! records when it checked and which release it saw.

use crate::error::InstallError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

pub const DEFAULT_TIMER_NAME: &str = "llamaup-update.timer";
pub const DEFAULT_SERVICE_NAME: &str = "llamaup-update.service";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Hourly,
    Daily,
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interval::Hourly => write!(f, "hourly"),
            Interval::Daily => write!(f, "daily"),
        }
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hourly" => Ok(Interval::Hourly),
            "daily" => Ok(Interval::Daily),
            other => Err(format!(
                "Invalid interval: {}. Valid options: hourly, daily",
                other
            )),
        }
    }
}

/// Persisted state of the recurring update check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateConfig {
    pub interval: Interval,
    pub script_path: PathBuf,
    pub last_check: Option<DateTime<Utc>>,
    pub last_version: Option<String>,
    pub enabled: bool,
    pub timer_name: String,
    pub service_name: String,
}

impl UpdateConfig {
    pub fn new(interval: Interval, script_path: PathBuf) -> Self {
        Self {
            interval,
            script_path,
            last_check: None,
            last_version: None,
            enabled: true,
            timer_name: DEFAULT_TIMER_NAME.to_string(),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
        }
    }

    /// Loads the file at `path`; `Ok(None)` when it does not exist
    pub fn load(path: &Path) -> Result<Option<Self>, InstallError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(|e| InstallError::io(path, e))?;
        Self::parse(&content)
            .map(Some)
            .map_err(|message| InstallError::UpdateConfig {
                path: path.to_path_buf(),
                message,
            })
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        let mut interval = None;
        let mut script_path = None;
        let mut last_check = None;
        let mut last_version = None;
        let mut enabled = true;
        let mut timer_name = DEFAULT_TIMER_NAME.to_string();
        let mut service_name = DEFAULT_SERVICE_NAME.to_string();

        for (lineno, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| format!("line {}: expected KEY=\"value\"", lineno + 1))?;
            let value = unquote(value.trim());

            match key.trim() {
                "INTERVAL" => interval = Some(value.parse::<Interval>()?),
                "SCRIPT_PATH" => script_path = Some(PathBuf::from(value)),
                "LAST_CHECK" if !value.is_empty() => {
                    let parsed = DateTime::parse_from_rfc3339(value)
                        .map_err(|e| format!("line {}: bad LAST_CHECK: {}", lineno + 1, e))?;
                    last_check = Some(parsed.with_timezone(&Utc));
                }
                "LAST_VERSION" if !value.is_empty() => last_version = Some(value.to_string()),
                "ENABLED" => enabled = value.eq_ignore_ascii_case("true"),
                "TIMER_NAME" => timer_name = value.to_string(),
                "SERVICE_NAME" => service_name = value.to_string(),
                other => debug!(key = other, "Ignoring update config key"),
            }
        }

        Ok(Self {
            interval: interval.ok_or("missing INTERVAL")?,
            script_path: script_path.ok_or("missing SCRIPT_PATH")?,
            last_check,
            last_version,
            enabled,
            timer_name,
            service_name,
        })
    }

    pub fn render(&self) -> String {
        let last_check = self
            .last_check
            .map(|t| t.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
            .unwrap_or_default();

        format!(
            "INTERVAL=\"{}\"\n\
             SCRIPT_PATH=\"{}\"\n\
             LAST_CHECK=\"{}\"\n\
             LAST_VERSION=\"{}\"\n\
             ENABLED=\"{}\"\n\
             TIMER_NAME=\"{}\"\n\
             SERVICE_NAME=\"{}\"\n",
            self.interval,
            self.script_path.display(),
            last_check,
            self.last_version.as_deref().unwrap_or_default(),
            self.enabled,
            self.timer_name,
            self.service_name,
        )
    }

    pub fn save(&self, path: &Path) -> Result<(), InstallError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| InstallError::io(parent, e))?;
        }
        fs::write(path, self.render()).map_err(|e| InstallError::io(path, e))?;
        debug!(path = %path.display(), "Update config saved");
        Ok(())
    }

    /// Deletes the file; returns whether there was one
    pub fn remove(path: &Path) -> Result<bool, InstallError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(InstallError::io(path, e)),
        }
    }

    pub fn record_check(&mut self, at: DateTime<Utc>, version: &str) {
        self.last_check = Some(at);
        self.last_version = Some(version.to_string());
    }
}

/// Stamps the check into an existing config file; no file means nothing to do
pub fn record_check_if_configured(
    path: &Path,
    at: DateTime<Utc>,
    version: &str,
) -> Result<bool, InstallError> {
    let Some(mut config) = UpdateConfig::load(path)? else {
        return Ok(false);
    };

    config.record_check(at, version);
    config.save(path)?;
    info!(version, "Recorded update check");
    Ok(true)
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
