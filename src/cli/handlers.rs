use crate::cli::commands::{InstallArgs, ProfileArgs, ScheduleAction};
use crate::cli::output::{summarize, OutputFormatter};
use crate::config::{update_config_path, InstallerConfig};
use crate::error::InstallError;
use crate::installer::Installer;
use crate::profile::{detect_profile, RealProbe};
use crate::release::GitHubReleases;
use crate::schedule::UpdateConfig;

use anyhow::{Context, Result};
use std::env;
use tracing::{debug, error, info};

pub fn handle_install(args: &InstallArgs, quiet: bool) -> i32 {
    info!("Starting llama.cpp install");

    let config = match install_config(args) {
        Ok(config) => config,
        Err(e) => return report_failure(&e),
    };
    debug!("Install directory: {}", config.install_dir.display());

    let profile = match detect_profile(&RealProbe::new()) {
        Ok(profile) => profile,
        Err(e) => return report_failure(&e),
    };
    info!(profile = %profile, "Detected host");

    let source = match GitHubReleases::new(&config) {
        Ok(source) => source,
        Err(e) => return report_failure(&e),
    };

    let installer = Installer::new(&config, source, profile);
    match installer.run() {
        Ok(report) => {
            if !quiet {
                println!("{}", summarize(&report, &config.install_dir));
            }
            0
        }
        Err(e) => report_failure(&e),
    }
}

pub fn handle_profile(args: &ProfileArgs) -> i32 {
    let profile = match detect_profile(&RealProbe::new()) {
        Ok(profile) => profile,
        Err(e) => return report_failure(&e),
    };

    match OutputFormatter::new(args.format.into()).format_profile(&profile) {
        Ok(text) => {
            println!("{}", text);
            0
        }
        Err(e) => {
            error!("{:#}", e);
            1
        }
    }
}

pub fn handle_schedule(action: &ScheduleAction) -> i32 {
    match run_schedule(action) {
        Ok(()) => 0,
        Err(e) => {
            error!("{:#}", e);
            1
        }
    }
}

fn run_schedule(action: &ScheduleAction) -> Result<()> {
    let path = update_config_path().context("Failed to locate the update config")?;

    match action {
        ScheduleAction::Set {
            interval,
            script_path,
        } => {
            let script_path = match script_path {
                Some(path) => path.clone(),
                None => env::current_exe().context("Failed to locate the llamaup executable")?,
            };

            // Keep the check history when only the interval changes
            let mut config = UpdateConfig::load(&path)?
                .unwrap_or_else(|| UpdateConfig::new(*interval, script_path.clone()));
            config.interval = *interval;
            config.script_path = script_path;
            config.enabled = true;
            config.save(&path)?;

            info!(interval = %config.interval, path = %path.display(), "Update check enabled");
            println!(
                "Recurring update check saved to {}\nSchedule `{} install` to run {} \
                 (e.g. with {}).",
                path.display(),
                config.script_path.display(),
                config.interval,
                config.timer_name
            );
        }
        ScheduleAction::Status { format } => {
            let config = UpdateConfig::load(&path)?;
            let text = OutputFormatter::new((*format).into())
                .format_schedule(&path, config.as_ref())?;
            println!("{}", text);
        }
        ScheduleAction::Remove => {
            if UpdateConfig::remove(&path)? {
                info!(path = %path.display(), "Update check removed");
                println!("Removed {}", path.display());
            } else {
                println!("No recurring update check configured");
            }
        }
    }

    Ok(())
}

fn install_config(args: &InstallArgs) -> Result<InstallerConfig, InstallError> {
    let mut config = InstallerConfig::from_env()?;

    if let Some(dir) = &args.dir {
        debug!("Install directory overridden to: {}", dir.display());
        config.install_dir = dir.clone();
    }
    if let Some(version) = &args.version {
        config.version = Some(version.clone());
    }
    config.dry_run = args.dry_run;
    config.force = args.force;

    config.validate()?;
    Ok(config)
}

fn report_failure(e: &InstallError) -> i32 {
    let category = e.category();
    error!(category = %category, "{}", e);
    if let Some(hint) = category.hint() {
        eprintln!("\n{}", hint);
    }
    1
}
