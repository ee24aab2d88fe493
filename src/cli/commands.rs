use crate::schedule::Interval;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Installs and updates prebuilt llama.cpp binaries
#[derive(Parser, Debug)]
#[command(
    name = "llamaup",
    about = "Installs and updates prebuilt llama.cpp binaries",
    version,
    long_about = "llamaup detects the host OS, architecture and GPU, picks the matching \
                  llama.cpp release archive from GitHub, verifies its checksum and installs \
                  llama-cli and llama-server."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only report errors"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Install or update llama.cpp binaries",
        long_about = "Fetches the release manifest, compares it with the installed build and \
                      installs the best matching archive when needed.\n\n\
                      Examples:\n  \
                      llamaup install\n  \
                      llamaup install --dir /opt/llama/bin\n  \
                      llamaup install --version b7426 --force\n  \
                      llamaup install --dry-run"
    )]
    Install(InstallArgs),

    #[command(about = "Show the detected host profile")]
    Profile(ProfileArgs),

    #[command(
        about = "Manage the recurring update check",
        long_about = "Records how often an external scheduler should re-run `llamaup install`. \
                      Each run then stamps the time and release it saw into the settings file."
    )]
    Schedule {
        #[command(subcommand)]
        action: ScheduleAction,
    },
}

#[derive(Args, Debug, Clone)]
pub struct InstallArgs {
    #[arg(
        short = 'd',
        long,
        value_name = "DIR",
        help = "Install directory (defaults to ~/.local/bin)"
    )]
    pub dir: Option<PathBuf>,

    #[arg(
        long,
        value_name = "TAG",
        help = "Release tag to install, e.g. b7426 (defaults to latest); an older tag than the installed build needs --force"
    )]
    pub version: Option<String>,

    #[arg(long, help = "Show what would be installed without downloading")]
    pub dry_run: bool,

    #[arg(short = 'f', long, help = "Reinstall even if the installed build is current")]
    pub force: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    #[arg(long, value_enum, default_value = "human", help = "Output format")]
    pub format: OutputFormatArg,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ScheduleAction {
    #[command(about = "Enable the recurring update check")]
    Set {
        #[arg(long, value_parser = parse_interval, default_value = "daily")]
        interval: Interval,

        #[arg(
            long,
            value_name = "PATH",
            help = "Command the scheduler runs (defaults to this executable)"
        )]
        script_path: Option<PathBuf>,
    },

    #[command(about = "Show the recurring update check settings")]
    Status {
        #[arg(long, value_enum, default_value = "human", help = "Output format")]
        format: OutputFormatArg,
    },

    #[command(about = "Remove the recurring update check settings")]
    Remove,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

fn parse_interval(s: &str) -> Result<Interval, String> {
    s.parse()
}
