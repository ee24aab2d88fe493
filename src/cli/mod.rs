pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, Commands, InstallArgs, ProfileArgs, ScheduleAction};
pub use output::{OutputFormat, OutputFormatter};
