use llamaup::cli::commands::{CliArgs, Commands};
use llamaup::cli::handlers::{handle_install, handle_profile, handle_schedule};
use llamaup::util::logging::{init_logging, parse_level, LoggingConfig};
use llamaup::VERSION;

use clap::Parser;
use tracing::{debug, Level};

fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("llamaup v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Install(install_args) => handle_install(install_args, args.quiet),
        Commands::Profile(profile_args) => handle_profile(profile_args),
        Commands::Schedule { action } => handle_schedule(action),
    };

    std::process::exit(exit_code);
}

/// Flags win over `LLAMAUP_LOG_LEVEL`; `RUST_LOG` wins over both
fn init_logging_from_args(args: &CliArgs) {
    let mut config = LoggingConfig::from_env();

    if let Some(level_str) = &args.log_level {
        config.level = parse_level(level_str);
    } else if args.verbose {
        config.level = Level::DEBUG;
    } else if args.quiet {
        config.level = Level::ERROR;
    }

    init_logging(config);
}
