//! Finite State Machine Generator

use clap::Parser;
use fsmgen::{Config, Result, VERSION, cli, init_logging};

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    let config = if let Some(config_path) = &args.config {
        Config::from_file(config_path)?
    } else {
        Config::load()?
    };

    let level = if args.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    init_logging(level);

    tracing::debug!("fsmgen v{}", VERSION);
    tracing::debug!("Parsed arguments: {:?}", args);
    tracing::debug!("Loaded configuration: {:?}", config);

    cli::execute(args, config)?;

    Ok(())
}
