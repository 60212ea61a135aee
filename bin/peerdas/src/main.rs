#![allow(missing_docs)]
//! PeerDAS custody and column sampling tool

use color_eyre::eyre::{Result, eyre};
use peerdas_cli::{
    args::{Args, Commands},
    cmd::{custody::CustodyCmd, init::InitCmd, spec::SpecCmd},
    config::{self, Config},
    logging,
};
use tracing::{info, trace};

/// Main entry point for the application
///
/// This function:
/// - Parses command-line arguments
/// - Loads the configuration file, falling back to defaults
/// - Initializes logging
/// - Runs the selected command
fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::new();

    let mut config = match &args.command {
        // init writes the file, so there is nothing to load yet
        Commands::Init(_) => Config::default(),
        _ => {
            let config_file = args
                .get_config_file_path()
                .map_err(|error| eyre!("Failed to get configuration file path: {error}"))?;
            config::load_or_default(&config_file)
                .map_err(|error| eyre!("Failed to load configuration file: {error}"))?
        }
    };
    config.apply_env_overrides();

    // Command-line flags take precedence over the configuration file.
    if let Some(log_level) = args.log_level {
        config.logging.log_level = log_level;
    }
    if let Some(log_format) = args.log_format {
        config.logging.log_format = log_format;
    }

    // Drop guard flushing buffered logs on exit; must not be bound to `_`.
    let _guard = logging::init(config.logging.log_level, config.logging.log_format);

    trace!("Command-line parameters: {args:?}");

    match &args.command {
        Commands::Init(cmd) => init(&args, cmd, config),
        Commands::Custody(cmd) => custody(cmd, &config),
        Commands::Spec(cmd) => spec(cmd, &config),
    }
}

fn init(args: &Args, cmd: &InitCmd, config: Config) -> Result<()> {
    let config_file = args.get_config_file_path()?;
    cmd.run(&config_file, config.logging)
        .map_err(|error| eyre!("Failed to run init command: {error:?}"))
}

fn custody(cmd: &CustodyCmd, config: &Config) -> Result<()> {
    let report = cmd.run(config)?;
    info!(
        node_id = %report.node_id,
        count = report.custody_group_count,
        columns = report.custody_columns.len(),
        "Computed custody assignment"
    );

    println!("{}", report.render(cmd.json)?);
    Ok(())
}

fn spec(cmd: &SpecCmd, config: &Config) -> Result<()> {
    println!("{}", cmd.run(config)?);
    Ok(())
}
