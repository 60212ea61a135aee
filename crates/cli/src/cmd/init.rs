//! Init command

use std::path::Path;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use tracing::{info, warn};

use crate::{
    config::{Config, LoggingConfig},
    error::Error,
    file::save_config,
};

#[derive(Parser, Debug, Clone, Default, PartialEq)]
pub struct InitCmd {
    /// Overwrite an existing configuration file
    #[clap(long)]
    pub overwrite: bool,
}

impl InitCmd {
    /// Write a default configuration file, keeping the logging settings in effect.
    pub fn run(&self, config_file: &Path, logging: LoggingConfig) -> Result<()> {
        if config_file.exists() {
            if !self.overwrite {
                return Err(eyre!(Error::FileExists(config_file.to_path_buf())));
            }
            warn!(file = %config_file.display(), "Overwriting existing configuration file");
        }

        let config = Config { logging, ..Default::default() };
        save_config(config_file, &config)?;

        info!(file = %config_file.display(), "Wrote configuration file");
        Ok(())
    }
}
