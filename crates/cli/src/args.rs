//! Node command-line interface configuration
//!
//! The CLI is built with clap derive. Global flags select the home
//! directory, the configuration file and the logging overrides; each
//! subcommand carries its own arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::{
    cmd::{custody::CustodyCmd, init::InitCmd, spec::SpecCmd},
    config::{LogFormat, LogLevel},
    error::Error,
};

const APP_FOLDER: &str = ".peerdas";
const CONFIG_FILE: &str = "config.toml";

#[derive(Parser, Clone, Debug, PartialEq)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Home directory (default: `~/.peerdas`)
    #[arg(long, global = true, value_name = "HOME_DIR")]
    pub home: Option<PathBuf>,

    /// Configuration file (default: `<HOME_DIR>/config/config.toml`)
    #[arg(long, global = true, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Log level, overrides the configuration file
    #[arg(long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Log format, overrides the configuration file
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone, Debug, PartialEq)]
pub enum Commands {
    /// Write a default configuration file
    Init(InitCmd),

    /// Show the custody groups, columns and subnets of a node
    Custody(CustodyCmd),

    /// Print the effective network parameters
    Spec(SpecCmd),
}

impl Args {
    pub fn new() -> Self {
        Args::parse()
    }

    /// Home directory, falling back to `$HOME/.peerdas`.
    pub fn get_home_dir(&self) -> Result<PathBuf, Error> {
        if let Some(home) = &self.home {
            return Ok(home.clone());
        }

        std::env::var_os("HOME")
            .filter(|home| !home.is_empty())
            .map(|home| PathBuf::from(home).join(APP_FOLDER))
            .ok_or(Error::HomeDir)
    }

    pub fn get_config_dir(&self) -> Result<PathBuf, Error> {
        Ok(self.get_home_dir()?.join("config"))
    }

    pub fn get_config_file_path(&self) -> Result<PathBuf, Error> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => Ok(self.get_config_dir()?.join(CONFIG_FILE)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_custody_command() {
        let node_id = format!("0x{}", "01".repeat(32));
        let args = Args::try_parse_from([
            "peerdas",
            "--home",
            "/tmp/peerdas",
            "--log-level",
            "debug",
            "custody",
            "--node-id",
            node_id.as_str(),
            "--count",
            "4",
        ])
        .unwrap();

        assert_eq!(args.log_level, Some(LogLevel::Debug));
        assert_eq!(args.get_home_dir().unwrap(), PathBuf::from("/tmp/peerdas"));
        assert_eq!(
            args.get_config_file_path().unwrap(),
            PathBuf::from("/tmp/peerdas/config/config.toml")
        );
        assert!(matches!(args.command, Commands::Custody(_)));
    }

    #[test]
    fn test_short_node_id_rejected() {
        assert!(Args::try_parse_from(["peerdas", "custody", "--node-id", "0x01"]).is_err());
    }

    #[test]
    fn test_explicit_config_path_wins() {
        let args =
            Args::try_parse_from(["peerdas", "spec", "--config", "/etc/peerdas.toml"]).unwrap();
        assert_eq!(args.get_config_file_path().unwrap(), PathBuf::from("/etc/peerdas.toml"));
    }

    #[test]
    fn test_unknown_log_format_rejected() {
        assert!(Args::try_parse_from(["peerdas", "--log-format", "xml", "spec"]).is_err());
    }
}
