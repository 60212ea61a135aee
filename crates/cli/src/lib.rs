#![allow(missing_docs)]
pub mod args;
pub mod cmd;
pub mod error;
pub mod file;
pub mod logging;

mod config_file;

pub mod config {
    pub use super::{
        config_file::{Config, LogFormat, LogLevel, LoggingConfig, NodeConfig},
        file::{load_config, load_or_default, save_config},
    };
}
