// Configuration file layout for the peerdas CLI

use std::{fmt, str::FromStr};

use clap::ValueEnum;
use peerdas_types::{DasSpec, NodeId};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub das: DasSpec,
    pub node: NodeConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Custody every group regardless of attached validators.
    pub subscribe_all_subnets: bool,
    pub node_id: Option<NodeId>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_level: LogLevel,
    pub log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        })
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Plaintext,
    Json,
}

impl Config {
    /// Apply environment variable overrides.
    ///
    /// Supported variables:
    /// - PEERDAS_SUBSCRIBE_ALL_SUBNETS
    /// - PEERDAS_NODE_ID
    /// - PEERDAS_CUSTODY_REQUIREMENT
    /// - PEERDAS_SAMPLES_PER_SLOT
    /// - PEERDAS_PEER_INFO_CACHE_SIZE
    /// - PEERDAS_LOG_LEVEL
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_env_overrides(&mut self) {
        fn get(key: &str) -> Option<String> {
            std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        }

        fn parse<T: FromStr>(key: &str) -> Option<T> {
            let value = get(key)?;
            match value.parse::<T>() {
                Ok(parsed) => Some(parsed),
                Err(_) => {
                    warn!(key, value = %value, "Invalid environment override, ignoring");
                    None
                }
            }
        }

        if let Some(v) = parse::<bool>("PEERDAS_SUBSCRIBE_ALL_SUBNETS") {
            self.node.subscribe_all_subnets = v;
        }
        if let Some(v) = parse::<NodeId>("PEERDAS_NODE_ID") {
            self.node.node_id = Some(v);
        }
        if let Some(v) = parse::<u64>("PEERDAS_CUSTODY_REQUIREMENT") {
            self.das.custody_requirement = v;
        }
        if let Some(v) = parse::<u64>("PEERDAS_SAMPLES_PER_SLOT") {
            self.das.samples_per_slot = v;
        }
        if let Some(v) = parse::<usize>("PEERDAS_PEER_INFO_CACHE_SIZE") {
            self.das.peer_info_cache_size = v.max(1);
        }
        if let Some(v) = parse::<LogLevel>("PEERDAS_LOG_LEVEL") {
            self.logging.log_level = v;
        }
    }
}
