#![allow(missing_docs)]

use std::{fs, path::Path};

use peerdas_types::DasSpec;
use tracing::debug;

use crate::{config::Config, error::Error};

/// Load configuration from file
pub fn load_config(config_file: &Path) -> Result<Config, Error> {
    let content =
        fs::read_to_string(config_file).map_err(|_| Error::OpenFile(config_file.to_path_buf()))?;
    let config: Config = toml::from_str(&content).map_err(|e| Error::Deserialize(e.to_string()))?;
    config.das.validate()?;
    Ok(config)
}

/// Load configuration from file, or the defaults if the file does not exist
pub fn load_or_default(config_file: &Path) -> Result<Config, Error> {
    if config_file.exists() {
        return load_config(config_file);
    }

    debug!(file = %config_file.display(), "No configuration file, using defaults");
    Ok(Config::default())
}

/// Save configuration to file
pub fn save_config(config_file: &Path, config: &Config) -> Result<(), Error> {
    save(config_file, &toml::to_string_pretty(config).map_err(|e| Error::Serialize(e.to_string()))?)
}

/// Render network parameters as TOML
pub fn spec_to_toml(spec: &DasSpec) -> Result<String, Error> {
    toml::to_string_pretty(spec).map_err(|e| Error::Serialize(e.to_string()))
}

fn save(path: &Path, data: &str) -> Result<(), Error> {
    use std::io::Write;

    if let Some(parent_dir) = path.parent() {
        fs::create_dir_all(parent_dir).map_err(|_| Error::ParentDir(parent_dir.to_path_buf()))?;
    }

    let mut f = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|_| Error::OpenFile(path.to_path_buf()))?;

    f.write_all(data.as_bytes()).map_err(|_| Error::WriteFile(path.to_path_buf()))?;

    Ok(())
}
