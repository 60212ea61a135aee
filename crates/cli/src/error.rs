use std::path::PathBuf;

use peerdas_types::spec::SpecError;
use thiserror::Error;

/// Error messages for commands
#[derive(Error, Debug)]
pub enum Error {
    /// Error creating parent directory
    #[error("Error creating parent directory: {}", .0.display())]
    ParentDir(PathBuf),

    /// Error opening file
    #[error("Error opening file: {}", .0.display())]
    OpenFile(PathBuf),

    /// Error writing file
    #[error("Error writing file: {}", .0.display())]
    WriteFile(PathBuf),

    /// Refusing to overwrite an existing file
    #[error("File already exists: {}", .0.display())]
    FileExists(PathBuf),

    /// Error serializing to TOML or JSON
    #[error("Error serializing: {0}")]
    Serialize(String),

    /// Error parsing a configuration file
    #[error("Error parsing configuration: {0}")]
    Deserialize(String),

    /// No home directory could be determined
    #[error("Home directory not set, pass --home")]
    HomeDir,

    /// Network parameters are inconsistent
    #[error("Invalid network parameters: {0}")]
    InvalidSpec(#[from] SpecError),
}
