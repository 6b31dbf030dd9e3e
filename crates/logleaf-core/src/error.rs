//! Error types for LogLeaf

use std::path::PathBuf;

/// LogLeaf error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Log file path cannot be empty")]
    EmptyPath,

    #[error("Invalid file extension for {path}. Allowed extensions are: {allowed}")]
    InvalidExtension { path: PathBuf, allowed: String },

    #[error("Invalid timestamp format: {0}")]
    InvalidTimestampFormat(String),

    #[error("Field count mismatch: {columns} columns configured but record has {values} values")]
    FieldCountMismatch { columns: usize, values: usize },

    #[error("Failed to rotate {path}: {source}")]
    Rotation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write to log file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read log file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid archive pattern: {0}")]
    Pattern(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Result type alias for LogLeaf
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::ConfigError(msg.into())
    }

    pub fn rotation(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Rotation {
            path: path.into(),
            source,
        }
    }

    pub fn write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::WriteFailed {
            path: path.into(),
            source,
        }
    }

    pub fn read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::ReadFailed {
            path: path.into(),
            source,
        }
    }

    /// Configuration errors are not recoverable for the instance that raised them.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::ConfigError(_)
                | Error::ConfigNotFound(_)
                | Error::EmptyPath
                | Error::InvalidExtension { .. }
                | Error::InvalidTimestampFormat(_)
                | Error::FieldCountMismatch { .. }
                | Error::Pattern(_)
                | Error::TomlError(_)
                | Error::YamlError(_)
                | Error::JsonError(_)
        )
    }
}
