//! Configuration for LogLeaf targets
//!
//! A [`LoggerConfig`] is assembled once (in code or from a TOML, YAML or
//! JSON file) and validated into an immutable [`LogTarget`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::*;
use crate::error::{Error, Result};
use crate::types::{validate_timestamp_format, ContextColumns, FormatKind, LogTarget};

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(ConfigFormat::Toml),
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            "json" => Some(ConfigFormat::Json),
            _ => None,
        }
    }

    /// Detect format from file path
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

fn default_timestamp_format() -> String {
    DEFAULT_TIMESTAMP_FORMAT.to_string()
}

fn default_max_size() -> u64 {
    DEFAULT_MAX_LOG_SIZE
}

fn default_max_archives() -> usize {
    DEFAULT_MAX_ARCHIVES
}

fn default_archive_prefix() -> String {
    DEFAULT_ARCHIVE_PREFIX.to_string()
}

/// Logger configuration (logleaf.toml/yaml/json)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Active log file
    pub path: PathBuf,
    /// Explicit format; detected from the extension when absent
    #[serde(default)]
    pub format: Option<FormatKind>,
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
    /// Column names for delimited logs, timestamp column included
    #[serde(default)]
    pub columns: Vec<String>,
    /// Append the client IP to every record
    #[serde(default)]
    pub log_ip: bool,
    /// Append browser and OS labels to every record
    #[serde(default)]
    pub log_browser_os: bool,
    /// Size ceiling that triggers rotation within a period
    #[serde(default = "default_max_size")]
    pub max_size_bytes: u64,
    /// Archives kept after pruning
    #[serde(default = "default_max_archives")]
    pub max_archives: usize,
    #[serde(default = "default_archive_prefix")]
    pub archive_prefix: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_FILE)
    }
}

impl LoggerConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: None,
            timestamp_format: default_timestamp_format(),
            columns: Vec::new(),
            log_ip: false,
            log_browser_os: false,
            max_size_bytes: DEFAULT_MAX_LOG_SIZE,
            max_archives: DEFAULT_MAX_ARCHIVES,
            archive_prefix: default_archive_prefix(),
        }
    }

    pub fn with_format(mut self, format: FormatKind) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = format.into();
        self
    }

    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_ip(mut self, enabled: bool) -> Self {
        self.log_ip = enabled;
        self
    }

    pub fn with_browser_os(mut self, enabled: bool) -> Self {
        self.log_browser_os = enabled;
        self
    }

    pub fn with_max_size(mut self, bytes: u64) -> Self {
        self.max_size_bytes = bytes;
        self
    }

    pub fn with_max_archives(mut self, count: usize) -> Self {
        self.max_archives = count;
        self
    }

    pub fn with_archive_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.archive_prefix = prefix.into();
        self
    }

    /// Load config from file, automatically detecting format from extension
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }

        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            Error::ConfigError(format!(
                "Unsupported config file extension: {}. Expected .toml, .yaml, .yml, or .json",
                path.display()
            ))
        })?;

        let content = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&content, format)?;

        // Relative log paths are resolved against the config file's directory
        if config.path.is_relative() && !config.path.as_os_str().is_empty() {
            if let Some(parent) = path.parent() {
                config.path = parent.join(&config.path);
            }
        }
        Ok(config)
    }

    /// Parse config content with specified format
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        let config = match format {
            ConfigFormat::Toml => toml::from_str(content)?,
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };
        Ok(config)
    }

    /// Find and load a config file from a directory
    pub fn find_and_load(dir: &Path) -> Result<(Self, PathBuf)> {
        for name in CONFIG_FILES {
            let path = dir.join(name);
            if path.exists() {
                let config = Self::load(&path)?;
                return Ok((config, path));
            }
        }
        Err(Error::ConfigError(format!(
            "No config file found in {}. Expected one of: {:?}",
            dir.display(),
            CONFIG_FILES
        )))
    }

    /// Validate and freeze into a target
    pub fn build(self) -> Result<LogTarget> {
        if self.path.as_os_str().is_empty() {
            return Err(Error::EmptyPath);
        }

        let detected = FormatKind::from_path(&self.path).ok_or_else(|| Error::InvalidExtension {
            path: self.path.clone(),
            allowed: ALLOWED_EXTENSIONS.join(", "),
        })?;
        let format = self.format.unwrap_or(detected).into_format();

        validate_timestamp_format(&self.timestamp_format)?;

        if self.archive_prefix.trim().is_empty() {
            return Err(Error::config("Archive prefix cannot be empty"));
        }

        let context = ContextColumns {
            ip: self.log_ip,
            browser_os: self.log_browser_os,
        };

        // Context columns only extend an explicit header
        let mut columns = self.columns;
        if !columns.is_empty() {
            columns.extend(context.names().into_iter().map(String::from));
        }

        Ok(LogTarget {
            path: self.path,
            format,
            timestamp_format: self.timestamp_format,
            columns,
            context,
            max_size_bytes: self.max_size_bytes,
            max_archives: self.max_archives,
            archive_prefix: self.archive_prefix,
        })
    }
}
