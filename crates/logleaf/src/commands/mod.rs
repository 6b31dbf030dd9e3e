//! Command implementations

pub mod archives;
pub mod classify;
pub mod config;
pub mod pipe;
pub mod prune;
pub mod rotate;
pub mod show;
pub mod tail;
pub mod write;

use anyhow::Result;
use logleaf_core::{Error, LoggerConfig, RequestContext, CONFIG_FILES};
use logleaf_logs::LogWriter;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::cli::{RequestArgs, TargetArgs};

/// Per-user config location, used when the working directory has none
fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("logleaf").join(CONFIG_FILES[0]))
}

/// Resolve the effective configuration: config file, then CLI overrides
pub fn load_config(config_path: Option<&Path>, overrides: &TargetArgs) -> Result<LoggerConfig> {
    let mut config = match config_path {
        Some(path) => LoggerConfig::load(path)?,
        None => match LoggerConfig::find_and_load(&std::env::current_dir()?) {
            Ok((config, path)) => {
                debug!("Using config {}", path.display());
                config
            }
            Err(Error::ConfigError(_)) => match user_config_path().filter(|p| p.exists()) {
                Some(path) => {
                    debug!("Using user config {}", path.display());
                    LoggerConfig::load(&path)?
                }
                None => LoggerConfig::default(),
            },
            Err(e) => return Err(e.into()),
        },
    };

    if let Some(file) = &overrides.file {
        config.path = file.clone();
    }
    if let Some(format) = overrides.format {
        config.format = Some(format);
    }
    if let Some(columns) = &overrides.columns {
        config.columns = columns.clone();
    }
    if overrides.log_ip {
        config.log_ip = true;
    }
    if overrides.log_browser_os {
        config.log_browser_os = true;
    }
    if let Some(format) = &overrides.timestamp_format {
        config.timestamp_format = format.clone();
    }
    if let Some(bytes) = overrides.max_size {
        config.max_size_bytes = bytes;
    }
    if let Some(count) = overrides.max_archives {
        config.max_archives = count;
    }

    Ok(config)
}

/// Open the configured log, resuming its rotation period from disk
pub fn open_writer(config: LoggerConfig) -> Result<LogWriter> {
    Ok(LogWriter::resume(config.build()?)?)
}

pub fn request_context(args: &RequestArgs) -> RequestContext {
    let mut ctx = RequestContext::new();
    for (name, value) in &args.headers {
        ctx = ctx.with_header(name, value.clone());
    }
    if let Some(ip) = &args.ip {
        ctx = ctx.with_remote_addr(ip.clone());
    }
    if let Some(ua) = &args.user_agent {
        ctx = ctx.with_user_agent(ua.clone());
    }
    ctx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("logleaf.toml");
        std::fs::write(&config_path, "path = \"app.csv\"\nmax_archives = 3\n").unwrap();

        let overrides = TargetArgs {
            columns: Some(vec!["Time".to_string(), "Event".to_string()]),
            log_ip: true,
            max_size: Some(512),
            ..Default::default()
        };
        let config = load_config(Some(&config_path), &overrides).unwrap();
        assert_eq!(config.path, dir.path().join("app.csv"));
        assert_eq!(config.max_archives, 3);
        assert_eq!(config.max_size_bytes, 512);
        assert!(config.log_ip);
        assert_eq!(config.columns, vec!["Time", "Event"]);
    }

    #[test]
    fn test_request_context() {
        let args = RequestArgs {
            ip: Some("10.0.0.1".to_string()),
            headers: vec![("X-Forwarded-For".to_string(), "203.0.113.5".to_string())],
            user_agent: Some("Firefox/120.0".to_string()),
        };
        let ctx = request_context(&args);
        assert_eq!(ctx.remote_addr.as_deref(), Some("10.0.0.1"));
        assert_eq!(ctx.header("x-forwarded-for"), Some("203.0.113.5"));
        assert_eq!(ctx.user_agent(), "Firefox/120.0");
    }
}
