//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use logleaf_core::FormatKind;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "logleaf")]
#[command(version, about = "Append-only file logger with weekly rotation and retention")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (.toml, .yaml, .yml or .json)
    #[arg(short, long, global = true, env = "LOGLEAF_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output in JSON format instead of tables
    #[arg(long, global = true)]
    pub json: bool,
}

/// Overrides applied on top of the config file
#[derive(Args, Default)]
pub struct TargetArgs {
    /// Log file (.txt, .csv or .tsv)
    #[arg(short, long, global = true)]
    pub file: Option<PathBuf>,

    /// Force the record format instead of using the extension
    #[arg(long, global = true, value_parser = parse_format)]
    pub format: Option<FormatKind>,

    /// Column names for delimited logs, timestamp column first
    #[arg(long, global = true, value_delimiter = ',')]
    pub columns: Option<Vec<String>>,

    /// Append the client IP column
    #[arg(long, global = true)]
    pub log_ip: bool,

    /// Append Browser and OS columns
    #[arg(long, global = true)]
    pub log_browser_os: bool,

    /// Timestamp format (strftime syntax)
    #[arg(long, global = true)]
    pub timestamp_format: Option<String>,

    /// Rotate when the file reaches this many bytes
    #[arg(long, global = true)]
    pub max_size: Option<u64>,

    /// Archives kept after pruning
    #[arg(long, global = true)]
    pub max_archives: Option<usize>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Append one record
    Write(WriteArgs),

    /// Append every line read from stdin
    Pipe(RequestArgs),

    /// Print the whole active log
    Show,

    /// Print the last lines of the active log
    Tail(TailArgs),

    /// Rotate the active log if due
    Rotate {
        /// Rotate even if no trigger applies
        #[arg(long)]
        force: bool,
    },

    /// Delete archives beyond the retention count
    Prune {
        /// Archives to keep (defaults to the configured count)
        #[arg(long)]
        keep: Option<usize>,
    },

    /// List archives, newest first
    Archives,

    /// Classify a user agent string
    Classify {
        /// User agent to classify
        user_agent: String,
    },

    /// Print the effective configuration
    Config,
}

#[derive(Args)]
pub struct WriteArgs {
    /// Field values; a single value is logged as a message
    #[arg(required = true)]
    pub fields: Vec<String>,

    #[command(flatten)]
    pub request: RequestArgs,
}

/// Request context for the IP/Browser/OS columns
#[derive(Args, Default)]
pub struct RequestArgs {
    /// Client address of the request
    #[arg(long)]
    pub ip: Option<String>,

    /// Request header in `Name: value` form (repeatable)
    #[arg(long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// User agent of the request
    #[arg(long)]
    pub user_agent: Option<String>,
}

#[derive(Args)]
pub struct TailArgs {
    /// Number of lines to show
    #[arg(short = 'n', long, default_value = "15")]
    pub lines: usize,

    /// Follow log output
    #[arg(long)]
    pub follow: bool,
}

fn parse_format(s: &str) -> Result<FormatKind, String> {
    s.parse().map_err(|e: logleaf_core::Error| e.to_string())
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once(':')
        .ok_or_else(|| format!("Invalid header '{}': expected `Name: value`", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("Invalid header '{}': empty name", s));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
