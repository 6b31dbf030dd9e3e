//! Core types for LogLeaf

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::constants::*;
use crate::error::{Error, Result};

/// File kind as written in configuration or implied by the file extension
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    Txt,
    Csv,
    Tsv,
}

impl FormatKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatKind::Txt => "txt",
            FormatKind::Csv => "csv",
            FormatKind::Tsv => "tsv",
        }
    }

    /// Detect kind from a log file path
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str())? {
            "txt" => Some(FormatKind::Txt),
            "csv" => Some(FormatKind::Csv),
            "tsv" => Some(FormatKind::Tsv),
            _ => None,
        }
    }

    /// Resolve into the format used for writing
    pub fn into_format(self) -> LogFormat {
        match self {
            FormatKind::Txt => LogFormat::PlainText,
            FormatKind::Csv => LogFormat::Delimited { delimiter: ',' },
            FormatKind::Tsv => LogFormat::Delimited { delimiter: '\t' },
        }
    }
}

impl FromStr for FormatKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "txt" | "text" | "plain" => Ok(FormatKind::Txt),
            "csv" => Ok(FormatKind::Csv),
            "tsv" => Ok(FormatKind::Tsv),
            _ => Err(Error::ConfigError(format!("Invalid format: {}", s))),
        }
    }
}

impl std::fmt::Display for FormatKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How records are serialized, fixed once per target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    PlainText,
    Delimited { delimiter: char },
}

impl LogFormat {
    pub fn delimiter(&self) -> Option<char> {
        match self {
            LogFormat::PlainText => None,
            LogFormat::Delimited { delimiter } => Some(*delimiter),
        }
    }

    pub fn is_delimited(&self) -> bool {
        matches!(self, LogFormat::Delimited { .. })
    }
}

/// Rotation period identifier: ISO week within its ISO week-year.
///
/// Ordering and equality use both parts, so week 1 of 2025 never
/// compares equal to week 1 of 2024.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeriodKey {
    pub year: i32,
    pub week: u32,
}

impl PeriodKey {
    pub fn new(year: i32, week: u32) -> Self {
        Self { year, week }
    }

    /// Period containing the given instant
    pub fn of<Tz: TimeZone>(at: &DateTime<Tz>) -> Self {
        let iso = at.iso_week();
        Self {
            year: iso.year(),
            week: iso.week(),
        }
    }

    /// Label used in archive names, e.g. `"7 2024"`
    pub fn label(&self) -> String {
        format!("{} {}", self.week, self.year)
    }
}

impl std::fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "W{} {}", self.week, self.year)
    }
}

/// Which request-derived columns are appended to every record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextColumns {
    pub ip: bool,
    pub browser_os: bool,
}

impl ContextColumns {
    pub fn is_empty(&self) -> bool {
        !self.ip && !self.browser_os
    }

    /// Column names in the order their values are appended
    pub fn names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.ip {
            names.push(IP_COLUMN);
        }
        if self.browser_os {
            names.push(BROWSER_COLUMN);
            names.push(OS_COLUMN);
        }
        names
    }

    pub fn len(&self) -> usize {
        usize::from(self.ip) + 2 * usize::from(self.browser_os)
    }
}

/// Caller's request context, passed explicitly with each entry.
///
/// Header names are matched case-insensitively.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestContext {
    #[serde(default, deserialize_with = "lowercase_keys")]
    headers: HashMap<String, String>,
    #[serde(default)]
    pub remote_addr: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn lowercase_keys<'de, D>(deserializer: D) -> std::result::Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let headers = HashMap::<String, String>::deserialize(deserializer)?;
    Ok(headers
        .into_iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), value))
        .collect())
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_remote_addr(mut self, addr: impl Into<String>) -> Self {
        self.remote_addr = Some(addr.into());
        self
    }

    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Explicit user agent, falling back to the `User-Agent` header
    pub fn user_agent(&self) -> &str {
        self.user_agent
            .as_deref()
            .or_else(|| self.header("user-agent"))
            .unwrap_or("")
    }
}

/// A validated, immutable log destination
#[derive(Debug, Clone)]
pub struct LogTarget {
    pub(crate) path: PathBuf,
    pub(crate) format: LogFormat,
    pub(crate) timestamp_format: String,
    pub(crate) columns: Vec<String>,
    pub(crate) context: ContextColumns,
    pub(crate) max_size_bytes: u64,
    pub(crate) max_archives: usize,
    pub(crate) archive_prefix: String,
}

impl LogTarget {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> LogFormat {
        self.format
    }

    pub fn timestamp_format(&self) -> &str {
        &self.timestamp_format
    }

    /// Full header row: configured columns followed by context columns.
    /// Empty when no columns were configured.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn context(&self) -> ContextColumns {
        self.context
    }

    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    pub fn max_archives(&self) -> usize {
        self.max_archives
    }

    pub fn archive_prefix(&self) -> &str {
        &self.archive_prefix
    }

    /// True when a header row belongs at the top of every fresh file
    pub fn has_header(&self) -> bool {
        self.format.is_delimited() && !self.columns.is_empty()
    }
}

/// Reject strftime strings chrono cannot render
pub fn validate_timestamp_format(format: &str) -> Result<()> {
    if format.is_empty() {
        return Err(Error::InvalidTimestampFormat(
            "format cannot be empty".to_string(),
        ));
    }
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(Error::InvalidTimestampFormat(format.to_string()));
    }
    // Some specifiers parse but cannot be rendered
    render_timestamp(&Utc::now(), format).map(|_| ())
}

/// Render `at` with a strftime `format`, failing instead of panicking
pub fn render_timestamp<Tz>(at: &DateTime<Tz>, format: &str) -> Result<String>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::new();
    write!(out, "{}", at.format(format))
        .map_err(|_| Error::InvalidTimestampFormat(format.to_string()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, NaiveDate, Utc};

    #[test]
    fn test_format_kind_parse() {
        assert_eq!("csv".parse::<FormatKind>().unwrap(), FormatKind::Csv);
        assert_eq!("TSV".parse::<FormatKind>().unwrap(), FormatKind::Tsv);
        assert_eq!("txt".parse::<FormatKind>().unwrap(), FormatKind::Txt);
        assert!("log".parse::<FormatKind>().is_err());
    }

    #[test]
    fn test_format_kind_from_path() {
        assert_eq!(
            FormatKind::from_path(Path::new("/var/log/app.tsv")),
            Some(FormatKind::Tsv)
        );
        assert_eq!(FormatKind::from_path(Path::new("app.log")), None);
        assert_eq!(FormatKind::from_path(Path::new("app")), None);
    }

    #[test]
    fn test_into_format() {
        assert_eq!(FormatKind::Txt.into_format(), LogFormat::PlainText);
        assert_eq!(
            FormatKind::Tsv.into_format().delimiter(),
            Some('\t')
        );
    }

    #[test]
    fn test_period_key_uses_iso_year() {
        // 2024-12-30 is a Monday in ISO week 1 of 2025
        let at = Utc.with_ymd_and_hms(2024, 12, 30, 9, 0, 0).unwrap();
        assert_eq!(PeriodKey::of(&at), PeriodKey::new(2025, 1));

        let earlier = Utc.with_ymd_and_hms(2024, 1, 3, 9, 0, 0).unwrap();
        assert_eq!(PeriodKey::of(&earlier), PeriodKey::new(2024, 1));
        assert_ne!(PeriodKey::of(&at), PeriodKey::of(&earlier));
    }

    #[test]
    fn test_period_key_local_time() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 14).unwrap();
        let at = Local
            .from_local_datetime(&date.and_hms_opt(12, 0, 0).unwrap())
            .unwrap();
        assert_eq!(PeriodKey::of(&at).week, 11);
    }

    #[test]
    fn test_period_label() {
        let key = PeriodKey::new(2024, 7);
        assert_eq!(key.label(), "7 2024");
        assert_eq!(key.to_string(), "W7 2024");
    }

    #[test]
    fn test_context_columns() {
        let cols = ContextColumns {
            ip: true,
            browser_os: true,
        };
        assert_eq!(cols.names(), vec!["IP", "Browser", "OS"]);
        assert_eq!(cols.len(), 3);
        assert!(ContextColumns::default().is_empty());
    }

    #[test]
    fn test_request_context_headers() {
        let ctx = RequestContext::new()
            .with_header("X-Forwarded-For", "10.0.0.1")
            .with_header("User-Agent", "Mozilla/5.0 Firefox/120.0");
        assert_eq!(ctx.header("x-forwarded-for"), Some("10.0.0.1"));
        assert_eq!(ctx.user_agent(), "Mozilla/5.0 Firefox/120.0");

        let explicit = ctx.with_user_agent("curl/8.0");
        assert_eq!(explicit.user_agent(), "curl/8.0");
        assert_eq!(RequestContext::new().user_agent(), "");
    }

    #[test]
    fn test_request_context_deserialized_headers() {
        let ctx: RequestContext = serde_json::from_str(
            r#"{"headers": {"X-Forwarded-For": "203.0.113.4", "User-Agent": "Firefox/121.0"}}"#,
        )
        .unwrap();
        assert_eq!(ctx.header("x-forwarded-for"), Some("203.0.113.4"));
        assert_eq!(ctx.header("X-FORWARDED-FOR"), Some("203.0.113.4"));
        assert_eq!(ctx.user_agent(), "Firefox/121.0");
        assert!(ctx.remote_addr.is_none());
    }

    #[test]
    fn test_validate_timestamp_format() {
        assert!(validate_timestamp_format(DEFAULT_TIMESTAMP_FORMAT).is_ok());
        assert!(validate_timestamp_format("%d/%m/%Y %H:%M").is_ok());
        assert!(validate_timestamp_format("%Q").is_err());
        assert!(validate_timestamp_format("").is_err());
    }

    #[test]
    fn test_unrenderable_timestamp_format_rejected() {
        assert!(matches!(
            validate_timestamp_format("%Y %#z"),
            Err(Error::InvalidTimestampFormat(_))
        ));

        let at = Utc.with_ymd_and_hms(2024, 3, 14, 9, 30, 0).unwrap();
        assert!(render_timestamp(&at, "%Y %#z").is_err());
        assert_eq!(render_timestamp(&at, "%d/%m/%Y").unwrap(), "14/03/2024");
    }
}
