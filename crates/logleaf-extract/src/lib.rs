//! LogLeaf Extract - Request field classification
//!
//! Maps raw request context (user agent, proxy headers) to the labels
//! written into the `IP`, `Browser` and `OS` columns:
//! - [`Classifier`] - pluggable browser/OS detection
//! - [`BuiltinClassifier`] - ordered substring matching
//! - [`client_ip`] - proxy-aware client address lookup

mod classify;
mod ip;

pub use classify::{BuiltinClassifier, Classifier, BROWSER_PATTERNS, OS_PATTERNS};
pub use ip::{client_ip, CLIENT_IP_HEADERS, UNKNOWN_IP};

/// Label returned when nothing matches
pub const DEFAULT_LABEL: &str = "Others";
