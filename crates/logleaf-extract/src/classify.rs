//! Browser and OS classification from user agent strings

use crate::DEFAULT_LABEL;

/// Browser labels and the substrings that select them, highest priority first
pub const BROWSER_PATTERNS: &[(&str, &[&str])] = &[
    ("Firefox", &["Firefox"]),
    ("Chrome", &["Chrome"]),
    ("Safari", &["Safari"]),
    ("Internet Explorer", &["MSIE", "Trident"]),
];

/// OS labels and the substrings that select them, highest priority first
pub const OS_PATTERNS: &[(&str, &[&str])] = &[
    ("Windows", &["Windows NT"]),
    ("MacOS", &["Mac OS X"]),
    ("Linux", &["Linux"]),
    ("iOS", &["iPhone", "iPad"]),
    ("Android", &["Android"]),
];

/// Trait for browser/OS detection backends
///
/// Classification never fails; unknown agents map to a default label.
pub trait Classifier: Send + Sync {
    fn browser(&self, user_agent: &str) -> String;

    fn os(&self, user_agent: &str) -> String;
}

/// Default classifier: first matching pattern wins
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinClassifier;

impl BuiltinClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl Classifier for BuiltinClassifier {
    fn browser(&self, user_agent: &str) -> String {
        first_match(BROWSER_PATTERNS, user_agent).to_string()
    }

    fn os(&self, user_agent: &str) -> String {
        first_match(OS_PATTERNS, user_agent).to_string()
    }
}

fn first_match(table: &[(&'static str, &[&str])], haystack: &str) -> &'static str {
    table
        .iter()
        .find(|(_, needles)| needles.iter().any(|n| haystack.contains(n)))
        .map(|(label, _)| *label)
        .unwrap_or(DEFAULT_LABEL)
}
