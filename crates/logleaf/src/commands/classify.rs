//! Classify command implementation

use anyhow::Result;
use logleaf_extract::{BuiltinClassifier, Classifier};
use serde_json::json;

use crate::output::{is_json_mode, print_json};

pub fn execute(user_agent: &str) -> Result<()> {
    let classifier = BuiltinClassifier::new();
    let browser = classifier.browser(user_agent);
    let os = classifier.os(user_agent);

    if is_json_mode() {
        print_json(&json!({ "browser": browser, "os": os }));
    } else {
        println!("Browser: {}", browser);
        println!("OS:      {}", os);
    }
    Ok(())
}
