//! Record formatting for plain and delimited logs
//!
//! Delimited output quotes any value containing the delimiter, a double
//! quote or a line break, doubling embedded quotes. [`parse_records`]
//! reads the same encoding back.

use logleaf_core::{
    Error, LogFormat, LogTarget, Result, LINE_ENDING, PLAIN_FIELD_SEPARATOR,
    PLAIN_MESSAGE_SEPARATOR,
};
use std::borrow::Cow;

/// Render one record, terminated by the platform line ending.
///
/// `fields` are the caller's values; `context` holds the values of the
/// target's context columns (IP, Browser, OS) and is appended after them.
///
/// When the target has a header, the row (timestamp included) must have
/// exactly one value per column. Mismatches fail with
/// [`Error::FieldCountMismatch`]; rows are never padded or truncated.
pub fn format_record(
    target: &LogTarget,
    timestamp: &str,
    fields: &[String],
    context: &[String],
) -> Result<String> {
    match target.format() {
        LogFormat::PlainText => Ok(format_plain(timestamp, fields, context)),
        LogFormat::Delimited { delimiter } => {
            let values = 1 + fields.len() + context.len();
            if target.has_header() && values != target.columns().len() {
                return Err(Error::FieldCountMismatch {
                    columns: target.columns().len(),
                    values,
                });
            }

            let row = std::iter::once(timestamp)
                .chain(fields.iter().map(String::as_str))
                .chain(context.iter().map(String::as_str));
            Ok(join_delimited(row, delimiter))
        }
    }
}

fn format_plain(timestamp: &str, fields: &[String], context: &[String]) -> String {
    if context.is_empty() && fields.len() <= 1 {
        let message = fields.first().map(String::as_str).unwrap_or("");
        return format!("{}{}{}{}", timestamp, PLAIN_MESSAGE_SEPARATOR, message, LINE_ENDING);
    }

    let mut line = timestamp.to_string();
    for value in fields.iter().chain(context) {
        line.push_str(PLAIN_FIELD_SEPARATOR);
        line.push_str(value);
    }
    line.push_str(LINE_ENDING);
    line
}

/// Header row for targets that carry one
pub fn header_line(target: &LogTarget) -> Option<String> {
    if !target.has_header() {
        return None;
    }
    let delimiter = target.format().delimiter()?;
    Some(join_delimited(
        target.columns().iter().map(String::as_str),
        delimiter,
    ))
}

/// Size in bytes of the header row, 0 when there is none
pub fn header_len(target: &LogTarget) -> u64 {
    header_line(target).map(|h| h.len() as u64).unwrap_or(0)
}

fn join_delimited<'a>(values: impl Iterator<Item = &'a str>, delimiter: char) -> String {
    let mut line = String::new();
    for (i, value) in values.enumerate() {
        if i > 0 {
            line.push(delimiter);
        }
        line.push_str(&escape_field(value, delimiter));
    }
    line.push_str(LINE_ENDING);
    line
}

/// Quote a value if it contains the delimiter, a quote or a line break
pub fn escape_field(value: &str, delimiter: char) -> Cow<'_, str> {
    let needs_quotes = value
        .chars()
        .any(|c| c == delimiter || c == '"' || c == '\n' || c == '\r');
    if !needs_quotes {
        return Cow::Borrowed(value);
    }
    Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
}

/// Split delimited text into records.
///
/// Quoted values may contain delimiters, doubled quotes and line breaks.
/// Blank lines are skipped.
pub fn parse_records(content: &str, delimiter: char) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut dirty = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => {
                in_quotes = true;
                dirty = true;
            }
            c if c == delimiter => {
                record.push(std::mem::take(&mut field));
                dirty = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                if dirty {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
                dirty = false;
            }
            _ => {
                field.push(c);
                dirty = true;
            }
        }
    }

    if dirty {
        record.push(field);
        records.push(record);
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use logleaf_core::LoggerConfig;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_plain_message() {
        let target = LoggerConfig::new("app.txt").build().unwrap();
        let line = format_record(&target, "2024-01-02 10:00:00", &strings(&["started"]), &[])
            .unwrap();
        assert_eq!(line, format!("2024-01-02 10:00:00 : started{}", LINE_ENDING));
    }

    #[test]
    fn test_plain_fields_with_context() {
        let target = LoggerConfig::new("app.txt").with_ip(true).build().unwrap();
        let line = format_record(
            &target,
            "ts",
            &strings(&["login", "alice"]),
            &strings(&["10.0.0.1"]),
        )
        .unwrap();
        assert_eq!(line, format!("ts, login, alice, 10.0.0.1{}", LINE_ENDING));
    }

    #[test]
    fn test_delimited_escaping() {
        let target = LoggerConfig::new("app.csv").build().unwrap();
        let line = format_record(
            &target,
            "ts",
            &strings(&["plain", "a,b", "say \"hi\"", "two\nlines"]),
            &[],
        )
        .unwrap();
        assert_eq!(
            line,
            format!(
                "ts,plain,\"a,b\",\"say \"\"hi\"\"\",\"two\nlines\"{}",
                LINE_ENDING
            )
        );
    }

    #[test]
    fn test_tab_delimiter_leaves_commas() {
        let target = LoggerConfig::new("app.tsv").build().unwrap();
        let line = format_record(&target, "ts", &strings(&["a,b", "c\td"]), &[]).unwrap();
        assert_eq!(line, format!("ts\ta,b\t\"c\td\"{}", LINE_ENDING));
    }

    #[test]
    fn test_column_count_mismatch_fails() {
        let target = LoggerConfig::new("app.csv")
            .with_columns(["Time", "Event", "User"])
            .build()
            .unwrap();

        let err = format_record(&target, "ts", &strings(&["only-one"]), &[]).unwrap_err();
        assert!(matches!(
            err,
            Error::FieldCountMismatch {
                columns: 3,
                values: 2
            }
        ));
        assert!(err.is_config());

        let err = format_record(&target, "ts", &strings(&["a", "b", "c"]), &[]).unwrap_err();
        assert!(matches!(err, Error::FieldCountMismatch { values: 4, .. }));

        assert!(format_record(&target, "ts", &strings(&["a", "b"]), &[]).is_ok());
    }

    #[test]
    fn test_context_counts_toward_columns() {
        let target = LoggerConfig::new("app.csv")
            .with_columns(["Time", "Event"])
            .with_browser_os(true)
            .build()
            .unwrap();
        let line = format_record(
            &target,
            "ts",
            &strings(&["view"]),
            &strings(&["Chrome", "Linux"]),
        )
        .unwrap();
        assert_eq!(line, format!("ts,view,Chrome,Linux{}", LINE_ENDING));
    }

    #[test]
    fn test_header_line() {
        let target = LoggerConfig::new("app.csv")
            .with_columns(["Time", "Event, detail"])
            .with_ip(true)
            .build()
            .unwrap();
        assert_eq!(
            header_line(&target).unwrap(),
            format!("Time,\"Event, detail\",IP{}", LINE_ENDING)
        );
        assert_eq!(header_len(&target), header_line(&target).unwrap().len() as u64);

        let plain = LoggerConfig::new("app.txt")
            .with_columns(["Time"])
            .build()
            .unwrap();
        assert!(header_line(&plain).is_none());
        assert_eq!(header_len(&plain), 0);
    }

    #[test]
    fn test_parse_records_reads_back_escaped_values() {
        let target = LoggerConfig::new("app.csv").build().unwrap();
        let values = strings(&["a,b", "\"quoted\"", "multi\r\nline", "", "tail"]);
        let mut content = format_record(&target, "ts", &values, &[]).unwrap();
        content.push_str(&format_record(&target, "ts2", &strings(&["x"]), &[]).unwrap());

        let records = parse_records(&content, ',');
        assert_eq!(records.len(), 2);
        assert_eq!(records[0][0], "ts");
        assert_eq!(&records[0][1..], values.as_slice());
        assert_eq!(records[1], vec!["ts2", "x"]);
    }

    #[test]
    fn test_parse_records_skips_blank_lines() {
        let records = parse_records("a,b\n\nc,d", ',');
        assert_eq!(records, vec![vec!["a", "b"], vec!["c", "d"]]);
    }
}
