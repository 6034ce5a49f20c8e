//! NDJSON parser for hub session logs.
//!
//! This module provides pure parsing functions for converting the raw content
//! of a session into validated [`MessageRecord`]s. Only lines of the form
//! `{"type": "message", "message": {...}}` become records; everything else is
//! dropped without being counted.

use crate::model::{
    ContentPart, Message, MessageContent, MessageRecord, ParseError, Role, Timestamp,
};
use serde::Deserialize;
use serde_json::Value;
use std::iter::Enumerate;
use std::str::Split;
use tracing::debug;

// Record type carrying a renderable message
const RECORD_TYPE_MESSAGE: &str = "message";

// Content part type contributing to rendered text
const PART_TYPE_TEXT: &str = "text";

/// Raw JSON structure for deserializing one log line.
///
/// `message` stays untyped so that an odd `role` or `content` never turns an
/// eligible line into a malformed one.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default, rename = "type")]
    record_type: Option<String>,
    #[serde(default)]
    timestamp: Timestamp,
    #[serde(default)]
    message: Option<Value>,
}

/// Parse a single log line.
///
/// Returns `Ok(Some(record))` for an eligible message line, `Ok(None)` for a
/// well-formed line that is not a message (wrong `type`, or `message` absent,
/// null, `false`, `0` or `""`), and `Err` when the line is not a JSON object.
/// A non-string `role` reads as [`Role::Unknown`].
///
/// `line_number` is 1-based and only used for error reporting.
pub fn parse_line(raw: &str, line_number: usize) -> Result<Option<MessageRecord>, ParseError> {
    let raw_record: RawRecord =
        serde_json::from_str(raw).map_err(|e| ParseError::InvalidJson {
            line: line_number,
            message: e.to_string(),
        })?;

    if raw_record.record_type.as_deref() != Some(RECORD_TYPE_MESSAGE) {
        return Ok(None);
    }

    let Some(raw_message) = raw_record.message.filter(is_present) else {
        return Ok(None);
    };

    let role = Role::parse(raw_message.get("role").and_then(Value::as_str));
    let content = raw_message
        .get("content")
        .map(parse_content)
        .unwrap_or_default();

    Ok(Some(MessageRecord::new(
        raw_record.timestamp,
        Message::new(role, content),
    )))
}

// Empty values (null, false, 0, "") mean "no message".
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64() != Some(0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn parse_content(raw: &Value) -> MessageContent {
    match raw {
        Value::String(text) => MessageContent::Text(text.clone()),
        Value::Array(parts) => MessageContent::Parts(parts.iter().filter_map(parse_part).collect()),
        // Numbers, objects and booleans carry no displayable text.
        _ => MessageContent::default(),
    }
}

fn parse_part(raw: &Value) -> Option<ContentPart> {
    let object = raw.as_object()?;
    let kind = object
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let text = object
        .get("text")
        .and_then(Value::as_str)
        .map(str::to_string);

    if kind == PART_TYPE_TEXT {
        // A text part without text still occupies a line in the output.
        Some(ContentPart::new(kind, Some(text.unwrap_or_default())))
    } else {
        Some(ContentPart::new(kind, text))
    }
}

/// Lazily parse all eligible records of a session's content.
///
/// The returned iterator is finite and cheap to clone, so callers may walk the
/// same content more than once (count first, then render a suffix).
pub fn parse_records(content: &str) -> Records<'_> {
    Records {
        lines: content.split('\n').enumerate(),
    }
}

/// Iterator over eligible records of a session's content.
///
/// Blank lines are skipped. Lines that fail to decode are logged at debug level
/// and skipped. Source order is preserved.
#[derive(Debug, Clone)]
pub struct Records<'a> {
    lines: Enumerate<Split<'a, char>>,
}

impl Iterator for Records<'_> {
    type Item = MessageRecord;

    fn next(&mut self) -> Option<Self::Item> {
        for (index, line) in self.lines.by_ref() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.trim().is_empty() {
                continue;
            }

            match parse_line(line, index + 1) {
                Ok(Some(record)) => return Some(record),
                Ok(None) => continue,
                Err(err) => {
                    debug!(error = %err, "Skipping malformed log line");
                    continue;
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_line(role: &str, text: &str) -> String {
        serde_json::json!({
            "type": "message",
            "timestamp": "2025-12-25T10:00:00Z",
            "message": {"role": role, "content": text}
        })
        .to_string()
    }

    // ===== parse_line =====

    #[test]
    fn parse_line_accepts_plain_text_message() {
        let line = message_line("user", "hello");
        let record = parse_line(&line, 1).unwrap().expect("eligible");

        assert_eq!(record.role(), &Role::User);
        assert_eq!(record.text(), "hello");
        assert!(record.timestamp().instant().is_some());
    }

    #[test]
    fn parse_line_joins_text_parts_and_skips_others() {
        let line = r#"{"type":"message","message":{"role":"assistant","content":[
            {"type":"text","text":"one"},
            {"type":"tool_use","name":"bash"},
            {"type":"text","text":"two"}
        ]}}"#
            .replace('\n', "");
        let record = parse_line(&line, 1).unwrap().expect("eligible");

        assert_eq!(record.role(), &Role::Assistant);
        assert_eq!(record.text(), "one\ntwo");
    }

    #[test]
    fn parse_line_rejects_non_message_types() {
        let line = r#"{"type":"tool_result","message":{"role":"user","content":"x"}}"#;
        assert_eq!(parse_line(line, 1), Ok(None));
    }

    #[test]
    fn parse_line_rejects_missing_or_null_message() {
        assert_eq!(parse_line(r#"{"type":"message"}"#, 1), Ok(None));
        assert_eq!(parse_line(r#"{"type":"message","message":null}"#, 1), Ok(None));
    }

    #[test]
    fn parse_line_rejects_empty_message_values() {
        for message in ["false", "0", "\"\""] {
            let line = format!(r#"{{"type":"message","message":{message}}}"#);
            assert_eq!(parse_line(&line, 1), Ok(None), "message = {message}");
        }
    }

    #[test]
    fn parse_line_keeps_message_with_non_string_role() {
        let line = r#"{"type":"message","message":{"role":7,"content":"hi"}}"#;
        let record = parse_line(line, 1).unwrap().expect("eligible");

        assert_eq!(record.role(), &Role::Unknown);
        assert_eq!(record.text(), "hi");
    }

    #[test]
    fn parse_line_keeps_plain_string_message_as_empty_record() {
        let line = r#"{"type":"message","message":"hello"}"#;
        let record = parse_line(line, 1).unwrap().expect("eligible");

        assert_eq!(record.role(), &Role::Unknown);
        assert_eq!(record.text(), "");
    }

    #[test]
    fn parse_line_reports_malformed_json_with_line_number() {
        let err = parse_line("{not json", 7).unwrap_err();
        assert!(matches!(err, ParseError::InvalidJson { line: 7, .. }));
    }

    #[test]
    fn parse_line_tolerates_missing_role_and_bad_timestamp() {
        let line = r#"{"type":"message","timestamp":"yesterday","message":{"content":"x"}}"#;
        let record = parse_line(line, 1).unwrap().expect("eligible");

        assert_eq!(record.role(), &Role::Unknown);
        assert_eq!(record.timestamp(), Timestamp::unknown());
    }

    #[test]
    fn parse_line_accepts_epoch_millis_timestamp() {
        let line = r#"{"type":"message","timestamp":1735120800000,"message":{"role":"user","content":"x"}}"#;
        let record = parse_line(line, 1).unwrap().expect("eligible");
        assert_eq!(record.timestamp(), Timestamp::from_millis(1_735_120_800_000));
    }

    #[test]
    fn parse_line_text_part_without_text_is_empty_line() {
        let line = r#"{"type":"message","message":{"role":"user","content":[{"type":"text"},{"type":"text","text":"b"}]}}"#;
        let record = parse_line(line, 1).unwrap().expect("eligible");
        assert_eq!(record.text(), "\nb");
    }

    // ===== parse_records =====

    #[test]
    fn parse_records_skips_blank_malformed_and_ineligible_lines() {
        let content = [
            message_line("user", "first"),
            String::new(),
            "   ".to_string(),
            "{broken".to_string(),
            r#"{"type":"status","message":{"role":"system","content":"x"}}"#.to_string(),
            message_line("assistant", "second"),
        ]
        .join("\n");

        let texts: Vec<String> = parse_records(&content).map(|r| r.text()).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[test]
    fn parse_records_tolerates_crlf_and_trailing_newline() {
        let content = format!(
            "{}\r\n{}\r\n",
            message_line("user", "a"),
            message_line("user", "b")
        );
        assert_eq!(parse_records(&content).count(), 2);
    }

    #[test]
    fn parse_records_is_restartable() {
        let content = format!("{}\n{}", message_line("user", "a"), message_line("user", "b"));
        let records = parse_records(&content);

        let first_pass = records.clone().count();
        let second_pass: Vec<String> = records.map(|r| r.text()).collect();

        assert_eq!(first_pass, 2);
        assert_eq!(second_pass, vec!["a", "b"]);
    }

    #[test]
    fn parse_records_of_empty_content_is_empty() {
        assert_eq!(parse_records("").count(), 0);
        assert_eq!(parse_records("\n\n").count(), 0);
    }
}
