#![forbid(unsafe_code)]

//! Error relay: turns cross-boundary notifications into [`ErrorRecord`]s.
//!
//! Two inbound paths exist and both converge here:
//!
//! 1. the guarded block's `catch` (path [`FailurePath::Trap`]);
//! 2. the isolated context's own `error` event (path
//!    [`FailurePath::Uncaught`]), which also covers parse failures that kept
//!    the guarded block from running at all.
//!
//! Parsing is lenient on purpose. Anything not tagged as relay traffic is
//! [`Inbound::Unrelated`]; anything tagged but malformed still yields a
//! record with the missing fields defaulted.

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::compose::RELAY_MESSAGE_TAG;
use crate::record::{DEFAULT_KIND, ErrorRecord, FailurePath, Timestamp};

/// Message shown when a notification carries no usable message.
pub const FALLBACK_MESSAGE: &str = "Unknown error";

/// Raw failure fields as reported by the isolated context. All optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailureReport {
    pub message: Option<String>,
    pub stack: Option<String>,
    pub kind: Option<String>,
    pub line: Option<u32>,
}

impl FailureReport {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    #[must_use]
    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }
}

/// Classified inbound notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Trap(FailureReport),
    Uncaught(FailureReport),
    /// Not relay traffic; ignored.
    Unrelated,
}

impl Inbound {
    #[must_use]
    pub fn path(&self) -> Option<FailurePath> {
        match self {
            Self::Trap(_) => Some(FailurePath::Trap),
            Self::Uncaught(_) => Some(FailurePath::Uncaught),
            Self::Unrelated => None,
        }
    }
}

/// Classify a JSON-encoded notification. Never fails.
#[must_use]
pub fn parse_notification(json: &str) -> Inbound {
    match serde_json::from_str::<Value>(json) {
        Ok(value) => classify(&value),
        Err(err) => {
            debug!(target: "playground::relay", %err, "ignoring non-JSON notification");
            Inbound::Unrelated
        }
    }
}

/// Classify an already-decoded notification value.
#[must_use]
pub fn classify(value: &Value) -> Inbound {
    let Some(obj) = value.as_object() else {
        trace!(target: "playground::relay", "ignoring non-object notification");
        return Inbound::Unrelated;
    };
    if obj.get("type").and_then(Value::as_str) != Some(RELAY_MESSAGE_TAG) {
        trace!(target: "playground::relay", "ignoring untagged notification");
        return Inbound::Unrelated;
    }

    let report = obj
        .get("error")
        .and_then(Value::as_object)
        .map(report_from_fields)
        .unwrap_or_default();

    match obj.get("source").and_then(Value::as_str) {
        Some("uncaught") => Inbound::Uncaught(report),
        Some("trap") | None => Inbound::Trap(report),
        Some(other) => {
            debug!(
                target: "playground::relay",
                source = other,
                "unknown relay source; treating as trap"
            );
            Inbound::Trap(report)
        }
    }
}

fn report_from_fields(fields: &Map<String, Value>) -> FailureReport {
    FailureReport {
        message: text_field(fields.get("message")),
        stack: text_field(fields.get("stack")),
        kind: text_field(fields.get("type")).or_else(|| text_field(fields.get("name"))),
        line: line_field(fields.get("lineNumber")).or_else(|| line_field(fields.get("line"))),
    }
}

/// Strings pass through; other non-null values are rendered as JSON text.
fn text_field(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn line_field(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Normalization rules shared by both paths.
#[derive(Debug, Default, Clone, Copy)]
pub struct ErrorRelay;

impl ErrorRelay {
    /// Build a record observed at `now`. Absent or empty kinds become
    /// `"Error"`, a missing message becomes [`FALLBACK_MESSAGE`].
    #[must_use]
    pub fn normalize(report: FailureReport, path: FailurePath, now: Timestamp) -> ErrorRecord {
        let kind = report
            .kind
            .filter(|k| !k.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_KIND.to_owned());
        let message = report.message.unwrap_or_else(|| FALLBACK_MESSAGE.to_owned());
        ErrorRecord {
            message,
            stack: report.stack.filter(|s| !s.is_empty()),
            kind,
            occurred_at: now,
            line: report.line.filter(|&l| l > 0),
            path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn trap_payload_is_fully_copied() {
        let inbound = parse_notification(
            r#"{"type":"error","source":"trap","error":{"message":"x is not a function","stack":"TypeError: x is not a function\n    at about:srcdoc:12:9","type":"TypeError","lineNumber":12}}"#,
        );
        assert_eq!(
            inbound,
            Inbound::Trap(
                FailureReport::new("x is not a function")
                    .with_stack("TypeError: x is not a function\n    at about:srcdoc:12:9")
                    .with_kind("TypeError")
                    .with_line(12)
            )
        );
    }

    #[test]
    fn missing_source_means_trap() {
        let inbound = parse_notification(r#"{"type":"error","error":{"message":"boom"}}"#);
        assert_eq!(inbound.path(), Some(FailurePath::Trap));
    }

    #[test]
    fn uncaught_source_is_classified() {
        let inbound = parse_notification(
            r#"{"type":"error","source":"uncaught","error":{"message":"Uncaught SyntaxError: Unexpected token ')'","type":"SyntaxError","lineNumber":3}}"#,
        );
        assert_eq!(inbound.path(), Some(FailurePath::Uncaught));
    }

    #[test]
    fn unrelated_traffic_is_ignored() {
        for json in [
            "",
            "not json",
            "42",
            r#""error""#,
            r#"{"type":"resize","width":3}"#,
            r#"{"error":{"message":"no tag"}}"#,
        ] {
            assert_eq!(parse_notification(json), Inbound::Unrelated, "{json}");
        }
    }

    #[test]
    fn malformed_payload_degrades() {
        let inbound = parse_notification(
            r#"{"type":"error","error":{"message":{"nested":true},"stack":null,"type":"","lineNumber":-4}}"#,
        );
        let Inbound::Trap(report) = inbound else {
            panic!("expected trap, got {inbound:?}");
        };
        assert_eq!(report.message.as_deref(), Some(r#"{"nested":true}"#));
        assert_eq!(report.stack, None);
        assert_eq!(report.line, None);

        let record = ErrorRelay::normalize(report, FailurePath::Trap, Timestamp::from_millis(9));
        assert_eq!(record.kind, "Error");
        assert_eq!(record.occurred_at, Timestamp::from_millis(9));
    }

    #[test]
    fn tagged_message_without_error_object_still_records() {
        let Inbound::Trap(report) = parse_notification(r#"{"type":"error","error":"boom"}"#)
        else {
            panic!("expected trap");
        };
        let record = ErrorRelay::normalize(report, FailurePath::Trap, Timestamp::UNIX_EPOCH);
        assert_eq!(record.message, FALLBACK_MESSAGE);
        assert_eq!(record.kind, "Error");
        assert_eq!(record.stack, None);
        assert_eq!(record.line, None);
    }

    #[test]
    fn string_line_numbers_are_accepted() {
        let Inbound::Uncaught(report) = parse_notification(
            r#"{"type":"error","source":"uncaught","error":{"message":"m","lineNumber":"7"}}"#,
        ) else {
            panic!("expected uncaught");
        };
        assert_eq!(report.line, Some(7));
    }

    #[test]
    fn normalize_uses_observation_time_and_path() {
        let record = ErrorRelay::normalize(
            FailureReport::new("late").with_kind("ReferenceError"),
            FailurePath::Uncaught,
            Timestamp::from_millis(1234),
        );
        assert_eq!(record.kind, "ReferenceError");
        assert_eq!(record.path, FailurePath::Uncaught);
        assert_eq!(record.occurred_at.as_millis(), 1234);
    }
}
