//! Audit logging for command dispatch
//!
//! Every non-empty input line produces audit output: dispatched commands
//! emit a pending record before the handler runs and a success/failure
//! record after it completes, so a record group with no terminal entry
//! identifies a command that started but never finished. Early rejections
//! (parse error, unknown command, unauthorized) emit a single failure
//! record.
//!
//! Records are append-only and pass through [`sanitize`] before emission:
//! newlines and control characters are escaped so operator input cannot
//! forge log entries, and oversized values are truncated at a UTF-8
//! character boundary.

use std::io::Write;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Longest sanitized value emitted into a record field.
const MAX_FIELD_LEN: usize = 200;

/// Terminal state of one dispatch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Pending,
    Success,
    Failure,
}

/// One audit log entry. Never mutated after emission; each state
/// transition is a fresh record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditRecord {
    pub timestamp: DateTime<Utc>,
    /// Acting user identity as reported by the authorizer.
    pub user: String,
    /// Command name, or the raw line for input that never parsed.
    pub command: String,
    pub args: Vec<String>,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuditRecord {
    pub fn new(user: &str, command: &str, args: &[String], outcome: Outcome) -> Self {
        Self {
            timestamp: Utc::now(),
            user: sanitize(user),
            command: sanitize(command),
            args: args.iter().map(|a| sanitize(a)).collect(),
            outcome,
            error: None,
        }
    }

    pub fn failure(user: &str, command: &str, args: &[String], error: impl Into<String>) -> Self {
        let mut record = Self::new(user, command, args, Outcome::Failure);
        record.error = Some(sanitize(&error.into()));
        record
    }
}

/// Destination for audit records.
///
/// At-least-once, fire-and-forget: the shell never learns about delivery
/// failures, and sinks must not block dispatch for long.
pub trait AuditSink: Send + Sync {
    fn record(&self, record: &AuditRecord);
}

/// Emits records as structured `tracing` events under the
/// `kiosksh::audit` target. The engine default.
#[derive(Default)]
pub struct TracingSink;

impl TracingSink {
    pub fn new() -> Self {
        Self
    }
}

impl AuditSink for TracingSink {
    fn record(&self, record: &AuditRecord) {
        tracing::info!(
            target: "kiosksh::audit",
            user = %record.user,
            command = %record.command,
            args = ?record.args,
            outcome = ?record.outcome,
            error = record.error.as_deref().unwrap_or(""),
            "command audit"
        );
    }
}

/// Appends one JSON object per record to any writer (audit files, pipes).
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

impl<W: Write + Send> AuditSink for JsonLinesSink<W> {
    fn record(&self, record: &AuditRecord) {
        // Fire-and-forget: serialization of these fields cannot fail, and
        // write errors are the host's concern, not the dispatch path's.
        if let Ok(line) = serde_json::to_string(record) {
            let mut writer = self.writer.lock().expect("audit writer lock poisoned");
            let _ = writeln!(writer, "{line}");
            let _ = writer.flush();
        }
    }
}

/// Collects records in memory for inspection. Test support.
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().expect("audit lock poisoned").clone()
    }
}

impl AuditSink for MemorySink {
    fn record(&self, record: &AuditRecord) {
        self.records
            .lock()
            .expect("audit lock poisoned")
            .push(record.clone());
    }
}

/// Escape control characters and truncate oversized values.
///
/// Newline, carriage return and tab become visible escapes; remaining
/// control characters are dropped. Truncation respects UTF-8 character
/// boundaries.
pub fn sanitize(value: &str) -> String {
    let escaped: String = value
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
        .chars()
        .filter(|c| !c.is_control())
        .collect();

    if escaped.len() <= MAX_FIELD_LEN {
        return escaped;
    }
    let mut end = MAX_FIELD_LEN;
    while end > 0 && !escaped.is_char_boundary(end) {
        end -= 1;
    }
    format!(
        "{}...[truncated {} bytes]",
        &escaped[..end],
        escaped.len() - end
    )
}
