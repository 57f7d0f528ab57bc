//! Audit records and sinks.
//!
//! An [`AuditRecord`] describes one phase of one invocation: the ATTEMPT
//! before the command runs, and the SUCCESS or FAILURE after it returns.
//! Records are handed to an [`AuditSink`], which is append-only and
//! fire-and-forget: a sink that cannot write logs the problem and carries on.
//!
//! # Sinks
//!
//! | Sink | Destination |
//! |------|-------------|
//! | [`TracingAuditSink`] | `tracing` events on the `ministry::audit` target |
//! | [`FileAuditSink`] | One JSON object per line in an append-only file |
//! | [`FanoutAuditSink`] | Every contained sink, in order |

use crate::error::TelemetryError;
use crate::TelemetryResult;
use chrono::{DateTime, Utc};
use ministry_core::{InvocationId, User};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Tracing target for audit events.
pub const AUDIT_TARGET: &str = "ministry::audit";

/// Free-form details attached to an audit record.
pub type AuditDetails = BTreeMap<String, String>;

/// Phase of an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditStatus {
    /// The call is about to run.
    Attempt,
    /// The call returned normally.
    Success,
    /// The call failed.
    Failure,
}

impl AuditStatus {
    /// Returns the status as written in the audit trail.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Attempt => "ATTEMPT",
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
        }
    }

    /// Returns `true` for SUCCESS and FAILURE.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Attempt)
    }
}

impl fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How urgently a record needs attention.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditPriority {
    /// Routine record.
    #[default]
    Normal,
    /// Security-relevant violation.
    High,
}

/// One audit trail entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Shared by every record of the same invocation.
    pub invocation_id: InvocationId,
    /// Username of the caller.
    pub user: String,
    /// Role of the caller.
    pub role: String,
    /// Action being audited (e.g., `cast_spell`).
    pub action: String,
    /// Phase of the invocation.
    pub status: AuditStatus,
    /// Request details.
    pub details: AuditDetails,
    /// Failure text, present on FAILURE records.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
    /// Record priority.
    #[serde(default)]
    pub priority: AuditPriority,
    /// When the record was created.
    pub timestamp: DateTime<Utc>,
}

impl AuditRecord {
    /// Creates a record stamped with the current time.
    pub fn new(
        invocation_id: InvocationId,
        user: &User,
        action: impl Into<String>,
        status: AuditStatus,
    ) -> Self {
        Self {
            invocation_id,
            user: user.username().to_string(),
            role: user.role().to_string(),
            action: action.into(),
            status,
            details: AuditDetails::new(),
            error: None,
            priority: AuditPriority::Normal,
            timestamp: Utc::now(),
        }
    }

    /// Replaces the details.
    pub fn with_details(mut self, details: AuditDetails) -> Self {
        self.details = details;
        self
    }

    /// Adds one detail entry.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Attaches failure text.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: AuditPriority) -> Self {
        self.priority = priority;
        self
    }
}

/// Append-only destination for audit records.
///
/// Implementations must tolerate concurrent writers and must never fail the
/// caller: write problems are logged, not returned.
pub trait AuditSink: Send + Sync {
    /// Appends a record.
    fn append(&self, record: AuditRecord);
}

/// Writes records as `tracing` events on [`AUDIT_TARGET`].
///
/// High-priority records are logged at `warn`, everything else at `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn append(&self, record: AuditRecord) {
        let details = serde_json::to_string(&record.details).unwrap_or_default();
        let error = record.error.as_deref().unwrap_or("");

        match record.priority {
            AuditPriority::High => tracing::warn!(
                target: AUDIT_TARGET,
                invocation_id = %record.invocation_id,
                user = %record.user,
                role = %record.role,
                action = %record.action,
                status = %record.status,
                details = %details,
                error = %error,
                "audit"
            ),
            AuditPriority::Normal => tracing::info!(
                target: AUDIT_TARGET,
                invocation_id = %record.invocation_id,
                user = %record.user,
                role = %record.role,
                action = %record.action,
                status = %record.status,
                details = %details,
                error = %error,
                "audit"
            ),
        }
    }
}

/// Appends records to a file, one JSON object per line.
pub struct FileAuditSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileAuditSink {
    /// Opens (or creates) the file in append mode.
    ///
    /// # Errors
    ///
    /// Returns `TelemetryError::AuditSink` if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> TelemetryResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| TelemetryError::AuditSink {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditSink for FileAuditSink {
    fn append(&self, record: AuditRecord) {
        let line = match serde_json::to_string(&record) {
            Ok(line) => line,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize audit record");
                return;
            }
        };

        let mut file = self.file.lock();
        if let Err(e) = writeln!(file, "{line}").and_then(|()| file.flush()) {
            tracing::error!(
                path = %self.path.display(),
                error = %e,
                "failed to write audit record"
            );
        }
    }
}

impl fmt::Debug for FileAuditSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileAuditSink")
            .field("path", &self.path)
            .finish()
    }
}

/// Delivers every record to each contained sink.
#[derive(Default, Clone)]
pub struct FanoutAuditSink {
    sinks: Vec<Arc<dyn AuditSink>>,
}

impl FanoutAuditSink {
    /// Creates an empty fan-out.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sink.
    pub fn with_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Returns the number of sinks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Returns `true` if there are no sinks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl AuditSink for FanoutAuditSink {
    fn append(&self, record: AuditRecord) {
        if let Some((last, rest)) = self.sinks.split_last() {
            for sink in rest {
                sink.append(record.clone());
            }
            last.append(record);
        }
    }
}

impl fmt::Debug for FanoutAuditSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FanoutAuditSink")
            .field("sink_count", &self.sinks.len())
            .finish()
    }
}

/// Audit output configuration.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// Whether audit records are produced at all.
    pub enabled: bool,

    /// Whether records are written to the `ministry::audit` tracing target.
    pub log_records: bool,

    /// Optional JSON-lines audit file.
    pub file_path: Option<PathBuf>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_records: true,
            file_path: None,
        }
    }
}

/// Builds the audit sink described by `config`.
///
/// Returns `None` when audit is disabled or no output is configured. The
/// audit aspect treats a missing sink as degraded and keeps serving calls.
///
/// # Errors
///
/// Returns `TelemetryError::AuditSink` if the audit file cannot be opened.
pub fn build_audit_sink(config: &AuditConfig) -> TelemetryResult<Option<Arc<dyn AuditSink>>> {
    if !config.enabled {
        return Ok(None);
    }

    let mut sinks: Vec<Arc<dyn AuditSink>> = Vec::new();
    if config.log_records {
        sinks.push(Arc::new(TracingAuditSink));
    }
    if let Some(path) = &config.file_path {
        sinks.push(Arc::new(FileAuditSink::open(path)?));
    }

    let sink = match sinks.len() {
        0 => {
            tracing::warn!("audit enabled without any output, records will be dropped");
            None
        }
        1 => sinks.pop(),
        _ => Some(Arc::new(FanoutAuditSink { sinks }) as Arc<dyn AuditSink>),
    };

    Ok(sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader};

    #[derive(Default)]
    struct Collect(Mutex<Vec<AuditRecord>>);

    impl AuditSink for Collect {
        fn append(&self, record: AuditRecord) {
            self.0.lock().push(record);
        }
    }

    fn record(status: AuditStatus) -> AuditRecord {
        AuditRecord::new(
            InvocationId::new(),
            &User::new("harry_potter", "Auror"),
            "cast_spell",
            status,
        )
        .with_detail("spell", "Lumos")
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_value(AuditStatus::Attempt).unwrap(), "ATTEMPT");
        assert_eq!(serde_json::to_value(AuditStatus::Success).unwrap(), "SUCCESS");
        assert_eq!(serde_json::to_value(AuditStatus::Failure).unwrap(), "FAILURE");
        assert_eq!(AuditStatus::Failure.to_string(), "FAILURE");
        assert!(!AuditStatus::Attempt.is_terminal());
        assert!(AuditStatus::Success.is_terminal());
    }

    #[test]
    fn test_record_builders() {
        let record = record(AuditStatus::Failure)
            .with_error("boom")
            .with_priority(AuditPriority::High);

        assert_eq!(record.user, "harry_potter");
        assert_eq!(record.role, "Auror");
        assert_eq!(record.details["spell"], "Lumos");
        assert_eq!(record.error.as_deref(), Some("boom"));
        assert_eq!(record.priority, AuditPriority::High);
    }

    #[test]
    fn test_record_json_shape() {
        let json = serde_json::to_value(record(AuditStatus::Attempt)).unwrap();
        assert_eq!(json["status"], "ATTEMPT");
        assert_eq!(json["priority"], "normal");
        assert_eq!(json["details"]["spell"], "Lumos");
        assert!(json.get("error").is_none());
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_tracing_sink_does_not_panic() {
        TracingAuditSink.append(record(AuditStatus::Attempt));
        TracingAuditSink.append(record(AuditStatus::Failure).with_priority(AuditPriority::High));
    }

    #[test]
    fn test_file_sink_writes_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");

        let sink = FileAuditSink::open(&path).unwrap();
        sink.append(record(AuditStatus::Attempt));
        sink.append(record(AuditStatus::Success));

        let lines: Vec<AuditRecord> = BufReader::new(File::open(&path).unwrap())
            .lines()
            .map(|line| serde_json::from_str(&line.unwrap()).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].status, AuditStatus::Attempt);
        assert_eq!(lines[1].status, AuditStatus::Success);
    }

    #[test]
    fn test_file_sink_appends_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");

        FileAuditSink::open(&path).unwrap().append(record(AuditStatus::Attempt));
        FileAuditSink::open(&path).unwrap().append(record(AuditStatus::Success));

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_file_sink_open_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileAuditSink::open(dir.path()).unwrap_err();
        assert!(matches!(err, TelemetryError::AuditSink { .. }));
    }

    #[test]
    fn test_fanout_delivers_to_all() {
        let a = Arc::new(Collect::default());
        let b = Arc::new(Collect::default());
        let fanout = FanoutAuditSink::new()
            .with_sink(a.clone())
            .with_sink(b.clone());

        fanout.append(record(AuditStatus::Attempt));

        assert_eq!(fanout.len(), 2);
        assert_eq!(a.0.lock().len(), 1);
        assert_eq!(b.0.lock().len(), 1);
    }

    #[test]
    fn test_build_audit_sink() {
        let disabled = AuditConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(build_audit_sink(&disabled).unwrap().is_none());

        let no_outputs = AuditConfig {
            enabled: true,
            log_records: false,
            file_path: None,
        };
        assert!(build_audit_sink(&no_outputs).unwrap().is_none());

        assert!(build_audit_sink(&AuditConfig::default()).unwrap().is_some());
    }

    #[test]
    fn test_build_audit_sink_with_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = AuditConfig {
            enabled: true,
            log_records: true,
            file_path: Some(dir.path().join("audit.jsonl")),
        };

        let sink = build_audit_sink(&config).unwrap().unwrap();
        sink.append(record(AuditStatus::Attempt));
        assert!(dir.path().join("audit.jsonl").exists());
    }
}
