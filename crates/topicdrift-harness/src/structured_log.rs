//! Structured run log and artifact index.
//!
//! Provides:
//! - [`LogEntry`]: one JSONL record with required + optional fields.
//! - [`LogEmitter`]: writes JSONL lines to a file or any other writer.
//! - [`ArtifactIndex`]: lists the run's output files with SHA-256 digests.
//! - [`validate_log_line`] / [`validate_log_file`]: schema checks.

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// ---------------------------------------------------------------------------
// Log entry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Pass,
    Fail,
    Skip,
    Error,
}

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const OUTCOMES: [&str; 4] = ["pass", "fail", "skip", "error"];
const POLICIES: [&str; 2] = ["shift", "drift"];

/// Required fields: `timestamp`, `trace_id`, `level`, `event`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    // Required
    pub timestamp: String,
    pub trace_id: String,
    pub level: LogLevel,
    pub event: String,

    // Optional
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    /// `shift` or `drift`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,
    /// Zero-based window index the record refers to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<usize>,
    /// Topic display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_refs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl LogEntry {
    #[must_use]
    pub fn new(trace_id: impl Into<String>, level: LogLevel, event: impl Into<String>) -> Self {
        Self {
            timestamp: now_utc(),
            trace_id: trace_id.into(),
            level,
            event: event.into(),
            run_id: None,
            policy: None,
            window: None,
            topic: None,
            outcome: None,
            duration_ms: None,
            artifact_refs: None,
            details: None,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: impl Into<String>) -> Self {
        self.policy = Some(policy.into());
        self
    }

    #[must_use]
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = Some(window);
        self
    }

    #[must_use]
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    #[must_use]
    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    #[must_use]
    pub fn with_duration_ms(mut self, ms: u64) -> Self {
        self.duration_ms = Some(ms);
        self
    }

    #[must_use]
    pub fn with_artifacts(mut self, refs: Vec<String>) -> Self {
        self.artifact_refs = Some(refs);
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Serialize to a single JSONL line (no trailing newline).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ---------------------------------------------------------------------------
// Artifact index
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactEntry {
    pub path: String,
    pub kind: String,
    pub sha256: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactIndex {
    pub index_version: u32,
    pub run_id: String,
    pub generated_utc: String,
    pub artifacts: Vec<ArtifactEntry>,
}

impl ArtifactIndex {
    #[must_use]
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            index_version: 1,
            run_id: run_id.into(),
            generated_utc: now_utc(),
            artifacts: Vec::new(),
        }
    }

    pub fn add(
        &mut self,
        path: impl Into<String>,
        kind: impl Into<String>,
        sha256: impl Into<String>,
    ) -> &mut Self {
        self.artifacts.push(ArtifactEntry {
            path: path.into(),
            kind: kind.into(),
            sha256: sha256.into(),
            size_bytes: None,
        });
        self
    }

    /// Hash `file` and record it under `path` (as written in the index).
    pub fn add_file(
        &mut self,
        path: impl Into<String>,
        kind: impl Into<String>,
        file: &Path,
    ) -> std::io::Result<&mut Self> {
        let bytes = std::fs::read(file)?;
        self.artifacts.push(ArtifactEntry {
            path: path.into(),
            kind: kind.into(),
            sha256: sha256_hex(&bytes),
            size_bytes: Some(bytes.len() as u64),
        });
        Ok(self)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

// ---------------------------------------------------------------------------
// Log emitter
// ---------------------------------------------------------------------------

/// Writes JSONL entries with sequential `topicdrift::<run_id>::<seq>` trace ids.
pub struct LogEmitter {
    writer: Box<dyn Write>,
    seq: u64,
    run_id: String,
    policy: Option<String>,
}

impl LogEmitter {
    pub fn to_file(path: &Path, run_id: &str) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::to_writer(std::io::BufWriter::new(file), run_id))
    }

    #[must_use]
    pub fn to_writer(writer: impl Write + 'static, run_id: &str) -> Self {
        Self {
            writer: Box::new(writer),
            seq: 0,
            run_id: run_id.to_string(),
            policy: None,
        }
    }

    /// Stamp every later entry with `policy` unless it sets its own.
    #[must_use]
    pub fn with_policy(mut self, policy: impl Into<String>) -> Self {
        self.policy = Some(policy.into());
        self
    }

    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    fn next_trace_id(&mut self) -> String {
        self.seq += 1;
        format!("topicdrift::{}::{:03}", self.run_id, self.seq)
    }

    /// Start an entry with the next trace id; finish it with [`Self::emit_entry`].
    pub fn entry(&mut self, level: LogLevel, event: &str) -> LogEntry {
        let trace_id = self.next_trace_id();
        LogEntry::new(trace_id, level, event)
    }

    pub fn emit(&mut self, level: LogLevel, event: &str) -> std::io::Result<LogEntry> {
        let entry = self.entry(level, event);
        self.emit_entry(entry.clone())?;
        Ok(entry)
    }

    pub fn emit_entry(&mut self, mut entry: LogEntry) -> std::io::Result<()> {
        if entry.trace_id.is_empty() {
            entry.trace_id = self.next_trace_id();
        }
        if entry.run_id.is_none() {
            entry.run_id = Some(self.run_id.clone());
        }
        if entry.policy.is_none() {
            entry.policy.clone_from(&self.policy);
        }
        let line = serde_json::to_string(&entry).map_err(std::io::Error::other)?;
        writeln!(self.writer, "{line}")
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct LogValidationError {
    pub line_number: usize,
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for LogValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "line {}: field '{}': {}",
            self.line_number, self.field, self.message
        )
    }
}

fn check_enum(
    obj: &serde_json::Map<String, serde_json::Value>,
    field: &str,
    allowed: &[&str],
    line_number: usize,
    errors: &mut Vec<LogValidationError>,
) {
    if let Some(value) = obj.get(field).and_then(|v| v.as_str())
        && !allowed.contains(&value)
    {
        errors.push(LogValidationError {
            line_number,
            field: field.to_string(),
            message: format!("invalid {field}: '{value}'"),
        });
    }
}

/// Validate a single JSONL line against the schema.
pub fn validate_log_line(
    line: &str,
    line_number: usize,
) -> Result<LogEntry, Vec<LogValidationError>> {
    let mut errors = Vec::new();

    let value: serde_json::Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => {
            errors.push(LogValidationError {
                line_number,
                field: "<json>".to_string(),
                message: format!("invalid JSON: {e}"),
            });
            return Err(errors);
        }
    };

    let Some(obj) = value.as_object() else {
        errors.push(LogValidationError {
            line_number,
            field: "<root>".to_string(),
            message: "expected JSON object".to_string(),
        });
        return Err(errors);
    };

    for field in ["timestamp", "trace_id", "level", "event"] {
        if !obj.contains_key(field) {
            errors.push(LogValidationError {
                line_number,
                field: field.to_string(),
                message: "required field missing".to_string(),
            });
        }
    }

    check_enum(obj, "level", &LEVELS, line_number, &mut errors);
    check_enum(obj, "outcome", &OUTCOMES, line_number, &mut errors);
    check_enum(obj, "policy", &POLICIES, line_number, &mut errors);

    if let Some(window) = obj.get("window")
        && !window.is_u64()
    {
        errors.push(LogValidationError {
            line_number,
            field: "window".to_string(),
            message: format!("window must be a non-negative integer, got: {window}"),
        });
    }

    if let Some(trace_id) = obj.get("trace_id").and_then(|v| v.as_str())
        && !trace_id.contains("::")
    {
        errors.push(LogValidationError {
            line_number,
            field: "trace_id".to_string(),
            message: format!(
                "trace_id should follow topicdrift::<run_id>::<seq> format, got: '{trace_id}'"
            ),
        });
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    match serde_json::from_value::<LogEntry>(value) {
        Ok(entry) => Ok(entry),
        Err(e) => {
            errors.push(LogValidationError {
                line_number,
                field: "<deserialization>".to_string(),
                message: format!("failed to deserialize: {e}"),
            });
            Err(errors)
        }
    }
}

/// Validate an entire JSONL file.
///
/// Returns the non-blank line count and any validation errors found.
pub fn validate_log_file(path: &Path) -> Result<(usize, Vec<LogValidationError>), std::io::Error> {
    let content = std::fs::read_to_string(path)?;
    let mut all_errors = Vec::new();
    let mut line_count = 0;

    for (i, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        line_count += 1;
        if let Err(errs) = validate_log_line(line, i + 1) {
            all_errors.extend(errs);
        }
    }

    Ok((line_count, all_errors))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// RFC 3339 UTC timestamp with millisecond precision.
fn now_utc() -> String {
    let duration = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    format_utc(duration.as_secs(), duration.subsec_millis())
}

fn format_utc(secs: u64, millis: u32) -> String {
    let days = (secs / 86_400) as i64;
    let rem = secs % 86_400;
    let (year, month, day) = civil_from_days(days);
    format!(
        "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}.{millis:03}Z",
        rem / 3600,
        (rem % 3600) / 60,
        rem % 60,
    )
}

/// Days since 1970-01-01 to a proleptic Gregorian (year, month, day).
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_entry_serializes_required_fields() {
        let entry = LogEntry::new("topicdrift::run-1::001", LogLevel::Info, "run_started");
        let json = entry.to_jsonl().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed["timestamp"].is_string());
        assert_eq!(parsed["trace_id"], "topicdrift::run-1::001");
        assert_eq!(parsed["level"], "info");
        assert_eq!(parsed["event"], "run_started");
        assert!(parsed.get("window").is_none());
        assert!(parsed.get("policy").is_none());
        assert!(parsed.get("topic").is_none());
    }

    #[test]
    fn log_entry_with_optional_fields() {
        let entry = LogEntry::new("topicdrift::run-1::002", LogLevel::Warn, "sparse_topic")
            .with_policy("drift")
            .with_window(4)
            .with_topic("sports")
            .with_outcome(Outcome::Skip)
            .with_duration_ms(3)
            .with_artifacts(vec!["window-05".to_string()])
            .with_details(serde_json::json!({"documents": 7}));
        let parsed: serde_json::Value = serde_json::from_str(&entry.to_jsonl().unwrap()).unwrap();
        assert_eq!(parsed["policy"], "drift");
        assert_eq!(parsed["window"], 4);
        assert_eq!(parsed["topic"], "sports");
        assert_eq!(parsed["outcome"], "skip");
        assert_eq!(parsed["duration_ms"], 3);
        assert!(parsed["artifact_refs"].is_array());
        assert_eq!(parsed["details"]["documents"], 7);
    }

    #[test]
    fn validate_valid_line() {
        let json = LogEntry::new("topicdrift::run-1::001", LogLevel::Info, "run_started")
            .with_policy("shift")
            .with_window(0)
            .to_jsonl()
            .unwrap();
        let result = validate_log_line(&json, 1);
        assert!(result.is_ok(), "valid line should pass: {result:?}");
    }

    #[test]
    fn validate_missing_required_field() {
        let json = r#"{"timestamp":"2026-01-01T00:00:00Z","level":"info","event":"x"}"#;
        let errors = validate_log_line(json, 1).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "trace_id"));
    }

    #[test]
    fn validate_rejects_unknown_enums() {
        let json = r#"{"timestamp":"t","trace_id":"a::b::1","level":"critical","event":"x","policy":"wobble","outcome":"maybe"}"#;
        let errors = validate_log_line(json, 3).unwrap_err();
        for field in ["level", "policy", "outcome"] {
            assert!(errors.iter().any(|e| e.field == field), "{field} not flagged");
        }
        assert!(errors.iter().all(|e| e.line_number == 3));
    }

    #[test]
    fn validate_rejects_negative_window() {
        let json = r#"{"timestamp":"t","trace_id":"a::b::1","level":"info","event":"x","window":-1}"#;
        let errors = validate_log_line(json, 1).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "window"));
    }

    #[test]
    fn validate_invalid_json_and_trace_id() {
        assert!(
            validate_log_line("not json", 1)
                .unwrap_err()
                .iter()
                .any(|e| e.field == "<json>")
        );
        let json = r#"{"timestamp":"t","trace_id":"flat","level":"info","event":"x"}"#;
        assert!(
            validate_log_line(json, 1)
                .unwrap_err()
                .iter()
                .any(|e| e.field == "trace_id")
        );
    }

    fn unique_tmp_dir(prefix: &str) -> std::path::PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system time should be after UNIX_EPOCH")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("{prefix}-{}-{nanos}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[test]
    fn emitter_numbers_trace_ids_and_stamps_run() {
        let dir = unique_tmp_dir("topicdrift-emitter");
        let path = dir.join("run_log.jsonl");
        let mut emitter = LogEmitter::to_file(&path, "drift-0001")
            .unwrap()
            .with_policy("drift");
        let e1 = emitter.emit(LogLevel::Info, "run_started").unwrap();
        let e2 = emitter.emit(LogLevel::Info, "run_completed").unwrap();
        assert_eq!(e1.trace_id, "topicdrift::drift-0001::001");
        assert!(e2.trace_id.ends_with("::002"));
        emitter.flush().unwrap();
        drop(emitter);

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first = validate_log_line(lines[0], 1).unwrap();
        assert_eq!(first.run_id.as_deref(), Some("drift-0001"));
        assert_eq!(first.policy.as_deref(), Some("drift"));
        let (count, errors) = validate_log_file(&path).unwrap();
        assert_eq!(count, 2);
        assert!(errors.is_empty(), "violations: {errors:?}");

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn artifact_index_serializes() {
        let mut idx = ArtifactIndex::new("run-001");
        idx.add("drift_overview.csv", "overview", "abc123");
        let parsed: serde_json::Value = serde_json::from_str(&idx.to_json().unwrap()).unwrap();
        assert_eq!(parsed["index_version"], 1);
        assert_eq!(parsed["run_id"], "run-001");
        assert_eq!(parsed["artifacts"].as_array().unwrap().len(), 1);
        assert!(parsed["artifacts"][0].get("size_bytes").is_none());
    }

    #[test]
    fn sha256_of_empty_input() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn utc_formatting() {
        assert_eq!(format_utc(0, 0), "1970-01-01T00:00:00.000Z");
        // 2024-02-29T12:34:56Z, a leap day.
        assert_eq!(format_utc(1_709_210_096, 789), "2024-02-29T12:34:56.789Z");
        assert_eq!(format_utc(951_782_400, 0), "2000-02-29T00:00:00.000Z");
    }
}
