//! Tests for logging module.

use super::*;
use crate::config::Profile;
use serde_json::{json, Value};
use std::io;
use std::sync::{Arc, Mutex};
use std::thread;
use tracing_subscriber::fmt::MakeWriter;

/// In-memory sink shared between the root and the test.
#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn lines(&self) -> Vec<String> {
        let buf = self.0.lock().unwrap();
        String::from_utf8_lossy(&buf)
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Capture {
    type Writer = Capture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

struct Harness {
    root: Arc<RootLogger>,
    stdout: Capture,
    stderr: Capture,
}

fn harness(profile: Profile) -> Harness {
    let stdout = Capture::default();
    let stderr = Capture::default();
    let config = LoggerConfig::new(profile, "abc1234");
    let root = RootLogger::new(config, stdout.clone(), stderr.clone());
    Harness {
        root: Arc::new(root),
        stdout,
        stderr,
    }
}

/// Splits a delimited line into its eight fields; the message keeps any
/// separators of its own.
fn delimited_fields(line: &str) -> Vec<&str> {
    line.splitn(8, " | ").collect()
}

fn json_line(line: &str) -> Value {
    serde_json::from_str(line).unwrap()
}

#[derive(Debug, thiserror::Error)]
#[error("could not load order")]
struct LoadError(#[source] io::Error);

// ==================== Level tests ====================

#[test]
fn test_level_numbers() {
    let numbers: Vec<u8> = Level::ALL.iter().map(Level::number).collect();
    assert_eq!(numbers, vec![10, 20, 30, 40, 50]);
}

#[test]
fn test_level_names() {
    assert_eq!(Level::Warning.name(), "WARNING");
    assert_eq!(Level::Critical.to_string(), "CRITICAL");
}

#[test]
fn test_level_bands() {
    assert_eq!(Level::Debug.band(), LevelBand::Low);
    assert_eq!(Level::Info.band(), LevelBand::Low);
    assert_eq!(Level::Warning.band(), LevelBand::Low);
    assert_eq!(Level::Error.band(), LevelBand::High);
    assert_eq!(Level::Critical.band(), LevelBand::High);
}

#[test]
fn test_threshold_per_profile() {
    assert_eq!(Level::threshold_for(Profile::Development), Level::Debug);
    assert_eq!(Level::threshold_for(Profile::Staging), Level::Debug);
    assert_eq!(Level::threshold_for(Profile::Production), Level::Info);
}

// ==================== Context tests ====================

#[test]
fn test_context_insert_replaces_in_place() {
    let mut ctx = Context::from([("a", 1), ("b", 2)]);
    ctx.insert("a", 3);

    assert_eq!(ctx.len(), 2);
    assert_eq!(ctx.render_prefix(), "a: 3 | b: 2 | ");
}

#[test]
fn test_context_merge_call_wins() {
    let static_ctx = Context::new().with("environment", "development");
    let call_ctx = Context::new()
        .with("environment", "production")
        .with("task_id", 7);

    let merged = static_ctx.merged(&call_ctx);

    assert_eq!(merged.render_prefix(), "environment: production | task_id: 7 | ");
    // The static context itself is untouched.
    assert_eq!(static_ctx.render_prefix(), "environment: development | ");
}

#[test]
fn test_context_from_json_object() {
    let ctx = Context::try_from(json!({
        "task_id": 7,
        "ratio": 0.5,
        "retry": true,
        "name": "sync",
        "skipped": null
    }))
    .unwrap();

    assert_eq!(ctx.len(), 4);
    assert_eq!(ctx.get("task_id"), Some(&ContextValue::Int(7)));
    assert_eq!(ctx.get("ratio"), Some(&ContextValue::Float(0.5)));
    assert_eq!(ctx.get("retry"), Some(&ContextValue::Bool(true)));
    assert_eq!(ctx.get("name"), Some(&ContextValue::Str("sync".into())));
    assert!(ctx.get("skipped").is_none());
}

#[test]
fn test_context_from_json_non_mapping() {
    for value in [json!("text"), json!(42), json!([1, 2]), json!(null)] {
        let err = Context::try_from(value).unwrap_err();
        assert!(matches!(err, LoggerError::ContextType { .. }));
    }
}

#[test]
fn test_context_from_json_nested_value() {
    let err = Context::try_from(json!({"inner": {"a": 1}})).unwrap_err();
    match err {
        LoggerError::ContextValue { key, found } => {
            assert_eq!(key, "inner");
            assert_eq!(found, "object");
        }
        other => panic!("unexpected error: {other}"),
    }
}

// ==================== Metadata tests ====================

#[test]
fn test_metadata_into_context() {
    let metadata = Metadata::from_json(json!({
        "idempotency_key": "9b2f7c1e-3d4a-4f6b-8c9d-0e1f2a3b4c5d",
        "task_id": 12,
        "callback_url": "https://example.com/hook"
    }))
    .unwrap();

    let ctx = Context::from(&metadata);
    assert_eq!(
        ctx.render_prefix(),
        "idempotency_key: 9b2f7c1e-3d4a-4f6b-8c9d-0e1f2a3b4c5d | task_id: 12 | \
         callback_url: https://example.com/hook | "
    );
}

#[test]
fn test_metadata_empty_is_valid() {
    let metadata = Metadata::from_json(json!({})).unwrap();
    assert!(Context::from(&metadata).is_empty());
}

#[test]
fn test_metadata_rejects_non_v4_key() {
    // Version 1 UUID.
    let err = Metadata::from_json(json!({
        "idempotency_key": "c232ab00-9414-11ec-b3c8-9f6bdeced846"
    }))
    .unwrap_err();
    assert!(matches!(err, LoggerError::Metadata(_)));
}

#[test]
fn test_metadata_rejects_zero_task_id() {
    let err = Metadata::from_json(json!({"task_id": 0})).unwrap_err();
    assert!(matches!(err, LoggerError::Metadata(_)));
}

#[test]
fn test_metadata_rejects_ftp_callback() {
    let err = Metadata::from_json(json!({"callback_url": "ftp://example.com/drop"})).unwrap_err();
    assert!(err.to_string().contains("ftp"));
}

// ==================== Routing tests ====================

#[test]
fn test_low_band_goes_to_stdout_only() {
    let h = harness(Profile::Development);

    h.root.debug("debug message", None);
    h.root.info("info message", None);
    h.root.warning("warning message", None);

    let stdout = h.stdout.lines();
    assert_eq!(stdout.len(), 3);
    assert!(stdout[0].ends_with("debug message"));
    assert!(stdout[1].ends_with("info message"));
    assert!(stdout[2].ends_with("warning message"));
    assert!(h.stderr.lines().is_empty());
}

#[test]
fn test_high_band_goes_to_stderr_only() {
    let h = harness(Profile::Development);

    h.root.error("error message", None);
    h.root.critical("critical message", None);

    assert!(h.stdout.lines().is_empty());
    let stderr = h.stderr.lines();
    assert_eq!(stderr.len(), 2);

    let error = json_line(&stderr[0]);
    assert_eq!(error["level"], "ERROR");
    assert_eq!(error["levelno"], 40);
    assert_eq!(error["message"], "error message");

    let critical = json_line(&stderr[1]);
    assert_eq!(critical["level"], "CRITICAL");
    assert_eq!(critical["levelno"], 50);
}

#[test]
fn test_production_drops_debug() {
    let h = harness(Profile::Production);

    h.root.debug("hidden", None);
    h.root.info("shown", None);

    let stdout = h.stdout.lines();
    assert_eq!(stdout.len(), 1);
    assert!(stdout[0].ends_with("shown"));
}

#[test]
fn test_staging_keeps_debug() {
    let h = harness(Profile::Staging);
    h.root.debug("shown", None);
    assert_eq!(h.stdout.lines().len(), 1);
}

#[test]
fn test_log_with_explicit_level() {
    let h = harness(Profile::Development);

    h.root.log(Level::Warning, "low", None);
    h.root.log(Level::Critical, "high", None);

    assert_eq!(h.stdout.lines().len(), 1);
    assert_eq!(h.stderr.lines().len(), 1);
}

// ==================== Record format tests ====================

#[test]
fn test_delimited_line_fields() {
    let h = harness(Profile::Development);
    let log = ModuleLogger::new(h.root.clone(), "orders", Some(Context::new()));

    log.info("order accepted", None);
    let line = line!() - 1;

    let stdout = h.stdout.lines();
    let fields = delimited_fields(&stdout[0]);
    assert_eq!(fields.len(), 8);
    assert_eq!(fields[0].len(), "2024-01-01 00:00:00.000".len());
    assert_eq!(fields[1], "INFO:20");
    assert!(fields[2].parse::<u128>().is_ok());
    assert_eq!(fields[3], "src/logging/tests.rs");
    assert_eq!(fields[4], format!("orders:{}", line));
    assert!(fields[5].ends_with(&format!(":{}", std::process::id())));
    let thread_name = thread::current().name().unwrap_or("unnamed").to_string();
    assert!(fields[6].starts_with(&format!("{}:", thread_name)));
    assert_eq!(fields[7], "order accepted");
}

#[test]
fn test_json_line_fields() {
    let h = harness(Profile::Development);
    let log = ModuleLogger::new(h.root.clone(), "payments", Some(Context::new()));

    log.error("charge failed", None);
    let line = line!() - 1;

    let record = json_line(&h.stderr.lines()[0]);
    assert!(record["timestamp"].is_string());
    assert_eq!(record["level"], "ERROR");
    assert_eq!(record["levelno"], 40);
    assert!(record["elapsed_ms"].is_u64());
    assert_eq!(record["file"], "src/logging/tests.rs");
    assert_eq!(record["function"], "payments");
    assert_eq!(record["lineno"], line);
    assert_eq!(record["process"], std::process::id());
    assert!(record["process_name"].is_string());
    assert!(record["thread_name"].is_string());
    assert!(record["thread"].is_string());
    assert_eq!(record["message"], "charge failed");
    assert!(record.get("exc_info").is_none());
}

#[test]
fn test_multiline_message_stays_one_json_line() {
    let h = harness(Profile::Development);

    h.root.error("first\nsecond", None);

    let stderr = h.stderr.lines();
    assert_eq!(stderr.len(), 1);
    assert_eq!(json_line(&stderr[0])["message"], "first\nsecond");
}

#[test]
fn test_multiline_message_stays_one_delimited_line() {
    let h = harness(Profile::Development);

    h.root.info("first\nsecond", None);
    h.root.warning("x", Some(&Context::new().with("note", "a\r\nb")));

    let stdout = h.stdout.lines();
    assert_eq!(stdout.len(), 2);
    assert_eq!(delimited_fields(&stdout[0])[7], "first\\nsecond");
    assert_eq!(delimited_fields(&stdout[1])[7], "note: a\\r\\nb | x");
}

#[test]
fn test_worker_thread_name_in_record() {
    let h = harness(Profile::Development);
    let root = h.root.clone();

    thread::Builder::new()
        .name("ingest-worker".to_string())
        .spawn(move || root.info("from worker", None))
        .unwrap()
        .join()
        .unwrap();

    let stdout = h.stdout.lines();
    let fields = delimited_fields(&stdout[0]);
    let (name, id) = fields[6].split_once(':').unwrap();
    assert_eq!(name, "ingest-worker");
    assert!(id.parse::<u64>().is_ok());
}

// ==================== Context rendering tests ====================

#[test]
fn test_call_context_overrides_static_context() {
    let h = harness(Profile::Development);
    let log = ModuleLogger::new(
        h.root.clone(),
        "api",
        Some(Context::new().with("environment", "development")),
    );

    log.info(
        "request handled",
        Some(&Context::new().with("environment", "production").with("task_id", 7)),
    );

    let stdout = h.stdout.lines();
    let fields = delimited_fields(&stdout[0]);
    assert_eq!(
        fields[7],
        "environment: production | task_id: 7 | request handled"
    );
}

#[test]
fn test_log_json_context() {
    let h = harness(Profile::Development);
    let log = ModuleLogger::new(
        h.root.clone(),
        "api",
        Some(Context::new().with("environment", "development")),
    );

    log.log_json(
        Level::Info,
        "request handled",
        json!({"environment": "production", "task_id": 7}),
    )
    .unwrap();

    let stdout = h.stdout.lines();
    assert!(stdout[0].ends_with("environment: production | task_id: 7 | request handled"));
}

#[test]
fn test_log_json_non_mapping_emits_nothing() {
    let h = harness(Profile::Development);
    let log = ModuleLogger::new(h.root.clone(), "api", None);

    let err = log
        .log_json(Level::Error, "boom", json!(["not", "a", "mapping"]))
        .unwrap_err();

    assert!(matches!(err, LoggerError::ContextType { found: "array" }));
    assert!(h.stdout.lines().is_empty());
    assert!(h.stderr.lines().is_empty());
}

#[test]
fn test_module_logger_default_context() {
    let h = harness(Profile::Staging);
    let log = ModuleLogger::new(h.root.clone(), "worker", None);

    log.info("started", None);

    let stdout = h.stdout.lines();
    assert!(stdout[0].ends_with("environment: staging | commit_sha: abc1234 | started"));
}

#[test]
fn test_root_logger_has_empty_context() {
    let h = harness(Profile::Development);

    h.root.info("plain", None);

    let stdout = h.stdout.lines();
    assert_eq!(delimited_fields(&stdout[0])[7], "plain");
    assert!(stdout[0].contains(" | root:"));
}

// ==================== Exception and timing tests ====================

#[test]
fn test_exception_carries_error_chain() {
    let h = harness(Profile::Development);
    let err = LoadError(io::Error::new(io::ErrorKind::NotFound, "disk gone"));

    h.root.exception("loading failed", &err, None);

    assert!(h.stdout.lines().is_empty());
    let record = json_line(&h.stderr.lines()[0]);
    assert_eq!(record["level"], "ERROR");
    assert_eq!(record["message"], "loading failed");
    let exc_info = record["exc_info"].as_str().unwrap();
    assert!(exc_info.starts_with("could not load order\nCaused by: disk gone"));
}

#[test]
fn test_timed_logs_running_time() {
    let h = harness(Profile::Development);
    let log = ModuleLogger::new(h.root.clone(), "jobs", Some(Context::new()));

    let value = log.timed("sum", || (1..=10).sum::<u32>());

    assert_eq!(value, 55);
    let stdout = h.stdout.lines();
    let fields = delimited_fields(&stdout[0]);
    assert_eq!(fields[1], "DEBUG:10");
    assert!(fields[7].starts_with("'sum' running_time: "));
    assert!(fields[7].ends_with(" ms."));
}

#[test]
fn test_timed_is_silent_in_production() {
    let h = harness(Profile::Production);
    let log = ModuleLogger::new(h.root.clone(), "jobs", None);

    let value = log.timed("noop", || "done");

    assert_eq!(value, "done");
    assert!(h.stdout.lines().is_empty());
}

// ==================== Registry tests ====================

#[test]
fn test_registry_initializes_once() {
    let registry = LoggerRegistry::new();
    let stdout = Capture::default();
    let stderr = Capture::default();
    let mut inits = 0;

    let first = registry.root_or_init(|| {
        inits += 1;
        RootLogger::new(
            LoggerConfig::new(Profile::Development, "abc1234"),
            stdout.clone(),
            stderr.clone(),
        )
    });
    let second = registry.root_or_init(|| {
        inits += 1;
        RootLogger::new(
            LoggerConfig::new(Profile::Development, "abc1234"),
            stdout.clone(),
            stderr.clone(),
        )
    });

    assert_eq!(inits, 1);
    assert!(Arc::ptr_eq(&first, &second));

    second.warning("once", None);
    second.error("once", None);
    assert_eq!(stdout.lines().len(), 1);
    assert_eq!(stderr.lines().len(), 1);
}

#[test]
fn test_registry_starts_empty() {
    let registry = LoggerRegistry::default();
    assert!(!registry.is_initialized());
    assert!(registry.root().is_none());
}

// ==================== Concurrency tests ====================

#[test]
fn test_concurrent_emission_keeps_lines_whole() {
    let h = harness(Profile::Development);
    let log = ModuleLogger::new(h.root.clone(), "pool", None);

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let log = log.clone();
            thread::spawn(move || {
                for i in 0..50 {
                    let ctx = Context::new().with("worker", worker).with("i", i);
                    log.info("tick", Some(&ctx));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let stdout = h.stdout.lines();
    assert_eq!(stdout.len(), 400);
    for line in &stdout {
        assert_eq!(delimited_fields(line).len(), 8);
        assert!(line.contains(" | INFO:20 | "));
        assert!(line.ends_with(" | tick"));
    }
}
