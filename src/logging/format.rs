//! Line templates for the two output sinks.
//!
//! Standard output gets a `|`-delimited line, standard error a JSON object.
//! Both carry the same fields.

use std::borrow::Cow;
use std::fmt::{self, Write as _};
use std::sync::OnceLock;
use std::time::Instant;
use std::{env, process, thread};

use chrono::{Local, SecondsFormat};
use serde_json::json;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use super::Level;

/// Field names the façade attaches to every event.
pub(crate) mod fields {
    pub const LOGGER: &str = "logger";
    pub const LEVEL_NAME: &str = "levelname";
    pub const LEVEL_NO: &str = "levelno";
    pub const CALLER_FILE: &str = "caller_file";
    pub const CALLER_LINE: &str = "caller_line";
    pub const EXC_INFO: &str = "exc_info";
    pub const MESSAGE: &str = "message";
}

/// Instant the process started logging; elapsed times are measured from it.
pub(crate) fn process_start() -> Instant {
    static START: OnceLock<Instant> = OnceLock::new();
    *START.get_or_init(Instant::now)
}

/// Executable name and pid of this process.
fn process_info() -> &'static (String, u32) {
    static PROCESS: OnceLock<(String, u32)> = OnceLock::new();
    PROCESS.get_or_init(|| {
        let name = env::current_exe()
            .ok()
            .and_then(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "unknown".to_string());
        (name, process::id())
    })
}

/// Name and numeric id of the emitting thread.
fn thread_info() -> (String, String) {
    let current = thread::current();
    let name = current.name().unwrap_or("unnamed").to_string();
    // `ThreadId` only exposes its number through `Debug`: "ThreadId(7)".
    let id = format!("{:?}", current.id());
    let id = id
        .trim_start_matches("ThreadId(")
        .trim_end_matches(')')
        .to_string();
    (name, id)
}

/// Escapes line breaks so a record never spans more than one line.
fn single_line(s: &str) -> Cow<'_, str> {
    if s.contains(['\n', '\r']) {
        Cow::Owned(s.replace('\r', "\\r").replace('\n', "\\n"))
    } else {
        Cow::Borrowed(s)
    }
}

/// Fields of one event, gathered from the façade's own fields when present
/// and from the event metadata otherwise.
#[derive(Debug, Default)]
struct RecordFields {
    message: String,
    logger: Option<String>,
    level_name: Option<String>,
    level_no: Option<u64>,
    file: Option<String>,
    line: Option<u64>,
    exc_info: Option<String>,
    extra: Vec<(String, String)>,
}

impl Visit for RecordFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            fields::MESSAGE => self.message = value.to_string(),
            fields::LOGGER => self.logger = Some(value.to_string()),
            fields::LEVEL_NAME => self.level_name = Some(value.to_string()),
            fields::CALLER_FILE => self.file = Some(value.to_string()),
            fields::EXC_INFO if !value.is_empty() => self.exc_info = Some(value.to_string()),
            fields::EXC_INFO => {}
            name => self.extra.push((name.to_string(), value.to_string())),
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            fields::LEVEL_NO => self.level_no = Some(value),
            fields::CALLER_LINE => self.line = Some(value),
            name => self.extra.push((name.to_string(), value.to_string())),
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == fields::MESSAGE {
            self.message = format!("{:?}", value);
        } else {
            self.extra
                .push((field.name().to_string(), format!("{:?}", value)));
        }
    }
}

/// A fully resolved record, ready to render.
struct Record {
    timestamp: chrono::DateTime<Local>,
    level_name: String,
    level_no: u64,
    elapsed_ms: u128,
    file: String,
    function: String,
    line: u64,
    process_name: &'static str,
    process_id: u32,
    thread_name: String,
    thread_id: String,
    message: String,
    exc_info: Option<String>,
}

impl Record {
    fn from_event(event: &Event<'_>, started: Instant) -> Self {
        let mut visitor = RecordFields::default();
        event.record(&mut visitor);

        let meta = event.metadata();
        let fallback_level = Level::from_tracing(meta.level());

        let mut message = visitor.message;
        for (key, value) in &visitor.extra {
            let _ = write!(message, " {}={}", key, value);
        }

        let (process_name, process_id) = process_info();
        let (thread_name, thread_id) = thread_info();

        Record {
            timestamp: Local::now(),
            level_name: visitor
                .level_name
                .unwrap_or_else(|| fallback_level.name().to_string()),
            level_no: visitor
                .level_no
                .unwrap_or_else(|| u64::from(fallback_level.number())),
            elapsed_ms: started.elapsed().as_millis(),
            file: visitor
                .file
                .or_else(|| meta.file().map(str::to_string))
                .unwrap_or_default(),
            function: visitor.logger.unwrap_or_else(|| meta.target().to_string()),
            line: visitor
                .line
                .or_else(|| meta.line().map(u64::from))
                .unwrap_or_default(),
            process_name: process_name.as_str(),
            process_id: *process_id,
            thread_name,
            thread_id,
            message,
            exc_info: visitor.exc_info,
        }
    }
}

/// `timestamp | LEVEL:no | elapsed | file | function:line | process:pid | thread:id | message`
///
/// Line breaks in the message and in `exc_info` are escaped as `\n`.
#[derive(Debug, Clone, Copy)]
pub struct DelimitedFormat {
    started: Instant,
}

impl DelimitedFormat {
    pub fn new(started: Instant) -> Self {
        Self { started }
    }
}

impl<S, N> FormatEvent<S, N> for DelimitedFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let record = Record::from_event(event, self.started);

        write!(
            writer,
            "{} | {}:{} | {} | {} | {}:{} | {}:{} | {}:{} | {}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level_name,
            record.level_no,
            record.elapsed_ms,
            record.file,
            record.function,
            record.line,
            record.process_name,
            record.process_id,
            record.thread_name,
            record.thread_id,
            single_line(&record.message),
        )?;
        if let Some(exc_info) = &record.exc_info {
            write!(writer, " | {}", single_line(exc_info))?;
        }
        writeln!(writer)
    }
}

/// One JSON object per line with the same fields as [`DelimitedFormat`].
#[derive(Debug, Clone, Copy)]
pub struct JsonFormat {
    started: Instant,
}

impl JsonFormat {
    pub fn new(started: Instant) -> Self {
        Self { started }
    }
}

impl<S, N> FormatEvent<S, N> for JsonFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let record = Record::from_event(event, self.started);

        let mut line = json!({
            "timestamp": record.timestamp.to_rfc3339_opts(SecondsFormat::Millis, false),
            "level": record.level_name,
            "levelno": record.level_no,
            "elapsed_ms": record.elapsed_ms as u64,
            "file": record.file,
            "function": record.function,
            "lineno": record.line,
            "process_name": record.process_name,
            "process": record.process_id,
            "thread_name": record.thread_name,
            "thread": record.thread_id,
            "message": record.message,
        });
        if let Some(exc_info) = record.exc_info {
            line["exc_info"] = exc_info.into();
        }

        writeln!(writer, "{}", line)
    }
}
