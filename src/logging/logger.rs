//! The logging façade shared by the root and module loggers.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error;
use std::fmt::Write as _;
use std::panic::Location;
use std::sync::Arc;
use std::time::Instant;

use super::root::Emission;
use super::{Context, Level, LoggerError, RootLogger};

/// Emission methods for a logger with a name and a static context.
///
/// Every provided method composes the message as the static context merged
/// with the call context (call wins), rendered as `key: value | ` pairs in
/// front of the message. The call site is recorded as file and line.
pub trait Logger {
    fn name(&self) -> &str;

    /// Context attached to every record of this logger.
    fn static_context(&self) -> &Context;

    /// Root that owns the output sinks.
    fn root(&self) -> &RootLogger;

    #[track_caller]
    fn log(&self, level: Level, message: &str, context: Option<&Context>) {
        emit(self, level, message, context, "", Location::caller());
    }

    #[track_caller]
    fn debug(&self, message: &str, context: Option<&Context>) {
        emit(self, Level::Debug, message, context, "", Location::caller());
    }

    #[track_caller]
    fn info(&self, message: &str, context: Option<&Context>) {
        emit(self, Level::Info, message, context, "", Location::caller());
    }

    #[track_caller]
    fn warning(&self, message: &str, context: Option<&Context>) {
        emit(self, Level::Warning, message, context, "", Location::caller());
    }

    #[track_caller]
    fn error(&self, message: &str, context: Option<&Context>) {
        emit(self, Level::Error, message, context, "", Location::caller());
    }

    #[track_caller]
    fn critical(&self, message: &str, context: Option<&Context>) {
        emit(self, Level::Critical, message, context, "", Location::caller());
    }

    /// Logs at ERROR with the error's source chain and, when enabled by
    /// `RUST_BACKTRACE`, a backtrace captured here.
    #[track_caller]
    fn exception(&self, message: &str, error: &(dyn Error + 'static), context: Option<&Context>) {
        let exc_info = describe_error(error);
        emit(self, Level::Error, message, context, &exc_info, Location::caller());
    }

    /// Logs with a context given as untyped JSON.
    ///
    /// The value must be an object of scalars; anything else is rejected
    /// before a record is emitted.
    #[track_caller]
    fn log_json(
        &self,
        level: Level,
        message: &str,
        context: serde_json::Value,
    ) -> Result<(), LoggerError> {
        let context = Context::try_from(context)?;
        emit(self, level, message, Some(&context), "", Location::caller());
        Ok(())
    }

    /// Runs `f` and logs its running time at DEBUG.
    #[track_caller]
    fn timed<T>(&self, label: &str, f: impl FnOnce() -> T) -> T
    where
        Self: Sized,
    {
        let caller = Location::caller();
        let started = Instant::now();
        let result = f();
        let message = format!(
            "'{}' running_time: {} ms.",
            label,
            started.elapsed().as_millis()
        );
        emit(self, Level::Debug, &message, None, "", caller);
        result
    }
}

fn emit<L: Logger + ?Sized>(
    logger: &L,
    level: Level,
    message: &str,
    context: Option<&Context>,
    exc_info: &str,
    caller: &'static Location<'static>,
) {
    let root = logger.root();
    if !root.enabled(level) {
        return;
    }

    let composed = match context {
        Some(call) => logger.static_context().merged(call),
        None => logger.static_context().clone(),
    };
    let message = format!("{}{}", composed.render_prefix(), message);

    root.emit(Emission {
        logger: logger.name(),
        level,
        message: &message,
        caller,
        exc_info,
    });
}

fn describe_error(error: &(dyn Error + 'static)) -> String {
    let mut out = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let _ = write!(out, "\nCaused by: {}", cause);
        source = cause.source();
    }

    let backtrace = Backtrace::capture();
    if backtrace.status() == BacktraceStatus::Captured {
        let _ = write!(out, "\n{}", backtrace);
    }
    out
}

/// A named logger that forwards to the root.
#[derive(Clone)]
pub struct ModuleLogger {
    name: String,
    context: Context,
    root: Arc<RootLogger>,
}

impl ModuleLogger {
    /// Without an explicit context the logger is tagged with the
    /// environment and commit of the root's configuration.
    pub fn new(root: Arc<RootLogger>, name: impl Into<String>, context: Option<Context>) -> Self {
        let context = context.unwrap_or_else(|| root.config().default_context());
        ModuleLogger {
            name: name.into(),
            context,
            root,
        }
    }
}

impl std::fmt::Debug for ModuleLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleLogger")
            .field("name", &self.name)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl Logger for ModuleLogger {
    fn name(&self) -> &str {
        &self.name
    }

    fn static_context(&self) -> &Context {
        &self.context
    }

    fn root(&self) -> &RootLogger {
        &self.root
    }
}
