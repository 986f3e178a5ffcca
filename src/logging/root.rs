//! The root logger: one dispatcher, two severity-routed sinks.

use std::panic::Location;
use std::sync::{Arc, OnceLock};

use tracing::Dispatch;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use super::format::{process_start, DelimitedFormat, JsonFormat};
use super::{Context, Level, Logger};
use crate::config::{Profile, Settings};

/// Target of every event the façade emits.
pub const EVENT_TARGET: &str = "boilerplate";

/// Logger settings derived from the resolved [`Settings`].
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub profile: Profile,
    /// Records below this level are dropped.
    pub threshold: Level,
    /// Commit reference attached to module loggers by default.
    pub commit_sha: String,
    /// Let `RUST_LOG` replace the threshold-based filter.
    pub honor_env_filter: bool,
}

impl LoggerConfig {
    pub fn new(profile: Profile, commit_sha: impl Into<String>) -> Self {
        LoggerConfig {
            profile,
            threshold: Level::threshold_for(profile),
            commit_sha: commit_sha.into(),
            honor_env_filter: false,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        LoggerConfig {
            honor_env_filter: true,
            ..Self::new(settings.profile(), settings.app.commit_sha.clone())
        }
    }

    /// Context module loggers get when the caller supplies none.
    pub fn default_context(&self) -> Context {
        Context::new()
            .with("environment", self.profile.as_str())
            .with("commit_sha", self.commit_sha.as_str())
    }

    fn filter(&self) -> EnvFilter {
        let fallback = || EnvFilter::new(self.threshold.as_tracing().to_string());
        if self.honor_env_filter {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback())
        } else {
            fallback()
        }
    }
}

/// One emission, as handed from a [`Logger`] to the root.
pub(crate) struct Emission<'a> {
    pub logger: &'a str,
    pub level: Level,
    pub message: &'a str,
    pub caller: &'static Location<'static>,
    pub exc_info: &'a str,
}

macro_rules! emit_at {
    ($level:expr, $e:expr) => {
        tracing::event!(
            target: EVENT_TARGET,
            $level,
            logger = $e.logger,
            levelname = $e.level.name(),
            levelno = $e.level.number(),
            caller_file = $e.caller.file(),
            caller_line = $e.caller.line(),
            exc_info = $e.exc_info,
            "{}",
            $e.message
        )
    };
}

/// The process-wide logger.
///
/// Owns a `tracing` dispatcher with two `fmt` layers: the DEBUG..=WARNING
/// band goes to the first sink in the delimited template, the
/// ERROR..=CRITICAL band to the second in the JSON template. Each record
/// reaches exactly one sink. The root does not propagate any further.
pub struct RootLogger {
    dispatch: Dispatch,
    config: LoggerConfig,
    context: Context,
}

impl RootLogger {
    pub const NAME: &'static str = "root";

    /// Builds a root writing the low band to `stdout` and the high band to
    /// `stderr`. Any `MakeWriter` works, which is how tests capture output.
    pub fn new<O, E>(config: LoggerConfig, stdout: O, stderr: E) -> Self
    where
        O: for<'w> MakeWriter<'w> + Send + Sync + 'static,
        E: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let started = process_start();
        let report_errors = config.profile.reports_sink_errors();

        let low_band = fmt::layer()
            .with_ansi(false)
            .log_internal_errors(report_errors)
            .event_format(DelimitedFormat::new(started))
            .with_writer(stdout.with_min_level(tracing::Level::WARN));

        let high_band = fmt::layer()
            .with_ansi(false)
            .log_internal_errors(report_errors)
            .event_format(JsonFormat::new(started))
            .with_writer(stderr.with_max_level(tracing::Level::ERROR));

        let subscriber = tracing_subscriber::registry()
            .with(config.filter())
            .with(low_band)
            .with(high_band);

        RootLogger {
            dispatch: Dispatch::new(subscriber),
            config,
            context: Context::new(),
        }
    }

    /// Root writing to the real standard output and standard error.
    pub fn stdio(config: LoggerConfig) -> Self {
        Self::new(config, std::io::stdout, std::io::stderr)
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Makes this root the global `tracing` default, so plain `tracing`
    /// events and `log` records from dependencies reach the same sinks.
    ///
    /// Returns false if another global subscriber was installed first.
    pub fn install_global(&self) -> bool {
        self.dispatch.clone().try_init().is_ok()
    }

    pub fn enabled(&self, level: Level) -> bool {
        level >= self.config.threshold
    }

    pub(crate) fn emit(&self, emission: Emission<'_>) {
        if !self.enabled(emission.level) {
            return;
        }
        tracing::dispatcher::with_default(&self.dispatch, || match emission.level {
            Level::Debug => emit_at!(tracing::Level::DEBUG, emission),
            Level::Info => emit_at!(tracing::Level::INFO, emission),
            Level::Warning => emit_at!(tracing::Level::WARN, emission),
            Level::Error | Level::Critical => emit_at!(tracing::Level::ERROR, emission),
        });
    }
}

impl Logger for RootLogger {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn static_context(&self) -> &Context {
        &self.context
    }

    fn root(&self) -> &RootLogger {
        self
    }
}

/// Holds the root logger and configures it at most once.
///
/// The first [`LoggerRegistry::root_or_init`] call builds the root; later
/// calls return that same instance and never attach sinks again.
pub struct LoggerRegistry {
    root: OnceLock<Arc<RootLogger>>,
}

impl LoggerRegistry {
    pub const fn new() -> Self {
        Self {
            root: OnceLock::new(),
        }
    }

    pub fn root_or_init(&self, init: impl FnOnce() -> RootLogger) -> Arc<RootLogger> {
        Arc::clone(self.root.get_or_init(|| Arc::new(init())))
    }

    pub fn root(&self) -> Option<Arc<RootLogger>> {
        self.root.get().cloned()
    }

    pub fn is_initialized(&self) -> bool {
        self.root.get().is_some()
    }
}

impl Default for LoggerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

