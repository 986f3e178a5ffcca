//! Structured logging façade.
//!
//! One process-wide [`RootLogger`] owns two sinks: records from DEBUG to
//! WARNING go to standard output as delimited lines, ERROR and CRITICAL go
//! to standard error as JSON. Named [`ModuleLogger`]s forward to the root
//! and prepend their context to every message.
//!
//! ```no_run
//! use boilerplate::logging::{self, Context, Logger};
//!
//! let log = logging::get_module_logger("orders", None)?;
//! log.info("order accepted", Some(&Context::new().with("task_id", 7)));
//! # Ok::<(), boilerplate::logging::LoggerError>(())
//! ```

mod context;
mod error;
mod format;
mod level;
mod logger;
mod metadata;
mod root;

pub use context::{Context, ContextValue};
pub use error::LoggerError;
pub use format::{DelimitedFormat, JsonFormat};
pub use level::{Level, LevelBand};
pub use logger::{Logger, ModuleLogger};
pub use metadata::Metadata;
pub use root::{EVENT_TARGET, LoggerConfig, LoggerRegistry, RootLogger};

use std::sync::Arc;

use crate::config::{self, Settings};

static REGISTRY: LoggerRegistry = LoggerRegistry::new();

/// Configures the process-wide root logger from `settings`.
///
/// Only the first call configures anything; later calls return the
/// existing root.
pub fn init_root_logger(settings: &Settings) -> Arc<RootLogger> {
    REGISTRY.root_or_init(|| {
        let root = RootLogger::stdio(LoggerConfig::from_settings(settings));
        root.install_global();
        root
    })
}

/// Returns the process-wide root logger, configuring it from the process
/// settings on first use.
pub fn get_root_logger() -> Result<Arc<RootLogger>, LoggerError> {
    if let Some(root) = REGISTRY.root() {
        return Ok(root);
    }
    let settings = config::get_settings()?;
    Ok(init_root_logger(settings))
}

/// Returns a logger named `name` that forwards to the root logger.
pub fn get_module_logger(
    name: impl Into<String>,
    context: Option<Context>,
) -> Result<ModuleLogger, LoggerError> {
    Ok(ModuleLogger::new(get_root_logger()?, name, context))
}

#[cfg(test)]
mod tests;
