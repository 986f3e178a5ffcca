//! Service bootstrap core: layered settings resolution and a structured
//! logging façade with severity-routed output streams.

pub mod config;
pub mod logging;
