//! Network bind settings read by the process supervisor.

use serde::Serialize;
use std::net::Ipv4Addr;
use std::ops::RangeInclusive;

use super::fields::Fields;
use super::ConfigError;

/// Ports the service is allowed to bind.
pub const ALLOWED_PORTS: RangeInclusive<u16> = 50000..=60000;

/// Listener settings.
#[derive(Debug, Clone, Serialize)]
pub struct ServerSettings {
    /// "http" or "https".
    pub protocol: String,
    pub host: Ipv4Addr,
    pub port: u16,
}

impl ServerSettings {
    pub(crate) fn from_fields(fields: &Fields<'_>) -> Result<Self, ConfigError> {
        Ok(ServerSettings {
            protocol: fields.one_of("SERVER_PROTOCOL", &["http", "https"])?,
            host: fields.parse("SERVER_HOST")?,
            port: fields.port_in("SERVER_PORT", ALLOWED_PORTS)?,
        })
    }
}
