//! Settings resolution for the service.
//!
//! Settings come from three sources in ascending priority: built-in defaults
//! (with per-profile overrides), a local settings file (dotenv or YAML), and
//! process environment variables. The result is validated once at startup
//! and never mutated afterwards.

mod app;
mod database;
mod duration;
mod error;
mod execution;
mod fields;
mod internal;
mod profile;
mod secret;
mod sentry;
mod server;
mod sources;

pub use app::AppSettings;
pub use database::DatabaseSettings;
pub use error::ConfigError;
pub use execution::{ExecutionSettings, RetrySettings};
pub use internal::InternalSettings;
pub use profile::Profile;
pub use secret::{SECRET_PLACEHOLDER, SecretString};
pub use sentry::SentrySettings;
pub use server::{ALLOWED_PORTS, ServerSettings};
pub use sources::{DEFAULT_SETTINGS_FILE, PROFILE_VAR, SETTINGS_FILE_VAR};

use serde::Serialize;
use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use fields::Fields;
use sources::Layer;

/// Resolved, validated settings.
///
/// Shared by reference only; see [`get_settings`] for the process-wide
/// instance.
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    /// Identity, API version and profile-dependent flags.
    pub app: AppSettings,
    /// Listener bind parameters.
    pub server: ServerSettings,
    /// Database connection parameters.
    pub database: DatabaseSettings,
    /// Remote error reporting.
    pub sentry: SentrySettings,
    /// Outbound call timeouts and retries.
    pub execution: ExecutionSettings,
    /// Internal logic parameters.
    pub internal: InternalSettings,
}

impl Settings {
    fn from_fields(profile: Profile, fields: &Fields<'_>) -> Result<Self, ConfigError> {
        Ok(Settings {
            app: AppSettings::from_fields(profile, fields)?,
            server: ServerSettings::from_fields(fields)?,
            database: DatabaseSettings::from_fields(fields)?,
            sentry: SentrySettings::from_fields(profile, fields)?,
            execution: ExecutionSettings::from_fields(fields)?,
            internal: InternalSettings::from_fields(fields)?,
        })
    }

    pub fn profile(&self) -> Profile {
        self.app.env
    }

    /// Socket address the listener binds to.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((self.server.host, self.server.port))
    }

    /// Versioned API prefix, e.g. `/api/v1`.
    pub fn api_prefix(&self) -> String {
        format!("/api/{}", self.app.api_version)
    }

    /// Prefix of the admin endpoints, e.g. `/api/v1/admin`.
    pub fn admin_prefix(&self) -> String {
        format!("{}/admin", self.api_prefix())
    }

    /// Pretty JSON with every secret masked.
    pub fn to_display_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Builder for a one-shot settings resolution.
///
/// Defaults to the process environment and the settings file it names.
/// Both can be replaced, which keeps resolution testable without touching
/// global state.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    settings_file: SettingsFile,
    env: Option<Layer>,
}

#[derive(Debug, Clone, Default)]
enum SettingsFile {
    /// `APP_SETTINGS_FILE`, else an optional `.env`.
    #[default]
    Discover,
    Path(PathBuf),
    Skip,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads this settings file instead of the one named by
    /// `APP_SETTINGS_FILE`. The file must exist.
    pub fn with_settings_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_file = SettingsFile::Path(path.into());
        self
    }

    /// Resolves from defaults and environment only.
    pub fn without_settings_file(mut self) -> Self {
        self.settings_file = SettingsFile::Skip;
        self
    }

    /// Uses these variables instead of the process environment.
    pub fn with_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.env = Some(sources::layer_from_pairs(vars));
        self
    }

    /// Resolves the profile, then every field.
    pub fn resolve(&self) -> Result<Settings, ConfigError> {
        let env_layer = match &self.env {
            Some(layer) => layer.clone(),
            None => sources::layer_from_pairs(env::vars()),
        };
        let file_layer = self.read_settings_file(&env_layer)?;
        let defaults = sources::defaults();

        // The selector follows the same precedence as every other field.
        let selector = sources::merge(&[&defaults, &file_layer, &env_layer]);
        let profile = match Fields::new(&selector).raw(PROFILE_VAR) {
            Some(raw) => raw.parse::<Profile>()?,
            None => Profile::default(),
        };

        let overrides = sources::layer_from_pairs(profile.overrides().iter().copied());
        let merged = sources::merge(&[&defaults, &overrides, &file_layer, &env_layer]);

        Settings::from_fields(profile, &Fields::new(&merged))
    }

    fn read_settings_file(&self, env_layer: &Layer) -> Result<Layer, ConfigError> {
        match &self.settings_file {
            SettingsFile::Path(path) => return sources::read_settings_file(path),
            SettingsFile::Skip => return Ok(Layer::new()),
            SettingsFile::Discover => {}
        }
        if let Some(path) = env_layer.get(SETTINGS_FILE_VAR) {
            return sources::read_settings_file(Path::new(path));
        }

        let default_path = Path::new(DEFAULT_SETTINGS_FILE);
        if default_path.is_file() {
            sources::read_settings_file(default_path)
        } else {
            Ok(Layer::new())
        }
    }
}

/// Resolves settings from the process environment and settings file.
pub fn resolve() -> Result<Settings, ConfigError> {
    Resolver::new().resolve()
}

static SETTINGS: OnceLock<Settings> = OnceLock::new();

/// Returns the process-wide settings, resolving them on first use.
pub fn get_settings() -> Result<&'static Settings, ConfigError> {
    if let Some(settings) = SETTINGS.get() {
        return Ok(settings);
    }
    let resolved = resolve()?;
    Ok(SETTINGS.get_or_init(|| resolved))
}

/// Installs already-resolved settings as the process-wide instance.
///
/// Returns the installed instance; if settings were installed before, that
/// earlier instance is kept and returned.
pub fn install(settings: Settings) -> &'static Settings {
    SETTINGS.get_or_init(|| settings)
}
