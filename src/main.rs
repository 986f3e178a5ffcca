use boilerplate::config::{self, Settings};
use boilerplate::logging::{self, Context, Logger};
use std::env;
use std::process;

fn parse_settings_path() -> Option<String> {
    env::args()
        .skip(1)
        .find_map(|arg| arg.strip_prefix("--settings=").map(str::to_string))
}

fn resolve_settings() -> Result<Settings, config::ConfigError> {
    let resolver = config::Resolver::new();
    match parse_settings_path() {
        Some(path) => resolver.with_settings_file(path).resolve(),
        None => resolver.resolve(),
    }
}

fn main() {
    let settings = match resolve_settings() {
        Ok(settings) => config::install(settings),
        Err(e) => {
            eprintln!("Failed to resolve settings: {}", e);
            process::exit(1);
        }
    };

    if env::args().any(|arg| arg == "--print-config") {
        match settings.to_display_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to render settings: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    logging::init_root_logger(settings);
    let log = match logging::get_module_logger(module_path!(), None) {
        Ok(log) => log,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            process::exit(1);
        }
    };

    let profile = settings.profile();
    log.info(
        "Settings resolved",
        Some(
            &Context::new()
                .with("app", settings.app.name.as_str())
                .with("bind_addr", settings.bind_addr().to_string())
                .with("api_prefix", settings.api_prefix())
                .with("hot_reload", profile.hot_reload()),
        ),
    );

    if let Ok(json) = settings.to_display_json() {
        log.debug(&format!("Effective settings: {}", json), None);
    }

    // Plain tracing events from dependencies share the root's sinks.
    tracing::info!(target: logging::EVENT_TARGET, "Bootstrap complete");
}
