//! Builds an `AppConfig` from the files in `config/` and the process environment.
//! Layers (later ones win): `base.toml`, `{environment}.toml`, `APP_*` variables, `MONGODB_URI`.
//! Gets initialized with `OnceLock` so it only needs to get loaded once.

mod error;
mod structs;

use std::{path::Path, sync::OnceLock};

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use tracing::info;

// Re-export config structs
pub use error::{ConfigError, ConfigResult};
pub use structs::{AppConfig, Environment, NetConfig, StoreBackend, StoreConfig};

/// The connection string of the document store is read from this variable.
pub const STORE_URI_ENV: &str = "MONGODB_URI";

/// Allocates a static `OnceLock` containing `AppConfig`.
/// Every caller after the first one gets a &'static ref to the same config.
/// Panics if the configuration can't be built.
pub fn get_or_init_config() -> &'static AppConfig {
    static CONFIG_INIT: OnceLock<AppConfig> = OnceLock::new();
    CONFIG_INIT.get_or_init(|| {
        info!(
            "{:<20} - Initializing the configuration",
            "get_or_init_config"
        );
        let base_path = std::env::current_dir()
            .unwrap_or_else(|er| panic!("Fatal Error: Failed to determine the current DIR: {er}"));
        let config_dir = base_path.join("config");

        let environment = Environment::from_env()
            .unwrap_or_else(|er| panic!("Fatal Error: Building config: {er}"));

        load_config(&config_dir, environment)
            .unwrap_or_else(|er| panic!("Fatal Error: Building config: {er}"))
    })
}

/// Merges all configuration layers found in `config_dir` for the given `environment`.
pub fn load_config(config_dir: &Path, environment: Environment) -> ConfigResult<AppConfig> {
    let environment_filename = format!("{}.toml", environment.as_ref());

    let config = Figment::new()
        .merge(Toml::file(config_dir.join("base.toml")))
        .merge(Toml::file(config_dir.join(environment_filename)))
        .merge(Env::prefixed("APP_").split("__"))
        .merge(
            Env::raw()
                .only(&[STORE_URI_ENV])
                .map(|_| "store_config.uri".into()),
        )
        .extract()?;

    Ok(config)
}
