mod settings;

use config::{Config, ConfigError, Environment, File};

use settings::PartialSettings;

pub use settings::{BrokerSettings, HttpSettings, LogSettings, ServerSettings, Settings};

/// Location of the optional configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/default";

/// Prefix of environment overrides, e.g. `COURIER_SERVER__PORT=9000`.
pub const ENV_PREFIX: &str = "COURIER";

/// Loads the configuration from the default file and environment variables.
pub fn load_config() -> Result<Settings, ConfigError> {
    load_config_from(DEFAULT_CONFIG_PATH)
}

/// Loads the configuration from `path` (extension optional, the file may be
/// absent) layered under `COURIER_*` environment variables, then merges the
/// result over `Settings::default()`.
pub fn load_config_from(path: &str) -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    let settings = partial.merge(Settings::default());
    if settings.broker.max_history_per_topic == Some(0) {
        return Err(ConfigError::Message(
            "broker.max_history_per_topic must be at least 1".to_string(),
        ));
    }

    Ok(settings)
}
