use super::{ConfigError, ConfigErrorExt, ConfigSchema};
use config::{Config, Value, ValueKind};
use myproduct_domain::config::{ApiConfig, ApplicationProperties};
use myproduct_domain::constants::APPLICATION_PREFIX;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

/// A typed namespace of the settings source with a declared schema.
///
/// Implementors pair a `Deserialize` struct with the [`ConfigSchema`] describing its
/// keys. [`bind`] validates the namespace against the schema first, so a typo in the
/// settings file surfaces as [`ConfigError::UnknownField`] instead of being ignored.
pub trait ConfigurationProperties: DeserializeOwned {
    fn schema() -> ConfigSchema;
}

impl ConfigurationProperties for ApplicationProperties {
    fn schema() -> ConfigSchema {
        ConfigSchema::new(APPLICATION_PREFIX)
    }
}

/// Validates the namespace of `T` and deserializes it.
///
/// Absent namespaces bind to the schema defaults. Binding the same settings twice
/// yields equal values.
///
/// # Errors
/// Returns a validation variant of [`ConfigError`] when the namespace breaks the schema,
/// or [`ConfigError::Config`] when the validated values do not deserialize into `T`.
pub fn bind<T>(settings: &Config) -> Result<T, ConfigError>
where
    T: ConfigurationProperties,
{
    let schema = T::schema();
    let resolved = schema.bind(settings)?;
    debug!(prefix = schema.prefix(), keys = resolved.len(), "Resolved configuration properties");

    let bound = T::deserialize(Value::new(None, ValueKind::Table(resolved)))
        .context(format!("Binding [{}]", schema.prefix()))?;

    info!(prefix = schema.prefix(), "Configuration properties bound");
    Ok(bound)
}

/// Deserializes the framework sections and binds the `application` namespace strictly.
///
/// # Errors
/// Returns [`ConfigError`] if the framework sections are malformed or the application
/// namespace fails validation.
pub fn bind_api_config(settings: &Config) -> Result<ApiConfig, ConfigError> {
    let mut cfg: ApiConfig =
        settings.clone().try_deserialize().context("Deserializing server settings")?;
    cfg.application = bind::<ApplicationProperties>(settings)?;
    Ok(cfg)
}
