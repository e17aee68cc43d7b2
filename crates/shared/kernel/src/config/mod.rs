//! Settings loading and strict property binding.
//!
//! The settings source is a layered [`Config`]: a required file (format detected from
//! the extension) overlaid with `MYPRODUCT__`-prefixed environment variables. Typed
//! namespaces are then bound from it with [`bind`], which rejects undeclared keys.

mod properties;
mod schema;

pub use config::{Config, FileFormat, Map, Value, ValueKind};
pub use properties::{ConfigurationProperties, bind, bind_api_config};
pub use schema::{ConfigSchema, FieldKind, FieldSpec, Requirement};

use config::{Case, Environment, File};
use myproduct_domain::constants::{DEFAULT_SETTINGS_FILE, ENV_PREFIX, ENV_SEPARATOR};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Errors raised while loading settings or binding them onto typed configuration.
#[myproduct_derive::app_error]
pub enum ConfigError {
    /// The settings source could not be read or deserialized.
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: ::config::ConfigError, context: Option<Cow<'static, str>> },

    /// Keys under a closed namespace that no field declares.
    #[error(
        "Unknown configuration keys under [{prefix}]{}: {}",
        format_context(.context),
        .keys.join(", ")
    )]
    UnknownField { prefix: String, keys: Vec<String>, context: Option<Cow<'static, str>> },

    #[error("Missing required configuration key '{key}'{}", format_context(.context))]
    MissingField { key: String, context: Option<Cow<'static, str>> },

    #[error(
        "Configuration key '{key}' expects {expected}, found {found}{}",
        format_context(.context)
    )]
    InvalidType {
        key: String,
        expected: &'static str,
        found: &'static str,
        context: Option<Cow<'static, str>>,
    },
}

impl ConfigError {
    /// `true` when the source was readable but its contents broke a schema.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::UnknownField { .. } | Self::MissingField { .. } | Self::InvalidType { .. }
        )
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX).separator(ENV_SEPARATOR).convert_case(Case::Snake)
}

/// Loads the layered settings source.
///
/// 1. **Base file**: `path`, or `server` in the working directory. The extension may be
///    omitted; any format supported by the `config` crate is detected.
/// 2. **Environment overrides**: variables prefixed with `MYPRODUCT__`, nested with `__`
///    (`MYPRODUCT__SERVER__PORT=9000` maps to `server.port`).
///
/// # Errors
/// Returns [`ConfigError::Config`] if the file is missing or malformed.
pub fn load_settings(path: Option<impl AsRef<Path>>) -> Result<Config, ConfigError> {
    let effective_path =
        path.map_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE), |p| p.as_ref().to_path_buf());

    info!("Loading settings from {}", effective_path.display());

    Config::builder()
        .add_source(File::from(effective_path.as_path()).required(true))
        .add_source(environment())
        .build()
        .context(format!("Failed to load settings from {}", effective_path.display()))
}

/// Builds a settings source from in-memory content, without environment overrides.
///
/// # Errors
/// Returns [`ConfigError::Config`] if `content` does not parse as `format`.
pub fn settings_from_str(content: &str, format: FileFormat) -> Result<Config, ConfigError> {
    Config::builder()
        .add_source(File::from_str(content, format))
        .build()
        .context("Failed to parse in-memory settings")
}

/// Loads settings and deserializes them into `T` without schema validation.
///
/// # Errors
/// Returns [`ConfigError::Config`] if the file is missing or does not match `T`.
///
/// # Example
/// ```rust,no_run
/// use myproduct_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct ToolConfig {
///     port: u16,
/// }
///
/// let cfg: ToolConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    load_settings(path)?.try_deserialize::<T>().context("Failed to deserialize config")
}
