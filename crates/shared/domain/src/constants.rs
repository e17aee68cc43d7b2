/// Namespace holding the product-specific properties in the settings source.
pub const APPLICATION_PREFIX: &str = "application";

/// Prefix for environment overrides (`MYPRODUCT__SERVER__PORT=9000`).
pub const ENV_PREFIX: &str = "MYPRODUCT";

/// Separator between nested keys in environment overrides.
pub const ENV_SEPARATOR: &str = "__";

/// Settings file loaded when no explicit path is given (extension is detected).
pub const DEFAULT_SETTINGS_FILE: &str = "server";

/// `OpenAPI` tag for infrastructure endpoints.
pub const SYSTEM_TAG: &str = "System";
