pub use crate::config::{ConfigError, ConfigErrorExt, ConfigurationProperties, bind, bind_api_config};
#[cfg(feature = "server")]
pub use crate::server::ApiState;
pub use myproduct_domain::config::{ApiConfig, ApplicationProperties};
