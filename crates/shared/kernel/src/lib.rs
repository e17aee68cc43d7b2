//! Kernel utilities shared by the server and its tooling.
//!
//! ## Settings and properties
//! Settings are loaded from a file layered with `MYPRODUCT__` environment overrides,
//! then typed namespaces are bound against a closed schema:
//! ```rust
//! use myproduct_kernel::config::{FileFormat, bind_api_config, settings_from_str};
//!
//! let settings = settings_from_str("[server]\nport = 9000\n", FileFormat::Toml).unwrap();
//! let cfg = bind_api_config(&settings).unwrap();
//! assert_eq!(cfg.server.port, 9000);
//!
//! let strict = settings_from_str("[application]\ntypo = 1\n", FileFormat::Toml).unwrap();
//! assert!(bind_api_config(&strict).is_err());
//! ```
pub mod config;
pub mod prelude;
#[cfg(feature = "server")]
pub mod server;

pub use myproduct_domain as domain;
