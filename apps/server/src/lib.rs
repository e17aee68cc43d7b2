//! # My MVP Product 007 Server
//!
//! An `Axum` web server whose `application` settings namespace is bound strictly:
//! any undeclared key under `[application]` aborts startup.
//!
//! ## Example
//! ```no_run
//! use myproduct_kernel::config::load_settings;
//! use myproduct_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder()
//!         .settings(load_settings(Some("server"))?)
//!         .port(4583)
//!         .build()
//!         .await?
//!         .run()
//!         .await
//! }
//! ```

mod router;

use anyhow::{Context, Result};
use axum::Router;
use axum_server::Handle;
use myproduct_kernel::config::{Config, bind_api_config, load_settings};
use myproduct_kernel::domain::config::{ApiConfig, LoggingConfig};
use myproduct_kernel::server::ApiState;
use myproduct_logger::Logger;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Bound configuration and the installed logger, produced by [`startup`].
#[derive(Debug)]
pub struct Startup {
    pub config: ApiConfig,
    /// Keep alive for the lifetime of the process.
    pub logger: Logger,
}

/// Loads and binds the settings at `path`, then installs the logger from `[logging]`.
///
/// Records emitted before the logger exists are dropped, so the settings path is
/// logged once it is installed.
///
/// # Errors
/// Returns an error if the settings cannot be read or bound, or the logger fails to start.
pub fn startup(path: impl AsRef<Path>) -> Result<Startup> {
    let path = path.as_ref();
    let settings = load_settings(Some(path)).context("Failed to read settings")?;
    let config = bind_api_config(&settings).context("Critical: Configuration is malformed")?;
    let logger = init_logger(&config.logging)?;

    info!(
        path = %path.display(),
        address = %config.server.address,
        port = config.server.port,
        "Settings loaded"
    );
    Ok(Startup { config, logger })
}

fn init_logger(logging: &LoggingConfig) -> Result<Logger> {
    let builder = Logger::builder().name(env!("CARGO_PKG_NAME")).level_str(&logging.level)?;
    let builder = match &logging.filter {
        Some(filter) => builder.env_filter(filter),
        None => builder,
    };
    let logger = match &logging.directory {
        Some(directory) => builder.path(directory).json(logging.json).init()?,
        None => builder.init()?,
    };
    Ok(logger)
}

/// A fluent builder for configuring and initializing the [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: ApiConfig,
    settings: Option<Config>,
    port: Option<u16>,
}

impl ServerBuilder {
    /// Uses an already bound configuration.
    pub fn config(mut self, cfg: ApiConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Binds the configuration from a settings source during [`ServerBuilder::build`].
    ///
    /// Takes precedence over [`ServerBuilder::config`].
    pub fn settings(mut self, settings: Config) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Overrides the listening port after binding.
    pub const fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    fn validate_ssl_config(cfg: &ApiConfig) -> Result<()> {
        if let Some(ssl) = &cfg.server.ssl {
            if !ssl.cert.exists() {
                anyhow::bail!("SSL certificate not found at: {}", ssl.cert.display());
            }
            if !ssl.key.exists() {
                anyhow::bail!("SSL key not found at: {}", ssl.key.display());
            }

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let metadata = ssl.key.metadata()?;
                if metadata.permissions().mode() & 0o077 != 0 {
                    tracing::warn!(
                        "SECURITY: SSL Private Key {} has insecure permissions (should be 600)",
                        ssl.key.display()
                    );
                }
            }
        }
        Ok(())
    }

    /// Consumes the builder and initializes the server.
    ///
    /// # Process
    /// 1. Binds the settings source, if one was given, rejecting unknown `application` keys
    /// 2. Applies the port override
    /// 3. Validates SSL files
    /// 4. Constructs application state and the router
    ///
    /// # Errors
    /// Returns an error if:
    /// * The settings fail to bind (malformed sections, unknown application keys)
    /// * SSL certificate/key files cannot be found
    /// * Application state cannot be assembled
    pub async fn build(self) -> Result<Server> {
        let mut cfg = match &self.settings {
            Some(settings) => {
                bind_api_config(settings).context("Critical: Configuration is malformed")?
            },
            None => self.cfg,
        };
        if let Some(port) = self.port {
            cfg.server.port = port;
        }

        Self::validate_ssl_config(&cfg)?;

        let address = SocketAddr::new(cfg.server.address, cfg.server.port);
        info!(address = %address, "Initializing server");

        let state =
            ApiState::builder().config(cfg).build().context("Failed to finalize API state")?;
        let router = router::init(state.clone());

        Ok(Server { state, router })
    }
}

/// A fully initialized server instance ready to run.
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    state: ApiState,
    router: Router,
}

impl Server {
    /// Returns a new [`ServerBuilder`] to configure the server.
    ///
    /// # Examples
    /// ```no_run
    /// # use myproduct_server::Server;
    /// # async fn example() -> anyhow::Result<()> {
    /// let server = Server::builder()
    ///     .port(4583)
    ///     .build()
    ///     .await?;
    ///
    /// server.run().await
    /// # }
    /// ```
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Starts the server and runs until the shutdown signal is received.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the configured address
    /// or if SSL/TLS setup fails.
    pub async fn run(self) -> Result<()> {
        let cfg = self.state.config.clone();
        let address = SocketAddr::new(cfg.server.address, cfg.server.port);

        info!(
            address = %address,
            ssl = cfg.server.ssl.is_some(),
            "Starting server"
        );

        let handle = Handle::<SocketAddr>::new();
        let shutdown_handle = handle.clone();

        tokio::spawn(async move {
            if let Err(e) = shutdown_signal().await {
                error!("Error while waiting for shutdown signal: {e}");
                return;
            }
            info!("Shutdown signal received, starting graceful shutdown...");
            shutdown_handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        });

        if let Some(ssl_config) = &cfg.server.ssl {
            info!("Starting HTTPS server on https://{address}");

            let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
                &ssl_config.cert,
                &ssl_config.key,
            )
            .await
            .context("Failed to load SSL/TLS certificates")?;

            axum_server::bind_rustls(address, tls_config)
                .handle(handle)
                .serve(self.router.into_make_service())
                .await
                .context("HTTPS server failed")?;
        } else {
            info!("Starting HTTP server on http://{address}");

            axum_server::bind(address)
                .handle(handle)
                .serve(self.router.into_make_service())
                .await
                .context("HTTP server failed")?;
        }

        info!("Server shutdown complete");
        Ok(())
    }

    /// Returns a reference to the application state.
    #[must_use]
    pub const fn state(&self) -> &ApiState {
        &self.state
    }

    /// A clone of the fully layered router, for in-process requests.
    #[must_use]
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Listens for shutdown signals (Ctrl+C, SIGTERM).
async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("Failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        res = ctrl_c => {
            res.context("Ctrl+C signal received")?;
        },
        res = terminate => {
            res.context("SIGTERM signal received")?;
        },
    }

    Ok(())
}
