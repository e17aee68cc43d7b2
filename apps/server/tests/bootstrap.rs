use myproduct_kernel::config::{ConfigError, FileFormat, settings_from_str};
use myproduct_kernel::domain::config::ApplicationProperties;
use myproduct_runtime::get_global_runtime;
use myproduct_server::Server;
use myproduct_testing::anyhow::{Context, Result};
use myproduct_testing::{ContextBootstrapError, ContextRoot, FullContext};
use std::sync::atomic::{AtomicUsize, Ordering};

const UNKNOWN_KEY_SETTINGS: &str = r#"
[server]
port = 18081

[application]
unknown_key = "value"
"#;

struct MisconfiguredApp;

impl ContextRoot for MisconfiguredApp {
    const NAME: &'static str = "misconfigured-server";
    type Context = Server;

    async fn boot() -> Result<Self::Context> {
        let settings = settings_from_str(UNKNOWN_KEY_SETTINGS, FileFormat::Toml)
            .context("inline settings")?;
        Server::builder().settings(settings).build().await
    }
}

static CASES_RUN: AtomicUsize = AtomicUsize::new(0);

#[test]
fn unknown_application_key_prevents_every_case() {
    let err = FullContext::<MisconfiguredApp>::suite("never_starts")
        .case("health", |_server| async move {
            CASES_RUN.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .run()
        .expect_err("bootstrap must fail");

    assert!(matches!(err, ContextBootstrapError::Bootstrap { .. }));
    assert!(err.to_string().contains("application.unknown_key"), "{err}");
    assert_eq!(CASES_RUN.load(Ordering::SeqCst), 0);
}

#[test]
fn build_rejects_unknown_application_keys() {
    let settings =
        settings_from_str(UNKNOWN_KEY_SETTINGS, FileFormat::Toml).expect("valid toml");
    let err = get_global_runtime()
        .block_on(Server::builder().settings(settings).build())
        .expect_err("unknown key");

    let config_err = err.downcast_ref::<ConfigError>().expect("config error in chain");
    assert!(matches!(config_err, ConfigError::UnknownField { .. }));
}

#[test]
fn build_accepts_empty_application_and_applies_port_override() {
    let settings = settings_from_str("[application]\n", FileFormat::Toml).expect("valid toml");
    let server = get_global_runtime()
        .block_on(Server::builder().settings(settings).port(18082).build())
        .expect("server builds");

    assert_eq!(server.state().config.server.port, 18082);
    assert_eq!(server.state().properties(), &ApplicationProperties::default());
}

#[test]
fn build_rejects_missing_ssl_files() {
    let dir = tempfile::tempdir().expect("temp dir");
    let settings = settings_from_str(
        &format!(
            "[server.ssl]\ncert = \"{}\"\nkey = \"{}\"\n",
            dir.path().join("cert.pem").display(),
            dir.path().join("key.pem").display()
        ),
        FileFormat::Toml,
    )
    .expect("valid toml");

    let err = get_global_runtime()
        .block_on(Server::builder().settings(settings).build())
        .expect_err("missing certificate");
    assert!(err.to_string().contains("SSL certificate not found"));
}
