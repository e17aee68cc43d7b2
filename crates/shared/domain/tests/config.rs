use myproduct_domain::config::{
    ApiConfig, ApplicationProperties, LoggingConfig, ServerConfig, SslConfig,
};
use serde_json::json;

#[test]
fn config_defaults_are_sane() {
    let server = ServerConfig::default();
    assert_eq!(server.port, 8080);
    assert!(server.address.is_unspecified());
    assert!(server.ssl.is_none());

    let ssl = SslConfig::default();
    assert_eq!(ssl.cert, std::path::PathBuf::from("cert.pem"));

    let logging = LoggingConfig::default();
    assert_eq!(logging.level, "info");
    assert!(!logging.json);
    assert!(logging.directory.is_none());
}

#[test]
fn api_config_deserializes_framework_sections() {
    let raw = json!({
        "server": { "address": "127.0.0.1", "port": 9000 },
        "logging": { "level": "debug", "json": true }
    });

    let cfg: ApiConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.server.port, 9000);
    assert_eq!(cfg.logging.level, "debug");
    assert!(cfg.logging.json);
    assert_eq!(cfg.application, ApplicationProperties::default());
}

#[test]
fn api_config_never_reads_application_section() {
    let raw = json!({ "application": { "anything": 1 } });

    let cfg: ApiConfig = serde_json::from_value(raw).expect("application is skipped");
    assert_eq!(cfg.application, ApplicationProperties::default());
}

#[test]
fn application_properties_reject_unknown_fields() {
    assert!(serde_json::from_value::<ApplicationProperties>(json!({})).is_ok());

    let err = serde_json::from_value::<ApplicationProperties>(json!({ "unknown_key": "x" }))
        .expect_err("closed schema");
    assert!(err.to_string().contains("unknown_key"), "unexpected error: {err}");
}

#[test]
fn api_config_clones_share_until_mutated() {
    let original = ApiConfig::default();
    let mut copy = original.clone();
    copy.server.port = 1234;

    assert_eq!(original.server.port, 8080);
    assert_eq!(copy.server.port, 1234);
}
