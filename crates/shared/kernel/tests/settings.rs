use myproduct_kernel::config::{ConfigError, bind_api_config, load_settings};
use std::fs;
use tempfile::tempdir;

fn write_settings(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("server.toml");
    fs::write(&path, content).expect("write settings");
    (dir, path)
}

#[test]
fn server_settings_bind_from_file() {
    let (_dir, path) = write_settings(
        r#"
[server]
address = "127.0.0.1"
port = 9443

[logging]
level = "warn"
json = true

[application]
"#,
    );

    let settings = load_settings(Some(&path)).expect("settings load");
    let cfg = bind_api_config(&settings).expect("settings bind");

    assert_eq!(cfg.server.address.to_string(), "127.0.0.1");
    assert_eq!(cfg.server.port, 9443);
    assert!(cfg.server.ssl.is_none());
    assert_eq!(cfg.logging.level, "warn");
    assert!(cfg.logging.json);
}

#[test]
fn file_without_application_section_binds() {
    let (_dir, path) = write_settings("[server]\nport = 8081\n");

    let settings = load_settings(Some(&path)).expect("settings load");
    let cfg = bind_api_config(&settings).expect("settings bind");
    assert_eq!(cfg.server.port, 8081);
}

#[test]
fn unknown_application_key_in_file_fails_startup() {
    let (_dir, path) = write_settings("[application]\nunknown_key = \"value\"\n");

    let settings = load_settings(Some(&path)).expect("settings load");
    let err = bind_api_config(&settings).expect_err("unknown key");

    assert!(err.is_validation());
    match err {
        ConfigError::UnknownField { prefix, keys, .. } => {
            assert_eq!(prefix, "application");
            assert_eq!(keys, vec!["application.unknown_key".to_owned()]);
        },
        other => panic!("expected UnknownField, got {other:?}"),
    }
}

#[test]
fn malformed_framework_section_is_a_source_error() {
    let (_dir, path) = write_settings("[server]\nport = \"not-a-port\"\n");

    let settings = load_settings(Some(&path)).expect("settings load");
    let err = bind_api_config(&settings).expect_err("bad port");
    assert!(!err.is_validation());
}
