use aiva::cli::Args;
use aiva::config::{expand_env_var_in_string, Config, JsonConfig};
use aiva::theme::ColorScheme;
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_load_yaml_config() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("aiva.yaml");
    fs::write(
        &path,
        r#"
api:
  base_url: http://localhost:5000/api
  timeout: 5
identity:
  api_key: abc123
storage:
  data_dir: /tmp/aiva-test
ui:
  color_scheme: dark
"#,
    )
    .unwrap();

    let config = JsonConfig::load_from(&path).unwrap();

    assert_eq!(config.api.base_url.as_deref(), Some("http://localhost:5000/api"));
    assert_eq!(config.api.timeout_or_default(), 5);
    assert_eq!(config.identity.api_key.as_deref(), Some("abc123"));
    assert_eq!(config.storage.data_dir.as_deref(), Some("/tmp/aiva-test"));
    assert_eq!(config.ui.color_scheme, Some(ColorScheme::Dark));
}

#[test]
fn test_load_json_config_with_missing_sections() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("aiva.json");
    fs::write(&path, r#"{ "session": { "verbose": true } }"#).unwrap();

    let config = JsonConfig::load_from(&path).unwrap();

    assert_eq!(config.session.verbose, Some(true));
    assert_eq!(
        config.api.base_url_or_default(),
        "https://aiva-backend-woad.vercel.app/api"
    );
    assert_eq!(config.api.timeout_or_default(), 30);
}

#[test]
fn test_malformed_config_names_the_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("aiva.json");
    fs::write(&path, "{ not json").unwrap();

    let err = JsonConfig::load_from(&path).unwrap_err();

    assert!(format!("{:#}", err).contains("aiva.json"));
}

#[test]
fn test_cli_args_take_precedence() {
    let args = Args::parse_from([
        "aiva",
        "--api-base-url",
        "http://cli.example/api/",
        "--data-dir",
        "/tmp/from-cli",
        "status",
    ]);
    let json: JsonConfig = serde_json::from_str(
        r#"{
            "api": { "base_url": "http://file.example/api" },
            "storage": { "data_dir": "/tmp/from-file" }
        }"#,
    )
    .unwrap();

    let config = Config::resolve(&args, json).unwrap();

    assert_eq!(config.api_base_url, "http://cli.example/api");
    assert_eq!(config.data_dir, PathBuf::from("/tmp/from-cli"));
}

#[test]
fn test_missing_identity_key_is_reported() {
    let args = Args::parse_from(["aiva", "--data-dir", "/tmp/aiva", "status"]);
    let mut config = Config::resolve(&args, JsonConfig::default()).unwrap();
    config.identity_api_key = None;

    let err = config.firebase_settings().unwrap_err();

    assert!(err.contains("AIVA_FIREBASE_API_KEY"));
}

#[test]
fn test_expand_env_var_in_string() {
    std::env::set_var("AIVA_TEST_EXPAND_KEY", "secret");

    assert_eq!(
        expand_env_var_in_string("key-${AIVA_TEST_EXPAND_KEY}"),
        "key-secret"
    );
    assert_eq!(
        expand_env_var_in_string("${AIVA_TEST_UNSET_VAR_XYZ}"),
        "${AIVA_TEST_UNSET_VAR_XYZ}"
    );
}
