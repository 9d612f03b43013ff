use std::env;
use std::fs;
use tempfile::TempDir;

/// Test loading configuration from YAML file
#[test]
fn test_load_yaml_config() {
    let yaml = r#"
access_key: AKTEST
secret_key: secrettest
region: us-west-2
bucket: test-bucket
base_url: "http://127.0.0.1:9000/"
"#;

    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("objstore.yaml");
    fs::write(&config_path, yaml).unwrap();

    let config = objstore::config::load_from_yaml(&config_path).unwrap();

    assert_eq!(config.access_key(), "AKTEST");
    assert_eq!(config.region(), Some("us-west-2"));
    assert_eq!(config.default_bucket(), Some("test-bucket"));
    // Trailing slash is stripped
    assert_eq!(config.base_url(), "http://127.0.0.1:9000");
}

/// Test default values
#[test]
fn test_default_values() {
    let yaml = r#"
access_key: key
secret_key: secret
"#;

    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("objstore.yaml");
    fs::write(&config_path, yaml).unwrap();

    let config = objstore::config::load_config(config_path.to_str()).unwrap();

    assert_eq!(config.base_url(), objstore::config::DEFAULT_BASE_URL);
    assert_eq!(config.region(), None);
    assert_eq!(config.default_bucket(), None);
}

/// Missing credentials surface the construction error through the loader
#[test]
fn test_yaml_without_credentials() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("objstore.yaml");
    fs::write(&config_path, "access_key: only-access\nregion: eu\n").unwrap();

    let err = objstore::config::load_from_yaml(&config_path).unwrap_err();
    let chain = format!("{:#}", err);
    assert!(chain.contains("Access key and secret key are required."));
}

#[test]
fn test_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let err = objstore::config::load_from_yaml(temp_dir.path().join("absent.yaml")).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn test_malformed_yaml() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("objstore.yaml");
    fs::write(&config_path, "access_key: [unterminated\n").unwrap();

    let err = objstore::config::load_from_yaml(&config_path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse YAML configuration"));
}

/// Environment loading. Kept in one test: the process environment is shared
/// between test threads.
#[test]
fn test_load_env_config() {
    const VARS: [&str; 5] = [
        "OBJSTORE_ACCESS_KEY",
        "OBJSTORE_SECRET_KEY",
        "OBJSTORE_REGION",
        "OBJSTORE_BUCKET",
        "OBJSTORE_BASE_URL",
    ];

    // Save original env vars
    let originals: Vec<(&str, Option<String>)> =
        VARS.iter().map(|k| (*k, env::var(k).ok())).collect();

    env::set_var("OBJSTORE_ACCESS_KEY", "env_key");
    env::set_var("OBJSTORE_SECRET_KEY", "env_secret");
    env::set_var("OBJSTORE_REGION", "eu-west-1");
    env::set_var("OBJSTORE_BUCKET", "env-bucket");
    env::remove_var("OBJSTORE_BASE_URL");

    let config = objstore::config::load_from_env().unwrap();
    assert_eq!(config.access_key(), "env_key");
    assert_eq!(config.region(), Some("eu-west-1"));
    assert_eq!(config.default_bucket(), Some("env-bucket"));
    assert_eq!(config.base_url(), objstore::config::DEFAULT_BASE_URL);

    // The env loader is what load_config falls back to
    let config = objstore::config::load_config(None).unwrap();
    assert_eq!(config.access_key(), "env_key");

    env::set_var("OBJSTORE_BASE_URL", "http://localhost:8080");
    let config = objstore::config::load_from_env().unwrap();
    assert_eq!(config.base_url(), "http://localhost:8080");

    env::remove_var("OBJSTORE_SECRET_KEY");
    let err = objstore::config::load_from_env().unwrap_err();
    assert!(err.to_string().contains("OBJSTORE_SECRET_KEY"));

    env::set_var("OBJSTORE_SECRET_KEY", "");
    let err = objstore::config::load_from_env().unwrap_err();
    assert!(format!("{:#}", err).contains("Access key and secret key are required."));

    // Restore original env vars
    for (key, value) in originals {
        cleanup_env(key, value);
    }
}

/// Helper function to cleanup environment variables
fn cleanup_env(key: &str, orig_val: Option<String>) {
    match orig_val {
        Some(val) => env::set_var(key, val),
        None => env::remove_var(key),
    }
}
