use insta::assert_debug_snapshot;
use searchflow::core::config::loader::CONFIG_FILE_NAME;
use searchflow::core::config::{ConfigLoader, SearchflowConfig};
use searchflow::core::types::ErrorCategory;
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;

fn clear_searchflow_env() {
    for v in &[
        "SEARCHFLOW_BACKEND_URL",
        "SEARCHFLOW_BACKEND_TIMEOUT_SECONDS",
        "SEARCHFLOW_BACKEND_VERBOSE_PREVIEW",
        "SEARCHFLOW_TRANSFORM_MAX_NESTING_DEPTH",
        "SEARCHFLOW_UI_SCHEMA_VERSION",
        "SEARCHFLOW_LOG_LEVEL",
        "SEARCHFLOW_LOG_CONSOLE",
        "SEARCHFLOW_LOG_ENABLE_FILE",
        "SEARCHFLOW_LOG_DIR",
    ] {
        env::remove_var(v);
    }
}

/// Test integration of config loading with environment variables
#[test]
#[serial]
fn test_config_loading_integration() {
    clear_searchflow_env();
    let temp_dir = TempDir::new().unwrap();
    let workspace_path = temp_dir.path();

    let config_content = r#"
[backend]
url = "http://search.internal:9200"
timeout_seconds = 10
verbose_preview = true

[transform]
max_nesting_depth = 4

[ui]
schema_version = "1.1.0"

[logging]
default_level = "searchflow=debug,info"
enable_file = true
log_dir = "logs"
console_output = "stdout"
"#;

    fs::write(workspace_path.join(CONFIG_FILE_NAME), config_content).unwrap();

    let config = ConfigLoader::load_from_workspace(workspace_path).unwrap();

    assert_debug_snapshot!(config, @r###"
    SearchflowConfig {
        backend: BackendConfig {
            url: "http://search.internal:9200",
            timeout_seconds: 10,
            verbose_preview: true,
        },
        transform: TransformConfig {
            max_nesting_depth: 4,
        },
        ui: UiConfig {
            schema_version: "1.1.0",
        },
        logging: LoggingConfig {
            log_dir: Some(
                "logs",
            ),
            default_level: "searchflow=debug,info",
            enable_file: true,
            console_output: Some(
                Stdout,
            ),
        },
    }
    "###);
}

#[test]
#[serial]
fn test_env_overrides_file_values() {
    clear_searchflow_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(CONFIG_FILE_NAME),
        "[backend]\nurl = \"http://from-file:9200\"\ntimeout_seconds = 10\n",
    )
    .unwrap();

    env::set_var("SEARCHFLOW_BACKEND_URL", "https://from-env:9200");
    env::set_var("SEARCHFLOW_TRANSFORM_MAX_NESTING_DEPTH", "2");
    env::set_var("SEARCHFLOW_LOG_CONSOLE", "none");

    let config = ConfigLoader::load_from_workspace(temp_dir.path()).unwrap();
    assert_eq!(config.backend.url, "https://from-env:9200");
    assert_eq!(config.backend.timeout_seconds, 10);
    assert_eq!(config.transform.max_nesting_depth, 2);
    assert_eq!(
        config.logging.console_output,
        Some(searchflow::logging::ConsoleOutput::None)
    );

    clear_searchflow_env();
}

#[test]
#[serial]
fn test_missing_file_yields_defaults() {
    clear_searchflow_env();
    let temp_dir = TempDir::new().unwrap();
    let config = ConfigLoader::load_from_workspace(temp_dir.path()).unwrap();
    assert_eq!(config, SearchflowConfig::default());
}

#[test]
#[serial]
fn test_invalid_values_fail_validation() {
    clear_searchflow_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(CONFIG_FILE_NAME),
        "[backend]\nurl = \"ftp://search.internal\"\n",
    )
    .unwrap();

    let err = ConfigLoader::load_from_workspace(temp_dir.path()).unwrap_err();
    assert_eq!(err.code, "CONFIG-BACKEND-URL");
    assert_eq!(err.category, ErrorCategory::ConfigurationError);

    fs::write(
        temp_dir.path().join(CONFIG_FILE_NAME),
        "[transform]\nmax_nesting_depth = 0\n",
    )
    .unwrap();
    let err = ConfigLoader::load_from_workspace(temp_dir.path()).unwrap_err();
    assert_eq!(err.code, "CONFIG-DEPTH");
}

#[test]
#[serial]
fn test_env_value_can_invalidate_config() {
    clear_searchflow_env();
    let temp_dir = TempDir::new().unwrap();
    env::set_var("SEARCHFLOW_LOG_LEVEL", "not a level");

    let err = ConfigLoader::load_from_workspace(temp_dir.path()).unwrap_err();
    assert_eq!(err.code, "CONFIG-LOGGING");

    clear_searchflow_env();
}
