#![allow(clippy::result_large_err)]

use super::{ConfigValidator, SearchflowConfig};
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use crate::logging::ConsoleOutput;
use std::env;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "searchflow.toml";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config from workspace root (workspace/searchflow.toml)
    /// Environment variables override config file values; the result is validated.
    pub fn load_from_workspace(workspace_path: &Path) -> Result<SearchflowConfig, AppError> {
        let config_path = workspace_path.join(CONFIG_FILE_NAME);
        let mut config = Self::load_from_file(&config_path)?.unwrap_or_default();

        Self::apply_env_overrides(&mut config);
        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Load config from specific file path
    /// Returns Ok(None) if file doesn't exist
    pub fn load_from_file(path: &Path) -> Result<Option<SearchflowConfig>, AppError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Failed to read config file {}: {}", path.display(), e),
            )
        })?;

        let config: SearchflowConfig = toml::from_str(&content).map_err(|e| {
            AppError::new(
                ErrorCategory::ConfigurationError,
                format!("Failed to parse config file {}: {}", path.display(), e),
            )
            .with_code("CONFIG-PARSE")
        })?;

        Ok(Some(config))
    }

    /// Apply environment variable overrides to the configuration
    /// Unparseable values are ignored.
    fn apply_env_overrides(config: &mut SearchflowConfig) {
        if let Ok(url) = env::var("SEARCHFLOW_BACKEND_URL") {
            config.backend.url = url;
        }

        if let Ok(timeout) = env::var("SEARCHFLOW_BACKEND_TIMEOUT_SECONDS") {
            if let Ok(timeout) = timeout.parse::<u64>() {
                config.backend.timeout_seconds = timeout;
            }
        }

        if let Ok(verbose) = env::var("SEARCHFLOW_BACKEND_VERBOSE_PREVIEW") {
            if let Ok(verbose) = verbose.parse::<bool>() {
                config.backend.verbose_preview = verbose;
            }
        }

        if let Ok(depth) = env::var("SEARCHFLOW_TRANSFORM_MAX_NESTING_DEPTH") {
            if let Ok(depth) = depth.parse::<usize>() {
                config.transform.max_nesting_depth = depth;
            }
        }

        if let Ok(schema_version) = env::var("SEARCHFLOW_UI_SCHEMA_VERSION") {
            config.ui.schema_version = schema_version;
        }

        if let Ok(level) = env::var("SEARCHFLOW_LOG_LEVEL") {
            config.logging.default_level = level;
        }

        if let Ok(console) = env::var("SEARCHFLOW_LOG_CONSOLE") {
            if let Ok(console) = console.parse::<ConsoleOutput>() {
                config.logging.console_output = Some(console);
            }
        }

        if let Ok(enable_file) = env::var("SEARCHFLOW_LOG_ENABLE_FILE") {
            if let Ok(enable_file) = enable_file.parse::<bool>() {
                config.logging.enable_file = enable_file;
            }
        }

        if let Ok(log_dir) = env::var("SEARCHFLOW_LOG_DIR") {
            config.logging.log_dir = Some(PathBuf::from(log_dir));
        }
    }

    /// Get documentation for supported environment variables
    pub fn env_var_documentation() -> &'static [&'static str] {
        &[
            "SEARCHFLOW_BACKEND_URL - Override backend URL (default: http://localhost:9200)",
            "SEARCHFLOW_BACKEND_TIMEOUT_SECONDS - Override request timeout (default: 30)",
            "SEARCHFLOW_BACKEND_VERBOSE_PREVIEW - Request per-processor preview results (true/false)",
            "SEARCHFLOW_TRANSFORM_MAX_NESTING_DEPTH - Override transform nesting limit (default: 8)",
            "SEARCHFLOW_UI_SCHEMA_VERSION - Override schema version stamped into templates",
            "SEARCHFLOW_LOG_LEVEL - Override default tracing level (default: info)",
            "SEARCHFLOW_LOG_CONSOLE - Console sink: stdout, stderr or none",
            "SEARCHFLOW_LOG_ENABLE_FILE - Write logs to a file (true/false, default: false)",
            "SEARCHFLOW_LOG_DIR - Override log directory (default: .searchflow/logs)",
        ]
    }
}
