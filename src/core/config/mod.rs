use crate::core::template::DEFAULT_SCHEMA_VERSION;
use crate::core::transform::DEFAULT_MAX_NESTING_DEPTH;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

/// Main searchflow configuration loaded from searchflow.toml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SearchflowConfig {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub transform: TransformConfig,

    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Search backend connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_backend_url")]
    pub url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Ask the backend for per-processor results when previewing
    #[serde(default)]
    pub verbose_preview: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformConfig {
    #[serde(default = "default_max_nesting_depth")]
    pub max_nesting_depth: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Schema version stamped into built templates
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
}

fn default_backend_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_max_nesting_depth() -> usize {
    DEFAULT_MAX_NESTING_DEPTH
}

fn default_schema_version() -> String {
    DEFAULT_SCHEMA_VERSION.to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig {
            url: default_backend_url(),
            timeout_seconds: default_timeout_seconds(),
            verbose_preview: false,
        }
    }
}

impl Default for TransformConfig {
    fn default() -> Self {
        TransformConfig {
            max_nesting_depth: default_max_nesting_depth(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            schema_version: default_schema_version(),
        }
    }
}


pub mod loader;
pub mod validation;

pub use loader::ConfigLoader;
pub use validation::ConfigValidator;
