use crate::logging::layers::console::ConsoleOutput;
use crate::Result;
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::filter::Directive;

const DEFAULT_LEVEL: &str = "info";

/// `[logging]` section of searchflow.toml after env overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
    #[serde(default = "default_level")]
    pub default_level: String,
    #[serde(default)]
    pub enable_file: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub console_output: Option<ConsoleOutput>,
}

fn default_level() -> String {
    DEFAULT_LEVEL.to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            default_level: default_level(),
            enable_file: false,
            console_output: None,
        }
    }
}

impl LoggingConfig {
    /// Every comma-separated part of `default_level` must be a tracing directive.
    pub fn validate(&self) -> Result<()> {
        let level = self.default_level.trim();
        if level.is_empty() || level.chars().any(char::is_whitespace) {
            return Err(anyhow!(
                "logging.default_level must be a valid tracing directive"
            ));
        }
        for part in level.split(',') {
            Directive::from_str(part).map_err(|_| {
                anyhow!(
                    "logging.default_level must be a valid tracing directive, got '{}'",
                    part
                )
            })?;
        }

        if let Some(dir) = &self.log_dir {
            if dir.as_os_str().is_empty() {
                return Err(anyhow!("logging.log_dir cannot be empty"));
            }
        }
        Ok(())
    }
}
