#![allow(clippy::result_large_err)]

use super::SearchflowConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use url::Url;

pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration rules
    pub fn validate(config: &SearchflowConfig) -> Result<(), AppError> {
        let url = Url::parse(&config.backend.url).map_err(|e| {
            AppError::new(
                ErrorCategory::ConfigurationError,
                format!("backend.url '{}' is not a valid URL: {}", config.backend.url, e),
            )
            .with_code("CONFIG-BACKEND-URL")
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::new(
                ErrorCategory::ConfigurationError,
                format!("backend.url must use http or https, got '{}'", url.scheme()),
            )
            .with_code("CONFIG-BACKEND-URL"));
        }

        if config.backend.timeout_seconds == 0 {
            return Err(AppError::new(
                ErrorCategory::ConfigurationError,
                "backend.timeout_seconds must be at least 1",
            )
            .with_code("CONFIG-TIMEOUT"));
        }

        if config.transform.max_nesting_depth == 0 {
            return Err(AppError::new(
                ErrorCategory::ConfigurationError,
                "transform.max_nesting_depth must be at least 1",
            )
            .with_code("CONFIG-DEPTH"));
        }

        if config.ui.schema_version.trim().is_empty() {
            return Err(AppError::new(
                ErrorCategory::ConfigurationError,
                "ui.schema_version cannot be empty",
            )
            .with_code("CONFIG-SCHEMA-VERSION"));
        }

        config.logging.validate().map_err(|e| {
            AppError::new(ErrorCategory::ConfigurationError, e.to_string())
                .with_code("CONFIG-LOGGING")
        })?;

        Ok(())
    }
}
