//! Field-level transforms used to wire data between pipeline steps.

mod draft;
mod engine;
pub mod template;
mod types;

pub use draft::{DraftBody, MultiExpressionForm, TransformDraft};
pub use engine::{TransformEngine, DEFAULT_MAX_NESTING_DEPTH};
pub use types::*;

use thiserror::Error;

/// Reasons a transform cannot be resolved into a concrete value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("template references variable '{name}' which has no binding")]
    UnresolvedVariable { name: String },

    #[error("variable '{name}' is declared more than once")]
    DuplicateVariable { name: String },

    #[error("malformed template at byte {position}: {reason}")]
    MalformedTemplate { position: usize, reason: String },

    #[error("transform nesting exceeds the maximum depth of {max}")]
    DepthExceeded { max: usize },

    #[error(
        "a value is required{}",
        .variable.as_ref().map(|name| format!(" for '{}'", name)).unwrap_or_default()
    )]
    MissingValue { variable: Option<String> },

    #[error("expression '{expression}' must be a JSONPath starting with '$'")]
    InvalidExpression { expression: String },
}

impl TransformError {
    /// Stable diagnostic code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            TransformError::UnresolvedVariable { .. } => "TRANSFORM-001",
            TransformError::DuplicateVariable { .. } => "TRANSFORM-002",
            TransformError::MalformedTemplate { .. } => "TRANSFORM-003",
            TransformError::DepthExceeded { .. } => "TRANSFORM-004",
            TransformError::MissingValue { .. } => "TRANSFORM-005",
            TransformError::InvalidExpression { .. } => "TRANSFORM-006",
        }
    }
}
