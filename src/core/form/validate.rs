use super::path::FieldPath;
use super::state::FormState;
use crate::core::schema::{ConfigField, ConfigFieldType, WorkflowConfig};
use crate::core::transform::{InputMapArrayFormValue, TransformEngine};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A schema validation problem attached to one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub path: FieldPath,
    pub message: String,
}

impl FieldError {
    pub fn new(path: FieldPath, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Validate every field of the form. Problems are collected, never fatal.
pub fn validate_form(
    config: &WorkflowConfig,
    state: &FormState,
    engine: &TransformEngine,
) -> Vec<FieldError> {
    let mut errors = Vec::new();
    for slot in config.field_slots() {
        let value = state
            .get(&slot.path)
            .cloned()
            .unwrap_or_else(|| slot.field.field_type.initial_value());
        errors.extend(validate_field(&slot.path, slot.field, slot.optional, &value, engine));
    }
    errors
}

/// Check one field value against its declared type and options.
pub fn validate_field(
    path: &FieldPath,
    field: &ConfigField,
    optional: bool,
    value: &Value,
    engine: &TransformEngine,
) -> Vec<FieldError> {
    let field_type = field.field_type;
    if !field_type.accepts(value) {
        return vec![FieldError::new(
            path.clone(),
            format!("expected a {} value", field_type),
        )];
    }

    let mut errors = Vec::new();
    match field_type {
        ConfigFieldType::JsonString => {
            let text = value.as_str().unwrap_or_default();
            if !text.trim().is_empty() {
                if let Err(err) = serde_json::from_str::<Value>(text) {
                    errors.push(FieldError::new(path.clone(), format!("invalid JSON: {}", err)));
                }
            }
        }
        ConfigFieldType::JsonLines => {
            let text = value.as_str().unwrap_or_default();
            for (line_no, line) in text.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                if let Err(err) = serde_json::from_str::<Value>(line) {
                    errors.push(FieldError::new(
                        path.clone(),
                        format!("invalid JSON on line {}: {}", line_no + 1, err),
                    ));
                }
            }
        }
        ConfigFieldType::Select => {
            let selected = value.as_str().unwrap_or_default();
            if let Some(options) = &field.select_options {
                if !selected.is_empty() && !options.iter().any(|option| option == value) {
                    errors.push(FieldError::new(
                        path.clone(),
                        format!("'{}' is not one of the available options", selected),
                    ));
                }
            }
        }
        ConfigFieldType::Model => {
            if !optional && field_type.is_empty_value(value) {
                errors.push(FieldError::new(path.clone(), "a model is required"));
            }
        }
        ConfigFieldType::InputMapArray | ConfigFieldType::OutputMapArray => {
            let mappings: InputMapArrayFormValue =
                serde_json::from_value(value.clone()).unwrap_or_default();
            for (outer, entries) in mappings.iter().enumerate() {
                for (row, entry) in entries.iter().enumerate() {
                    let entry_path = path.clone().index(outer).index(row);
                    if entry.key.trim().is_empty() {
                        errors.push(FieldError::new(entry_path.clone().key("key"), "key is required"));
                    }
                    if let Err(err) = engine.validate(&entry.value) {
                        errors.push(FieldError::new(entry_path.key("value"), err.to_string()));
                    }
                }
            }
        }
        _ => {}
    }
    errors
}
