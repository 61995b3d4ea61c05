use super::engine::TransformEngine;
use super::types::{ExpressionVar, OutputMapEntry, Transform, TransformType};
use super::TransformError;
use std::collections::HashSet;

/// Editable body of a transform as presented by the template and expression modals.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftBody {
    Empty,
    Text(String),
    Parametrized {
        template: String,
        vars: Vec<ExpressionVar>,
    },
}

/// A transform taken apart for editing.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformDraft {
    pub transform_type: TransformType,
    pub optional: bool,
    pub body: DraftBody,
}

impl TransformDraft {
    pub fn deconstruct(transform: &Transform) -> Self {
        let body = if transform.is_parametrized() {
            DraftBody::Parametrized {
                template: transform.value.clone().unwrap_or_default(),
                vars: transform.vars().to_vec(),
            }
        } else {
            match &transform.value {
                Some(text) => DraftBody::Text(text.clone()),
                None => DraftBody::Empty,
            }
        };
        Self {
            transform_type: transform.transform_type,
            optional: transform.optional,
            body,
        }
    }

    pub fn reconstruct(&self) -> Transform {
        let (value, nested_vars) = match &self.body {
            DraftBody::Empty => (None, None),
            DraftBody::Text(text) => (Some(text.clone()), None),
            DraftBody::Parametrized { template, vars } => {
                (Some(template.clone()), Some(vars.clone()))
            }
        };
        Transform {
            transform_type: self.transform_type,
            value,
            optional: self.optional,
            nested_vars,
        }
    }

    /// Add or replace a variable binding, turning the body into a template if needed.
    pub fn bind(&mut self, name: impl Into<String>, transform: Transform) {
        let name = name.into();
        let body = std::mem::replace(&mut self.body, DraftBody::Empty);
        self.body = match body {
            DraftBody::Empty => DraftBody::Parametrized {
                template: String::new(),
                vars: vec![ExpressionVar::new(name, transform)],
            },
            DraftBody::Text(template) => DraftBody::Parametrized {
                template,
                vars: vec![ExpressionVar::new(name, transform)],
            },
            DraftBody::Parametrized { template, mut vars } => {
                match vars.iter_mut().find(|var| var.name == name) {
                    Some(existing) => existing.transform = transform,
                    None => vars.push(ExpressionVar::new(name, transform)),
                }
                DraftBody::Parametrized { template, vars }
            }
        };
    }
}

/// A set of named expressions edited together and stored as output-map rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultiExpressionForm {
    pub expressions: Vec<ExpressionVar>,
}

impl MultiExpressionForm {
    pub fn from_output_map(entries: &[OutputMapEntry]) -> Self {
        Self {
            expressions: entries
                .iter()
                .map(|entry| ExpressionVar::new(entry.key.clone(), entry.value.clone()))
                .collect(),
        }
    }

    pub fn into_output_map(self) -> Vec<OutputMapEntry> {
        self.expressions
            .into_iter()
            .map(|var| OutputMapEntry::new(var.name, var.transform))
            .collect()
    }

    pub fn push(&mut self, name: impl Into<String>, expression: impl Into<String>) {
        self.expressions
            .push(ExpressionVar::new(name, Transform::expression(expression)));
    }

    /// Names must be present and unique; every expression must validate.
    pub fn validate(&self, engine: &TransformEngine) -> Result<(), TransformError> {
        let mut seen = HashSet::new();
        for var in &self.expressions {
            if var.name.trim().is_empty() {
                return Err(TransformError::MissingValue { variable: None });
            }
            if !seen.insert(var.name.as_str()) {
                return Err(TransformError::DuplicateVariable {
                    name: var.name.clone(),
                });
            }
            engine.validate(&var.transform)?;
        }
        Ok(())
    }
}
