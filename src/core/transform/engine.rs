use super::template::{parse_template, placeholder_names, render};
use super::types::{InputMapEntry, Transform, TransformType};
use super::TransformError;
use indexmap::IndexMap;
use tracing::debug;

/// Default cap on how deeply nested variables may be parametrized.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 8;

/// Resolves transforms with nested variables into concrete values.
#[derive(Debug, Clone)]
pub struct TransformEngine {
    max_depth: usize,
}

impl Default for TransformEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_NESTING_DEPTH)
    }
}

impl TransformEngine {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth: max_depth.max(1),
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Resolve a transform into a variable-free transform of the same type.
    ///
    /// A transform without nested variables is returned unchanged, so resolving an
    /// already resolved transform is a no-op. A template without variables must not
    /// reference any placeholder.
    pub fn resolve(&self, transform: &Transform) -> Result<Transform, TransformError> {
        if !transform.is_parametrized() {
            check_unbound(transform)?;
            return Ok(transform.clone());
        }
        let value = self.resolve_value(transform, 0)?;
        Ok(Transform {
            transform_type: transform.transform_type,
            value,
            optional: transform.optional,
            nested_vars: None,
        })
    }

    /// Check that a transform can be resolved and carries a value unless optional.
    pub fn validate(&self, transform: &Transform) -> Result<(), TransformError> {
        if transform.is_blank() {
            return if transform.optional {
                Ok(())
            } else {
                Err(TransformError::MissingValue { variable: None })
            };
        }
        if transform.transform_type == TransformType::Expression && !transform.is_parametrized() {
            check_expression(transform.value.as_deref().unwrap_or(""))?;
        }
        self.resolve(transform).map(|_| ())
    }

    /// Resolve every row of a mapping into `key -> value`, skipping blank optional rows.
    pub fn resolve_map(
        &self,
        entries: &[InputMapEntry],
    ) -> Result<IndexMap<String, String>, TransformError> {
        let mut out = IndexMap::new();
        for entry in entries {
            let resolved = self.resolve(&entry.value)?;
            match resolved.value {
                Some(value) if !value.is_empty() => {
                    out.insert(entry.key.clone(), value);
                }
                _ if resolved.optional => {}
                _ => {
                    return Err(TransformError::MissingValue {
                        variable: Some(entry.key.clone()),
                    })
                }
            }
        }
        Ok(out)
    }

    fn resolve_value(
        &self,
        transform: &Transform,
        depth: usize,
    ) -> Result<Option<String>, TransformError> {
        if !transform.is_parametrized() {
            check_unbound(transform)?;
            return Ok(transform.value.clone());
        }
        if depth >= self.max_depth {
            return Err(TransformError::DepthExceeded {
                max: self.max_depth,
            });
        }

        let template = transform.value.as_deref().unwrap_or("");
        let parts = parse_template(template)?;

        let mut bindings: IndexMap<String, String> = IndexMap::new();
        for var in transform.vars() {
            if bindings.contains_key(&var.name) {
                return Err(TransformError::DuplicateVariable {
                    name: var.name.clone(),
                });
            }
            let value = match self.resolve_value(&var.transform, depth + 1)? {
                Some(value) if !value.is_empty() => value,
                _ if var.transform.optional => String::new(),
                _ => {
                    return Err(TransformError::MissingValue {
                        variable: Some(var.name.clone()),
                    })
                }
            };
            bindings.insert(var.name.clone(), value);
        }

        let rendered = render(&parts, &bindings)?;
        debug!(
            depth,
            variables = bindings.len(),
            "resolved parametrized transform"
        );
        Ok(Some(rendered))
    }
}

fn check_unbound(transform: &Transform) -> Result<(), TransformError> {
    if transform.transform_type != TransformType::Template {
        return Ok(());
    }
    let template = transform.value.as_deref().unwrap_or("");
    match placeholder_names(template)?.first() {
        Some(name) => Err(TransformError::UnresolvedVariable {
            name: (*name).to_string(),
        }),
        None => Ok(()),
    }
}

fn check_expression(expression: &str) -> Result<(), TransformError> {
    if expression.trim_start().starts_with('$') {
        Ok(())
    } else {
        Err(TransformError::InvalidExpression {
            expression: expression.to_string(),
        })
    }
}
