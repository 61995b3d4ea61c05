use serde::{Deserialize, Deserializer, Serialize};

/// Named transform template kinds a mapping value can be authored with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TransformType {
    /// A literal string.
    #[default]
    String,
    /// A reference to a document or model field.
    Field,
    /// A JSONPath expression evaluated against the document.
    Expression,
    /// A prompt-style template parametrized by nested variables.
    Template,
}

impl std::fmt::Display for TransformType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransformType::String => write!(f, "String"),
            TransformType::Field => write!(f, "Field"),
            TransformType::Expression => write!(f, "Expression"),
            TransformType::Template => write!(f, "Template"),
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Value side of a mapping entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    #[serde(default)]
    pub transform_type: TransformType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested_vars: Option<Vec<ExpressionVar>>,
}

impl Transform {
    pub fn new(transform_type: TransformType, value: impl Into<String>) -> Self {
        Self {
            transform_type,
            value: Some(value.into()),
            optional: false,
            nested_vars: None,
        }
    }

    /// A transform of the given type with no value yet.
    pub fn empty(transform_type: TransformType) -> Self {
        Self {
            transform_type,
            ..Default::default()
        }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self::new(TransformType::String, value)
    }

    pub fn field(value: impl Into<String>) -> Self {
        Self::new(TransformType::Field, value)
    }

    pub fn expression(value: impl Into<String>) -> Self {
        Self::new(TransformType::Expression, value)
    }

    pub fn template(value: impl Into<String>, vars: Vec<ExpressionVar>) -> Self {
        Self {
            transform_type: TransformType::Template,
            value: Some(value.into()),
            optional: false,
            nested_vars: Some(vars),
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Nested variables, treating an absent list as empty.
    pub fn vars(&self) -> &[ExpressionVar] {
        self.nested_vars.as_deref().unwrap_or(&[])
    }

    pub fn is_parametrized(&self) -> bool {
        !self.vars().is_empty()
    }

    /// True when the transform carries no usable value.
    pub fn is_blank(&self) -> bool {
        self.value.as_deref().map(str::trim).unwrap_or("").is_empty() && !self.is_parametrized()
    }
}

/// Binds a variable name used inside a template to a sub-transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionVar {
    pub name: String,
    #[serde(deserialize_with = "transform_or_expression")]
    pub transform: Transform,
}

impl ExpressionVar {
    pub fn new(name: impl Into<String>, transform: Transform) -> Self {
        Self {
            name: name.into(),
            transform,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TransformRepr {
    Full(Transform),
    Bare(String),
}

// Older documents persist a nested variable's transform as a bare expression string.
fn transform_or_expression<'de, D>(deserializer: D) -> Result<Transform, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match TransformRepr::deserialize(deserializer)? {
        TransformRepr::Full(transform) => transform,
        TransformRepr::Bare(expression) => Transform::expression(expression),
    })
}

/// One `{key, value}` row of an input or output map.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InputMapEntry {
    pub key: String,
    pub value: Transform,
}

impl InputMapEntry {
    pub fn new(key: impl Into<String>, value: Transform) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

pub type OutputMapEntry = InputMapEntry;
pub type InputMapFormValue = Vec<InputMapEntry>;
pub type OutputMapFormValue = Vec<OutputMapEntry>;
pub type InputMapArrayFormValue = Vec<InputMapFormValue>;
pub type OutputMapArrayFormValue = Vec<OutputMapFormValue>;

/// Plain string-to-string row used by `map` and `mapArray` fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MapEntry {
    pub key: String,
    pub value: String,
}

pub type MapFormValue = Vec<MapEntry>;
pub type MapArrayFormValue = Vec<MapFormValue>;
