use crate::core::transform::{InputMapArrayFormValue, MapArrayFormValue, MapFormValue};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// Closed set of value shapes a configurable field may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConfigFieldType {
    String,
    TextArea,
    Json,
    JsonArray,
    JsonString,
    JsonLines,
    Select,
    Model,
    Map,
    MapArray,
    Boolean,
    Number,
    InputMapArray,
    OutputMapArray,
}

impl ConfigFieldType {
    pub const ALL: [ConfigFieldType; 14] = [
        ConfigFieldType::String,
        ConfigFieldType::TextArea,
        ConfigFieldType::Json,
        ConfigFieldType::JsonArray,
        ConfigFieldType::JsonString,
        ConfigFieldType::JsonLines,
        ConfigFieldType::Select,
        ConfigFieldType::Model,
        ConfigFieldType::Map,
        ConfigFieldType::MapArray,
        ConfigFieldType::Boolean,
        ConfigFieldType::Number,
        ConfigFieldType::InputMapArray,
        ConfigFieldType::OutputMapArray,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigFieldType::String => "string",
            ConfigFieldType::TextArea => "textArea",
            ConfigFieldType::Json => "json",
            ConfigFieldType::JsonArray => "jsonArray",
            ConfigFieldType::JsonString => "jsonString",
            ConfigFieldType::JsonLines => "jsonLines",
            ConfigFieldType::Select => "select",
            ConfigFieldType::Model => "model",
            ConfigFieldType::Map => "map",
            ConfigFieldType::MapArray => "mapArray",
            ConfigFieldType::Boolean => "boolean",
            ConfigFieldType::Number => "number",
            ConfigFieldType::InputMapArray => "inputMapArray",
            ConfigFieldType::OutputMapArray => "outputMapArray",
        }
    }

    /// Canonical value used whenever a field of this type has no usable value.
    pub fn initial_value(&self) -> Value {
        match self {
            ConfigFieldType::String
            | ConfigFieldType::TextArea
            | ConfigFieldType::Select
            | ConfigFieldType::JsonString
            | ConfigFieldType::JsonLines => json!(""),
            ConfigFieldType::Json => json!({}),
            ConfigFieldType::JsonArray
            | ConfigFieldType::Map
            | ConfigFieldType::MapArray
            | ConfigFieldType::InputMapArray
            | ConfigFieldType::OutputMapArray => json!([]),
            ConfigFieldType::Model => json!({ "id": "" }),
            ConfigFieldType::Boolean => json!(false),
            ConfigFieldType::Number => json!(0),
        }
    }

    /// Whether `value` has the shape this type stores.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ConfigFieldType::String
            | ConfigFieldType::TextArea
            | ConfigFieldType::Select
            | ConfigFieldType::JsonString
            | ConfigFieldType::JsonLines => value.is_string(),
            ConfigFieldType::Json => value.is_object(),
            ConfigFieldType::JsonArray => value.is_array(),
            ConfigFieldType::Model => value
                .as_object()
                .and_then(|model| model.get("id"))
                .map(Value::is_string)
                .unwrap_or(false),
            ConfigFieldType::Map => serde_json::from_value::<MapFormValue>(value.clone()).is_ok(),
            ConfigFieldType::MapArray => {
                serde_json::from_value::<MapArrayFormValue>(value.clone()).is_ok()
            }
            ConfigFieldType::Boolean => value.is_boolean(),
            ConfigFieldType::Number => value.is_number(),
            ConfigFieldType::InputMapArray | ConfigFieldType::OutputMapArray => {
                serde_json::from_value::<InputMapArrayFormValue>(value.clone()).is_ok()
            }
        }
    }

    /// Map arrays persist as explicit empty arrays instead of being dropped.
    pub fn is_map_array(&self) -> bool {
        matches!(
            self,
            ConfigFieldType::MapArray
                | ConfigFieldType::InputMapArray
                | ConfigFieldType::OutputMapArray
        )
    }

    /// True when `value` carries nothing worth persisting for this type.
    pub fn is_empty_value(&self, value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::String(text) => text.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::Object(map) => match self {
                ConfigFieldType::Model => map
                    .get("id")
                    .and_then(Value::as_str)
                    .map(str::is_empty)
                    .unwrap_or(true),
                _ => map.is_empty(),
            },
            Value::Bool(_) | Value::Number(_) => false,
        }
    }
}

impl fmt::Display for ConfigFieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One configurable leaf of a processor or pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigField {
    #[serde(rename = "type")]
    pub field_type: ConfigFieldType,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(
        default,
        rename = "selectOptions",
        skip_serializing_if = "Option::is_none"
    )]
    pub select_options: Option<Vec<Value>>,
}

impl ConfigField {
    pub fn new(id: impl Into<String>, field_type: ConfigFieldType) -> Self {
        Self {
            field_type,
            id: id.into(),
            value: None,
            select_options: None,
        }
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_select_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select_options = Some(
            options
                .into_iter()
                .map(|option| Value::String(option.into()))
                .collect(),
        );
        self
    }

    /// The stored value if it matches the declared type.
    pub fn typed_value(&self) -> Option<&Value> {
        self.value
            .as_ref()
            .filter(|value| self.field_type.accepts(value))
    }

    /// The stored value, or the type's initial value when absent or malformed.
    pub fn value_or_initial(&self) -> Value {
        self.typed_value()
            .cloned()
            .unwrap_or_else(|| self.field_type.initial_value())
    }
}
