use super::path::{FieldPath, PathSegment};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Nested editable form values addressed by [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormState {
    root: Value,
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}

impl FormState {
    pub fn new() -> Self {
        Self {
            root: Value::Object(Map::new()),
        }
    }

    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }

    pub fn into_value(self) -> Value {
        self.root
    }

    pub fn get(&self, path: &FieldPath) -> Option<&Value> {
        let mut current = &self.root;
        for segment in path.segments() {
            current = match segment {
                PathSegment::Key(key) => current.as_object()?.get(key)?,
                PathSegment::Index(index) => current.as_array()?.get(*index)?,
            };
        }
        Some(current)
    }

    pub fn get_mut(&mut self, path: &FieldPath) -> Option<&mut Value> {
        let mut current = &mut self.root;
        for segment in path.segments() {
            current = match segment {
                PathSegment::Key(key) => current.as_object_mut()?.get_mut(key)?,
                PathSegment::Index(index) => current.as_array_mut()?.get_mut(*index)?,
            };
        }
        Some(current)
    }

    /// Write `value` at `path`, creating intermediate objects and arrays.
    ///
    /// A non-container met along the way is replaced by the container the next
    /// segment needs; arrays are padded with `null` up to the index.
    pub fn set(&mut self, path: &FieldPath, value: Value) {
        let mut current = &mut self.root;
        for segment in path.segments() {
            current = match segment {
                PathSegment::Key(key) => {
                    if !current.is_object() {
                        *current = Value::Object(Map::new());
                    }
                    match current {
                        Value::Object(map) => map.entry(key.clone()).or_insert(Value::Null),
                        _ => unreachable!("replaced with an object above"),
                    }
                }
                PathSegment::Index(index) => {
                    if !current.is_array() {
                        *current = Value::Array(Vec::new());
                    }
                    match current {
                        Value::Array(items) => {
                            if items.len() <= *index {
                                items.resize(*index + 1, Value::Null);
                            }
                            &mut items[*index]
                        }
                        _ => unreachable!("replaced with an array above"),
                    }
                }
            };
        }
        *current = value;
    }

    pub fn remove(&mut self, path: &FieldPath) -> Option<Value> {
        let parent = path.parent()?;
        let container = self.get_mut(&parent)?;
        match (path.last()?, container) {
            (PathSegment::Key(key), Value::Object(map)) => map.remove(key),
            (PathSegment::Index(index), Value::Array(items)) if *index < items.len() => {
                Some(items.remove(*index))
            }
            _ => None,
        }
    }
}
