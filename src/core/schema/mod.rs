//! Typed description of the configurable fields of each pipeline stage.

mod field;
pub mod processors;
mod workflow_config;

pub use field::{ConfigField, ConfigFieldType};
pub use workflow_config::{
    Config, FieldSlot, FieldSlotMut, IndexConfig, IngestConfig, ProcessorConfig,
    ProcessorContext, ProcessorType, ProcessorsConfig, SearchConfig, SearchIndexConfig,
    WorkflowConfig,
};

use serde_json::Value;

/// Canonical default for a field type.
pub fn initial_value(field_type: ConfigFieldType) -> Value {
    field_type.initial_value()
}
