//! Backend-shaped pipeline bodies built from processor configs.

use crate::core::error::AppError;
use crate::core::schema::{ConfigField, ConfigFieldType, ProcessorConfig, ProcessorType};
use crate::core::transform::{InputMapArrayFormValue, MapFormValue, TransformEngine};
use crate::core::types::ErrorCategory;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IngestPipelineConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub processors: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchPipelineConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub request_processors: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub response_processors: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phase_results_processors: Vec<Value>,
}

/// Convert one processor into its `{ <processor name>: { ... } }` wire form.
pub fn processor_to_wire(
    processor: &ProcessorConfig,
    engine: &TransformEngine,
) -> Result<Value, AppError> {
    let body = match &processor.processor_type {
        ProcessorType::MlProcessor => ml_inference_body(processor, engine)?,
        ProcessorType::TextChunking => text_chunking_body(processor),
        ProcessorType::Normalization => normalization_body(processor),
        _ => generic_body(processor),
    };
    let mut wire = Map::new();
    wire.insert(
        wire_name(&processor.processor_type).to_string(),
        Value::Object(body),
    );
    Ok(Value::Object(wire))
}

/// Name the backend knows the processor by.
pub fn wire_name(processor_type: &ProcessorType) -> &str {
    match processor_type {
        ProcessorType::MlProcessor => "ml_inference",
        ProcessorType::Normalization => "normalization-processor",
        other => other.as_str(),
    }
}

/// Search-side processors that run between the query and fetch phases.
pub fn is_phase_results(processor_type: &ProcessorType) -> bool {
    matches!(processor_type, ProcessorType::Normalization)
}

fn present(field: &ConfigField) -> Option<&Value> {
    field
        .typed_value()
        .filter(|value| !field.field_type.is_empty_value(value))
}

// Plain fields as they appear on the wire, skipping empty ones.
fn generic_body(processor: &ProcessorConfig) -> Map<String, Value> {
    let mut body = Map::new();
    for field in processor.config.all_fields() {
        let Some(value) = present(field) else {
            continue;
        };
        let wire_value = match field.field_type {
            ConfigFieldType::Model => value.get("id").cloned().unwrap_or(Value::Null),
            ConfigFieldType::Map => map_to_object(value),
            _ => value.clone(),
        };
        let key = if field.field_type == ConfigFieldType::Model {
            "model_id".to_string()
        } else {
            field.id.clone()
        };
        body.insert(key, wire_value);
    }
    body
}

fn map_to_object(value: &Value) -> Value {
    let entries: MapFormValue = serde_json::from_value(value.clone()).unwrap_or_default();
    Value::Object(
        entries
            .into_iter()
            .filter(|entry| !entry.key.is_empty())
            .map(|entry| (entry.key, Value::String(entry.value)))
            .collect(),
    )
}

fn ml_inference_body(
    processor: &ProcessorConfig,
    engine: &TransformEngine,
) -> Result<Map<String, Value>, AppError> {
    let mut body = generic_body(processor);
    for id in ["input_map", "output_map"] {
        let Some(field) = processor.config.field(id) else {
            continue;
        };
        let mappings: InputMapArrayFormValue = field
            .typed_value()
            .and_then(|value| serde_json::from_value(value.clone()).ok())
            .unwrap_or_default();
        let mut wire = Vec::with_capacity(mappings.len());
        for entries in &mappings {
            let resolved = engine.resolve_map(entries).map_err(|err| {
                AppError::from(err)
                    .with_detail("processor", processor.id())
                    .with_detail("field", id)
            })?;
            wire.push(json!(resolved));
        }
        body.insert(id.to_string(), Value::Array(wire));
    }
    Ok(body)
}

fn text_chunking_body(processor: &ProcessorConfig) -> Map<String, Value> {
    let mut body = generic_body(processor);
    let algorithm = body
        .remove("algorithm")
        .and_then(|value| value.as_str().map(str::to_string))
        .unwrap_or_else(|| "fixed_token_length".to_string());
    let mut parameters = Map::new();
    let keys: &[&str] = match algorithm.as_str() {
        "delimiter" => &["delimiter"],
        _ => &["token_limit", "overlap_rate"],
    };
    for key in ["token_limit", "overlap_rate", "delimiter"] {
        if let Some(value) = body.remove(key) {
            if keys.contains(&key) {
                parameters.insert(key.to_string(), value);
            }
        }
    }
    let mut nested = Map::new();
    nested.insert(algorithm, Value::Object(parameters));
    body.insert("algorithm".to_string(), Value::Object(nested));
    body
}

fn normalization_body(processor: &ProcessorConfig) -> Map<String, Value> {
    let mut body = generic_body(processor);
    if let Some(technique) = body.remove("normalization_technique") {
        body.insert("normalization".to_string(), json!({ "technique": technique }));
    }
    let combination_technique = body.remove("combination_technique");
    let weights = body.remove("weights");
    if combination_technique.is_some() || weights.is_some() {
        let mut combination = Map::new();
        if let Some(technique) = combination_technique {
            combination.insert("technique".to_string(), technique);
        }
        if let Some(weights) = weights {
            combination.insert("parameters".to_string(), json!({ "weights": weights }));
        }
        body.insert("combination".to_string(), Value::Object(combination));
    }
    body
}

/// Body of an ingest pipeline built from the given processors.
pub fn ingest_pipeline(
    processors: &[ProcessorConfig],
    description: Option<String>,
    engine: &TransformEngine,
) -> Result<IngestPipelineConfig, AppError> {
    Ok(IngestPipelineConfig {
        description,
        processors: processors
            .iter()
            .map(|processor| processor_to_wire(processor, engine))
            .collect::<Result<_, _>>()?,
    })
}

/// Body of a search pipeline. Phase-results processors are split out of the response list.
pub fn search_pipeline(
    request: &[ProcessorConfig],
    response: &[ProcessorConfig],
    description: Option<String>,
    engine: &TransformEngine,
) -> Result<SearchPipelineConfig, AppError> {
    let mut pipeline = SearchPipelineConfig {
        description,
        ..Default::default()
    };
    for processor in request {
        let wire = processor_to_wire(processor, engine)?;
        if is_phase_results(&processor.processor_type) {
            pipeline.phase_results_processors.push(wire);
        } else {
            pipeline.request_processors.push(wire);
        }
    }
    for processor in response {
        let wire = processor_to_wire(processor, engine)?;
        if is_phase_results(&processor.processor_type) {
            pipeline.phase_results_processors.push(wire);
        } else {
            pipeline.response_processors.push(wire);
        }
    }
    Ok(pipeline)
}

/// Encode a pipeline or index body as the JSON string `configurations` expects.
pub fn to_configurations<T: Serialize>(body: &T) -> Result<String, AppError> {
    serde_json::to_string(body).map_err(|err| {
        AppError::new(
            ErrorCategory::SerializationError,
            format!("failed to encode configurations: {}", err),
        )
        .with_code("SERDE_JSON_ERROR")
    })
}
