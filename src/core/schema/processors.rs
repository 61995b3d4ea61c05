//! Built-in processor configs in the shape the editor offers them.

use super::field::{ConfigField, ConfigFieldType};
use super::workflow_config::{Config, ProcessorConfig, ProcessorType};
use serde_json::json;

pub const CHUNKING_ALGORITHMS: [&str; 2] = ["fixed_token_length", "delimiter"];
pub const NORMALIZATION_TECHNIQUES: [&str; 2] = ["min_max", "l2"];
pub const COMBINATION_TECHNIQUES: [&str; 3] =
    ["arithmetic_mean", "geometric_mean", "harmonic_mean"];

fn field(id: &str, field_type: ConfigFieldType) -> ConfigField {
    ConfigField::new(id, field_type)
}

fn common_optional() -> Vec<ConfigField> {
    vec![
        field("tag", ConfigFieldType::String),
        field("description", ConfigFieldType::String),
    ]
}

fn build(
    processor_type: ProcessorType,
    id: &str,
    name: &str,
    fields: Vec<ConfigField>,
    mut optional_fields: Vec<ConfigField>,
) -> ProcessorConfig {
    optional_fields.extend(common_optional());
    ProcessorConfig {
        processor_type,
        config: Config {
            id: id.to_string(),
            name: name.to_string(),
            fields,
            optional_fields,
        },
    }
}

impl ProcessorConfig {
    /// ML inference: a model reference with per-prediction input and output maps.
    pub fn ml_inference(id: &str) -> Self {
        build(
            ProcessorType::MlProcessor,
            id,
            "ML Inference Processor",
            vec![
                field("model", ConfigFieldType::Model),
                field("input_map", ConfigFieldType::InputMapArray),
                field("output_map", ConfigFieldType::OutputMapArray),
            ],
            vec![
                field("model_config", ConfigFieldType::Json),
                field("full_response_path", ConfigFieldType::Boolean),
                field("ignore_missing", ConfigFieldType::Boolean),
                field("ignore_failure", ConfigFieldType::Boolean),
                field("max_prediction_tasks", ConfigFieldType::Number).with_value(json!(10)),
            ],
        )
    }

    pub fn text_chunking(id: &str) -> Self {
        build(
            ProcessorType::TextChunking,
            id,
            "Text Chunking Processor",
            vec![field("field_map", ConfigFieldType::Map)],
            vec![
                field("algorithm", ConfigFieldType::Select)
                    .with_value(json!("fixed_token_length"))
                    .with_select_options(CHUNKING_ALGORITHMS),
                field("token_limit", ConfigFieldType::Number).with_value(json!(384)),
                field("overlap_rate", ConfigFieldType::Number).with_value(json!(0.0)),
                field("delimiter", ConfigFieldType::String),
            ],
        )
    }

    pub fn normalization(id: &str) -> Self {
        build(
            ProcessorType::Normalization,
            id,
            "Normalization Processor",
            vec![],
            vec![
                field("normalization_technique", ConfigFieldType::Select)
                    .with_select_options(NORMALIZATION_TECHNIQUES),
                field("combination_technique", ConfigFieldType::Select)
                    .with_select_options(COMBINATION_TECHNIQUES),
                field("weights", ConfigFieldType::JsonArray),
            ],
        )
    }

    pub fn split(id: &str) -> Self {
        build(
            ProcessorType::Split,
            id,
            "Split Processor",
            vec![
                field("field", ConfigFieldType::String),
                field("separator", ConfigFieldType::String),
            ],
            vec![
                field("preserve_trailing", ConfigFieldType::Boolean),
                field("target_field", ConfigFieldType::String),
                field("ignore_missing", ConfigFieldType::Boolean),
            ],
        )
    }

    pub fn sort(id: &str) -> Self {
        build(
            ProcessorType::Sort,
            id,
            "Sort Processor",
            vec![field("field", ConfigFieldType::String)],
            vec![
                field("order", ConfigFieldType::Select)
                    .with_value(json!("asc"))
                    .with_select_options(["asc", "desc"]),
                field("target_field", ConfigFieldType::String),
                field("ignore_missing", ConfigFieldType::Boolean),
            ],
        )
    }

    pub fn copy(id: &str) -> Self {
        build(
            ProcessorType::Copy,
            id,
            "Copy Processor",
            vec![
                field("source_field", ConfigFieldType::String),
                field("target_field", ConfigFieldType::String),
            ],
            vec![
                field("ignore_missing", ConfigFieldType::Boolean),
                field("override_target", ConfigFieldType::Boolean),
                field("remove_source", ConfigFieldType::Boolean),
            ],
        )
    }

    pub fn text_embedding(id: &str) -> Self {
        build(
            ProcessorType::TextEmbedding,
            id,
            "Text Embedding Processor",
            vec![
                field("model", ConfigFieldType::Model),
                field("field_map", ConfigFieldType::Map),
            ],
            vec![],
        )
    }

    pub fn collapse(id: &str) -> Self {
        build(
            ProcessorType::Collapse,
            id,
            "Collapse Processor",
            vec![field("field", ConfigFieldType::String)],
            vec![],
        )
    }

    /// Factory for a known processor tag. Unknown tags have no template.
    pub fn for_type(processor_type: &ProcessorType, id: &str) -> Option<Self> {
        let processor = match processor_type {
            ProcessorType::MlProcessor => Self::ml_inference(id),
            ProcessorType::TextChunking => Self::text_chunking(id),
            ProcessorType::Normalization => Self::normalization(id),
            ProcessorType::Split => Self::split(id),
            ProcessorType::Sort => Self::sort(id),
            ProcessorType::Copy => Self::copy(id),
            ProcessorType::TextEmbedding => Self::text_embedding(id),
            ProcessorType::Collapse => Self::collapse(id),
            ProcessorType::Rerank
            | ProcessorType::TextImageEmbedding
            | ProcessorType::Other(_) => return None,
        };
        Some(processor)
    }
}
