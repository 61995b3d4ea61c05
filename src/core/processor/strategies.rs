use super::layout::{LayoutBuilder, ProcessorLayout};
use super::ProcessorStrategy;
use crate::core::form::{validate_field, FieldError, FieldPath, FormState};
use crate::core::schema::processors::{
    CHUNKING_ALGORITHMS, COMBINATION_TECHNIQUES, NORMALIZATION_TECHNIQUES,
};
use crate::core::schema::ProcessorConfig;
use crate::core::transform::TransformEngine;
use serde_json::Value;

const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Type and shape checks for every field of a processor.
pub fn validate_fields(
    processor: &ProcessorConfig,
    state: &FormState,
    base_path: &FieldPath,
    engine: &TransformEngine,
) -> Vec<FieldError> {
    let mut errors = Vec::new();
    for field in processor.config.all_fields() {
        let path = base_path.clone().key(field.id.as_str());
        let value = current_value(state, &path, processor, &field.id);
        let optional = processor.config.is_optional(&field.id);
        errors.extend(validate_field(&path, field, optional, &value, engine));
    }
    errors
}

// Form value if present, otherwise the stored config value, otherwise the initial value.
fn current_value(state: &FormState, path: &FieldPath, processor: &ProcessorConfig, id: &str) -> Value {
    state
        .get(path)
        .cloned()
        .or_else(|| processor.config.field(id).and_then(|field| field.typed_value().cloned()))
        .or_else(|| processor.config.field(id).map(|field| field.field_type.initial_value()))
        .unwrap_or(Value::Null)
}

fn string_value(state: &FormState, base_path: &FieldPath, processor: &ProcessorConfig, id: &str) -> String {
    let path = base_path.clone().key(id);
    current_value(state, &path, processor, id)
        .as_str()
        .unwrap_or_default()
        .to_string()
}

/// Required fields, then optional fields collapsed under advanced settings.
pub struct GenericStrategy;

impl ProcessorStrategy for GenericStrategy {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn layout(&self, processor: &ProcessorConfig, base_path: &FieldPath) -> ProcessorLayout {
        LayoutBuilder::new(processor, base_path, self.name())
            .required_rest("Settings")
            .advanced_rest()
            .build()
    }

    fn validate(
        &self,
        processor: &ProcessorConfig,
        state: &FormState,
        base_path: &FieldPath,
        engine: &TransformEngine,
    ) -> Vec<FieldError> {
        validate_fields(processor, state, base_path, engine)
    }
}

/// Model inference with paired input and output map arrays.
pub struct MlInferenceStrategy;

impl ProcessorStrategy for MlInferenceStrategy {
    fn name(&self) -> &'static str {
        "ml_inference"
    }

    fn layout(&self, processor: &ProcessorConfig, base_path: &FieldPath) -> ProcessorLayout {
        LayoutBuilder::new(processor, base_path, self.name())
            .section("Model", &["model"])
            .section("Inputs", &["input_map"])
            .section("Outputs", &["output_map"])
            .required_rest("Settings")
            .advanced_rest()
            .build()
    }

    fn validate(
        &self,
        processor: &ProcessorConfig,
        state: &FormState,
        base_path: &FieldPath,
        engine: &TransformEngine,
    ) -> Vec<FieldError> {
        let mut errors = validate_fields(processor, state, base_path, engine);
        for id in ["model", "input_map", "output_map"] {
            if processor.config.field(id).is_none() {
                errors.push(FieldError::new(
                    base_path.clone().key(id),
                    format!("ML inference processors require '{}'", id),
                ));
            }
        }

        let count = |id: &str| {
            let path = base_path.clone().key(id);
            current_value(state, &path, processor, id)
                .as_array()
                .map(Vec::len)
                .unwrap_or(0)
        };
        let (inputs, outputs) = (count("input_map"), count("output_map"));
        if inputs != outputs {
            errors.push(FieldError::new(
                base_path.clone().key("output_map"),
                format!(
                    "{} output mappings do not match the {} input mappings",
                    outputs, inputs
                ),
            ));
        }
        errors
    }
}

/// Text chunking; the chosen algorithm decides which parameters are checked.
pub struct TextChunkingStrategy;

impl ProcessorStrategy for TextChunkingStrategy {
    fn name(&self) -> &'static str {
        "text_chunking"
    }

    fn layout(&self, processor: &ProcessorConfig, base_path: &FieldPath) -> ProcessorLayout {
        LayoutBuilder::new(processor, base_path, self.name())
            .section("Fields", &["field_map"])
            .section(
                "Chunking",
                &["algorithm", "token_limit", "overlap_rate", "delimiter"],
            )
            .required_rest("Settings")
            .advanced_rest()
            .build()
    }

    fn validate(
        &self,
        processor: &ProcessorConfig,
        state: &FormState,
        base_path: &FieldPath,
        engine: &TransformEngine,
    ) -> Vec<FieldError> {
        let mut errors = validate_fields(processor, state, base_path, engine);
        let algorithm = string_value(state, base_path, processor, "algorithm");
        let algorithm = if algorithm.is_empty() {
            CHUNKING_ALGORITHMS[0].to_string()
        } else {
            algorithm
        };

        match algorithm.as_str() {
            "fixed_token_length" => {
                let number = |id: &str| {
                    let path = base_path.clone().key(id);
                    current_value(state, &path, processor, id).as_f64()
                };
                match number("token_limit") {
                    Some(limit) if limit >= 1.0 && limit.fract() == 0.0 => {}
                    _ => errors.push(FieldError::new(
                        base_path.clone().key("token_limit"),
                        "token limit must be a positive integer",
                    )),
                }
                if let Some(rate) = number("overlap_rate") {
                    if !(0.0..=0.5).contains(&rate) {
                        errors.push(FieldError::new(
                            base_path.clone().key("overlap_rate"),
                            "overlap rate must be between 0 and 0.5",
                        ));
                    }
                }
            }
            "delimiter" => {
                if string_value(state, base_path, processor, "delimiter").is_empty() {
                    errors.push(FieldError::new(
                        base_path.clone().key("delimiter"),
                        "a delimiter is required",
                    ));
                }
            }
            other => errors.push(FieldError::new(
                base_path.clone().key("algorithm"),
                format!("unknown chunking algorithm '{}'", other),
            )),
        }
        errors
    }
}

/// Score normalization and combination for hybrid search.
pub struct NormalizationStrategy;

impl ProcessorStrategy for NormalizationStrategy {
    fn name(&self) -> &'static str {
        "normalization"
    }

    fn layout(&self, processor: &ProcessorConfig, base_path: &FieldPath) -> ProcessorLayout {
        LayoutBuilder::new(processor, base_path, self.name())
            .section(
                "Normalization",
                &["normalization_technique", "combination_technique", "weights"],
            )
            .required_rest("Settings")
            .advanced_rest()
            .build()
    }

    fn validate(
        &self,
        processor: &ProcessorConfig,
        state: &FormState,
        base_path: &FieldPath,
        engine: &TransformEngine,
    ) -> Vec<FieldError> {
        let mut errors = validate_fields(processor, state, base_path, engine);

        let technique = string_value(state, base_path, processor, "normalization_technique");
        if !technique.is_empty() && !NORMALIZATION_TECHNIQUES.contains(&technique.as_str()) {
            errors.push(FieldError::new(
                base_path.clone().key("normalization_technique"),
                format!("unknown normalization technique '{}'", technique),
            ));
        }
        let combination = string_value(state, base_path, processor, "combination_technique");
        if !combination.is_empty() && !COMBINATION_TECHNIQUES.contains(&combination.as_str()) {
            errors.push(FieldError::new(
                base_path.clone().key("combination_technique"),
                format!("unknown combination technique '{}'", combination),
            ));
        }

        let weights_path = base_path.clone().key("weights");
        if let Value::Array(weights) = current_value(state, &weights_path, processor, "weights") {
            if !weights.is_empty() {
                if let Some(message) = check_weights(&weights) {
                    errors.push(FieldError::new(weights_path, message));
                }
            }
        }
        errors
    }
}

fn check_weights(weights: &[Value]) -> Option<String> {
    let mut sum = 0.0;
    for weight in weights {
        match weight.as_f64() {
            Some(value) if value >= 0.0 => sum += value,
            _ => return Some(format!("weight {} is not a non-negative number", weight)),
        }
    }
    if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
        return Some(format!("weights must sum to 1.0, got {}", sum));
    }
    None
}
