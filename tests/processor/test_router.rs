use searchflow::core::form::{config_to_form, FieldError, FormState};
use searchflow::core::processor::{
    GenericStrategy, ProcessorLayout, ProcessorRouter, ProcessorStrategy, ADVANCED_SETTINGS,
};
use searchflow::core::schema::{ProcessorConfig, ProcessorContext, ProcessorType, WorkflowConfig};
use searchflow::core::transform::TransformEngine;
use serde_json::json;

fn errors_at<'a>(errors: &'a [FieldError], suffix: &str) -> Vec<&'a FieldError> {
    errors
        .iter()
        .filter(|error| error.path.to_string().ends_with(suffix))
        .collect()
}

fn set(state: &mut FormState, path: &str, value: serde_json::Value) {
    state.set(&path.parse().unwrap(), value);
}

#[test]
fn every_built_in_processor_gets_a_collapsed_advanced_section() {
    let router = ProcessorRouter::standard();
    let processors = [
        ProcessorConfig::ml_inference("ml"),
        ProcessorConfig::text_chunking("chunk"),
        ProcessorConfig::normalization("norm"),
        ProcessorConfig::split("split"),
        ProcessorConfig::sort("sort"),
        ProcessorConfig::copy("copy"),
        ProcessorConfig::text_embedding("embed"),
        ProcessorConfig::collapse("collapse"),
    ];
    for processor in &processors {
        let layout = router.layout(processor, ProcessorContext::Ingest);
        let advanced = layout
            .section(ADVANCED_SETTINGS)
            .unwrap_or_else(|| panic!("{} has no advanced section", processor.id()));
        assert!(advanced.collapsed);
        assert!(advanced.fields.iter().all(|binding| binding.optional));
        let placed = layout.bindings().count();
        assert_eq!(placed, processor.config.all_fields().count(), "{}", processor.id());
    }
}

#[test]
fn layout_paths_follow_the_processor_context() {
    let router = ProcessorRouter::standard();
    let layout = router.layout(
        &ProcessorConfig::ml_inference("rewrite"),
        ProcessorContext::SearchRequest,
    );
    assert_eq!(layout.strategy, "ml_inference");
    let model = layout.bindings().find(|binding| binding.id == "model").unwrap();
    assert_eq!(
        model.path.to_string(),
        "search.enrichRequest.processors.rewrite.model"
    );
    assert_eq!(
        layout.sections.iter().map(|section| section.title.as_str()).collect::<Vec<_>>(),
        vec!["Model", "Inputs", "Outputs", ADVANCED_SETTINGS]
    );
}

#[test]
fn ml_inference_needs_matching_input_and_output_counts() {
    let router = ProcessorRouter::standard();
    let engine = TransformEngine::default();
    let processor = ProcessorConfig::ml_inference("ml");
    let mut state = FormState::new();
    set(&mut state, "ingest.enrich.processors.ml.model", json!({"id": "model-1"}));
    set(
        &mut state,
        "ingest.enrich.processors.ml.input_map",
        json!([[{"key": "text", "value": {"transformType": "Field", "value": "body"}}]]),
    );
    set(&mut state, "ingest.enrich.processors.ml.output_map", json!([]));

    let errors = router.validate_processor(&processor, ProcessorContext::Ingest, &state, &engine);
    let mismatch = errors_at(&errors, "ml.output_map");
    assert_eq!(mismatch.len(), 1);
    assert!(mismatch[0].message.contains("do not match"));

    set(
        &mut state,
        "ingest.enrich.processors.ml.output_map",
        json!([[{"key": "embedding", "value": {"transformType": "Expression", "value": "$.vector"}}]]),
    );
    let errors = router.validate_processor(&processor, ProcessorContext::Ingest, &state, &engine);
    assert!(errors.is_empty(), "{:?}", errors);
}

#[test]
fn ml_inference_requires_a_model() {
    let router = ProcessorRouter::standard();
    let processor = ProcessorConfig::ml_inference("ml");
    let errors = router.validate_processor(
        &processor,
        ProcessorContext::Ingest,
        &FormState::new(),
        &TransformEngine::default(),
    );
    let model = errors_at(&errors, "ml.model");
    assert_eq!(model.len(), 1);
    assert_eq!(model[0].message, "a model is required");
}

#[test]
fn normalization_weights_must_sum_to_one() {
    let router = ProcessorRouter::standard();
    let engine = TransformEngine::default();
    let processor = ProcessorConfig::normalization("norm");
    let mut state = FormState::new();
    set(
        &mut state,
        "search.enrichResponse.processors.norm.weights",
        json!([0.4, 0.4]),
    );
    let errors =
        router.validate_processor(&processor, ProcessorContext::SearchResponse, &state, &engine);
    let weights = errors_at(&errors, "norm.weights");
    assert_eq!(weights.len(), 1);
    assert!(weights[0].message.contains("sum to 1.0"));

    set(
        &mut state,
        "search.enrichResponse.processors.norm.weights",
        json!([0.3, 0.7]),
    );
    let errors =
        router.validate_processor(&processor, ProcessorContext::SearchResponse, &state, &engine);
    assert!(errors_at(&errors, "norm.weights").is_empty());
}

#[test]
fn chunking_checks_follow_the_selected_algorithm() {
    let router = ProcessorRouter::standard();
    let engine = TransformEngine::default();
    let processor = ProcessorConfig::text_chunking("chunk");
    let mut state = FormState::new();
    set(&mut state, "ingest.enrich.processors.chunk.token_limit", json!(0));
    let errors = router.validate_processor(&processor, ProcessorContext::Ingest, &state, &engine);
    assert_eq!(errors_at(&errors, "chunk.token_limit").len(), 1);

    set(&mut state, "ingest.enrich.processors.chunk.algorithm", json!("delimiter"));
    let errors = router.validate_processor(&processor, ProcessorContext::Ingest, &state, &engine);
    assert!(errors_at(&errors, "chunk.token_limit").is_empty());
    assert_eq!(errors_at(&errors, "chunk.delimiter").len(), 1);
}

#[test]
fn unregistered_types_fall_back_to_generic() {
    let router = ProcessorRouter::standard();
    assert_eq!(router.route(&ProcessorType::from("grok")).name(), "generic");
    let layout = router.layout(&ProcessorConfig::copy("copy"), ProcessorContext::Ingest);
    assert_eq!(layout.strategy, "generic");
}

struct StubStrategy;

impl ProcessorStrategy for StubStrategy {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn layout(
        &self,
        processor: &ProcessorConfig,
        _base_path: &searchflow::core::form::FieldPath,
    ) -> ProcessorLayout {
        ProcessorLayout::new(processor, self.name())
    }

    fn validate(
        &self,
        _processor: &ProcessorConfig,
        _state: &FormState,
        base_path: &searchflow::core::form::FieldPath,
        _engine: &TransformEngine,
    ) -> Vec<FieldError> {
        vec![FieldError::new(base_path.clone(), "stub")]
    }
}

#[test]
fn custom_strategies_take_precedence_over_the_fallback() {
    let mut builder = ProcessorRouter::builder();
    builder.register(ProcessorType::Sort, StubStrategy);
    let router = builder.build();
    let errors = router.validate_processor(
        &ProcessorConfig::sort("s"),
        ProcessorContext::SearchResponse,
        &FormState::new(),
        &TransformEngine::default(),
    );
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path.to_string(), "search.enrichResponse.processors.s");
}

#[test]
#[should_panic(expected = "duplicate strategy registered")]
fn registering_a_type_twice_panics() {
    let mut builder = ProcessorRouter::builder();
    builder
        .register(ProcessorType::Copy, GenericStrategy)
        .register(ProcessorType::Copy, StubStrategy);
}

#[test]
fn workflow_validation_covers_every_context() {
    let mut config = WorkflowConfig::default();
    config
        .ingest
        .enrich
        .processors
        .push(ProcessorConfig::ml_inference("ingest_ml"));
    config
        .search
        .enrich_response
        .processors
        .push(ProcessorConfig::normalization("norm"));
    let mut state = config_to_form(&config);
    set(
        &mut state,
        "search.enrichResponse.processors.norm.weights",
        json!([2.0]),
    );

    let errors =
        ProcessorRouter::standard().validate_workflow(&config, &state, &TransformEngine::default());
    assert_eq!(errors_at(&errors, "ingest_ml.model").len(), 1);
    assert_eq!(errors_at(&errors, "norm.weights").len(), 1);
}
