use searchflow::core::form::{config_to_form, form_to_config, FieldPath, FormState};
use searchflow::core::schema::{ConfigFieldType, ProcessorConfig, WorkflowConfig};
use serde_json::json;

fn path(text: &str) -> FieldPath {
    text.parse().unwrap()
}

fn hybrid_config() -> WorkflowConfig {
    let mut config = WorkflowConfig::default();
    config.ingest.index.name.value = Some(json!("products"));

    let mut ml = ProcessorConfig::ml_inference("ml_processor_1");
    ml.config.field_mut("model").unwrap().value = Some(json!({"id": "embedding-model"}));
    ml.config.field_mut("input_map").unwrap().value = Some(json!([[
        {"key": "text", "value": {"transformType": "Field", "value": "description"}}
    ]]));
    config.ingest.enrich.processors.push(ml);
    config
        .ingest
        .enrich
        .processors
        .push(ProcessorConfig::text_chunking("text_chunking_1"));
    config
        .search
        .enrich_response
        .processors
        .push(ProcessorConfig::normalization("normalization_1"));
    config
}

#[test]
fn initial_values_are_total_and_stable() {
    for field_type in ConfigFieldType::ALL {
        let first = field_type.initial_value();
        assert!(field_type.accepts(&first), "{} rejects its initial value", field_type);
        assert_eq!(first, field_type.initial_value());
    }
}

#[test]
fn every_field_becomes_one_leaf() {
    let config = hybrid_config();
    let state = config_to_form(&config);
    for slot in config.field_slots() {
        assert!(state.get(&slot.path).is_some(), "missing leaf {}", slot.path);
    }
    assert_eq!(
        state.get(&path("ingest.enrich.processors.text_chunking_1.token_limit")),
        Some(&json!(384))
    );
}

#[test]
fn unedited_form_round_trips_to_the_same_config() {
    let config = hybrid_config();
    let saved = form_to_config(&config, &config_to_form(&config));
    assert_eq!(config_to_form(&saved), config_to_form(&config));
    assert_eq!(saved.ingest.index.name.value, Some(json!("products")));
}

#[test]
fn round_trip_is_idempotent() {
    let config = hybrid_config();
    let once = form_to_config(&config, &config_to_form(&config));
    let twice = form_to_config(&once, &config_to_form(&once));
    assert_eq!(once, twice);
}

#[test]
fn edits_flow_back_into_the_config() {
    let config = hybrid_config();
    let mut state = config_to_form(&config);
    state.set(&path("search.request"), json!({"query": {"match": {"title": "shoes"}}}));
    state.set(
        &path("ingest.enrich.processors.text_chunking_1.algorithm"),
        json!("delimiter"),
    );

    let saved = form_to_config(&config, &state);
    assert_eq!(
        saved.search.request.value,
        Some(json!({"query": {"match": {"title": "shoes"}}}))
    );
    let chunking = &saved.ingest.enrich.processors[1].config;
    assert_eq!(chunking.field("algorithm").unwrap().value, Some(json!("delimiter")));
}

#[test]
fn empty_map_arrays_persist_as_empty_arrays() {
    let config = hybrid_config();
    let mut state = config_to_form(&config);
    state.set(&path("ingest.enrich.processors.ml_processor_1.output_map"), json!([]));
    let saved = form_to_config(&config, &state);
    let ml = &saved.ingest.enrich.processors[0].config;
    assert_eq!(ml.field("output_map").unwrap().value, Some(json!([])));
}

#[test]
fn malformed_stored_values_do_not_break_loading() {
    let mut config = hybrid_config();
    config.ingest.index.mappings.value = Some(json!("not an object"));
    let state = config_to_form(&config);
    assert_eq!(state.get(&path("ingest.index.mappings")), Some(&json!({})));
}

#[test]
fn missing_leaves_fall_back_to_initial_values() {
    let config = hybrid_config();
    let saved = form_to_config(&config, &FormState::new());
    assert_eq!(saved.search.request.value, Some(json!({})));
    assert_eq!(saved.ingest.index.name.value, Some(json!("")));
}
