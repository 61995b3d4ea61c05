use searchflow::core::schema::{ProcessorConfig, WorkflowConfig};
use searchflow::core::template::{
    correlate_resources, RawWorkflowResource, ResourceType, TemplateBuilder, TemplateFlow,
    TemplateNode, Workflow, WorkflowResource, WorkflowState, WorkflowStepType, WorkflowTemplate,
};
use serde_json::json;

fn raw(step: &str, step_id: &str, resource_type: &str, id: &str) -> RawWorkflowResource {
    RawWorkflowResource {
        workflow_step_name: step.to_string(),
        workflow_step_id: step_id.to_string(),
        resource_type: resource_type.to_string(),
        resource_id: id.to_string(),
    }
}

fn built_template() -> WorkflowTemplate {
    let mut config = WorkflowConfig::default();
    config.ingest.index.name.value = Some(json!("products"));
    config
        .ingest
        .enrich
        .processors
        .push(ProcessorConfig::split("split"));
    config
        .search
        .enrich_request
        .processors
        .push(ProcessorConfig::copy("copy"));
    TemplateBuilder::new("products").build(&config).unwrap()
}

#[test]
fn search_pipelines_are_labelled_by_step_not_resource_key() {
    let resource =
        WorkflowResource::from_raw(&raw("create_search_pipeline", "s", "pipeline_id", "p1"));
    assert_eq!(resource.resource_type, ResourceType::SearchPipeline);
    assert_eq!(resource.resource_type.to_string(), "Search pipeline");

    let resource =
        WorkflowResource::from_raw(&raw("create_ingest_pipeline", "i", "pipeline_id", "p2"));
    assert_eq!(resource.resource_type.label(), "Ingest pipeline");
}

#[test]
fn resources_serialize_with_display_labels() {
    let resource = WorkflowResource::from_raw(&raw("create_index", "create_index", "index_name", "products"));
    assert_eq!(
        serde_json::to_value(&resource).unwrap(),
        json!({"id": "products", "stepType": "create_index", "type": "Index"})
    );
}

#[test]
fn resources_correlate_to_template_nodes() {
    let template = built_template();
    let resources = vec![
        raw("create_ingest_pipeline", "create_ingest_pipeline", "pipeline_id", "products_ingest_pipeline"),
        raw("create_index", "step_2", "index_name", "products"),
        raw("create_search_pipeline", "create_search_pipeline", "pipeline_id", "products_search_pipeline"),
        raw("register_remote_model", "model", "model_id", "m-1"),
    ];
    let correlated = correlate_resources(&template, &resources);
    let node_ids: Vec<Option<&str>> = correlated
        .iter()
        .map(|entry| entry.node_id.as_deref())
        .collect();
    assert_eq!(
        node_ids,
        vec![
            Some("create_ingest_pipeline"),
            Some("create_index"),
            Some("create_search_pipeline"),
            None,
        ]
    );
    assert_eq!(correlated[3].resource.resource_type, ResourceType::Model);
}

#[test]
fn ambiguous_step_types_stay_uncorrelated() {
    let template = WorkflowTemplate::new("w").with_provision(TemplateFlow {
        nodes: vec![
            TemplateNode::new("index_a", WorkflowStepType::CreateIndex),
            TemplateNode::new("index_b", WorkflowStepType::CreateIndex),
        ],
        edges: Vec::new(),
        user_params: None,
    });
    let correlated = correlate_resources(
        &template,
        &[
            raw("create_index", "elsewhere", "index_name", "a"),
            raw("create_index", "index_b", "index_name", "b"),
        ],
    );
    assert_eq!(correlated[0].node_id, None);
    assert_eq!(correlated[1].node_id.as_deref(), Some("index_b"));
}

#[test]
fn provisioning_lifecycle_records_resources_and_errors() {
    let mut workflow = Workflow::from_template(built_template());
    workflow.id = Some("wf-1".to_string());

    workflow
        .apply_status(WorkflowState::Provisioning, None, &[])
        .unwrap();
    workflow
        .apply_status(
            WorkflowState::Provisioning,
            None,
            &[raw("create_ingest_pipeline", "create_ingest_pipeline", "pipeline_id", "p")],
        )
        .unwrap();
    assert_eq!(workflow.resources_created.len(), 1);

    workflow
        .apply_status(
            WorkflowState::Failed,
            Some("index already exists".to_string()),
            &[raw("create_ingest_pipeline", "create_ingest_pipeline", "pipeline_id", "p")],
        )
        .unwrap();
    assert_eq!(workflow.state, Some(WorkflowState::Failed));
    assert_eq!(workflow.error.as_deref(), Some("index already exists"));

    let err = workflow
        .apply_status(WorkflowState::Completed, None, &[])
        .unwrap_err();
    assert_eq!(err.code, "WORKFLOW-STATE");
    assert_eq!(err.context.get("from").map(String::as_str), Some("Failed"));
    assert_eq!(workflow.state, Some(WorkflowState::Failed));
}

#[test]
fn fresh_workflows_cannot_skip_provisioning() {
    let mut workflow = Workflow::from_template(WorkflowTemplate::new("w"));
    let err = workflow
        .apply_status(WorkflowState::Completed, None, &[])
        .unwrap_err();
    assert_eq!(err.code, "WORKFLOW-STATE");
    assert!(workflow.state.is_none());
}
