use super::types::{
    TemplateEdge, TemplateFlow, TemplateNode, UiMetadata, WorkflowStepType, WorkflowTemplate,
    WorkflowType,
};
use super::validate_template;
use super::wire::{ingest_pipeline, search_pipeline, to_configurations};
use crate::core::error::AppError;
use crate::core::schema::{ConfigField, WorkflowConfig};
use crate::core::transform::TransformEngine;
use crate::core::types::ErrorCategory;
use serde_json::{json, Value};
use tracing::{debug, warn};

pub const DEFAULT_SCHEMA_VERSION: &str = "1.0.0";

const INGEST_PIPELINE_NODE: &str = "create_ingest_pipeline";
const INDEX_NODE: &str = "create_index";
const SEARCH_PIPELINE_NODE: &str = "create_search_pipeline";

/// Builds a provisionable template from the editor's workflow config.
#[derive(Debug, Clone)]
pub struct TemplateBuilder {
    name: String,
    description: Option<String>,
    use_case: Option<String>,
    version: Option<Value>,
    workflow_type: WorkflowType,
    schema_version: String,
    engine: TransformEngine,
}

impl TemplateBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            use_case: None,
            version: None,
            workflow_type: WorkflowType::Custom,
            schema_version: DEFAULT_SCHEMA_VERSION.to_string(),
            engine: TransformEngine::default(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn use_case(mut self, use_case: impl Into<String>) -> Self {
        self.use_case = Some(use_case.into());
        self
    }

    pub fn version(mut self, version: Value) -> Self {
        self.version = Some(version);
        self
    }

    pub fn workflow_type(mut self, workflow_type: WorkflowType) -> Self {
        self.workflow_type = workflow_type;
        self
    }

    pub fn schema_version(mut self, schema_version: impl Into<String>) -> Self {
        self.schema_version = schema_version.into();
        self
    }

    pub fn engine(mut self, engine: TransformEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Build and validate the template. Diagnostics of error severity fail the build.
    pub fn build(&self, config: &WorkflowConfig) -> Result<WorkflowTemplate, AppError> {
        let mut flow = TemplateFlow::default();

        let ingest_enabled = config
            .ingest
            .enabled
            .typed_value()
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if ingest_enabled {
            self.add_ingest_nodes(config, &mut flow)?;
        }

        let search = &config.search;
        if !search.enrich_request.processors.is_empty() || !search.enrich_response.processors.is_empty() {
            let pipeline = search_pipeline(
                &search.enrich_request.processors,
                &search.enrich_response.processors,
                self.description.clone(),
                &self.engine,
            )?;
            let pipeline_id = self.pipeline_id(&search.pipeline_name, "search_pipeline");
            flow.nodes.push(
                TemplateNode::new(SEARCH_PIPELINE_NODE, WorkflowStepType::CreateSearchPipeline)
                    .with_input("pipeline_id", json!(pipeline_id))
                    .with_input("configurations", json!(to_configurations(&pipeline)?)),
            );
        }

        debug!(
            name = %self.name,
            nodes = flow.nodes.len(),
            edges = flow.edges.len(),
            "built workflow template"
        );

        let mut template = WorkflowTemplate::new(self.name.clone()).with_provision(flow);
        template.description = self.description.clone();
        template.version = self.version.clone();
        template.use_case = self.use_case.clone();
        template.ui_metadata = Some(UiMetadata {
            schema_version: self.schema_version.clone(),
            config: config.clone(),
            workflow_type: self.workflow_type,
            workspace_flow: None,
        });

        for warning in validate_template(&template)? {
            warn!(code = %warning.code, "{}", warning.message);
        }
        Ok(template)
    }

    fn add_ingest_nodes(&self, config: &WorkflowConfig, flow: &mut TemplateFlow) -> Result<(), AppError> {
        let ingest = &config.ingest;
        let index_name = string_value(&ingest.index.name);
        if index_name.is_empty() {
            return Err(AppError::new(
                ErrorCategory::SchemaValidationError,
                "ingest is enabled but no index name is set",
            )
            .with_code("SCHEMA-INDEX-NAME")
            .with_detail("path", "ingest.index.name"));
        }

        let mut settings = ingest
            .index
            .settings
            .typed_value()
            .cloned()
            .unwrap_or_else(|| json!({}));
        let mappings = ingest
            .index
            .mappings
            .typed_value()
            .cloned()
            .unwrap_or_else(|| json!({}));

        let mut index_node = TemplateNode::new(INDEX_NODE, WorkflowStepType::CreateIndex)
            .with_input("index_name", json!(index_name));

        if !ingest.enrich.processors.is_empty() {
            let pipeline = ingest_pipeline(
                &ingest.enrich.processors,
                self.description.clone(),
                &self.engine,
            )?;
            let pipeline_id = self.pipeline_id(&ingest.pipeline_name, "ingest_pipeline");
            flow.nodes.push(
                TemplateNode::new(INGEST_PIPELINE_NODE, WorkflowStepType::CreateIngestPipeline)
                    .with_input("pipeline_id", json!(pipeline_id))
                    .with_input("configurations", json!(to_configurations(&pipeline)?)),
            );
            if let Value::Object(map) = &mut settings {
                map.insert(
                    "default_pipeline".to_string(),
                    json!(format!("${{{{{}.pipeline_id}}}}", INGEST_PIPELINE_NODE)),
                );
            }
            index_node = index_node.with_previous_input(INGEST_PIPELINE_NODE, "pipeline_id");
            flow.edges
                .push(TemplateEdge::new(INGEST_PIPELINE_NODE, INDEX_NODE));
        }

        let index_body = json!({ "settings": settings, "mappings": mappings });
        flow.nodes.push(
            index_node.with_input("configurations", json!(to_configurations(&index_body)?)),
        );
        Ok(())
    }

    // Configured pipeline name, or one derived from the template name.
    fn pipeline_id(&self, field: &ConfigField, suffix: &str) -> String {
        let configured = string_value(field);
        if !configured.is_empty() {
            return configured;
        }
        let base: String = self
            .name
            .trim()
            .to_lowercase()
            .chars()
            .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
            .collect();
        if base.is_empty() {
            suffix.to_string()
        } else {
            format!("{}_{}", base, suffix)
        }
    }
}

fn string_value(field: &ConfigField) -> String {
    field
        .typed_value()
        .and_then(Value::as_str)
        .map(|text| text.trim().to_string())
        .unwrap_or_default()
}
