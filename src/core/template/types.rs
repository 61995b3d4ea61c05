use crate::core::schema::WorkflowConfig;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Step types a provisioning node can have. Unknown types are carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WorkflowStepType {
    CreateIngestPipeline,
    CreateSearchPipeline,
    CreateIndex,
    Other(String),
}

impl WorkflowStepType {
    pub fn as_str(&self) -> &str {
        match self {
            WorkflowStepType::CreateIngestPipeline => "create_ingest_pipeline",
            WorkflowStepType::CreateSearchPipeline => "create_search_pipeline",
            WorkflowStepType::CreateIndex => "create_index",
            WorkflowStepType::Other(step) => step,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, WorkflowStepType::Other(_))
    }

    /// `user_inputs` keys a node of this type must provide.
    pub fn required_user_inputs(&self) -> &'static [&'static str] {
        match self {
            WorkflowStepType::CreateIngestPipeline | WorkflowStepType::CreateSearchPipeline => {
                &["pipeline_id", "configurations"]
            }
            WorkflowStepType::CreateIndex => &["index_name", "configurations"],
            WorkflowStepType::Other(_) => &[],
        }
    }
}

impl From<String> for WorkflowStepType {
    fn from(step: String) -> Self {
        match step.as_str() {
            "create_ingest_pipeline" => WorkflowStepType::CreateIngestPipeline,
            "create_search_pipeline" => WorkflowStepType::CreateSearchPipeline,
            "create_index" => WorkflowStepType::CreateIndex,
            _ => WorkflowStepType::Other(step),
        }
    }
}

impl From<&str> for WorkflowStepType {
    fn from(step: &str) -> Self {
        WorkflowStepType::from(step.to_string())
    }
}

impl From<WorkflowStepType> for String {
    fn from(step: WorkflowStepType) -> Self {
        step.as_str().to_string()
    }
}

impl fmt::Display for WorkflowStepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One provisioning step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: WorkflowStepType,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub previous_node_inputs: IndexMap<String, String>,
    #[serde(default)]
    pub user_inputs: IndexMap<String, Value>,
}

impl TemplateNode {
    pub fn new(id: impl Into<String>, node_type: WorkflowStepType) -> Self {
        Self {
            id: id.into(),
            node_type,
            previous_node_inputs: IndexMap::new(),
            user_inputs: IndexMap::new(),
        }
    }

    pub fn with_input(mut self, key: impl Into<String>, value: Value) -> Self {
        self.user_inputs.insert(key.into(), value);
        self
    }

    /// Consume output `output` of node `source`.
    pub fn with_previous_input(mut self, source: impl Into<String>, output: impl Into<String>) -> Self {
        self.previous_node_inputs.insert(source.into(), output.into());
        self
    }
}

/// Declares that `dest` depends on `source`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemplateEdge {
    pub source: String,
    pub dest: String,
}

impl TemplateEdge {
    pub fn new(source: impl Into<String>, dest: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TemplateFlow {
    #[serde(default)]
    pub nodes: Vec<TemplateNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<TemplateEdge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_params: Option<Value>,
}

impl TemplateFlow {
    pub fn node(&self, id: &str) -> Option<&TemplateNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn has_edge(&self, source: &str, dest: &str) -> bool {
        self.edges
            .iter()
            .any(|edge| edge.source == source && edge.dest == dest)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TemplateFlows {
    pub provision: TemplateFlow,
}

/// Use case the editor was opened with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WorkflowType {
    #[default]
    Custom,
    #[serde(rename = "Semantic search")]
    SemanticSearch,
    #[serde(rename = "Hybrid search")]
    HybridSearch,
    #[serde(rename = "RAG")]
    Rag,
    Unknown,
}

/// Editor state stored alongside a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiMetadata {
    pub schema_version: String,
    pub config: WorkflowConfig,
    #[serde(rename = "type", default)]
    pub workflow_type: WorkflowType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_flow: Option<Value>,
}

/// Stateless declarative description of the resources to provision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowTemplate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Opaque; passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflows: Option<TemplateFlows>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_case: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_metadata: Option<UiMetadata>,
}

impl WorkflowTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            version: None,
            workflows: None,
            use_case: None,
            ui_metadata: None,
        }
    }

    pub fn with_provision(mut self, flow: TemplateFlow) -> Self {
        self.workflows = Some(TemplateFlows { provision: flow });
        self
    }

    pub fn provision(&self) -> Option<&TemplateFlow> {
        self.workflows.as_ref().map(|flows| &flows.provision)
    }
}

/// Provisioning state reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowState {
    NotStarted,
    Provisioning,
    Failed,
    Completed,
}

impl WorkflowState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowState::Failed | WorkflowState::Completed)
    }

    pub fn can_transition_to(&self, next: WorkflowState) -> bool {
        matches!(
            (self, next),
            (WorkflowState::NotStarted, WorkflowState::Provisioning)
                | (WorkflowState::Provisioning, WorkflowState::Completed)
                | (WorkflowState::Provisioning, WorkflowState::Failed)
        )
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowState::NotStarted => write!(f, "Not started"),
            WorkflowState::Provisioning => write!(f, "Provisioning"),
            WorkflowState::Failed => write!(f, "Failed"),
            WorkflowState::Completed => write!(f, "Completed"),
        }
    }
}

/// Display type of a provisioned resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResourceType {
    IngestPipeline,
    SearchPipeline,
    Index,
    Model,
    ModelGroup,
    Connector,
    Other(String),
}

impl ResourceType {
    pub fn label(&self) -> &str {
        match self {
            ResourceType::IngestPipeline => "Ingest pipeline",
            ResourceType::SearchPipeline => "Search pipeline",
            ResourceType::Index => "Index",
            ResourceType::Model => "Model",
            ResourceType::ModelGroup => "Model group",
            ResourceType::Connector => "Connector",
            ResourceType::Other(label) => label,
        }
    }
}

impl From<String> for ResourceType {
    fn from(label: String) -> Self {
        match label.as_str() {
            "Ingest pipeline" => ResourceType::IngestPipeline,
            "Search pipeline" => ResourceType::SearchPipeline,
            "Index" => ResourceType::Index,
            "Model" => ResourceType::Model,
            "Model group" => ResourceType::ModelGroup,
            "Connector" => ResourceType::Connector,
            _ => ResourceType::Other(label),
        }
    }
}

impl From<ResourceType> for String {
    fn from(resource_type: ResourceType) -> Self {
        resource_type.label().to_string()
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A provisioned resource as the editor shows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowResource {
    pub id: String,
    #[serde(rename = "stepType")]
    pub step_type: WorkflowStepType,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
}

/// A provisioned resource as the backend reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawWorkflowResource {
    pub workflow_step_name: String,
    pub workflow_step_id: String,
    pub resource_type: String,
    pub resource_id: String,
}

/// A template instance known to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    #[serde(flatten)]
    pub template: WorkflowTemplate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_launched: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<WorkflowState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources_created: Vec<WorkflowResource>,
}

impl Workflow {
    pub fn from_template(template: WorkflowTemplate) -> Self {
        Self {
            template,
            id: None,
            last_updated: None,
            last_launched: None,
            state: None,
            error: None,
            resources_created: Vec::new(),
        }
    }
}
