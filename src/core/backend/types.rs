use crate::core::template::{RawWorkflowResource, WorkflowState};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One input document for a simulate-ingest call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulateDoc {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_source")]
    pub source: Value,
}

impl SimulateDoc {
    pub fn new(index: impl Into<String>, id: impl Into<String>, source: Value) -> Self {
        Self {
            index: index.into(),
            id: id.into(),
            source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulateIngestRequest {
    pub pipeline: Value,
    pub docs: Vec<SimulateDoc>,
}

impl SimulateIngestRequest {
    /// Wrap plain `_source` bodies, numbering ids from 1.
    pub fn from_sources(index: &str, pipeline: Value, sources: Vec<Value>) -> Self {
        let docs = sources
            .into_iter()
            .enumerate()
            .map(|(i, source)| SimulateDoc::new(index, (i + 1).to_string(), source))
            .collect();
        Self { pipeline, docs }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ErrorReason {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IngestMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// A document after it went through the pipeline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IngestedDoc {
    #[serde(rename = "_index", default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "_source", default)]
    pub source: Value,
    #[serde(rename = "_ingest", default, skip_serializing_if = "Option::is_none")]
    pub ingest: Option<IngestMetadata>,
}

/// Per-processor outcome in a verbose simulate response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestProcessorResult {
    pub processor_type: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<IngestedDoc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorReason>,
}

impl IngestProcessorResult {
    pub fn succeeded(&self) -> bool {
        self.status == "success" && self.error.is_none()
    }
}

/// One entry of `docs` in a simulate response; normal and verbose shapes share it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SimulateDocResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<IngestedDoc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorReason>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub processor_results: Vec<IngestProcessorResult>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SimulateIngestResponse {
    #[serde(default)]
    pub docs: Vec<SimulateDocResult>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Shards {
    pub total: u64,
    pub successful: u64,
    #[serde(default)]
    pub skipped: u64,
    pub failed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalHits {
    pub value: u64,
    pub relation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source", default)]
    pub source: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Hits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<TotalHits>,
    #[serde(default)]
    pub max_score: Option<f64>,
    #[serde(default)]
    pub hits: Vec<SearchHit>,
}

/// Per-processor outcome in a verbose search response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchProcessorResult {
    pub processor_name: String,
    #[serde(default)]
    pub duration_millis: u64,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub input_data: Value,
    #[serde(default)]
    pub output_data: Value,
}

impl SearchProcessorResult {
    pub fn succeeded(&self) -> bool {
        self.status == "success" && self.error.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub took: u64,
    #[serde(default)]
    pub timed_out: bool,
    #[serde(rename = "_shards", default)]
    pub shards: Shards,
    #[serde(default)]
    pub hits: Hits,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregations: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub processor_results: Vec<SearchProcessorResult>,
}

/// Reply to create-workflow and provision calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowIdResponse {
    pub workflow_id: String,
}

/// Provisioning status of a stored workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStatusResponse {
    pub workflow_id: String,
    pub state: WorkflowState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub resources_created: Vec<RawWorkflowResource>,
}
