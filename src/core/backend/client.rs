use super::guard::{PreviewGuard, PreviewKind};
use super::preview::{IngestPreview, SearchPreview};
use super::types::{
    SearchResponse, SimulateDoc, SimulateIngestRequest, SimulateIngestResponse,
    WorkflowIdResponse, WorkflowStatusResponse,
};
use crate::core::template::WorkflowTemplate;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

const FLOW_FRAMEWORK_PATH: &str = "_plugins/_flow_framework/workflow";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("network error: {0}")]
    Network(String),
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode backend response: {0}")]
    Decode(String),
    #[error("invalid backend url '{0}'")]
    InvalidUrl(String),
}

/// A search request against one index, optionally through an inline pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub index: String,
    pub query: Value,
    pub pipeline: Option<Value>,
    pub verbose: bool,
}

/// Operations the editor needs from the search engine.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn simulate_ingest(
        &self,
        request: &SimulateIngestRequest,
        verbose: bool,
    ) -> Result<SimulateIngestResponse, BackendError>;

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, BackendError>;

    async fn create_workflow(&self, template: &WorkflowTemplate) -> Result<String, BackendError>;

    async fn provision_workflow(&self, workflow_id: &str) -> Result<(), BackendError>;

    async fn get_workflow(&self, workflow_id: &str) -> Result<WorkflowStatusResponse, BackendError>;
}

/// HTTP client for an OpenSearch-compatible backend.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let base_url =
            Url::parse(base_url).map_err(|_| BackendError::InvalidUrl(base_url.to_string()))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| BackendError::Network(err.to_string()))?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base_url.as_str().trim_end_matches('/').to_string();
        for segment in segments {
            if !segment.is_empty() {
                url.push('/');
                url.push_str(segment.trim_matches('/'));
            }
        }
        Url::parse(&url).map_err(|_| BackendError::InvalidUrl(url))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, BackendError> {
        let response = request
            .send()
            .await
            .map_err(|err| BackendError::Network(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| BackendError::Network(err.to_string()))?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "backend request failed");
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(|err| BackendError::Decode(err.to_string()))
    }
}

#[async_trait]
impl SearchBackend for BackendClient {
    async fn simulate_ingest(
        &self,
        request: &SimulateIngestRequest,
        verbose: bool,
    ) -> Result<SimulateIngestResponse, BackendError> {
        let mut url = self.endpoint(&["_ingest", "pipeline", "_simulate"])?;
        if verbose {
            url.query_pairs_mut().append_pair("verbose", "true");
        }
        debug!(docs = request.docs.len(), verbose, "simulating ingest pipeline");
        self.send(self.http.post(url).json(request)).await
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, BackendError> {
        let mut url = self.endpoint(&[request.index.as_str(), "_search"])?;
        if request.verbose {
            url.query_pairs_mut().append_pair("verbose_pipeline", "true");
        }
        let mut body = match &request.query {
            Value::Object(map) => map.clone(),
            _ => serde_json::Map::new(),
        };
        if let Some(pipeline) = &request.pipeline {
            body.insert("search_pipeline".to_string(), pipeline.clone());
        }
        debug!(index = %request.index, verbose = request.verbose, "running search");
        self.send(self.http.post(url).json(&body)).await
    }

    async fn create_workflow(&self, template: &WorkflowTemplate) -> Result<String, BackendError> {
        let url = self.endpoint(&[FLOW_FRAMEWORK_PATH])?;
        let response: WorkflowIdResponse = self.send(self.http.post(url).json(template)).await?;
        debug!(workflow_id = %response.workflow_id, "created workflow");
        Ok(response.workflow_id)
    }

    async fn provision_workflow(&self, workflow_id: &str) -> Result<(), BackendError> {
        let url = self.endpoint(&[FLOW_FRAMEWORK_PATH, workflow_id, "_provision"])?;
        let _: WorkflowIdResponse = self.send(self.http.post(url)).await?;
        Ok(())
    }

    async fn get_workflow(&self, workflow_id: &str) -> Result<WorkflowStatusResponse, BackendError> {
        let mut url = self.endpoint(&[FLOW_FRAMEWORK_PATH, workflow_id, "_status"])?;
        url.query_pairs_mut().append_pair("all", "true");
        self.send(self.http.get(url)).await
    }
}

/// Runs previews against a backend, discarding responses that were superseded.
#[derive(Clone)]
pub struct PreviewRunner {
    backend: Arc<dyn SearchBackend>,
    guard: PreviewGuard,
}

impl PreviewRunner {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            backend,
            guard: PreviewGuard::new(),
        }
    }

    pub fn guard(&self) -> &PreviewGuard {
        &self.guard
    }

    /// `Ok(None)` means a newer ingest preview started while this one was in flight,
    /// whether or not this call succeeded.
    pub async fn preview_ingest(
        &self,
        pipeline: Value,
        docs: Vec<SimulateDoc>,
        verbose: bool,
    ) -> Result<Option<IngestPreview>, BackendError> {
        let kind = if verbose {
            PreviewKind::IngestVerbose
        } else {
            PreviewKind::Ingest
        };
        let ticket = self.guard.begin(kind);
        let request = SimulateIngestRequest { pipeline, docs };
        let result = self.backend.simulate_ingest(&request, verbose).await;
        if !self.guard.is_current(&ticket) {
            debug!(kind = ?kind, "dropping superseded ingest preview");
            return Ok(None);
        }
        Ok(Some(IngestPreview::from_response(&result?)))
    }

    pub async fn preview_search(
        &self,
        request: &SearchRequest,
    ) -> Result<Option<SearchPreview>, BackendError> {
        let ticket = self.guard.begin(PreviewKind::Search);
        let result = self.backend.search(request).await;
        if !self.guard.is_current(&ticket) {
            debug!("dropping superseded search preview");
            return Ok(None);
        }
        Ok(Some(SearchPreview::from_response(&result?)))
    }
}
