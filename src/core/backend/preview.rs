use super::types::{SearchResponse, SimulateIngestResponse};
use serde::Serialize;
use serde_json::Value;

/// Failure reason for a result entry that carries neither a document nor an error.
pub const NO_DOCUMENT_RETURNED: &str = "no document returned";

/// Outcome of one document in an ingest preview.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DocOutcome {
    Success { source: Value },
    Failed { reason: String },
}

impl DocOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DocOutcome::Success { .. })
    }
}

/// Outcome of one processor for one document, from a verbose simulate call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessorOutcome {
    pub processor_type: String,
    pub tag: Option<String>,
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocPreview {
    /// 1-based position in the request batch.
    pub position: usize,
    pub outcome: DocOutcome,
    pub processors: Vec<ProcessorOutcome>,
}

/// Ingest preview where failed documents never hide the successful ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestPreview {
    pub docs: Vec<DocPreview>,
}

impl IngestPreview {
    pub fn from_response(response: &SimulateIngestResponse) -> Self {
        let docs = response
            .docs
            .iter()
            .enumerate()
            .map(|(i, result)| {
                let processors: Vec<ProcessorOutcome> = result
                    .processor_results
                    .iter()
                    .map(|processor| ProcessorOutcome {
                        processor_type: processor.processor_type.clone(),
                        tag: processor.tag.clone(),
                        success: processor.succeeded(),
                        error: processor.error.as_ref().map(|err| err.reason.clone()),
                    })
                    .collect();

                // Verbose responses put the final document on the last processor.
                let outcome = if let Some(err) = &result.error {
                    DocOutcome::Failed {
                        reason: err.reason.clone(),
                    }
                } else if let Some(failed) = processors.iter().find(|p| !p.success) {
                    DocOutcome::Failed {
                        reason: failed
                            .error
                            .clone()
                            .unwrap_or_else(|| format!("{} failed", failed.processor_type)),
                    }
                } else {
                    let doc = result.doc.as_ref().or_else(|| {
                        result
                            .processor_results
                            .last()
                            .and_then(|processor| processor.doc.as_ref())
                    });
                    match doc {
                        Some(doc) => DocOutcome::Success {
                            source: doc.source.clone(),
                        },
                        None => DocOutcome::Failed {
                            reason: NO_DOCUMENT_RETURNED.to_string(),
                        },
                    }
                };

                DocPreview {
                    position: i + 1,
                    outcome,
                    processors,
                }
            })
            .collect();
        Self { docs }
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &DocPreview> {
        self.docs.iter().filter(|doc| doc.outcome.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &DocPreview> {
        self.docs.iter().filter(|doc| !doc.outcome.is_success())
    }

    pub fn is_partial_failure(&self) -> bool {
        self.succeeded().next().is_some() && self.failed().next().is_some()
    }

    /// Transformed sources of successful documents, in batch order.
    pub fn sources(&self) -> Vec<Value> {
        self.succeeded()
            .filter_map(|doc| match &doc.outcome {
                DocOutcome::Success { source } => Some(source.clone()),
                DocOutcome::Failed { .. } => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchProcessorOutcome {
    pub processor_name: String,
    pub success: bool,
    pub duration_millis: u64,
    pub error: Option<String>,
}

/// Search preview: the hits plus what each pipeline processor did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchPreview {
    pub total_hits: Option<u64>,
    pub hits: Vec<Value>,
    pub processors: Vec<SearchProcessorOutcome>,
}

impl SearchPreview {
    pub fn from_response(response: &SearchResponse) -> Self {
        Self {
            total_hits: response.hits.total.as_ref().map(|total| total.value),
            hits: response
                .hits
                .hits
                .iter()
                .map(|hit| hit.source.clone())
                .collect(),
            processors: response
                .processor_results
                .iter()
                .map(|processor| SearchProcessorOutcome {
                    processor_name: processor.processor_name.clone(),
                    success: processor.succeeded(),
                    duration_millis: processor.duration_millis,
                    error: processor.error.clone(),
                })
                .collect(),
        }
    }

    pub fn failed_processors(&self) -> impl Iterator<Item = &SearchProcessorOutcome> {
        self.processors.iter().filter(|processor| !processor.success)
    }
}
