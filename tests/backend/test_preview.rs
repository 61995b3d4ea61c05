use async_trait::async_trait;
use searchflow::core::backend::{
    BackendError, DocOutcome, IngestPreview, PreviewGuard, PreviewKind, PreviewRunner,
    SearchBackend, SearchPreview, SearchRequest, SearchResponse, SimulateDoc,
    SimulateIngestRequest, SimulateIngestResponse, WorkflowStatusResponse, NO_DOCUMENT_RETURNED,
};
use searchflow::core::template::WorkflowTemplate;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

fn three_doc_response() -> SimulateIngestResponse {
    serde_json::from_value(json!({
        "docs": [
            {"doc": {"_index": "products", "_id": "1", "_source": {"title": "a", "chunks": ["a"]}}},
            {"error": {"type": "illegal_argument_exception", "reason": "field [title] not present"}},
            {"doc": {"_index": "products", "_id": "3", "_source": {"title": "c", "chunks": ["c"]}}}
        ]
    }))
    .unwrap()
}

#[test]
fn failed_documents_do_not_hide_successful_ones() {
    let preview = IngestPreview::from_response(&three_doc_response());

    assert!(preview.is_partial_failure());
    let positions: Vec<usize> = preview.succeeded().map(|doc| doc.position).collect();
    assert_eq!(positions, vec![1, 3]);
    assert_eq!(
        preview.docs[1].outcome,
        DocOutcome::Failed {
            reason: "field [title] not present".to_string()
        }
    );
    assert_eq!(
        preview.sources(),
        vec![
            json!({"title": "a", "chunks": ["a"]}),
            json!({"title": "c", "chunks": ["c"]})
        ]
    );
}

#[test]
fn entries_without_a_document_count_as_failures() {
    let response: SimulateIngestResponse = serde_json::from_value(json!({
        "docs": [
            {},
            {"doc": {"_index": "products", "_id": "2", "_source": {"title": "b"}}}
        ]
    }))
    .unwrap();
    let preview = IngestPreview::from_response(&response);

    assert_eq!(
        preview.docs[0].outcome,
        DocOutcome::Failed {
            reason: NO_DOCUMENT_RETURNED.to_string()
        }
    );
    assert!(preview.is_partial_failure());
    assert_eq!(preview.sources(), vec![json!({"title": "b"})]);
}

#[test]
fn preview_serializes_outcomes_with_a_status_tag() {
    let preview = IngestPreview::from_response(&three_doc_response());
    let value = serde_json::to_value(&preview).unwrap();
    assert_eq!(value["docs"][0]["outcome"]["status"], json!("success"));
    assert_eq!(value["docs"][1]["outcome"]["status"], json!("failed"));
    assert_eq!(
        value["docs"][1]["outcome"]["reason"],
        json!("field [title] not present")
    );
}

#[test]
fn all_failed_is_not_a_partial_failure() {
    let response: SimulateIngestResponse = serde_json::from_value(json!({
        "docs": [{"error": {"reason": "boom"}}]
    }))
    .unwrap();
    let preview = IngestPreview::from_response(&response);
    assert!(!preview.is_partial_failure());
    assert_eq!(preview.failed().count(), 1);
}

#[test]
fn search_preview_lists_failed_processors() {
    let response: SearchResponse = serde_json::from_value(json!({
        "took": 5,
        "timed_out": false,
        "_shards": {"total": 1, "successful": 1, "failed": 0},
        "hits": {
            "total": {"value": 1, "relation": "eq"},
            "max_score": 1.0,
            "hits": [{"_index": "products", "_id": "1", "_score": 1.0, "_source": {"title": "a"}}]
        },
        "processor_results": [
            {"processor_name": "ml_inference", "duration_millis": 12, "status": "success"},
            {"processor_name": "rerank", "duration_millis": 3, "status": "fail", "error": "model timeout"}
        ]
    }))
    .unwrap();
    let preview = SearchPreview::from_response(&response);
    assert_eq!(preview.total_hits, Some(1));
    assert_eq!(preview.hits, vec![json!({"title": "a"})]);
    let failed: Vec<&str> = preview
        .failed_processors()
        .map(|processor| processor.processor_name.as_str())
        .collect();
    assert_eq!(failed, vec!["rerank"]);
}

#[test]
fn simulate_requests_number_documents_from_one() {
    let request = SimulateIngestRequest::from_sources(
        "products",
        json!({"processors": []}),
        vec![json!({"a": 1}), json!({"a": 2})],
    );
    assert_eq!(
        serde_json::to_value(&request.docs).unwrap(),
        json!([
            {"_index": "products", "_id": "1", "_source": {"a": 1}},
            {"_index": "products", "_id": "2", "_source": {"a": 2}}
        ])
    );
}

#[test]
fn stale_tickets_are_dropped_per_kind() {
    let guard = PreviewGuard::new();
    let first = guard.begin(PreviewKind::Ingest);
    let search = guard.begin(PreviewKind::Search);
    let second = guard.begin(PreviewKind::Ingest);

    assert_eq!(guard.accept(&first, 1), None);
    assert_eq!(guard.accept(&second, 2), Some(2));
    assert_eq!(guard.accept(&search, 3), Some(3));
    assert!(second.generation() > first.generation());
}

/// Backend that answers every simulate call with the same response (or a scripted
/// failure) and can start a competing preview while a request is in flight.
#[derive(Default)]
struct ScriptedBackend {
    interrupt: Mutex<Option<PreviewGuard>>,
    failure: Mutex<Option<BackendError>>,
    verbose_calls: Mutex<Vec<bool>>,
}

#[async_trait]
impl SearchBackend for ScriptedBackend {
    async fn simulate_ingest(
        &self,
        _request: &SimulateIngestRequest,
        verbose: bool,
    ) -> Result<SimulateIngestResponse, BackendError> {
        self.verbose_calls.lock().unwrap().push(verbose);
        if let Some(guard) = self.interrupt.lock().unwrap().take() {
            guard.begin(PreviewKind::Ingest);
        }
        match self.failure.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(three_doc_response()),
        }
    }

    async fn search(&self, _request: &SearchRequest) -> Result<SearchResponse, BackendError> {
        if let Some(guard) = self.interrupt.lock().unwrap().take() {
            guard.begin(PreviewKind::Search);
        }
        Err(BackendError::Status {
            status: 400,
            body: "bad query".to_string(),
        })
    }

    async fn create_workflow(&self, _template: &WorkflowTemplate) -> Result<String, BackendError> {
        Ok("wf".to_string())
    }

    async fn provision_workflow(&self, _workflow_id: &str) -> Result<(), BackendError> {
        Ok(())
    }

    async fn get_workflow(&self, _workflow_id: &str) -> Result<WorkflowStatusResponse, BackendError> {
        Err(BackendError::Network("offline".to_string()))
    }
}

fn docs() -> Vec<SimulateDoc> {
    vec![SimulateDoc::new("products", "1", json!({"title": "a"}))]
}

#[tokio::test]
async fn runner_returns_current_previews() {
    let backend = Arc::new(ScriptedBackend::default());
    let runner = PreviewRunner::new(backend.clone());
    let preview = runner
        .preview_ingest(json!({"processors": []}), docs(), true)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(preview.docs.len(), 3);
    assert_eq!(*backend.verbose_calls.lock().unwrap(), vec![true]);
}

#[tokio::test]
async fn runner_drops_superseded_previews() {
    let backend = Arc::new(ScriptedBackend::default());
    let runner = PreviewRunner::new(backend.clone());
    *backend.interrupt.lock().unwrap() = Some(runner.guard().clone());

    let preview = runner
        .preview_ingest(Value::Null, docs(), false)
        .await
        .unwrap();
    assert!(preview.is_none());
}

#[tokio::test]
async fn runner_propagates_backend_errors() {
    let runner = PreviewRunner::new(Arc::new(ScriptedBackend::default()));
    let request = SearchRequest {
        index: "products".to_string(),
        query: json!({"query": {"match_all": {}}}),
        pipeline: None,
        verbose: false,
    };
    let err = runner.preview_search(&request).await.unwrap_err();
    assert_eq!(
        err,
        BackendError::Status {
            status: 400,
            body: "bad query".to_string()
        }
    );
}

fn match_all() -> SearchRequest {
    SearchRequest {
        index: "products".to_string(),
        query: json!({"query": {"match_all": {}}}),
        pipeline: None,
        verbose: false,
    }
}

#[tokio::test]
async fn runner_drops_superseded_errors() {
    let backend = Arc::new(ScriptedBackend::default());
    let runner = PreviewRunner::new(backend.clone());
    *backend.interrupt.lock().unwrap() = Some(runner.guard().clone());
    *backend.failure.lock().unwrap() = Some(BackendError::Status {
        status: 500,
        body: "stale".to_string(),
    });

    let preview = runner
        .preview_ingest(Value::Null, docs(), false)
        .await
        .unwrap();
    assert!(preview.is_none());

    *backend.interrupt.lock().unwrap() = Some(runner.guard().clone());
    assert!(runner.preview_search(&match_all()).await.unwrap().is_none());
}

#[tokio::test]
async fn runner_reports_errors_for_current_ingest_previews() {
    let backend = Arc::new(ScriptedBackend::default());
    *backend.failure.lock().unwrap() = Some(BackendError::Network("reset".to_string()));
    let runner = PreviewRunner::new(backend);

    let err = runner
        .preview_ingest(Value::Null, docs(), false)
        .await
        .unwrap_err();
    assert_eq!(err, BackendError::Network("reset".to_string()));
}
