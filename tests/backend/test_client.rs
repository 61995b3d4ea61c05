use searchflow::core::backend::{
    BackendClient, BackendError, SearchBackend, SearchRequest, SimulateIngestRequest,
};
use searchflow::core::template::{WorkflowState, WorkflowTemplate};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> BackendClient {
    BackendClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn simulate_posts_pipeline_and_docs() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/_ingest/pipeline/_simulate"))
        .and(query_param("verbose", "true"))
        .and(body_partial_json(json!({
            "pipeline": {"processors": [{"copy": {"source_field": "a", "target_field": "b"}}]},
            "docs": [{"_index": "products", "_id": "1", "_source": {"a": 1}}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "docs": [{"processor_results": [
                {"processor_type": "copy", "status": "success", "doc": {"_source": {"a": 1, "b": 1}}}
            ]}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = SimulateIngestRequest::from_sources(
        "products",
        json!({"processors": [{"copy": {"source_field": "a", "target_field": "b"}}]}),
        vec![json!({"a": 1})],
    );
    let response = client(&server).simulate_ingest(&request, true).await.unwrap();
    assert!(response.docs[0].processor_results[0].succeeded());
}

#[tokio::test]
async fn search_inlines_the_pipeline() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/products/_search"))
        .and(query_param("verbose_pipeline", "true"))
        .and(body_partial_json(json!({
            "query": {"match": {"title": "shoe"}},
            "search_pipeline": {"response_processors": []}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "took": 2,
            "timed_out": false,
            "_shards": {"total": 1, "successful": 1, "failed": 0},
            "hits": {"total": {"value": 0, "relation": "eq"}, "hits": []}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server)
        .search(&SearchRequest {
            index: "products".to_string(),
            query: json!({"query": {"match": {"title": "shoe"}}}),
            pipeline: Some(json!({"response_processors": []})),
            verbose: true,
        })
        .await
        .unwrap();
    assert_eq!(response.took, 2);
    assert!(response.hits.hits.is_empty());
}

#[tokio::test]
async fn workflow_lifecycle_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/_plugins/_flow_framework/workflow"))
        .and(body_partial_json(json!({"name": "products"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"workflow_id": "wf-1"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/_plugins/_flow_framework/workflow/wf-1/_provision"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"workflow_id": "wf-1"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/_plugins/_flow_framework/workflow/wf-1/_status"))
        .and(query_param("all", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "workflow_id": "wf-1",
            "state": "COMPLETED",
            "resources_created": [{
                "workflow_step_name": "create_index",
                "workflow_step_id": "create_index",
                "resource_type": "index_name",
                "resource_id": "products"
            }]
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    let id = client
        .create_workflow(&WorkflowTemplate::new("products"))
        .await
        .unwrap();
    assert_eq!(id, "wf-1");
    client.provision_workflow(&id).await.unwrap();
    let status = client.get_workflow(&id).await.unwrap();
    assert_eq!(status.state, WorkflowState::Completed);
    assert_eq!(status.resources_created[0].resource_id, "products");
}

#[tokio::test]
async fn error_status_keeps_the_response_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/_ingest/pipeline/_simulate"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_string(r#"{"error":{"reason":"unknown processor type [foo]"}}"#),
        )
        .mount(&server)
        .await;

    let request = SimulateIngestRequest::from_sources("i", json!({}), vec![json!({})]);
    let err = client(&server)
        .simulate_ingest(&request, false)
        .await
        .unwrap_err();
    match err {
        BackendError::Status { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("unknown processor type [foo]"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn undecodable_bodies_are_decode_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/_plugins/_flow_framework/workflow/wf-2/_status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client(&server).get_workflow("wf-2").await.unwrap_err();
    assert!(matches!(err, BackendError::Decode(_)));
}
