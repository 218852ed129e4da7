use async_trait::async_trait;
use podgen_core::{INVALID_INPUT_MESSAGE, Job, SamplingConfig};
use podgen_engine::{ChatTemplate, Completion, EngineAdapter, InferenceEngine, PromptTokenizer};
use podgen_error::{EngineError, EngineErrorKind, PodgenResult, TokenizerError};
use podgen_server::{JobHandler, JobMetrics, serve};
use serde_json::{Value, json};
use std::sync::Arc;

const MODEL: &str = "test-org/test-model";

/// Repeats the prompt once per requested completion; fails on "boom".
struct EchoEngine;

#[async_trait]
impl InferenceEngine for EchoEngine {
    async fn generate(&self, prompt: &str, sampling: &SamplingConfig) -> PodgenResult<Vec<Completion>> {
        if prompt.contains("boom") {
            return Err(EngineError::new(EngineErrorKind::Http("connection reset".to_string())).into());
        }
        Ok((0..*sampling.n())
            .map(|i| Completion {
                text: format!("{}#{}", prompt, i),
                finish_reason: Some("stop".to_string()),
                tokens: prompt.len(),
            })
            .collect())
    }
}

struct PlainTokenizer;

impl PromptTokenizer for PlainTokenizer {
    fn chat_template(&self) -> Option<&ChatTemplate> {
        None
    }

    fn encode(&self, text: &str) -> Result<Vec<u32>, TokenizerError> {
        Ok(text.bytes().map(u32::from).collect())
    }
}

fn handler() -> JobHandler {
    let adapter = EngineAdapter::new(MODEL, Arc::new(EchoEngine), Arc::new(PlainTokenizer));
    JobHandler::new(Arc::new(adapter), Arc::new(JobMetrics::new()))
}

async fn spawn_runner() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, handler(), std::future::pending()));
    format!("http://{}", addr)
}

async fn run_sync(base: &str, body: Value) -> Value {
    let response = reqwest::Client::new()
        .post(format!("{}/runsync", base))
        .json(&body)
        .send()
        .await
        .expect("Request sent");
    assert_eq!(response.status(), 200);
    response.json().await.expect("JSON body")
}

#[tokio::test]
async fn test_handler_rejects_input_without_prompt_or_messages() {
    let result = handler()
        .handle(&Job::new(None, json!({"sampling_params": {"n": 1}})))
        .await;
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({"error": INVALID_INPUT_MESSAGE})
    );
}

#[tokio::test]
async fn test_handler_counts_outcomes() {
    let handler = handler();
    handler.handle(&Job::new(None, json!({"prompt": "hi"}))).await;
    handler.handle(&Job::new(None, json!({"prompt": "boom"}))).await;
    handler.handle(&Job::new(None, json!({"nothing": true}))).await;

    let snapshot = handler.metrics().snapshot();
    assert_eq!(*snapshot.received(), 3);
    assert_eq!(*snapshot.succeeded(), 1);
    assert_eq!(*snapshot.failed(), 1);
    assert_eq!(*snapshot.rejected(), 1);
}

#[tokio::test]
async fn test_runsync_returns_completed_envelope() {
    let base = spawn_runner().await;

    let body = run_sync(
        &base,
        json!({"id": "job-1", "input": {"prompt": "Hello", "sampling_params": {"n": 2}}}),
    )
    .await;

    assert_eq!(
        body,
        json!({
            "id": "job-1",
            "status": "COMPLETED",
            "output": {
                "output": [
                    {"text": "Hello#0", "finish_reason": "stop", "tokens": 5},
                    {"text": "Hello#1", "finish_reason": "stop", "tokens": 5}
                ],
                "model": MODEL
            }
        })
    );
}

#[tokio::test]
async fn test_runsync_assigns_id_when_missing() {
    let base = spawn_runner().await;

    let body = run_sync(&base, json!({"input": {"messages": [{"role": "user", "content": "Hi"}]}})).await;

    let id = body["id"].as_str().expect("id is a string");
    assert!(uuid::Uuid::parse_str(id).is_ok(), "not a uuid: {}", id);
    assert_eq!(body["output"]["output"][0]["text"], "User: Hi\n\nAssistant: #0");
}

#[tokio::test]
async fn test_runsync_reports_errors_as_output() {
    let base = spawn_runner().await;

    let invalid = run_sync(&base, json!({"input": {"text": "hello"}})).await;
    assert_eq!(invalid["status"], "COMPLETED");
    assert_eq!(invalid["output"], json!({"error": INVALID_INPUT_MESSAGE}));

    let empty = run_sync(&base, json!({"input": {"prompt": ""}})).await;
    assert_eq!(empty["output"], json!({"error": "No prompt or messages provided"}));

    let failed = run_sync(&base, json!({"input": {"prompt": "boom"}})).await;
    let message = failed["output"]["error"].as_str().expect("error string");
    assert!(message.contains("connection reset"), "{}", message);
}

#[tokio::test]
async fn test_runsync_rejects_non_json_body() {
    let base = spawn_runner().await;

    let response = reqwest::Client::new()
        .post(format!("{}/runsync", base))
        .header("content-type", "application/json")
        .body("not json")
        .send()
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_health_and_metrics_endpoints() {
    let base = spawn_runner().await;
    run_sync(&base, json!({"input": {"prompt": "hi"}})).await;

    let health: Value = reqwest::get(format!("{}/health", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health, json!({"status": "healthy", "model": MODEL}));

    let metrics: Value = reqwest::get(format!("{}/metrics", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(metrics["received"], 1);
    assert_eq!(metrics["succeeded"], 1);
    assert_eq!(metrics["rejected"], 0);
}
