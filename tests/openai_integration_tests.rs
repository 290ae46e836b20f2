//! OpenAI-compatible gateway tests with mocked network responses
//!
//! These tests use wiremock to stand in for a chat-completions endpoint and
//! validate:
//! - Request shape (model, messages, bearer auth) sent through async-openai
//! - Error handling for failed and empty responses
//! - A configuration-driven supervisor running end to end over HTTP

#![cfg(feature = "openai")]

use serde_json::json;
use supervisor::llm::openai::OpenAIClient;
use supervisor::{AppError, LLMClient, Provider, Supervisor, SupervisorConfig, Task};
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============= Helper Functions =============

/// Create a mock chat completion response
fn mock_completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

fn client_for(server: &MockServer) -> OpenAIClient {
    OpenAIClient::new(
        "test-key".to_string(),
        format!("{}/v1/", server.uri()),
        "gpt-4o-mini".to_string(),
    )
    .unwrap()
}

// ============= Client Tests =============

#[tokio::test]
async fn test_generate_posts_user_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "messages": [{"role": "user", "content": "Hello"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_completion("Hi there")))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client_for(&server).generate("Hello").await.unwrap();
    assert_eq!(reply, "Hi there");
}

#[tokio::test]
async fn test_generate_with_system_sends_both_messages() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "messages": [
                {"role": "system", "content": "You are a statistician."},
                {"role": "user", "content": "Summarize"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_completion("Summary")))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client_for(&server)
        .generate_with_system("You are a statistician.", "Summarize")
        .await
        .unwrap();
    assert_eq!(reply, "Summary");
}

#[tokio::test]
async fn test_api_error_surfaces_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {
                "message": "Incorrect API key provided",
                "type": "invalid_request_error",
                "param": null,
                "code": "invalid_api_key"
            }
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).generate("Hello").await.unwrap_err();

    match err {
        AppError::LLM(msg) => {
            assert!(msg.starts_with("OpenAI API error"));
            assert!(msg.contains("Incorrect API key provided"));
        }
        other => panic!("expected LLM error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_choices_is_an_error() {
    let server = MockServer::start().await;

    let mut body = mock_completion("unused");
    body["choices"] = json!([]);

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let err = client_for(&server).generate("Hello").await.unwrap_err();
    assert!(matches!(err, AppError::LLM(ref msg) if msg == "No response from OpenAI"));
}

#[tokio::test]
async fn test_provider_builds_openai_client() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_completion("pong")))
        .mount(&server)
        .await;

    let provider = Provider::OpenAI {
        api_key: "test-key".to_string(),
        api_base: server.uri(),
        model: "deepseek-chat".to_string(),
    };
    let client = provider.create_client().await.unwrap();

    assert_eq!(client.model_name(), "deepseek-chat");
    assert_eq!(client.generate("ping").await.unwrap(), "pong");
}

// ============= Supervisor Over HTTP =============

#[tokio::test]
async fn test_supervisor_from_config_end_to_end() {
    let server = MockServer::start().await;
    let endpoint = "/compatible-mode/v1/chat/completions";

    Mock::given(method("POST"))
        .and(path(endpoint))
        .and(body_string_contains("Decompose the following research task"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_completion(
            r#"[{"type": "research", "goal": "literature review", "resources": ["papers", "databases"]}]"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(endpoint))
        .and(body_string_contains("Subtask type: research"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_completion(
            "Twelve trials show a small recall benefit.",
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(endpoint))
        .and(body_string_contains("Integrate the results"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_completion(
            "Caffeine modestly improves short-term recall.",
        )))
        .expect(1)
        .mount(&server)
        .await;

    // Unique to this test.
    std::env::set_var("SUPERVISOR_TEST_QWEN_KEY", "test-key");

    let config = SupervisorConfig::from_toml_str(&format!(
        r#"
[llm]
type = "qwen"
api_key_env = "SUPERVISOR_TEST_QWEN_KEY"
api_base = "{}/compatible-mode/v1"

[supervisor]
call_timeout_secs = 10

[[agents]]
name = "generator"
handles = ["research"]
"#,
        server.uri()
    ))
    .unwrap();

    let supervisor = Supervisor::from_config(&config).await.unwrap();
    let outcome = supervisor
        .process(&Task::new("effects of caffeine on memory"))
        .await;

    assert_eq!(
        serde_json::to_value(&outcome).unwrap(),
        json!({
            "status": "success",
            "integrated_result": "Caffeine modestly improves short-term recall.",
            "sub_results": {
                "research": {
                    "agent": "generator",
                    "type": "research",
                    "goal": "literature review",
                    "output": "Twelve trials show a small recall benefit."
                }
            }
        })
    );

    let report = supervisor.try_reflect().await.unwrap();
    assert_eq!(report.agent_status["generator"].last_task_success, Some(true));
    assert_eq!(report.performance_metrics.task_success_rate, 1.0);
    assert_eq!(report.performance_metrics.agent_utilization, 1.0);
}

#[tokio::test]
async fn test_from_config_requires_api_key() {
    let config = SupervisorConfig::from_toml_str(
        r#"
[llm]
type = "deepseek"
api_key_env = "SUPERVISOR_TEST_UNSET_KEY"
"#,
    )
    .unwrap();

    let err = Supervisor::from_config(&config).await.err().unwrap();
    assert!(
        matches!(err, AppError::Configuration(ref msg) if msg.contains("SUPERVISOR_TEST_UNSET_KEY"))
    );
}
