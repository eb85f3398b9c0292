use mockito::{Matcher, Server};
use serde_json::json;
use wire_core::{
    AzureOpenAiClient, ChatCompletionClient, ChatMessage, GenerationError, GenerationSettings,
    TextGenerationService,
};

const DEPLOYMENT: &str = "gpt-writer";
const API_KEY: &str = "test-key";
const COMPLETIONS_PATH: &str = r"^/openai/deployments/gpt-writer/chat/completions";

fn settings(endpoint: &str) -> GenerationSettings {
    GenerationSettings {
        endpoint: endpoint.to_string(),
        api_key: API_KEY.to_string(),
        deployment: DEPLOYMENT.to_string(),
        api_version: "2024-06-01".to_string(),
        timeout_secs: 5,
    }
}

fn service_for(endpoint: &str) -> TextGenerationService<AzureOpenAiClient> {
    TextGenerationService::new(AzureOpenAiClient::new(&settings(endpoint)).unwrap())
}

fn completion(text: &str) -> String {
    json!({
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": text }
        }]
    })
    .to_string()
}

#[tokio::test]
async fn generate_returns_first_completion_text() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Regex(COMPLETIONS_PATH.to_string()))
        .match_query(Matcher::UrlEncoded(
            "api-version".to_string(),
            "2024-06-01".to_string(),
        ))
        .match_header("api-key", API_KEY)
        .match_body(Matcher::Json(json!({
            "messages": [{ "role": "user", "content": "Write a haiku" }]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion("Quiet wires hum"))
        .create_async()
        .await;

    let service = service_for(&server.url());
    let text = service.generate_text("Write a haiku", None).await;

    assert_eq!(text.as_deref(), Some("Quiet wires hum"));
    mock.assert_async().await;
}

#[tokio::test]
async fn context_is_sent_as_prior_assistant_turn() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Regex(COMPLETIONS_PATH.to_string()))
        .match_body(Matcher::Json(json!({
            "messages": [
                { "role": "assistant", "content": "Chapter one ended here." },
                { "role": "user", "content": "Continue" }
            ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion("Chapter two"))
        .create_async()
        .await;

    let service = service_for(&server.url());
    let text = service
        .generate_text("Continue", Some("Chapter one ended here."))
        .await;

    assert_eq!(text.as_deref(), Some("Chapter two"));
    mock.assert_async().await;
}

#[tokio::test]
async fn server_error_yields_none() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Regex(COMPLETIONS_PATH.to_string()))
        .with_status(500)
        .with_body("upstream exploded")
        .create_async()
        .await;

    let service = service_for(&server.url());
    assert!(service.generate_text("prompt", None).await.is_none());
    mock.assert_async().await;
}

#[tokio::test]
async fn client_reports_status_and_body_on_failure() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", Matcher::Regex(COMPLETIONS_PATH.to_string()))
        .with_status(429)
        .with_body("rate limited")
        .create_async()
        .await;

    let client = AzureOpenAiClient::new(&settings(&server.url())).unwrap();
    let err = client
        .complete_chat(&[ChatMessage::user("prompt")])
        .await
        .unwrap_err();
    match err {
        GenerationError::Status { status, body } => {
            assert_eq!(status, 429);
            assert_eq!(body, "rate limited");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn empty_choices_yield_none() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", Matcher::Regex(COMPLETIONS_PATH.to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "choices": [] }).to_string())
        .create_async()
        .await;

    let client = AzureOpenAiClient::new(&settings(&server.url())).unwrap();
    let err = client
        .complete_chat(&[ChatMessage::user("prompt")])
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::EmptyCompletion));

    let service = TextGenerationService::new(client);
    assert!(service.generate_text("prompt", None).await.is_none());
}

#[tokio::test]
async fn unreachable_endpoint_yields_none() {
    let service = service_for("http://127.0.0.1:1");
    assert!(service.generate_text("prompt", None).await.is_none());
}

#[test]
fn client_requires_endpoint_and_key() {
    let mut missing_key = settings("https://example.openai.azure.com");
    missing_key.api_key = "  ".to_string();
    assert!(matches!(
        AzureOpenAiClient::new(&missing_key),
        Err(GenerationError::Config(_))
    ));

    assert!(matches!(
        AzureOpenAiClient::new(&settings("")),
        Err(GenerationError::Config(_))
    ));
}
