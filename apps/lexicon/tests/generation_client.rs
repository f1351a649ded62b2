//! Generation client tests against a local stub endpoint.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use lexicon::config::{ApiKey, GenerationConfig};
use lexicon::generation::{GenerationClient, GenerationError, OpenAiClient, RetryPolicy, RetryingClient};
use pretty_assertions::assert_eq;

use common::fixtures;
use common::{StubServer, TEST_KEY};

fn no_wait(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        base_backoff: Duration::ZERO,
    }
}

#[tokio::test]
async fn returns_reply_content() {
    let stub = StubServer::respond(StatusCode::OK, fixtures::completion("{\"word_groups\": []}")).await;
    let client = OpenAiClient::new(&stub.config()).unwrap();

    let reply = client.send("system prompt", "{\"vocabulary\": []}", true).await.unwrap();
    assert_eq!(reply, "{\"word_groups\": []}");
}

#[tokio::test]
async fn sends_bearer_token_and_two_messages() {
    let stub = StubServer::respond(StatusCode::OK, fixtures::completion("ok")).await;
    let mut config = stub.config();
    config.model = "test-model".into();
    config.temperature = 0.2;
    let client = OpenAiClient::new(&config).unwrap();

    client.send("be terse", "{\"vocabulary\": []}", true).await.unwrap();

    let requests = stub.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.authorization.as_deref(), Some(format!("Bearer {TEST_KEY}").as_str()));
    assert_eq!(request.body["model"], "test-model");
    assert_eq!(request.body["messages"].as_array().unwrap().len(), 2);
    assert_eq!(request.body["messages"][0]["role"], "system");
    assert_eq!(request.body["messages"][0]["content"], "be terse");
    assert_eq!(request.body["messages"][1]["role"], "user");
    assert_eq!(request.body["response_format"]["type"], "json_object");
    assert!((request.body["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
}

#[tokio::test]
async fn unstructured_call_omits_response_format() {
    let stub = StubServer::respond(StatusCode::OK, fixtures::completion("plain text")).await;
    let client = OpenAiClient::new(&stub.config()).unwrap();

    assert_eq!(client.send("s", "u", false).await.unwrap(), "plain text");
    assert!(stub.requests()[0].body.get("response_format").is_none());
}

#[tokio::test]
async fn http_error_carries_service_message() {
    let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
    let stub = StubServer::respond(StatusCode::UNAUTHORIZED, body).await;
    let client = OpenAiClient::new(&stub.config()).unwrap();

    match client.send("s", "u", true).await {
        Err(GenerationError::Http { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Incorrect API key provided");
        }
        other => panic!("expected HTTP error, got {other:?}"),
    }
}

#[tokio::test]
async fn http_error_falls_back_to_raw_body() {
    let stub = StubServer::respond(StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").await;
    let client = OpenAiClient::new(&stub.config()).unwrap();

    match client.send("s", "u", true).await {
        Err(GenerationError::Http { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "upstream exploded");
        }
        other => panic!("expected HTTP error, got {other:?}"),
    }
}

#[tokio::test]
async fn base_client_makes_one_attempt() {
    let stub = StubServer::respond(StatusCode::SERVICE_UNAVAILABLE, "busy").await;
    let client = OpenAiClient::new(&stub.config()).unwrap();

    assert!(client.send("s", "u", true).await.is_err());
    assert_eq!(stub.requests().len(), 1);
}

#[tokio::test]
async fn malformed_success_body_is_invalid_response() {
    let stub = StubServer::respond(StatusCode::OK, "<html>not json</html>").await;
    let client = OpenAiClient::new(&stub.config()).unwrap();

    assert!(matches!(
        client.send("s", "u", true).await,
        Err(GenerationError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn empty_choices_is_invalid_response() {
    let stub = StubServer::respond(StatusCode::OK, r#"{"choices": []}"#).await;
    let client = OpenAiClient::new(&stub.config()).unwrap();

    assert!(matches!(
        client.send("s", "u", true).await,
        Err(GenerationError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn blank_content_is_invalid_response() {
    let stub = StubServer::respond(StatusCode::OK, fixtures::completion("   ")).await;
    let client = OpenAiClient::new(&stub.config()).unwrap();

    assert!(matches!(
        client.send("s", "u", true).await,
        Err(GenerationError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn unreachable_endpoint_is_network_error() {
    let config = GenerationConfig {
        api_key: ApiKey::new(TEST_KEY),
        endpoint: common::closed_endpoint().await,
        ..Default::default()
    };
    let client = OpenAiClient::new(&config).unwrap();

    let result = client.send("s", "u", true).await;
    assert!(matches!(result, Err(GenerationError::Network(_))), "{result:?}");
}

#[tokio::test]
async fn retrying_client_recovers_from_server_errors() {
    let stub = StubServer::script(vec![
        (StatusCode::SERVICE_UNAVAILABLE, "busy".into()),
        (StatusCode::TOO_MANY_REQUESTS, "slow down".into()),
        (StatusCode::OK, fixtures::completion("finally")),
    ])
    .await;
    let client = RetryingClient::new(OpenAiClient::new(&stub.config()).unwrap(), no_wait(3));

    assert_eq!(client.send("s", "u", true).await.unwrap(), "finally");
    assert_eq!(stub.requests().len(), 3);
}

#[tokio::test]
async fn retrying_client_does_not_retry_client_errors() {
    let stub = StubServer::respond(StatusCode::BAD_REQUEST, r#"{"error": {"message": "bad model"}}"#).await;
    let client = RetryingClient::new(OpenAiClient::new(&stub.config()).unwrap(), no_wait(3));

    assert!(matches!(
        client.send("s", "u", true).await,
        Err(GenerationError::Http { status: 400, .. })
    ));
    assert_eq!(stub.requests().len(), 1);
}
