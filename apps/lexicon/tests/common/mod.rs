//! Shared helpers for integration tests.
//!
//! `StubServer` is a local axum server standing in for the chat-completions
//! endpoint. It replays scripted responses in order (repeating the last one)
//! and records every request it receives.

#![allow(dead_code)]

pub mod fixtures;

use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::post,
    Router,
};
use lexicon::config::{ApiKey, GenerationConfig};
use serde_json::Value;
use tokio::task::JoinHandle;

pub const TEST_KEY: &str = "sk-test-key";

/// A request as seen by the stub.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct StubState {
    script: Arc<Vec<(StatusCode, String)>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub struct StubServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: JoinHandle<()>,
}

impl StubServer {
    /// Serve the same response to every request.
    pub async fn respond(status: StatusCode, body: impl Into<String>) -> Self {
        Self::script(vec![(status, body.into())]).await
    }

    /// Serve `script` in order, then keep repeating its last entry.
    pub async fn script(script: Vec<(StatusCode, String)>) -> Self {
        assert!(!script.is_empty(), "stub needs at least one response");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            script: Arc::new(script),
            requests: requests.clone(),
        };

        let app = Router::new()
            .route("/v1/chat/completions", post(reply))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub server");
        let addr = listener.local_addr().expect("stub address");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            base_url: format!("http://{addr}/v1"),
            requests,
            handle,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Generation settings pointing at this stub with a test credential.
    pub fn config(&self) -> GenerationConfig {
        GenerationConfig {
            api_key: ApiKey::new(TEST_KEY),
            endpoint: self.base_url.clone(),
            ..Default::default()
        }
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn reply(State(state): State<StubState>, headers: HeaderMap, body: String) -> (StatusCode, String) {
    let mut requests = state.requests.lock().unwrap();
    requests.push(RecordedRequest {
        authorization: headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_str(&body).unwrap_or(Value::Null),
    });

    let index = (requests.len() - 1).min(state.script.len() - 1);
    state.script[index].clone()
}

/// A base URL on which nothing is listening.
pub async fn closed_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/v1")
}
