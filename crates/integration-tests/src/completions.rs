//! Mock completion service recording everything the relay sends to it.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// A request as received by the mock.
#[derive(Debug, Clone)]
pub struct ReceivedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
enum Answer {
    Json(StatusCode, Value),
    Raw(StatusCode, String),
}

/// Builder for the mock completion service.
pub struct CompletionServiceMock {
    answer: Answer,
}

impl Default for CompletionServiceMock {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionServiceMock {
    pub fn new() -> Self {
        Self {
            answer: Answer::Json(StatusCode::OK, json!({"choices": [{"message": {"content": "hi"}}]})),
        }
    }

    pub fn with_response(mut self, body: Value) -> Self {
        self.answer = Answer::Json(StatusCode::OK, body);
        self
    }

    pub fn with_error(mut self, status: StatusCode, body: Value) -> Self {
        self.answer = Answer::Json(status, body);
        self
    }

    pub fn with_raw_response(mut self, body: impl Into<String>) -> Self {
        self.answer = Answer::Raw(StatusCode::OK, body.into());
        self
    }

    pub async fn spawn(self) -> anyhow::Result<CompletionService> {
        let state = Arc::new(MockState {
            answer: self.answer,
            received: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/{*path}", post(chat_completions))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let address = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Ok(CompletionService {
            address,
            state,
            _handle: handle,
        })
    }
}

/// A running mock completion service.
pub struct CompletionService {
    pub address: SocketAddr,
    state: Arc<MockState>,
    _handle: tokio::task::JoinHandle<()>,
}

impl CompletionService {
    /// URL of the chat completions endpoint.
    pub fn url(&self) -> String {
        self.url_for("/v1/chat/completions")
    }

    /// URL of an arbitrary path on the mock.
    pub fn url_for(&self, path: &str) -> String {
        format!("http://{}{path}", self.address)
    }

    /// Every request received so far, oldest first.
    pub fn received(&self) -> Vec<ReceivedRequest> {
        self.state.received.lock().unwrap().clone()
    }
}

struct MockState {
    answer: Answer,
    received: Mutex<Vec<ReceivedRequest>>,
}

async fn chat_completions(State(state): State<Arc<MockState>>, uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };

    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);

    state.received.lock().unwrap().push(ReceivedRequest {
        path: uri.path().to_string(),
        authorization: header_value(header::AUTHORIZATION),
        content_type: header_value(header::CONTENT_TYPE),
        body,
    });

    match &state.answer {
        Answer::Json(status, body) => (*status, Json(body.clone())).into_response(),
        Answer::Raw(status, body) => (*status, body.clone()).into_response(),
    }
}

/// An address nothing listens on.
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    format!("http://{address}/v1/chat/completions")
}
