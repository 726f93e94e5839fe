//! Shared test utilities: a mock JSON-RPC endpoint for driving the client.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// One request as seen by the endpoint.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: String,
    pub id: i64,
    pub auth: Option<String>,
    pub params: Value,
    pub content_type: Option<String>,
}

/// Staged answer for one call of a method.
#[derive(Debug, Clone)]
pub enum Reply {
    Result(Value),
    Error {
        code: i64,
        message: String,
        data: String,
    },
    Http {
        status: u16,
        body: String,
    },
}

#[derive(Default)]
struct MockState {
    calls: Vec<RecordedCall>,
    replies: HashMap<String, VecDeque<Reply>>,
}

#[derive(Debug, Deserialize)]
struct MockRequest {
    jsonrpc: String,
    method: String,
    #[serde(default)]
    params: Value,
    #[serde(default)]
    auth: Option<String>,
    id: i64,
}

/// Mock JSON-RPC endpoint. Records every call and serves staged replies
/// in order; methods without a staged reply get a small built-in default.
pub struct MockServer {
    pub addr: SocketAddr,
    state: Arc<Mutex<MockState>>,
    shutdown_tx: tokio::sync::oneshot::Sender<()>,
}

impl MockServer {
    /// Spawn the endpoint on an ephemeral port.
    pub async fn spawn() -> Self {
        let state = Arc::new(Mutex::new(MockState::default()));
        let router = Router::new()
            .route("/api_jsonrpc.php", post(handle))
            .with_state(state.clone());

        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let listener = TcpListener::bind(&addr).await.expect("Failed to bind");
        let actual_addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("Server error");
        });

        // Small delay to ensure the endpoint is ready
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        Self {
            addr: actual_addr,
            state,
            shutdown_tx,
        }
    }

    /// Endpoint URL for client configuration.
    pub fn url(&self) -> String {
        format!("http://{}/api_jsonrpc.php", self.addr)
    }

    /// Stage the next result for `method`.
    pub async fn stage(&self, method: &str, result: Value) {
        self.stage_reply(method, Reply::Result(result)).await;
    }

    /// Stage a protocol-level error for `method`.
    pub async fn stage_error(&self, method: &str, code: i64, message: &str, data: &str) {
        self.stage_reply(
            method,
            Reply::Error {
                code,
                message: message.to_string(),
                data: data.to_string(),
            },
        )
        .await;
    }

    /// Stage a raw HTTP answer for `method`.
    pub async fn stage_http(&self, method: &str, status: u16, body: &str) {
        self.stage_reply(
            method,
            Reply::Http {
                status,
                body: body.to_string(),
            },
        )
        .await;
    }

    async fn stage_reply(&self, method: &str, reply: Reply) {
        let mut state = self.state.lock().await;
        state
            .replies
            .entry(method.to_string())
            .or_default()
            .push_back(reply);
    }

    /// All recorded calls, in arrival order.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().await.calls.clone()
    }

    /// Number of recorded calls for `method`.
    pub async fn count(&self, method: &str) -> usize {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    /// Shutdown the endpoint.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
    }
}

// The real API takes content-type application/json-rpc, which axum's Json
// extractor rejects, so the body arrives as a plain string.
async fn handle(
    State(state): State<Arc<Mutex<MockState>>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let request: MockRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, format!("bad request: {e}")).into_response();
        }
    };
    if request.jsonrpc != "2.0" {
        return (StatusCode::BAD_REQUEST, "unsupported jsonrpc version").into_response();
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    let mut state = state.lock().await;
    state.calls.push(RecordedCall {
        method: request.method.clone(),
        id: request.id,
        auth: request.auth.clone(),
        params: request.params.clone(),
        content_type,
    });

    let staged = state
        .replies
        .get_mut(&request.method)
        .and_then(|queue| queue.pop_front());
    let reply = match staged {
        Some(reply) => reply,
        None => default_reply(&request, &state.calls),
    };

    match reply {
        Reply::Result(result) => envelope(json!({"result": result}), request.id),
        Reply::Error {
            code,
            message,
            data,
        } => envelope(
            json!({"error": {"code": code, "message": message, "data": data}}),
            request.id,
        ),
        Reply::Http { status, body } => (
            StatusCode::from_u16(status).expect("valid status code"),
            body,
        )
            .into_response(),
    }
}

fn envelope(mut payload: Value, id: i64) -> Response {
    payload["jsonrpc"] = json!("2.0");
    payload["id"] = json!(id);
    axum::Json(payload).into_response()
}

fn default_reply(request: &MockRequest, calls: &[RecordedCall]) -> Reply {
    match request.method.as_str() {
        "apiinfo.version" => Reply::Result(json!("7.0.0")),
        // Deterministic session tokens: the n-th login yields session-n.
        "user.login" => {
            let logins = calls.iter().filter(|c| c.method == "user.login").count();
            Reply::Result(json!(format!("session-{logins}")))
        }
        method => Reply::Error {
            code: -32601,
            message: "Method not found".to_string(),
            data: format!("no staged reply for {method}"),
        },
    }
}
