//! Shared test utilities: a mock JSON-RPC endpoint for driving the
//! reconcilers.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
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
    pub params: Value,
}

#[derive(Default)]
struct MockState {
    calls: Vec<RecordedCall>,
    replies: HashMap<String, VecDeque<Value>>,
}

#[derive(Debug, Deserialize)]
struct MockRequest {
    method: String,
    #[serde(default)]
    params: Value,
    id: i64,
}

/// Mock JSON-RPC endpoint. Records every call and serves staged results
/// in order; a method without a staged result answers with a protocol
/// error, so a missing stage shows up as a test failure.
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
        let mut state = self.state.lock().await;
        state
            .replies
            .entry(method.to_string())
            .or_default()
            .push_back(result);
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

// The client sends content-type application/json-rpc, which axum's Json
// extractor rejects, so the body arrives as a plain string.
async fn handle(State(state): State<Arc<Mutex<MockState>>>, body: String) -> Response {
    let request: MockRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, format!("bad request: {e}")).into_response();
        }
    };

    let mut state = state.lock().await;
    state.calls.push(RecordedCall {
        method: request.method.clone(),
        params: request.params.clone(),
    });

    let staged = state
        .replies
        .get_mut(&request.method)
        .and_then(|queue| queue.pop_front());
    let payload = match staged {
        Some(result) => json!({"jsonrpc": "2.0", "result": result, "id": request.id}),
        None => json!({
            "jsonrpc": "2.0",
            "error": {
                "code": -32601,
                "message": "Method not found",
                "data": format!("no staged reply for {}", request.method),
            },
            "id": request.id,
        }),
    };
    axum::Json(payload).into_response()
}
