//! JSON-RPC transport and session handling.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tracing::debug;

use crate::auth::Credential;
use crate::codec::{JSONRPC_VERSION, RpcRequest, RpcResponse};
use crate::error::{Error, Result};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings consumed by [`ApiClient::new`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Full endpoint URL, e.g. `https://monitor.example.com/api_jsonrpc.php`.
    pub url: String,
    /// Per-request timeout in seconds; 0 selects [`DEFAULT_TIMEOUT_SECS`].
    pub timeout_secs: u64,
    /// Disables TLS certificate validation when set.
    pub insecure_skip_tls: bool,
    pub credential: Credential,
}

#[derive(Debug)]
struct Shared {
    next_id: i64,
    session: Option<String>,
}

/// Client for the monitoring server's JSON-RPC API.
///
/// One instance is meant to be shared (`Arc`) by every reconciler talking
/// to the same server. The only mutable state is the call-id counter and
/// the cached session token, both behind a single mutex that is held only
/// for the in-memory read or update, never across a network call.
#[derive(Debug)]
pub struct ApiClient {
    url: String,
    http: reqwest::Client,
    credential: Credential,
    shared: Mutex<Shared>,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.url.is_empty() {
            return Err(Error::Config("endpoint url must not be empty".to_string()));
        }
        match &config.credential {
            Credential::Token(token) if token.is_empty() => {
                return Err(Error::Config("api token must not be empty".to_string()));
            }
            Credential::Password { username, password }
                if username.is_empty() || password.is_empty() =>
            {
                return Err(Error::Config(
                    "username and password must both be set".to_string(),
                ));
            }
            _ => {}
        }

        let timeout_secs = if config.timeout_secs == 0 {
            DEFAULT_TIMEOUT_SECS
        } else {
            config.timeout_secs
        };
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .danger_accept_invalid_certs(config.insecure_skip_tls)
            .build()
            .map_err(|e| Error::Config(format!("http client: {e}")))?;

        Ok(Self {
            url: config.url,
            http,
            credential: config.credential,
            shared: Mutex::new(Shared {
                next_id: 0,
                session: None,
            }),
        })
    }

    /// Health check. Asks the server for its version without
    /// authenticating; a successful answer validates the endpoint and TLS
    /// settings before reconciliation starts.
    pub async fn ping(&self) -> Result<String> {
        self.call("apiinfo.version", json!({}), false).await
    }

    /// Issues one API call and decodes its result into `R`.
    ///
    /// With `requires_auth` set, the static token or the cached (or
    /// freshly obtained) session token is attached to the envelope. The
    /// result decode is the one place where the tolerant coercions in
    /// [`crate::codec`] take effect.
    pub async fn call<R: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
        requires_auth: bool,
    ) -> Result<R> {
        let auth = if requires_auth {
            Some(self.ensure_auth().await?)
        } else {
            None
        };
        let result = self.send(method, params, auth).await?;
        serde_json::from_value(result).map_err(|e| Error::Decode(format!("{method} result: {e}")))
    }

    /// Returns the token to attach to an authenticated call, logging in
    /// once in password mode and caching the session for the lifetime of
    /// the client. An expired session is never detected here; it surfaces
    /// as a protocol error on the call that hits it.
    async fn ensure_auth(&self) -> Result<String> {
        match &self.credential {
            Credential::Token(token) => Ok(token.clone()),
            Credential::Password { username, password } => {
                {
                    let shared = self.shared.lock().await;
                    if let Some(session) = &shared.session {
                        return Ok(session.clone());
                    }
                }
                // The lock is not held across the login call. Two callers
                // racing on an empty session may both log in; each token
                // is usable and the one stored last wins.
                let result = self
                    .send(
                        "user.login",
                        json!({"username": username, "password": password}),
                        None,
                    )
                    .await?;
                let session: String = serde_json::from_value(result)
                    .map_err(|e| Error::Decode(format!("user.login result: {e}")))?;
                debug!("obtained api session");
                let mut shared = self.shared.lock().await;
                shared.session = Some(session.clone());
                Ok(session)
            }
        }
    }

    async fn next_id(&self) -> i64 {
        let mut shared = self.shared.lock().await;
        shared.next_id += 1;
        shared.next_id
    }

    /// Sends one envelope and classifies the outcome: transport or HTTP
    /// failure, envelope decode failure, or the server's own error
    /// member. Returns the raw `result` value.
    async fn send(&self, method: &str, params: Value, auth: Option<String>) -> Result<Value> {
        let id = self.next_id().await;
        let request = RpcRequest {
            jsonrpc: JSONRPC_VERSION,
            method,
            params,
            auth,
            id,
        };
        let body =
            serde_json::to_vec(&request).map_err(|e| Error::Decode(format!("request: {e}")))?;

        debug!(method = %method, call_id = id, "api call");
        let response = self
            .http
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json-rpc")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        let envelope: RpcResponse =
            serde_json::from_str(&text).map_err(|e| Error::Decode(format!("envelope: {e}")))?;
        if let Some(error) = envelope.error {
            return Err(Error::Protocol {
                code: error.code,
                message: error.message,
                data: error.data,
            });
        }
        Ok(envelope.result.unwrap_or(Value::Null))
    }
}
