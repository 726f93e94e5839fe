use thiserror::Error;

/// Failure kinds surfaced by the client and the reconcilers built on it.
///
/// Nothing is retried and nothing is recovered silently; every variant
/// aborts the operation that produced it and is reported to the caller
/// with its kind intact so callers branch on the variant, not on message
/// text.
#[derive(Debug, Error)]
pub enum Error {
    /// The client or credential settings are unusable. Raised at
    /// construction time, before any network traffic.
    #[error("configuration: {0}")]
    Config(String),

    /// A desired-state field failed local validation. Consumes no remote
    /// call.
    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// A name lookup matched no remote object.
    #[error("{kind} {name:?} not found")]
    NotFound { kind: &'static str, name: String },

    /// A name lookup matched more than one remote object.
    #[error("{kind} {name:?} matches more than one object")]
    Ambiguous { kind: &'static str, name: String },

    /// The HTTP exchange itself failed (connect, TLS, timeout).
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered outside the 2xx range. Carries the raw body.
    #[error("unexpected http status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The response envelope or result payload did not match the expected
    /// shape.
    #[error("decode: {0}")]
    Decode(String),

    /// The server's own error envelope: numeric code, message, and an
    /// optional detail string.
    #[error("api error {code}: {message} ({data})")]
    Protocol {
        code: i64,
        message: String,
        data: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
