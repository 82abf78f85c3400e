/// Unified error types for the keyserver gateway
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Main error type for the gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Malformed or incomplete lookup request
    #[error("{0}")]
    BadRequest(String),

    /// Operation code the gateway does not know
    #[error("operation not found: {0}")]
    UnsupportedOperation(String),

    /// Operation the protocol names but this gateway does not serve
    #[error("{0} not implemented")]
    NotImplemented(&'static str),

    /// Path not served, or resolution produced zero keys
    #[error("not found")]
    NotFound,

    /// Identity resolution violated the single-match invariant
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Directory transport failures (connect, timeout, bad status)
    #[error("directory request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Malformed armor or key packets
    #[error("key decode error: {0}")]
    Decode(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

/// Single-match invariant failures, tagged so callers can branch on kind
#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("expected exactly 1 user to match {search:?}, but got 0")]
    NoMatch { search: String },

    #[error("expected exactly 1 user to match {search:?}, but got {count}: {candidates:?}")]
    Ambiguous {
        search: String,
        count: usize,
        candidates: Vec<String>,
    },
}

/// Convert GatewayError to an HTTP response
///
/// HKP clients expect plain-text error bodies, so the message goes out
/// verbatim as text rather than a JSON envelope. Zero-match and ambiguous
/// resolution both map to 500, matching the behavior keyserver clients of
/// this gateway already rely on; the tagged variants keep a later remap to
/// 404/409 a one-arm change.
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::BadRequest(_) | GatewayError::UnsupportedOperation(_) => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            GatewayError::NotFound => StatusCode::NOT_FOUND,
            GatewayError::Resolution(_)
            | GatewayError::Transport(_)
            | GatewayError::Decode(_)
            | GatewayError::Config(_)
            | GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.to_string()).into_response()
    }
}

/// Result type alias for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;
