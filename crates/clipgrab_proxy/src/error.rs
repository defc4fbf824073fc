use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Failures the proxy itself answers for. Upstream statuses pass through untouched.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("no route for {0}")]
    OutsidePrefix(String),
    #[error("request body rejected: {0}")]
    Body(String),
    #[error("backend unreachable: {0}")]
    Upstream(String),
    #[error("invalid upstream response: {0}")]
    Response(String),
    #[error("failed to build http client: {0}")]
    Client(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::OutsidePrefix(_) => StatusCode::NOT_FOUND,
            ProxyError::Body(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ProxyError::Response(_) | ProxyError::Client(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
