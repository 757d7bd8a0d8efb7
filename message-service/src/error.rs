use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Failures of a single invocation. Each variant maps to a fixed status and a
/// fixed body; the underlying cause is only ever logged.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("failed to connect to document store: {0:#}")]
    Connection(anyhow::Error),

    #[error("invalid request body: {0:#}")]
    Parse(anyhow::Error),

    #[error("failed to serialize messages: {0:#}")]
    Serialize(anyhow::Error),

    #[error("failed to write message: {0:#}")]
    StoreWrite(anyhow::Error),

    #[error("method {0} not allowed")]
    MethodNotAllowed(Method),
}

impl MessageError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            MessageError::Parse(_) => StatusCode::BAD_REQUEST,
            MessageError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            MessageError::Connection(_)
            | MessageError::Serialize(_)
            | MessageError::StoreWrite(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body returned to the caller.
    pub fn public_message(&self) -> &'static str {
        match self {
            MessageError::Connection(_) => "Internal Server Error",
            MessageError::Parse(_) => "Invalid JSON",
            MessageError::Serialize(_) => "Failed to parse data",
            MessageError::StoreWrite(_) => "Failed to save message",
            MessageError::MethodNotAllowed(_) => "Method Not Allowed",
        }
    }

    /// Short label used for logs and the store error counter.
    pub fn kind(&self) -> &'static str {
        match self {
            MessageError::Connection(_) => "connection",
            MessageError::Parse(_) => "parse",
            MessageError::Serialize(_) => "serialize",
            MessageError::StoreWrite(_) => "store_write",
            MessageError::MethodNotAllowed(_) => "method_not_allowed",
        }
    }
}

impl From<serde_json::Error> for MessageError {
    fn from(err: serde_json::Error) -> Self {
        MessageError::Parse(anyhow::Error::new(err))
    }
}

impl IntoResponse for MessageError {
    fn into_response(self) -> Response {
        let mut res = (
            self.status_code(),
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            )],
            self.public_message(),
        )
            .into_response();

        if let MessageError::MethodNotAllowed(_) = self {
            res.headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("GET, POST"));
        }

        res
    }
}
