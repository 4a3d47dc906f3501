//! Typed errors for backend calls
//!
//! Every failure the client can observe falls into one of four kinds:
//! - transport: no response arrived (connect, timeout, DNS)
//! - HTTP: a response arrived with a non-2xx status
//! - structural: a 2xx response whose body is not what the operation needs
//! - application: the backend itself declared `status: "error"` in a 2xx body
//!
//! Operations convert these into an [`Envelope`](super::Envelope) (or a plain
//! sentence for chat routing) before handing them to the front-end.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The request did not complete within the fixed timeout
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Connection refused, DNS failure, TLS handshake failure, etc.
    #[error("Connection failed: {0}")]
    Connect(String),

    /// Any other failure before a response was received
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-2xx status
    #[error("HTTP {status}: {detail}")]
    Http { status: StatusCode, detail: String },

    /// 2xx response whose body is not valid JSON or lacks a required field
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// 2xx response whose body declares `status: "error"`
    #[error("Backend error: {0}")]
    Application(String),

    /// The request payload could not be encoded as JSON
    #[error("Invalid payload: {0}")]
    Payload(String),

    /// An item id that would not stay inside its family's URL
    #[error("Invalid resource id '{0}'")]
    InvalidId(String),

    /// The family does not expose this operation on the backend
    #[error("{operation} is not available for {family}")]
    Unsupported {
        family: &'static str,
        operation: &'static str,
    },
}

impl ClientError {
    /// No response was received at all
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ClientError::Timeout(_) | ClientError::Connect(_) | ClientError::Transport(_)
        )
    }

    pub fn is_http(&self) -> bool {
        matches!(self, ClientError::Http { .. })
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, ClientError::Malformed(_))
    }

    pub fn is_application(&self) -> bool {
        matches!(self, ClientError::Application(_))
    }

    /// HTTP status of the response, if one was received
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Convert network/connection errors into a typed error
    pub fn from_network_error(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout(e.to_string())
        } else if e.is_connect() {
            ClientError::Connect(e.to_string())
        } else if let Some(status) = e.status() {
            ClientError::Http {
                status,
                detail: e.to_string(),
            }
        } else if e.is_decode() {
            ClientError::Malformed(e.to_string())
        } else {
            ClientError::Transport(e.to_string())
        }
    }

    /// Build an HTTP error from the status and the raw response body.
    ///
    /// FastAPI-style bodies (`{"detail": "..."}`) and envelope-style bodies
    /// (`{"message": "..."}`) contribute their text; anything else is kept
    /// verbatim.
    pub fn from_http_status(status: StatusCode, body: &str) -> Self {
        let detail = extract_detail(body).unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                status.canonical_reason().unwrap_or("no body").to_string()
            } else {
                trimmed.to_string()
            }
        });
        ClientError::Http { status, detail }
    }
}

fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["detail", "message"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(ToString::to_string)
}
