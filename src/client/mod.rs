//! Backend access client
//!
//! Stateless request/response operations against the access-control and
//! chat-routing backend. Every operation is one request, one attempt, and one
//! normalized result: an [`Envelope`] for admin operations, a `String` for
//! chat routing.

mod auth;
mod authz;
mod chat;
mod directory;
mod envelope;
mod error;
mod families;
mod types;

pub use auth::Authenticator;
pub use directory::names;
pub use envelope::{DataShape, Envelope, Status, SUCCESS_MESSAGE};
pub use error::ClientError;
pub use families::{FamilyClient, Operation, ResourceFamily};
pub use types::{
    AssociationFields, Credentials, NamedFields, PermissionQuery, RouteRequest, UserFields,
    Verdict, PERMISSION_GRANTED,
};

use crate::config::BaseUrl;
use reqwest::Method;
use serde_json::Value;
use std::time::Duration;

/// Applied to every call; callers cannot override it per request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: BaseUrl,
    client: reqwest::Client,
}

impl BackendClient {
    pub fn new(base_url: BaseUrl) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ClientError::from_network_error)?;

        Ok(Self { base_url, client })
    }

    /// Send one request and return the parsed 2xx body.
    ///
    /// An empty 2xx body parses as `null`.
    pub async fn send_json(
        &self,
        method: Method,
        endpoint: &str,
        payload: Option<&Value>,
    ) -> Result<Value, ClientError> {
        let url = self.base_url.join(endpoint);
        tracing::debug!(%method, %url, "backend request");

        let mut request = self.client.request(method.clone(), &url);
        if let Some(body) = payload {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            let err = ClientError::from_network_error(e);
            tracing::warn!(%method, %url, "backend unreachable: {}", err);
            err
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(ClientError::from_network_error)?;
        tracing::debug!(%method, %url, %status, "backend response");

        if !status.is_success() {
            let err = ClientError::from_http_status(status, &body);
            tracing::warn!(%method, %url, "backend rejected request: {}", err);
            return Err(err);
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body)
            .map_err(|e| ClientError::Malformed(format!("invalid JSON from {}: {}", endpoint, e)))
    }

    /// Send one request and normalize the outcome into an [`Envelope`]
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        payload: Option<&Value>,
        shape: DataShape,
    ) -> Envelope {
        Envelope::from_result(self.send_json(method, endpoint, payload).await, shape)
    }
}

/// Serialize a typed payload for the wire
pub(crate) fn encode<T: serde::Serialize>(payload: &T) -> Result<Value, ClientError> {
    serde_json::to_value(payload).map_err(|e| ClientError::Payload(e.to_string()))
}
