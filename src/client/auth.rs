//! Login against the backend's auth endpoint.
//!
//! The console does not require a login unless `auth.required` is set, but
//! the contract is kept so a deployment can switch it on.

use super::{encode, BackendClient, Credentials, DataShape, Envelope};
use async_trait::async_trait;
use reqwest::Method;

const LOGIN_ENDPOINT: &str = "/auth/login/";

/// Something that can check a username/password pair
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Envelope;
}

#[async_trait]
impl Authenticator for BackendClient {
    async fn login(&self, credentials: &Credentials) -> Envelope {
        tracing::debug!(username = %credentials.username, "login attempt");
        let payload = match encode(credentials) {
            Ok(payload) => payload,
            Err(e) => return Envelope::error(e.to_string(), DataShape::Item),
        };
        self.request(Method::POST, LOGIN_ENDPOINT, Some(&payload), DataShape::Item)
            .await
    }
}
