//! The normalized `{status, data, message}` result every operation returns

use super::error::ClientError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message attached to every successful envelope
pub const SUCCESS_MESSAGE: &str = "Request successful";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Whether an operation returns a collection or a single entity.
///
/// Decides the `data` value of an error envelope so callers can always
/// iterate (`[]`) or null-check (`null`) without branching on the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataShape {
    Collection,
    Item,
}

impl DataShape {
    pub fn empty(self) -> Value {
        match self {
            DataShape::Collection => Value::Array(Vec::new()),
            DataShape::Item => Value::Null,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub status: Status,
    pub data: Value,
    pub message: String,
}

impl Envelope {
    pub fn success(data: Value) -> Self {
        Self {
            status: Status::Success,
            data,
            message: SUCCESS_MESSAGE.to_string(),
        }
    }

    pub fn error(message: impl Into<String>, shape: DataShape) -> Self {
        Self {
            status: Status::Error,
            data: shape.empty(),
            message: message.into(),
        }
    }

    pub fn from_result(result: Result<Value, ClientError>, shape: DataShape) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(e) => Self::error(e.to_string(), shape),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    /// Rows of a list response; empty for errors and non-array data
    pub fn rows(&self) -> &[Value] {
        self.data.as_array().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Failure declared by the backend inside a successful HTTP exchange.
    ///
    /// The client never rewrites such bodies; a 2xx response carrying
    /// `{"status": "error", ...}` still produces a success envelope whose
    /// `data` is that body. This accessor lets callers look for it.
    pub fn declared_failure(&self) -> Option<&str> {
        if !self.is_success() {
            return None;
        }
        let declared = self.data.get("status").and_then(Value::as_str)?;
        if declared != "error" {
            return None;
        }
        Some(
            self.data
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("backend reported an error"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_success_wraps_body_unmodified() {
        let body = json!([{"id": 1, "name": "Admin"}]);
        let env = Envelope::success(body.clone());
        assert!(env.is_success());
        assert_eq!(env.data, body);
        assert_eq!(env.message, "Request successful");
        assert_eq!(env.rows().len(), 1);
    }

    #[test]
    fn test_error_data_follows_shape() {
        let list = Envelope::error("down", DataShape::Collection);
        assert_eq!(list.data, json!([]));
        assert!(list.rows().is_empty());

        let item = Envelope::error("down", DataShape::Item);
        assert_eq!(item.data, Value::Null);
        assert_eq!(item.message, "down");
    }

    #[test]
    fn test_serializes_lowercase_status() {
        let env = Envelope::error("nope", DataShape::Item);
        let wire = serde_json::to_value(&env).unwrap();
        assert_eq!(
            wire,
            json!({"status": "error", "data": null, "message": "nope"})
        );
    }

    #[test]
    fn test_declared_failure_is_separate_from_envelope_status() {
        let env = Envelope::success(json!({"status": "error", "message": "role exists"}));
        assert!(env.is_success());
        assert_eq!(env.declared_failure(), Some("role exists"));

        let ok = Envelope::success(json!({"status": "success", "data": {}}));
        assert_eq!(ok.declared_failure(), None);

        let synthesized = Envelope::error("HTTP 500", DataShape::Item);
        assert_eq!(synthesized.declared_failure(), None);
    }

    #[test]
    fn test_from_result_uses_error_display() {
        let env = Envelope::from_result(
            Err(ClientError::Connect("refused".into())),
            DataShape::Collection,
        );
        assert_eq!(env.status, Status::Error);
        assert_eq!(env.message, "Connection failed: refused");
        assert_eq!(env.data, json!([]));
    }

    proptest! {
        #[test]
        fn prop_error_envelopes_never_carry_data(message in ".*", list in any::<bool>()) {
            let shape = if list { DataShape::Collection } else { DataShape::Item };
            let env = Envelope::error(message.clone(), shape);
            prop_assert!(!env.is_success());
            prop_assert_eq!(env.message, message);
            prop_assert!(env.data.is_null() || env.data == json!([]));
        }
    }
}
