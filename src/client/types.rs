use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire text the backend returns when a permission check passes
pub const PERMISSION_GRANTED: &str = "Permission granted";

/// Payload for creating or updating a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserFields {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Payload for roles, permissions and resources, which only carry a name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NamedFields {
    pub name: String,
}

impl NamedFields {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// An authorization grant: subject holds role over domain with permission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssociationFields {
    pub subject: String,
    pub role: String,
    pub domain: String,
    pub permission: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PermissionQuery {
    pub user: String,
    pub resource: String,
    pub permission: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RouteRequest {
    pub username: String,
    pub question: String,
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Outcome of a permission check.
///
/// The backend answers with free text. Only [`PERMISSION_GRANTED`] grants;
/// any other answer is a denial that keeps the backend's wording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Granted,
    Denied { reason: String },
}

impl Verdict {
    pub fn from_wire(data: &Value) -> Self {
        match data.as_str() {
            Some(text) if text == PERMISSION_GRANTED => Verdict::Granted,
            Some(text) => Verdict::Denied {
                reason: text.to_string(),
            },
            None => Verdict::Denied {
                reason: data.to_string(),
            },
        }
    }

    pub fn is_granted(&self) -> bool {
        matches!(self, Verdict::Granted)
    }

    /// The backend text behind this verdict
    pub fn text(&self) -> &str {
        match self {
            Verdict::Granted => PERMISSION_GRANTED,
            Verdict::Denied { reason } => reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn verdict_only_grants_on_sentinel() {
        assert_eq!(Verdict::from_wire(&json!("Permission granted")), Verdict::Granted);
        assert!(!Verdict::from_wire(&json!("permission granted")).is_granted());
        assert!(!Verdict::from_wire(&json!("Permission denied")).is_granted());
        assert!(!Verdict::from_wire(&json!("Permission granted ")).is_granted());
    }

    #[test]
    fn verdict_keeps_backend_wording() {
        let verdict = Verdict::from_wire(&json!("User not found"));
        assert_eq!(verdict.text(), "User not found");

        let odd = Verdict::from_wire(&json!({"granted": true}));
        assert!(!odd.is_granted());
        assert_eq!(odd.text(), r#"{"granted":true}"#);
    }

    #[test]
    fn association_serializes_wire_field_names() {
        let fields = AssociationFields {
            subject: "alice".into(),
            role: "reader".into(),
            domain: "db1".into(),
            permission: "read".into(),
        };
        assert_eq!(
            serde_json::to_value(&fields).unwrap(),
            json!({"subject": "alice", "role": "reader", "domain": "db1", "permission": "read"})
        );
    }

    #[test]
    fn credentials_debug_hides_password() {
        let creds = Credentials {
            username: "admin".into(),
            password: "hunter2".into(),
        };
        let rendered = format!("{:?}", creds);
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("hunter2"));
    }
}
