use super::BackendClient;
use serde_json::Value;

impl BackendClient {
    /// Every user record, for populating choices.
    ///
    /// Failures are logged and collapse to an empty list.
    pub async fn get_all_users(&self) -> Vec<Value> {
        let envelope = self.get_users().await;
        if !envelope.is_success() {
            tracing::warn!("user directory unavailable: {}", envelope.message);
        }
        envelope.rows().to_vec()
    }

    pub async fn usernames(&self) -> Vec<String> {
        names(&self.get_all_users().await, "username")
    }
}

/// Project one string field out of a list of records, skipping records
/// that lack it
pub fn names(rows: &[Value], field: &str) -> Vec<String> {
    rows.iter()
        .filter_map(|row| row.get(field).and_then(Value::as_str))
        .map(ToString::to_string)
        .collect()
}
