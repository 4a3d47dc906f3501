use super::{encode, BackendClient, ClientError, DataShape, Envelope, PermissionQuery, Verdict};
use reqwest::Method;

const TEST_PERMISSIONS_ENDPOINT: &str = "/associations/test_permissions/";

impl BackendClient {
    /// Ask the backend whether `user` holds `permission` over `resource`.
    ///
    /// On success `data` is the backend's verdict text, unchanged.
    pub async fn test_permissions(
        &self,
        user: &str,
        resource: &str,
        permission: &str,
    ) -> Envelope {
        let query = PermissionQuery {
            user: user.to_string(),
            resource: resource.to_string(),
            permission: permission.to_string(),
        };
        Envelope::from_result(self.post_permission_query(&query).await, DataShape::Item)
    }

    /// Typed variant of [`test_permissions`](Self::test_permissions)
    pub async fn check_permission(
        &self,
        query: &PermissionQuery,
    ) -> Result<Verdict, ClientError> {
        let data = self.post_permission_query(query).await?;
        let verdict = Verdict::from_wire(&data);
        tracing::debug!(
            user = %query.user,
            resource = %query.resource,
            permission = %query.permission,
            granted = verdict.is_granted(),
            "permission check"
        );
        Ok(verdict)
    }

    async fn post_permission_query(
        &self,
        query: &PermissionQuery,
    ) -> Result<serde_json::Value, ClientError> {
        let payload = encode(query)?;
        self.send_json(Method::POST, TEST_PERMISSIONS_ENDPOINT, Some(&payload))
            .await
    }
}
