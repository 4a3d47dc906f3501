//! Table-driven CRUD for the resource families
//!
//! One generic implementation serves every family. The table below records
//! each family's wire path, its label and the operations the backend exposes
//! for it; anything outside that set is refused without touching the network.

use super::{encode, BackendClient, ClientError, DataShape, Envelope};
use super::{AssociationFields, NamedFields, UserFields};
use reqwest::Method;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceFamily {
    Users,
    Roles,
    Permissions,
    /// Served from `/servers/` on the backend
    Resources,
    Associations,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn method(self) -> Method {
        match self {
            Operation::List | Operation::Get => Method::GET,
            Operation::Create => Method::POST,
            Operation::Update => Method::PUT,
            Operation::Delete => Method::DELETE,
        }
    }

    pub fn shape(self) -> DataShape {
        match self {
            Operation::List => DataShape::Collection,
            _ => DataShape::Item,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Get => "get",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

const FULL_CRUD: &[Operation] = &[
    Operation::List,
    Operation::Get,
    Operation::Create,
    Operation::Update,
    Operation::Delete,
];

struct FamilySpec {
    family: ResourceFamily,
    path: &'static str,
    label: &'static str,
    singular: &'static str,
    operations: &'static [Operation],
}

static FAMILIES: [FamilySpec; 5] = [
    FamilySpec {
        family: ResourceFamily::Users,
        path: "users",
        label: "Users",
        singular: "user",
        operations: FULL_CRUD,
    },
    FamilySpec {
        family: ResourceFamily::Roles,
        path: "roles",
        label: "Roles",
        singular: "role",
        operations: FULL_CRUD,
    },
    FamilySpec {
        family: ResourceFamily::Permissions,
        path: "permissions",
        label: "Permissions",
        singular: "permission",
        operations: FULL_CRUD,
    },
    FamilySpec {
        family: ResourceFamily::Resources,
        path: "servers",
        label: "Resources",
        singular: "resource",
        operations: FULL_CRUD,
    },
    FamilySpec {
        family: ResourceFamily::Associations,
        path: "associations",
        label: "Associations",
        singular: "association",
        operations: &[Operation::List, Operation::Create],
    },
];

impl ResourceFamily {
    pub const ALL: [ResourceFamily; 5] = [
        ResourceFamily::Users,
        ResourceFamily::Roles,
        ResourceFamily::Permissions,
        ResourceFamily::Resources,
        ResourceFamily::Associations,
    ];

    fn spec(self) -> &'static FamilySpec {
        // The table holds one entry per variant in declaration order
        let spec = &FAMILIES[self as usize];
        debug_assert_eq!(spec.family, self);
        spec
    }

    /// Path segment on the wire (`servers` for resources)
    pub fn path(self) -> &'static str {
        self.spec().path
    }

    /// Human-facing name
    pub fn label(self) -> &'static str {
        self.spec().label
    }

    pub fn singular(self) -> &'static str {
        self.spec().singular
    }

    pub fn operations(self) -> &'static [Operation] {
        self.spec().operations
    }

    pub fn supports(self, operation: Operation) -> bool {
        self.operations().contains(&operation)
    }

    /// `/<family>/`
    pub fn collection_endpoint(self) -> String {
        format!("/{}/", self.path())
    }

    /// `/<family>/<id>/`
    ///
    /// The id must stay a single path segment, so anything the URL parser
    /// would treat as a separator, query, fragment or dot segment is refused.
    pub fn item_endpoint(self, id: &str) -> Result<String, ClientError> {
        let escapes = id.is_empty()
            || id == "."
            || id == ".."
            || id.chars().any(|c| {
                matches!(c, '/' | '\\' | '?' | '#' | '%') || c.is_whitespace() || c.is_control()
            });
        if escapes {
            return Err(ClientError::InvalidId(id.to_string()));
        }
        Ok(format!("/{}/{}/", self.path(), id))
    }
}

impl fmt::Display for ResourceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ResourceFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "users" | "user" => Ok(Self::Users),
            "roles" | "role" => Ok(Self::Roles),
            "permissions" | "permission" => Ok(Self::Permissions),
            "resources" | "resource" | "servers" | "server" => Ok(Self::Resources),
            "associations" | "association" => Ok(Self::Associations),
            other => Err(format!("unknown resource family '{}'", other)),
        }
    }
}

/// CRUD operations scoped to one family
#[derive(Debug, Clone, Copy)]
pub struct FamilyClient<'a> {
    client: &'a BackendClient,
    family: ResourceFamily,
}

impl<'a> FamilyClient<'a> {
    pub fn family(&self) -> ResourceFamily {
        self.family
    }

    pub async fn list(&self) -> Envelope {
        self.dispatch(Operation::List, None, None::<&()>).await
    }

    pub async fn get(&self, id: &str) -> Envelope {
        self.dispatch(Operation::Get, Some(id), None::<&()>).await
    }

    pub async fn create<T: Serialize>(&self, fields: &T) -> Envelope {
        self.dispatch(Operation::Create, None, Some(fields)).await
    }

    pub async fn update<T: Serialize>(&self, id: &str, fields: &T) -> Envelope {
        self.dispatch(Operation::Update, Some(id), Some(fields)).await
    }

    pub async fn delete(&self, id: &str) -> Envelope {
        self.dispatch(Operation::Delete, Some(id), None::<&()>).await
    }

    async fn dispatch<T: Serialize>(
        &self,
        operation: Operation,
        id: Option<&str>,
        fields: Option<&T>,
    ) -> Envelope {
        let shape = operation.shape();
        if !self.family.supports(operation) {
            let err = ClientError::Unsupported {
                family: self.family.path(),
                operation: operation.name(),
            };
            return Envelope::error(err.to_string(), shape);
        }

        let endpoint = match id.map(|id| self.family.item_endpoint(id)).transpose() {
            Ok(Some(endpoint)) => endpoint,
            Ok(None) => self.family.collection_endpoint(),
            Err(e) => {
                tracing::warn!(family = self.family.path(), "refusing request: {}", e);
                return Envelope::error(e.to_string(), shape);
            }
        };

        let payload = match fields.map(encode).transpose() {
            Ok(payload) => payload,
            Err(e) => return Envelope::error(e.to_string(), shape),
        };

        self.client
            .request(operation.method(), &endpoint, payload.as_ref(), shape)
            .await
    }
}

impl BackendClient {
    pub fn family(&self, family: ResourceFamily) -> FamilyClient<'_> {
        FamilyClient {
            client: self,
            family,
        }
    }

    pub fn users(&self) -> FamilyClient<'_> {
        self.family(ResourceFamily::Users)
    }

    pub fn roles(&self) -> FamilyClient<'_> {
        self.family(ResourceFamily::Roles)
    }

    pub fn permissions(&self) -> FamilyClient<'_> {
        self.family(ResourceFamily::Permissions)
    }

    pub fn resources(&self) -> FamilyClient<'_> {
        self.family(ResourceFamily::Resources)
    }

    pub fn associations(&self) -> FamilyClient<'_> {
        self.family(ResourceFamily::Associations)
    }

    pub async fn get_users(&self) -> Envelope {
        self.users().list().await
    }

    pub async fn create_user(&self, username: &str, email: &str, password: &str) -> Envelope {
        let fields = UserFields {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        self.users().create(&fields).await
    }

    pub async fn get_roles(&self) -> Envelope {
        self.roles().list().await
    }

    pub async fn create_role(&self, name: &str) -> Envelope {
        self.roles().create(&NamedFields::new(name)).await
    }

    pub async fn get_permissions(&self) -> Envelope {
        self.permissions().list().await
    }

    pub async fn create_permission(&self, name: &str) -> Envelope {
        self.permissions().create(&NamedFields::new(name)).await
    }

    pub async fn get_resources(&self) -> Envelope {
        self.resources().list().await
    }

    pub async fn get_resource(&self, id: &str) -> Envelope {
        self.resources().get(id).await
    }

    pub async fn create_resource(&self, name: &str) -> Envelope {
        self.resources().create(&NamedFields::new(name)).await
    }

    pub async fn update_resource(&self, id: &str, name: &str) -> Envelope {
        self.resources().update(id, &NamedFields::new(name)).await
    }

    pub async fn get_associations(&self) -> Envelope {
        self.associations().list().await
    }

    pub async fn create_association(&self, fields: &AssociationFields) -> Envelope {
        self.associations().create(fields).await
    }

    /// Which subjects hold which roles
    pub async fn get_role_subject(&self) -> Envelope {
        self.request(
            Method::GET,
            "/associations/role_subject/",
            None,
            DataShape::Collection,
        )
        .await
    }
}
