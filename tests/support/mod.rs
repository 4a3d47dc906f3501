//! In-process stand-in for the access-control backend
//!
//! Serves the same paths as the real service from in-memory tables so the
//! client can be exercised end to end over real HTTP.

#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Nothing listens here, so connections are refused immediately
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:1";

pub const CRUD_FAMILIES: [&str; 4] = ["users", "roles", "permissions", "servers"];

#[derive(Default)]
pub struct BackendState {
    next_id: u64,
    tables: BTreeMap<&'static str, Vec<Value>>,
    associations: Vec<Value>,
}

impl BackendState {
    fn insert(&mut self, family: &'static str, mut record: Value) -> Value {
        self.next_id += 1;
        record["id"] = json!(self.next_id);
        self.tables.entry(family).or_default().push(record.clone());
        record
    }
}

type Shared = Arc<Mutex<BackendState>>;

pub struct StubBackend {
    pub base_url: String,
    state: Shared,
}

impl StubBackend {
    pub async fn spawn() -> Self {
        let state: Shared = Arc::new(Mutex::new(BackendState::default()));
        let app = router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub backend");
        let addr = listener.local_addr().expect("stub backend address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    /// Spawn on a dedicated runtime for synchronous tests (CLI)
    pub fn spawn_blocking() -> (tokio::runtime::Runtime, Self) {
        let runtime = tokio::runtime::Runtime::new().expect("stub runtime");
        let backend = runtime.block_on(Self::spawn());
        (runtime, backend)
    }

    pub fn seed(&self, family: &'static str, record: Value) -> Value {
        self.state.lock().unwrap().insert(family, record)
    }

    pub fn seed_user(&self, username: &str) -> Value {
        self.seed(
            "users",
            json!({"username": username, "email": format!("{}@example.com", username)}),
        )
    }

    pub fn seed_association(&self, subject: &str, role: &str, domain: &str, permission: &str) {
        self.state.lock().unwrap().associations.push(json!({
            "subject": subject,
            "role": role,
            "domain": domain,
            "permission": permission,
        }));
    }

    pub fn records(&self, family: &'static str) -> Vec<Value> {
        self.state
            .lock()
            .unwrap()
            .tables
            .get(family)
            .cloned()
            .unwrap_or_default()
    }
}

fn router(state: Shared) -> Router {
    let mut app: Router<Shared> = Router::new();
    for family in CRUD_FAMILIES {
        app = app
            .route(
                &format!("/{}/", family),
                get(move |State(s): State<Shared>| async move { list(s, family) })
                    .post(move |State(s): State<Shared>, Json(body): Json<Value>| async move {
                        create(s, family, body)
                    }),
            )
            .route(
                &format!("/{}/:id/", family),
                get(move |State(s): State<Shared>, Path(id): Path<u64>| async move {
                    fetch(s, family, id)
                })
                .put(
                    move |State(s): State<Shared>, Path(id): Path<u64>, Json(body): Json<Value>| async move {
                        update(s, family, id, body)
                    },
                )
                .delete(move |State(s): State<Shared>, Path(id): Path<u64>| async move {
                    remove(s, family, id)
                }),
            );
    }

    app.route(
        "/associations/",
        get(list_associations).post(create_association),
    )
    .route("/associations/role_subject/", get(role_subjects))
    .route("/associations/test_permissions/", post(test_permissions))
    .route("/request/route/", post(route_question))
    .route("/auth/login/", post(login))
    .route("/explode/", get(explode))
    .route("/garbage/", get(garbage))
    .with_state(state)
}

fn detail(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "detail": text }))).into_response()
}

fn unique_key(family: &str) -> &'static str {
    if family == "users" {
        "username"
    } else {
        "name"
    }
}

fn list(state: Shared, family: &'static str) -> Response {
    let rows = state
        .lock()
        .unwrap()
        .tables
        .get(family)
        .cloned()
        .unwrap_or_default();
    Json(Value::Array(rows)).into_response()
}

fn create(state: Shared, family: &'static str, body: Value) -> Response {
    let key = unique_key(family);
    let Some(value) = body.get(key).and_then(Value::as_str) else {
        return detail(StatusCode::UNPROCESSABLE_ENTITY, &format!("{} is required", key));
    };

    let mut state = state.lock().unwrap();
    let exists = state
        .tables
        .get(family)
        .is_some_and(|rows| rows.iter().any(|r| r[key] == value));
    if exists {
        return detail(StatusCode::CONFLICT, &format!("{} already exists", value));
    }

    let mut record = body.clone();
    if let Some(object) = record.as_object_mut() {
        object.remove("password");
    }
    let created = state.insert(family, record);
    (StatusCode::CREATED, Json(created)).into_response()
}

fn fetch(state: Shared, family: &'static str, id: u64) -> Response {
    let state = state.lock().unwrap();
    match state
        .tables
        .get(family)
        .and_then(|rows| rows.iter().find(|r| r["id"] == id))
    {
        Some(record) => Json(record.clone()).into_response(),
        None => detail(StatusCode::NOT_FOUND, "Not found"),
    }
}

fn update(state: Shared, family: &'static str, id: u64, body: Value) -> Response {
    let mut state = state.lock().unwrap();
    let Some(record) = state
        .tables
        .get_mut(family)
        .and_then(|rows| rows.iter_mut().find(|r| r["id"] == id))
    else {
        return detail(StatusCode::NOT_FOUND, "Not found");
    };

    if let (Some(target), Some(fields)) = (record.as_object_mut(), body.as_object()) {
        for (key, value) in fields {
            if key != "password" {
                target.insert(key.clone(), value.clone());
            }
        }
    }
    Json(record.clone()).into_response()
}

fn remove(state: Shared, family: &'static str, id: u64) -> Response {
    let mut state = state.lock().unwrap();
    let Some(rows) = state.tables.get_mut(family) else {
        return detail(StatusCode::NOT_FOUND, "Not found");
    };
    let before = rows.len();
    rows.retain(|r| r["id"] != id);
    if rows.len() == before {
        detail(StatusCode::NOT_FOUND, "Not found")
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}

async fn list_associations(State(state): State<Shared>) -> Json<Value> {
    Json(Value::Array(state.lock().unwrap().associations.clone()))
}

async fn create_association(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    for key in ["subject", "role", "domain", "permission"] {
        if body.get(key).and_then(Value::as_str).is_none() {
            return detail(StatusCode::UNPROCESSABLE_ENTITY, &format!("{} is required", key));
        }
    }
    let message = format!(
        "Association created: {} is {} on {} with {}",
        body["subject"].as_str().unwrap_or_default(),
        body["role"].as_str().unwrap_or_default(),
        body["domain"].as_str().unwrap_or_default(),
        body["permission"].as_str().unwrap_or_default(),
    );
    state.lock().unwrap().associations.push(body);
    (StatusCode::CREATED, Json(json!(message))).into_response()
}

async fn role_subjects(State(state): State<Shared>) -> Json<Value> {
    let pairs: Vec<Value> = state
        .lock()
        .unwrap()
        .associations
        .iter()
        .map(|a| json!({"subject": a["subject"], "role": a["role"]}))
        .collect();
    Json(Value::Array(pairs))
}

async fn test_permissions(State(state): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let granted = state.lock().unwrap().associations.iter().any(|a| {
        a["subject"] == body["user"]
            && a["domain"] == body["resource"]
            && a["permission"] == body["permission"]
    });
    if granted {
        Json(json!("Permission granted"))
    } else {
        Json(json!("Permission denied"))
    }
}

async fn route_question(State(state): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let username = body["username"].as_str().unwrap_or_default().to_string();
    let question = body["question"].as_str().unwrap_or_default();

    if question == "flat" {
        return Json(json!({"status": "success", "message": format!("hi {}", username)}));
    }

    let known = state
        .lock()
        .unwrap()
        .tables
        .get("users")
        .is_some_and(|rows| rows.iter().any(|r| r["username"] == username.as_str()));
    if !known {
        return Json(json!({"status": "error", "data": null, "message": "Unknown user"}));
    }

    Json(json!({"status": "success", "data": {"message": format!("hi {}", username)}}))
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] == "secret" {
        Json(json!({"status": "success", "data": {"token": "stub-token"}})).into_response()
    } else {
        detail(StatusCode::UNAUTHORIZED, "Invalid credentials")
    }
}

async fn explode() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response()
}

async fn garbage() -> Response {
    (StatusCode::OK, "<html>not json</html>").into_response()
}
