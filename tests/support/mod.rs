//! In-process fake of the portal backend for integration tests.
#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use course_portal::api::ApiClient;
use course_portal::clock::ManualClock;
use course_portal::config::Config;
use course_portal::controller::PageContext;
use course_portal::target::MemoryTarget;
use course_portal::transport::HttpTransport;

pub const CSRF_TOKEN: &str = "test-csrf-token";

/// Everything the fake server knows
#[derive(Default)]
pub struct Backend {
    pub groups: Vec<Value>,
    pub students: Vec<Value>,
    pub resources: Vec<Value>,
    /// Answer the statistics endpoint with 500 and this message
    pub statistics_error: Option<String>,
    pub reorder_fails: bool,
    /// CSRF header of every state-changing request, in arrival order
    pub csrf_headers: Vec<Option<String>>,
    next_id: u64,
}

pub type Shared = Arc<Mutex<Backend>>;

impl Backend {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

pub struct TestServer {
    pub base_url: String,
    pub state: Shared,
}

impl TestServer {
    pub fn with<F: FnOnce(&mut Backend)>(&self, change: F) {
        change(&mut self.state.lock().unwrap());
    }

    pub fn read<T, F: FnOnce(&Backend) -> T>(&self, look: F) -> T {
        look(&self.state.lock().unwrap())
    }

    /// Page context wired to this server over real HTTP.
    pub fn context(&self) -> PageContext<HttpTransport, MemoryTarget> {
        let transport = HttpTransport::new(&self.base_url, Duration::from_secs(5)).unwrap();
        let api = ApiClient::new(transport).with_csrf_token(Some(CSRF_TOKEN.to_string()));
        PageContext::new(api, MemoryTarget::new(), ManualClock::new(), &Config::default()).unwrap()
    }
}

pub async fn spawn(backend: Backend) -> TestServer {
    let state: Shared = Arc::new(Mutex::new(backend));
    let app = Router::new()
        .route("/api/groups", get(list_groups).post(create_group))
        .route("/api/groups/:id", get(group_detail).delete(delete_group))
        .route("/api/students/ungrouped/all", get(ungrouped_students))
        .route("/api/admin/statistics", get(statistics))
        .route("/api/admin/groups/submission-status", get(submission_status))
        .route("/api/admin/submissions", get(submissions))
        .route("/api/admin/resources", get(list_resources).post(create_resource))
        .route("/api/admin/resources/reorder", put(reorder_resources))
        .route(
            "/api/admin/resources/:id",
            put(update_resource).delete(delete_resource),
        )
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base_url: format!("http://{}", address),
        state,
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn record_csrf(state: &mut Backend, headers: &HeaderMap) {
    let token = headers
        .get("X-CSRFToken")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.csrf_headers.push(token);
}

fn same_id(value: &Value, id: &str) -> bool {
    match &value["id"] {
        Value::Number(n) => n.to_string() == id,
        Value::String(s) => s == id,
        _ => false,
    }
}

async fn list_groups(State(state): State<Shared>) -> Json<Value> {
    Json(Value::Array(state.lock().unwrap().groups.clone()))
}

#[derive(Deserialize)]
struct NewGroup {
    group_name: String,
    #[serde(default)]
    project_title: String,
    username: String,
    password: String,
    #[serde(default)]
    members: Vec<String>,
}

async fn create_group(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(group): Json<NewGroup>,
) -> Response {
    let mut state = state.lock().unwrap();
    record_csrf(&mut state, &headers);

    if group.password.len() < 6 {
        return error(StatusCode::BAD_REQUEST, "Password too short");
    }
    if state.groups.iter().any(|g| g["username"] == group.username.as_str()) {
        return error(StatusCode::BAD_REQUEST, "Username already taken");
    }

    let (members, remaining): (Vec<Value>, Vec<Value>) = state
        .students
        .drain(..)
        .partition(|s| group.members.iter().any(|id| same_id(s, id)));
    state.students = remaining;

    let id = state.next_id();
    let group_members: Vec<Value> = members
        .iter()
        .map(|s| {
            json!({
                "student_id": s["id"],
                "member_name": format!("{} {}", s["first_name"].as_str().unwrap_or(""), s["last_name"].as_str().unwrap_or("")),
                "last_name": s["last_name"],
            })
        })
        .collect();
    state.groups.push(json!({
        "id": id,
        "group_name": group.group_name,
        "project_title": group.project_title,
        "username": group.username,
        "created_at": "2025-03-01T09:30:00Z",
        "group_members": group_members,
        "submissions": [],
    }));

    (StatusCode::CREATED, Json(json!({ "id": id }))).into_response()
}

async fn group_detail(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let state = state.lock().unwrap();
    match state.groups.iter().find(|g| same_id(g, &id)) {
        Some(group) => Json(group.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, "Group not found"),
    }
}

async fn delete_group(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut state = state.lock().unwrap();
    record_csrf(&mut state, &headers);
    let before = state.groups.len();
    state.groups.retain(|g| !same_id(g, &id));
    if state.groups.len() == before {
        return error(StatusCode::NOT_FOUND, "Group not found");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn ungrouped_students(State(state): State<Shared>) -> Json<Value> {
    Json(Value::Array(state.lock().unwrap().students.clone()))
}

async fn statistics(State(state): State<Shared>) -> Response {
    let state = state.lock().unwrap();
    if let Some(message) = &state.statistics_error {
        return error(StatusCode::INTERNAL_SERVER_ERROR, message);
    }
    let total_submissions: usize = state
        .groups
        .iter()
        .map(|g| g["submissions"].as_array().map_or(0, Vec::len))
        .sum();
    Json(json!({
        "total_groups": state.groups.len(),
        "total_submissions": total_submissions,
        "stages": (1..=6)
            .map(|n| {
                json!({
                    "stage_number": n,
                    "stage_name": format!("Stage {}", n),
                    "completed_submissions": submitted_stage(&state.groups, n),
                    "total_submissions": state.groups.len(),
                })
            })
            .collect::<Vec<_>>(),
        "recent_submissions": [],
    }))
    .into_response()
}

fn has_stage(group: &Value, stage: u64) -> bool {
    group["submissions"]
        .as_array()
        .is_some_and(|subs| subs.iter().any(|s| s["stage_number"] == stage))
}

fn submitted_stage(groups: &[Value], stage: u64) -> usize {
    groups.iter().filter(|g| has_stage(g, stage)).count()
}

async fn submission_status(State(state): State<Shared>) -> Json<Value> {
    let state = state.lock().unwrap();
    let rows = state
        .groups
        .iter()
        .map(|g| {
            json!({
                "id": g["id"],
                "group_name": g["group_name"],
                "project_title": g["project_title"],
                "stages": (1..=6)
                    .map(|n| (format!("stage_{}", n), json!(has_stage(g, n))))
                    .collect::<serde_json::Map<_, _>>(),
            })
        })
        .collect();
    Json(Value::Array(rows))
}

#[derive(Deserialize)]
struct SubmissionQuery {
    stage_number: Option<u32>,
}

async fn submissions(
    State(state): State<Shared>,
    Query(query): Query<SubmissionQuery>,
) -> Json<Value> {
    let state = state.lock().unwrap();
    let rows: Vec<Value> = state
        .groups
        .iter()
        .flat_map(|g| {
            g["submissions"]
                .as_array()
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .map(move |mut s| {
                    s["group_id"] = g["id"].clone();
                    s["groups"] = json!({ "group_name": g["group_name"], "project_title": g["project_title"] });
                    s
                })
        })
        .filter(|s| match query.stage_number {
            Some(stage) => s["stage_number"] == stage,
            None => true,
        })
        .collect();
    Json(json!({ "submissions": rows }))
}

#[derive(Deserialize)]
struct CourseQuery {
    course_id: Option<String>,
}

async fn list_resources(
    State(state): State<Shared>,
    Query(query): Query<CourseQuery>,
) -> Json<Value> {
    let state = state.lock().unwrap();
    let rows = state
        .resources
        .iter()
        .filter(|r| match &query.course_id {
            Some(course) => r["course_id"] == course.as_str(),
            None => true,
        })
        .cloned()
        .collect();
    Json(Value::Array(rows))
}

async fn create_resource(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(mut resource): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    record_csrf(&mut state, &headers);
    let id = state.next_id() + 100;
    resource["id"] = json!(id);
    state.resources.push(resource.clone());
    (StatusCode::CREATED, Json(resource)).into_response()
}

async fn update_resource(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(changes): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    record_csrf(&mut state, &headers);
    let Some(resource) = state.resources.iter_mut().find(|r| same_id(r, &id)) else {
        return error(StatusCode::NOT_FOUND, "Resource not found");
    };
    if let (Value::Object(target), Value::Object(changes)) = (resource, changes) {
        target.extend(changes);
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn delete_resource(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut state = state.lock().unwrap();
    record_csrf(&mut state, &headers);
    state.resources.retain(|r| !same_id(r, &id));
    StatusCode::NO_CONTENT.into_response()
}

#[derive(Deserialize)]
struct Reorder {
    ordered_ids: Vec<Value>,
}

async fn reorder_resources(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(order): Json<Reorder>,
) -> Response {
    let mut state = state.lock().unwrap();
    record_csrf(&mut state, &headers);
    if state.reorder_fails {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Could not save order");
    }
    let position = |r: &Value| order.ordered_ids.iter().position(|id| *id == r["id"]);
    state
        .resources
        .sort_by_key(|r| position(r).unwrap_or(usize::MAX));
    Json(json!({ "success": true })).into_response()
}
