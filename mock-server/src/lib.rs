//! In-memory imitation of the slice of the AppVeyor REST API that the client's
//! integration tests exercise.
//!
//! All routes live under `/api` and require `Authorization: Bearer {token}`
//! exactly once; anything else gets a 401 with an AppVeyor-style
//! `{"message": ...}` body. State is lost when the router is dropped.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};

const DEFAULT_SETTINGS_YAML: &str = "version: 1.0.{build}\nbuild:\n  verbosity: minimal\n";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub project_id: u64,
    pub account_name: String,
    pub name: String,
    pub slug: String,
    pub repository_type: String,
    pub repository_name: String,
    pub next_build_number: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub job_id: String,
    pub status: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    pub build_id: u64,
    pub project_id: u64,
    pub version: String,
    pub branch: Option<String>,
    pub commit_id: Option<String>,
    pub pull_request_id: Option<u64>,
    pub status: String,
    pub jobs: Vec<Job>,
    #[serde(default)]
    pub environment_variables: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
struct Store {
    projects: Vec<Project>,
    builds: Vec<Build>,
    settings_yaml: BTreeMap<u64, String>,
    last_project_id: u64,
    last_build_id: u64,
}

impl Store {
    fn project(&self, account: &str, slug: &str) -> Option<&Project> {
        self.projects
            .iter()
            .find(|p| p.account_name == account && p.slug == slug)
    }

    fn project_mut(&mut self, account: &str, slug: &str) -> Option<&mut Project> {
        self.projects
            .iter_mut()
            .find(|p| p.account_name == account && p.slug == slug)
    }

    /// Builds of a project, newest first.
    fn builds_of(&self, project_id: u64) -> impl Iterator<Item = &Build> {
        self.builds
            .iter()
            .rev()
            .filter(move |b| b.project_id == project_id)
    }
}

#[derive(Clone)]
struct AppState {
    token: Arc<str>,
    store: Arc<RwLock<Store>>,
}

pub fn app(token: &str) -> Router {
    let state = AppState {
        token: Arc::from(token),
        store: Arc::default(),
    };
    let api = Router::new()
        .route("/projects", get(list_projects).post(add_project))
        .route("/projects/{account}/{slug}", get(last_build).delete(delete_project))
        .route("/projects/{account}/{slug}/history", get(history))
        .route(
            "/projects/{account}/{slug}/settings/yaml",
            get(settings_yaml).put(update_settings_yaml),
        )
        .route(
            "/projects/{account}/{slug}/settings/build-number",
            put(update_build_number),
        )
        .route("/builds", post(start_build))
        .route("/builds/{account}/{slug}/{version}", delete(cancel_build))
        .route("/buildjobs/{job_id}/log", get(build_log))
        .route("/roles", get(list_roles))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token))
        .with_state(state);
    Router::new().nest("/api", api)
}

pub async fn run(listener: TcpListener, token: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(token)).await
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn project_not_found() -> Response {
    error(StatusCode::NOT_FOUND, "Project not found or access denied.")
}

async fn require_token(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let expected = format!("Bearer {}", state.token);
    let mut values = request.headers().get_all(header::AUTHORIZATION).iter();
    let authorized = match (values.next(), values.next()) {
        (Some(value), None) => value.as_bytes() == expected.as_bytes(),
        _ => false,
    };
    if !authorized {
        debug!(uri = %request.uri(), "rejecting request without valid token");
        return error(StatusCode::UNAUTHORIZED, "Authorization required");
    }
    next.run(request).await
}

async fn list_projects(State(state): State<AppState>) -> Json<Vec<Project>> {
    Json(state.store.read().await.projects.clone())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddProject {
    repository_provider: String,
    repository_name: String,
}

async fn add_project(
    State(state): State<AppState>,
    Json(input): Json<AddProject>,
) -> Result<Json<Project>, Response> {
    let Some((owner, name)) = input.repository_name.split_once('/') else {
        return Err(error(
            StatusCode::BAD_REQUEST,
            "Repository name must be in owner/name format.",
        ));
    };
    let slug: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();

    let mut store = state.store.write().await;
    if store.project(owner, &slug).is_some() {
        return Err(error(StatusCode::CONFLICT, "Project already exists."));
    }
    store.last_project_id += 1;
    let project = Project {
        project_id: store.last_project_id,
        account_name: owner.to_string(),
        name: name.to_string(),
        slug,
        repository_type: input.repository_provider,
        repository_name: input.repository_name.clone(),
        next_build_number: 1,
    };
    info!(project = %project.slug, "project added");
    store.projects.push(project.clone());
    Ok(Json(project))
}

async fn last_build(
    State(state): State<AppState>,
    Path((account, slug)): Path<(String, String)>,
) -> Result<Json<Value>, Response> {
    let store = state.store.read().await;
    let project = store.project(&account, &slug).ok_or_else(project_not_found)?;
    let build = store.builds_of(project.project_id).next();
    Ok(Json(json!({ "project": project, "build": build })))
}

async fn delete_project(
    State(state): State<AppState>,
    Path((account, slug)): Path<(String, String)>,
) -> Result<StatusCode, Response> {
    let mut store = state.store.write().await;
    let project_id = store
        .project(&account, &slug)
        .map(|p| p.project_id)
        .ok_or_else(project_not_found)?;
    store.projects.retain(|p| p.project_id != project_id);
    store.builds.retain(|b| b.project_id != project_id);
    store.settings_yaml.remove(&project_id);
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryParams {
    records_number: Option<usize>,
    start_build_id: Option<u64>,
    branch: Option<String>,
}

async fn history(
    State(state): State<AppState>,
    Path((account, slug)): Path<(String, String)>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Value>, Response> {
    let store = state.store.read().await;
    let project = store.project(&account, &slug).ok_or_else(project_not_found)?;
    let builds: Vec<&Build> = store
        .builds_of(project.project_id)
        .filter(|b| params.start_build_id.map_or(true, |start| b.build_id < start))
        .filter(|b| params.branch.is_none() || b.branch == params.branch)
        .take(params.records_number.unwrap_or(usize::MAX))
        .collect();
    Ok(Json(json!({ "project": project, "builds": builds })))
}

async fn settings_yaml(
    State(state): State<AppState>,
    Path((account, slug)): Path<(String, String)>,
) -> Result<String, Response> {
    let store = state.store.read().await;
    let project = store.project(&account, &slug).ok_or_else(project_not_found)?;
    Ok(store
        .settings_yaml
        .get(&project.project_id)
        .cloned()
        .unwrap_or_else(|| DEFAULT_SETTINGS_YAML.to_string()))
}

async fn update_settings_yaml(
    State(state): State<AppState>,
    Path((account, slug)): Path<(String, String)>,
    yaml: String,
) -> Result<StatusCode, Response> {
    let mut store = state.store.write().await;
    let project_id = store
        .project(&account, &slug)
        .map(|p| p.project_id)
        .ok_or_else(project_not_found)?;
    store.settings_yaml.insert(project_id, yaml);
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuildNumber {
    next_build_number: u64,
}

async fn update_build_number(
    State(state): State<AppState>,
    Path((account, slug)): Path<(String, String)>,
    Json(input): Json<BuildNumber>,
) -> Result<StatusCode, Response> {
    let mut store = state.store.write().await;
    let project = store.project_mut(&account, &slug).ok_or_else(project_not_found)?;
    project.next_build_number = input.next_build_number;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartBuildRequest {
    account_name: String,
    project_slug: String,
    branch: Option<String>,
    commit_id: Option<String>,
    pull_request_id: Option<u64>,
    #[serde(default)]
    environment_variables: BTreeMap<String, String>,
}

async fn start_build(
    State(state): State<AppState>,
    Json(input): Json<StartBuildRequest>,
) -> Result<Json<Build>, Response> {
    let has_branch = input.branch.is_some();
    let has_pr = input.pull_request_id.is_some();
    if has_branch == has_pr || (input.commit_id.is_some() && !has_branch) {
        return Err(error(
            StatusCode::BAD_REQUEST,
            "Specify either a branch (optionally with commitId) or a pullRequestId.",
        ));
    }

    let mut store = state.store.write().await;
    store.last_build_id += 1;
    let build_id = store.last_build_id;
    let project = store
        .project_mut(&input.account_name, &input.project_slug)
        .ok_or_else(project_not_found)?;
    let version = format!("1.0.{}", project.next_build_number);
    project.next_build_number += 1;

    let build = Build {
        build_id,
        project_id: project.project_id,
        version,
        branch: input.branch,
        commit_id: input.commit_id,
        pull_request_id: input.pull_request_id,
        status: "queued".to_string(),
        jobs: vec![Job {
            job_id: format!("job{build_id}"),
            status: "queued".to_string(),
        }],
        environment_variables: input.environment_variables,
    };
    info!(build_id, version = %build.version, "build queued");
    store.builds.push(build.clone());
    Ok(Json(build))
}

async fn cancel_build(
    State(state): State<AppState>,
    Path((account, slug, version)): Path<(String, String, String)>,
) -> Result<StatusCode, Response> {
    let mut store = state.store.write().await;
    let project_id = store
        .project(&account, &slug)
        .map(|p| p.project_id)
        .ok_or_else(project_not_found)?;
    let build = store
        .builds
        .iter_mut()
        .find(|b| b.project_id == project_id && b.version == version)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Build not found."))?;
    build.status = "cancelled".to_string();
    for job in &mut build.jobs {
        job.status = "cancelled".to_string();
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn build_log(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<String, Response> {
    let store = state.store.read().await;
    let build = store
        .builds
        .iter()
        .find(|b| b.jobs.iter().any(|j| j.job_id == job_id))
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Job not found."))?;
    Ok(format!(
        "Build {} started\nJob {} {}\n",
        build.version, job_id, build.status
    ))
}

async fn list_roles() -> Json<Value> {
    Json(json!([
        { "roleId": 4, "name": "Administrator", "isSystem": true },
        { "roleId": 5, "name": "User", "isSystem": true }
    ]))
}
