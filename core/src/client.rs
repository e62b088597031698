//! The AppVeyor API client.
//!
//! # Design
//! `AppveyorClient` holds the token, the API root, a `User-Agent` and a
//! transport, and never changes after construction, so a shared reference can
//! be used from several threads at once.
//!
//! Every call is split in two halves. A pure `build_*` step produces an
//! `HttpRequest` carrying the bearer token. A parse step checks the status and
//! decodes the body. `execute` sits between them and is the only place the
//! network is touched. Callers who bring their own HTTP stack can use the
//! halves directly.

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{ClientConfig, TOKEN_ENV_VAR};
use crate::error::{ApiError, ApiResult};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::resources::{Builds, Collaborators, Deployments, Environments, Projects, Roles, Users};
use crate::types::HistoryQuery;

/// Blocking client for the AppVeyor REST API.
#[derive(Debug)]
pub struct AppveyorClient<T = UreqTransport> {
    token: SecretString,
    base_url: String,
    user_agent: String,
    transport: T,
}

impl AppveyorClient<UreqTransport> {
    /// Client for the hosted service (`https://ci.appveyor.com/api`).
    pub fn new(token: impl Into<String>) -> Self {
        Self::assemble(token.into(), ClientConfig::default(), UreqTransport::new())
    }

    pub fn with_config(token: impl Into<String>, config: ClientConfig) -> ApiResult<Self> {
        Self::with_transport(token, config, UreqTransport::new())
    }

    /// Reads the token from `APPVEYOR_TOKEN` and the optional API root from
    /// `APPVEYOR_API_URL`.
    pub fn from_env() -> ApiResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ApiResult<Self> {
        let token = lookup(TOKEN_ENV_VAR)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::Config(format!("environment variable {TOKEN_ENV_VAR} not set")))?;
        Self::with_config(token, ClientConfig::from_lookup(lookup)?)
    }
}

impl<T: Transport> AppveyorClient<T> {
    pub fn with_transport(
        token: impl Into<String>,
        mut config: ClientConfig,
        transport: T,
    ) -> ApiResult<Self> {
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        config.validate()?;
        Ok(Self::assemble(token.into(), config, transport))
    }

    fn assemble(token: String, config: ClientConfig, transport: T) -> Self {
        Self {
            token: SecretString::new(token),
            base_url: config.base_url,
            user_agent: config.user_agent,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // --- resource groups

    pub fn roles(&self) -> Roles<'_, T> {
        Roles::new(self)
    }

    pub fn users(&self) -> Users<'_, T> {
        Users::new(self)
    }

    pub fn collaborators(&self) -> Collaborators<'_, T> {
        Collaborators::new(self)
    }

    pub fn projects(&self) -> Projects<'_, T> {
        Projects::new(self)
    }

    pub fn builds(&self) -> Builds<'_, T> {
        Builds::new(self)
    }

    pub fn environments(&self) -> Environments<'_, T> {
        Environments::new(self)
    }

    pub fn deployments(&self) -> Deployments<'_, T> {
        Deployments::new(self)
    }

    // --- request building

    /// Request for `{base_url}{path}` with the auth, user-agent and accept
    /// headers set and no body. `path` starts with `/` and may carry a query.
    pub fn build_request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest {
            method,
            url: format!("{}{}", self.base_url, path),
            headers: vec![
                (
                    "authorization".to_string(),
                    format!("Bearer {}", self.token.expose_secret()),
                ),
                ("user-agent".to_string(), self.user_agent.clone()),
                ("accept".to_string(), "application/json".to_string()),
            ],
            body: None,
        }
    }

    pub fn build_json_request(
        &self,
        method: HttpMethod,
        path: &str,
        payload: &impl Serialize,
    ) -> ApiResult<HttpRequest> {
        let body = serde_json::to_string(payload)?;
        Ok(self.build_text_request(method, path, "application/json", body))
    }

    pub(crate) fn build_text_request(
        &self,
        method: HttpMethod,
        path: &str,
        content_type: &str,
        body: String,
    ) -> HttpRequest {
        let mut request = self.build_request(method, path);
        request
            .headers
            .push(("content-type".to_string(), content_type.to_string()));
        request.body = Some(body);
        request
    }

    pub fn build_list_projects(&self) -> HttpRequest {
        self.build_request(HttpMethod::Get, "/projects")
    }

    pub fn build_get_build_history(
        &self,
        account: &str,
        project: &str,
        query: &HistoryQuery,
    ) -> ApiResult<HttpRequest> {
        let path = with_query(format!("/projects/{account}/{project}/history"), query)?;
        Ok(self.build_request(HttpMethod::Get, &path))
    }

    // --- execution

    /// Sends `request` and fails with `ApiError::Request` on a non-2xx status.
    pub fn execute(&self, request: &HttpRequest) -> ApiResult<HttpResponse> {
        debug!(method = %request.method, url = %request.url, "sending AppVeyor request");
        let response = self.transport.send(request)?;
        if response.is_success() {
            debug!(status = response.status, url = %request.url, "AppVeyor request succeeded");
        } else {
            warn!(
                method = %request.method,
                url = %request.url,
                status = response.status,
                "AppVeyor request failed"
            );
        }
        check_status(response)
    }

    pub(crate) fn send_json(&self, request: HttpRequest) -> ApiResult<Value> {
        parse_json(&self.execute(&request)?)
    }

    pub(crate) fn send_text(&self, request: HttpRequest) -> ApiResult<String> {
        Ok(self.execute(&request)?.body)
    }

    pub(crate) fn get_json(&self, path: &str) -> ApiResult<Value> {
        self.send_json(self.build_request(HttpMethod::Get, path))
    }

    pub(crate) fn delete(&self, path: &str) -> ApiResult<Value> {
        self.send_json(self.build_request(HttpMethod::Delete, path))
    }

    pub(crate) fn send_payload(
        &self,
        method: HttpMethod,
        path: &str,
        payload: &impl Serialize,
    ) -> ApiResult<Value> {
        self.send_json(self.build_json_request(method, path, payload)?)
    }

    // --- accessors

    /// All projects visible to the token.
    pub fn list_projects(&self) -> ApiResult<Vec<Value>> {
        parse_project_list(&self.execute(&self.build_list_projects())?)
    }

    /// Build history of one project, with the server's default page size.
    pub fn get_build_history(&self, account: &str, project: &str) -> ApiResult<Value> {
        self.get_build_history_with(account, project, &HistoryQuery::default())
    }

    pub fn get_build_history_with(
        &self,
        account: &str,
        project: &str,
        query: &HistoryQuery,
    ) -> ApiResult<Value> {
        self.send_json(self.build_get_build_history(account, project, query)?)
    }

    /// Account name and project slug of the project building `repo_full_name`
    /// (`owner/repo`, compared case-insensitively), if any.
    pub fn account_slug_for_repo(&self, repo_full_name: &str) -> ApiResult<Option<(String, String)>> {
        let projects = self.list_projects()?;
        Ok(find_account_slug(&projects, repo_full_name))
    }
}

/// Append `query` to `path` unless it encodes to nothing.
pub(crate) fn with_query(path: String, query: &impl Serialize) -> ApiResult<String> {
    let query = serde_urlencoded::to_string(query)?;
    if query.is_empty() {
        Ok(path)
    } else {
        Ok(format!("{path}?{query}"))
    }
}

/// Map a non-2xx status to `ApiError::Request`.
pub fn check_status(response: HttpResponse) -> ApiResult<HttpResponse> {
    if response.is_success() {
        return Ok(response);
    }
    Err(ApiError::Request {
        status: response.status,
        body: response.body,
    })
}

/// Decode a successful response body. An empty body (e.g. `204 No Content`)
/// decodes as JSON `null`.
pub fn parse_json<D: DeserializeOwned>(response: &HttpResponse) -> ApiResult<D> {
    let body = response.body.trim();
    let body = if body.is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(|source| ApiError::Decode {
        source,
        body: response.body.clone(),
    })
}

/// Decode a project list. Accepts the bare array AppVeyor returns as well as
/// an object wrapping it under `projects`.
pub fn parse_project_list(response: &HttpResponse) -> ApiResult<Vec<Value>> {
    let list = match parse_json::<Value>(response)? {
        Value::Object(mut map) if map.contains_key("projects") => {
            map.remove("projects").unwrap_or(Value::Null)
        }
        other => other,
    };
    serde_json::from_value(list).map_err(|source| ApiError::Decode {
        source,
        body: response.body.clone(),
    })
}

fn find_account_slug(projects: &[Value], repo_full_name: &str) -> Option<(String, String)> {
    projects.iter().find_map(|project| {
        let repository = project["repositoryName"].as_str()?;
        if !repository.eq_ignore_ascii_case(repo_full_name) {
            return None;
        }
        let account = project["accountName"].as_str()?;
        let slug = project["slug"].as_str()?;
        Some((account.to_string(), slug.to_string()))
    })
}
