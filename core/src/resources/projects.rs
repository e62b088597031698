use serde_json::{json, Value};

use crate::client::AppveyorClient;
use crate::error::ApiResult;
use crate::http::{HttpMethod, Transport};
use crate::types::{HistoryQuery, RepositoryProvider};

/// Projects and their builds, settings and deployments.
///
/// <https://www.appveyor.com/docs/api/projects-builds/>
#[derive(Debug)]
pub struct Projects<'a, T> {
    client: &'a AppveyorClient<T>,
}

impl<'a, T: Transport> Projects<'a, T> {
    pub(crate) fn new(client: &'a AppveyorClient<T>) -> Self {
        Self { client }
    }

    pub fn list(&self) -> ApiResult<Vec<Value>> {
        self.client.list_projects()
    }

    /// Project details together with its most recent build.
    pub fn last_build(&self, account: &str, project: &str) -> ApiResult<Value> {
        self.client.get_json(&format!("/projects/{account}/{project}"))
    }

    pub fn last_branch_build(&self, account: &str, project: &str, branch: &str) -> ApiResult<Value> {
        self.client
            .get_json(&format!("/projects/{account}/{project}/branch/{branch}"))
    }

    pub fn build(&self, account: &str, project: &str, version: &str) -> ApiResult<Value> {
        self.client
            .get_json(&format!("/projects/{account}/{project}/build/{version}"))
    }

    pub fn history(&self, account: &str, project: &str, query: &HistoryQuery) -> ApiResult<Value> {
        self.client.get_build_history_with(account, project, query)
    }

    pub fn deployments(&self, account: &str, project: &str) -> ApiResult<Value> {
        self.client
            .get_json(&format!("/projects/{account}/{project}/deployments"))
    }

    pub fn settings(&self, account: &str, project: &str) -> ApiResult<Value> {
        self.client
            .get_json(&format!("/projects/{account}/{project}/settings"))
    }

    /// Build configuration as `appveyor.yml` text.
    pub fn settings_yaml(&self, account: &str, project: &str) -> ApiResult<String> {
        let request = self.client.build_request(
            HttpMethod::Get,
            &format!("/projects/{account}/{project}/settings/yaml"),
        );
        self.client.send_text(request)
    }

    pub fn add(&self, provider: RepositoryProvider, repository_name: &str) -> ApiResult<Value> {
        self.client.send_payload(
            HttpMethod::Post,
            "/projects",
            &json!({
                "repositoryProvider": provider,
                "repositoryName": repository_name,
            }),
        )
    }

    /// Replace project settings. `project` is the object returned by
    /// `settings` (its `settings` field) with the desired changes applied.
    pub fn update(&self, project: &Value) -> ApiResult<Value> {
        self.client.send_payload(HttpMethod::Put, "/projects", project)
    }

    pub fn update_settings_yaml(&self, account: &str, project: &str, yaml: &str) -> ApiResult<Value> {
        let request = self.client.build_text_request(
            HttpMethod::Put,
            &format!("/projects/{account}/{project}/settings/yaml"),
            "text/plain",
            yaml.to_string(),
        );
        self.client.send_json(request)
    }

    pub fn update_build_number(
        &self,
        account: &str,
        project: &str,
        next_build_number: u64,
    ) -> ApiResult<Value> {
        self.client.send_payload(
            HttpMethod::Put,
            &format!("/projects/{account}/{project}/settings/build-number"),
            &json!({ "nextBuildNumber": next_build_number }),
        )
    }

    pub fn delete_build_cache(&self, account: &str, project: &str) -> ApiResult<Value> {
        self.client
            .delete(&format!("/projects/{account}/{project}/buildcache"))
    }

    pub fn delete(&self, account: &str, project: &str) -> ApiResult<Value> {
        self.client.delete(&format!("/projects/{account}/{project}"))
    }
}
