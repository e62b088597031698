use serde_json::Value;

use crate::client::AppveyorClient;
use crate::error::ApiResult;
use crate::http::{HttpMethod, Transport};
use crate::types::StartBuild;

/// Starting, cancelling and inspecting builds.
#[derive(Debug)]
pub struct Builds<'a, T> {
    client: &'a AppveyorClient<T>,
}

impl<'a, T: Transport> Builds<'a, T> {
    pub(crate) fn new(client: &'a AppveyorClient<T>) -> Self {
        Self { client }
    }

    /// Queue a build of a branch, a commit or a pull request.
    pub fn start(&self, build: &StartBuild) -> ApiResult<Value> {
        self.client
            .send_payload(HttpMethod::Post, "/builds", &build.to_json())
    }

    pub fn cancel(&self, account: &str, project: &str, version: &str) -> ApiResult<Value> {
        self.client
            .delete(&format!("/builds/{account}/{project}/{version}"))
    }

    /// Console log of one build job, as plain text.
    pub fn log(&self, job_id: &str) -> ApiResult<String> {
        let request = self
            .client
            .build_request(HttpMethod::Get, &format!("/buildjobs/{job_id}/log"));
        self.client.send_text(request)
    }
}
