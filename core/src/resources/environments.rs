use serde_json::Value;

use crate::client::AppveyorClient;
use crate::error::ApiResult;
use crate::http::{HttpMethod, Transport};

/// Deployment environments.
///
/// <https://www.appveyor.com/docs/api/environments-deployments/#environments>
#[derive(Debug)]
pub struct Environments<'a, T> {
    client: &'a AppveyorClient<T>,
}

impl<'a, T: Transport> Environments<'a, T> {
    pub(crate) fn new(client: &'a AppveyorClient<T>) -> Self {
        Self { client }
    }

    pub fn list(&self) -> ApiResult<Value> {
        self.client.get_json("/environments")
    }

    pub fn settings(&self, environment_id: u64) -> ApiResult<Value> {
        self.client
            .get_json(&format!("/environments/{environment_id}/settings"))
    }

    pub fn deployments(&self, environment_id: u64) -> ApiResult<Value> {
        self.client
            .get_json(&format!("/environments/{environment_id}/deployments"))
    }

    /// `environment` holds `name`, `provider` and `settings` in the shape the
    /// API documents (provider settings and environment variables as
    /// name/value pairs).
    pub fn add(&self, environment: &Value) -> ApiResult<Value> {
        self.client
            .send_payload(HttpMethod::Post, "/environments", environment)
    }

    pub fn update(&self, environment: &Value) -> ApiResult<Value> {
        self.client
            .send_payload(HttpMethod::Put, "/environments", environment)
    }

    pub fn delete(&self, environment_id: u64) -> ApiResult<Value> {
        self.client
            .delete(&format!("/environments/{environment_id}"))
    }
}
