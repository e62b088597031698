use serde_json::{json, Value};

use crate::client::AppveyorClient;
use crate::error::ApiResult;
use crate::http::{HttpMethod, Transport};
use crate::types::StartDeployment;

#[derive(Debug)]
pub struct Deployments<'a, T> {
    client: &'a AppveyorClient<T>,
}

impl<'a, T: Transport> Deployments<'a, T> {
    pub(crate) fn new(client: &'a AppveyorClient<T>) -> Self {
        Self { client }
    }

    pub fn get(&self, deployment_id: u64) -> ApiResult<Value> {
        self.client
            .get_json(&format!("/deployments/{deployment_id}"))
    }

    /// Deploy an existing build to a named environment.
    pub fn start(&self, deployment: &StartDeployment) -> ApiResult<Value> {
        self.client
            .send_payload(HttpMethod::Post, "/deployments", deployment)
    }

    pub fn cancel(&self, deployment_id: u64) -> ApiResult<Value> {
        self.client.send_payload(
            HttpMethod::Put,
            "/deployments/stop",
            &json!({ "deploymentId": deployment_id }),
        )
    }
}
