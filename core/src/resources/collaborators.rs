use serde_json::{json, Value};

use crate::client::AppveyorClient;
use crate::error::ApiResult;
use crate::http::{HttpMethod, Transport};

/// Users from other accounts granted access to this one.
#[derive(Debug)]
pub struct Collaborators<'a, T> {
    client: &'a AppveyorClient<T>,
}

impl<'a, T: Transport> Collaborators<'a, T> {
    pub(crate) fn new(client: &'a AppveyorClient<T>) -> Self {
        Self { client }
    }

    pub fn list(&self) -> ApiResult<Value> {
        self.client.get_json("/collaborators")
    }

    pub fn get(&self, user_id: u64) -> ApiResult<Value> {
        self.client.get_json(&format!("/collaborators/{user_id}"))
    }

    pub fn add(&self, email: &str, role_id: u64) -> ApiResult<Value> {
        self.client.send_payload(
            HttpMethod::Post,
            "/collaborators",
            &json!({ "email": email, "roleId": role_id }),
        )
    }

    /// Change the role of an existing collaborator.
    pub fn update(&self, user_id: u64, role_id: u64) -> ApiResult<Value> {
        self.client.send_payload(
            HttpMethod::Put,
            "/collaborators",
            &json!({ "userId": user_id, "roleId": role_id }),
        )
    }

    pub fn delete(&self, user_id: u64) -> ApiResult<Value> {
        self.client.delete(&format!("/collaborators/{user_id}"))
    }
}
