use serde_json::Value;

use crate::client::AppveyorClient;
use crate::error::ApiResult;
use crate::http::{HttpMethod, Transport};
use crate::types::NewUser;

/// Account users. <https://www.appveyor.com/docs/api/team/>
#[derive(Debug)]
pub struct Users<'a, T> {
    client: &'a AppveyorClient<T>,
}

impl<'a, T: Transport> Users<'a, T> {
    pub(crate) fn new(client: &'a AppveyorClient<T>) -> Self {
        Self { client }
    }

    pub fn list(&self) -> ApiResult<Value> {
        self.client.get_json("/users")
    }

    pub fn get(&self, user_id: u64) -> ApiResult<Value> {
        self.client.get_json(&format!("/users/{user_id}"))
    }

    pub fn add(&self, user: &NewUser) -> ApiResult<Value> {
        self.client
            .send_payload(HttpMethod::Post, "/users", &user.to_json())
    }

    /// `user` must carry `userId`; fields not present are reset by the server.
    pub fn update(&self, user: &Value) -> ApiResult<Value> {
        self.client.send_payload(HttpMethod::Put, "/users", user)
    }

    pub fn delete(&self, user_id: u64) -> ApiResult<Value> {
        self.client.delete(&format!("/users/{user_id}"))
    }
}
