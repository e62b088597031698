use serde_json::{json, Value};

use crate::client::AppveyorClient;
use crate::error::ApiResult;
use crate::http::{HttpMethod, Transport};

/// Team roles. <https://www.appveyor.com/docs/api/team/>
#[derive(Debug)]
pub struct Roles<'a, T> {
    client: &'a AppveyorClient<T>,
}

impl<'a, T: Transport> Roles<'a, T> {
    pub(crate) fn new(client: &'a AppveyorClient<T>) -> Self {
        Self { client }
    }

    pub fn list(&self) -> ApiResult<Value> {
        self.client.get_json("/roles")
    }

    pub fn get(&self, role_id: u64) -> ApiResult<Value> {
        self.client.get_json(&format!("/roles/{role_id}"))
    }

    pub fn add(&self, name: &str) -> ApiResult<Value> {
        self.client
            .send_payload(HttpMethod::Post, "/roles", &json!({ "name": name }))
    }

    /// Replace a role, permissions included. `role` is the object returned
    /// by `get` with the desired changes applied.
    pub fn update(&self, role: &Value) -> ApiResult<Value> {
        self.client.send_payload(HttpMethod::Put, "/roles", role)
    }

    pub fn delete(&self, role_id: u64) -> ApiResult<Value> {
        self.client.delete(&format!("/roles/{role_id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{assert_requests, case, client_with, MockTransport, BASE_URL};

    #[test]
    fn get_role_uses_id_in_path() {
        let transport = MockTransport::new().on(
            HttpMethod::Get,
            "/roles/3040",
            200,
            r#"{"roleId":3040,"name":"My Role","isSystem":false}"#,
        );
        let client = client_with(transport);
        let role = client.roles().get(3040).unwrap();
        assert_eq!(role["name"], "My Role");
    }

    #[test]
    fn add_role_posts_name() {
        let transport = MockTransport::new().on(HttpMethod::Post, "/roles", 200, r#"{"roleId":1}"#);
        let client = client_with(transport);
        client.roles().add("Deployers").unwrap();

        let req = client.transport().only_request();
        assert_eq!(req.url, format!("{BASE_URL}/roles"));
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"name": "Deployers"}));
    }

    #[test]
    fn delete_role_returns_null_on_no_content() {
        let transport = MockTransport::new().on(HttpMethod::Delete, "/roles/7", 204, "");
        let client = client_with(transport);
        assert_eq!(client.roles().delete(7).unwrap(), Value::Null);
    }

    #[test]
    fn every_accessor_sends_expected_request() {
        assert_requests(vec![
            case(HttpMethod::Get, "/roles", None, |c| c.roles().list()),
            case(HttpMethod::Get, "/roles/3040", None, |c| c.roles().get(3040)),
            case(HttpMethod::Post, "/roles", Some(json!({"name": "Deployers"})), |c| {
                c.roles().add("Deployers")
            }),
            case(
                HttpMethod::Put,
                "/roles",
                Some(json!({"roleId": 3040, "name": "Release managers"})),
                |c| c.roles().update(&json!({"roleId": 3040, "name": "Release managers"})),
            ),
            case(HttpMethod::Delete, "/roles/3040", None, |c| c.roles().delete(3040)),
        ]);
    }
}
