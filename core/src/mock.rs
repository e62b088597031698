//! Request-capturing transport for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use crate::client::AppveyorClient;
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};

pub(crate) const BASE_URL: &str = "http://mock.appveyor.test/api";

/// Answers from a fixed route table and records every request it sees.
/// Unknown routes get a 404 so a wrong path shows up as a test failure.
#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    routes: HashMap<(HttpMethod, String), HttpResponse>,
    requests: Mutex<Vec<HttpRequest>>,
    fallback: Option<HttpResponse>,
    unreachable: bool,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Every request fails as if the host could not be reached.
    pub(crate) fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    /// Answer every request without a route with `status` and `body`.
    pub(crate) fn answering_all(status: u16, body: &str) -> Self {
        Self {
            fallback: Some(HttpResponse {
                status,
                headers: Vec::new(),
                body: body.to_string(),
            }),
            ..Self::default()
        }
    }

    /// Respond to `method` on `{BASE_URL}{path}`.
    pub(crate) fn on(mut self, method: HttpMethod, path: &str, status: u16, body: &str) -> Self {
        self.routes.insert(
            (method, format!("{BASE_URL}{path}")),
            HttpResponse {
                status,
                headers: Vec::new(),
                body: body.to_string(),
            },
        );
        self
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// The single recorded request. Panics if there were none or several.
    pub(crate) fn only_request(&self) -> HttpRequest {
        let mut requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request, got {requests:?}");
        requests.remove(0)
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &HttpRequest) -> ApiResult<HttpResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        if self.unreachable {
            return Err(ApiError::transport("connection refused"));
        }
        Ok(self
            .routes
            .get(&(request.method, request.url.clone()))
            .or(self.fallback.as_ref())
            .cloned()
            .unwrap_or_else(|| HttpResponse {
                status: 404,
                headers: Vec::new(),
                body: format!("no mock route for {} {}", request.method, request.url),
            }))
    }
}

/// Client with token `abc123` talking to `transport`.
pub(crate) fn client_with(transport: MockTransport) -> AppveyorClient<MockTransport> {
    let config = ClientConfig::builder()
        .base_url(BASE_URL)
        .build()
        .expect("mock base URL is valid");
    AppveyorClient::with_transport("abc123", config, transport).expect("mock config is valid")
}

pub(crate) type Call = fn(&AppveyorClient<MockTransport>) -> ApiResult<Value>;

/// One accessor call and the request it must produce.
pub(crate) struct Case {
    method: HttpMethod,
    path: &'static str,
    body: Option<Value>,
    call: Call,
}

pub(crate) fn case(method: HttpMethod, path: &'static str, body: Option<Value>, call: Call) -> Case {
    Case {
        method,
        path,
        body,
        call,
    }
}

/// Run each call on a fresh client whose transport answers `200 {}`, then
/// check the method, URL and JSON body of the one request it sent.
pub(crate) fn assert_requests(cases: Vec<Case>) {
    for Case {
        method,
        path,
        body,
        call,
    } in cases
    {
        let client = client_with(MockTransport::answering_all(200, "{}"));
        if let Err(err) = call(&client) {
            panic!("{method} {path}: {err}");
        }
        let req = client.transport().only_request();
        assert_eq!(req.method, method, "{path}: method");
        assert_eq!(req.url, format!("{BASE_URL}{path}"), "{method} {path}: url");
        let sent = req
            .body
            .as_deref()
            .map(|raw| serde_json::from_str::<Value>(raw).unwrap());
        assert_eq!(sent, body, "{method} {path}: body");
    }
}
