//! Blocking client for the AppVeyor REST API.
//!
//! # Overview
//! `AppveyorClient` turns method calls into authenticated HTTP requests
//! against `https://ci.appveyor.com/api` (or another API root) and hands back
//! the decoded JSON as `serde_json::Value`.
//!
//! ```no_run
//! use appveyor_client::AppveyorClient;
//!
//! # fn main() -> Result<(), appveyor_client::ApiError> {
//! let client = AppveyorClient::new("my-api-token");
//! for project in client.list_projects()? {
//!     println!("{}", project["slug"]);
//! }
//! let history = client.get_build_history("my-account", "my-project")?;
//! println!("{}", history["builds"]);
//! # Ok(())
//! # }
//! ```
//!
//! # Design
//! - The client is immutable: token, API root and transport are fixed at
//!   construction, and `&AppveyorClient` may be shared between threads.
//! - Each call is a pure `build_*` step producing an `HttpRequest` plus a
//!   parse step, joined by a `Transport`. The default transport is a blocking
//!   `ureq` agent; any other HTTP stack can implement `Transport`.
//! - Responses are not modelled as Rust types. Inputs are, where the API only
//!   accepts fixed shapes (`BuildTarget`, `UserPassword`, ...).
//! - Success is any 2xx status. Anything else is `ApiError::Request` with the
//!   raw body. Nothing is retried.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod resources;
pub mod types;

#[cfg(test)]
mod mock;

pub use client::AppveyorClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::{ApiError, ApiResult};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use types::{
    BuildTarget, HistoryQuery, NewUser, RepositoryProvider, StartBuild, StartDeployment,
    UserPassword,
};
