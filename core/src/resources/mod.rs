//! Borrowed views grouping the endpoints of each AppVeyor resource.
//!
//! Obtained from the client (`client.projects()`, `client.builds()`, ...).
//! Every method is one request; identifiers are inserted into the path as
//! given, and the server decides whether they are valid.

mod builds;
mod collaborators;
mod deployments;
mod environments;
mod projects;
mod roles;
mod users;

pub use builds::Builds;
pub use collaborators::Collaborators;
pub use deployments::Deployments;
pub use environments::Environments;
pub use projects::Projects;
pub use roles::Roles;
pub use users::Users;
