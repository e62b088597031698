//! Request payloads and query parameters.
//!
//! # Design
//! Responses stay untyped (`serde_json::Value`): the remote schema is large,
//! changes without notice, and callers usually need a handful of fields.
//! Inputs are typed where AppVeyor accepts only a fixed set of shapes, so an
//! impossible request (a build targeting both a branch and a pull request, a
//! user with neither password nor generated password) cannot be expressed.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Map, Value};

/// Query parameters for the project history endpoint.
///
/// Unset fields are omitted from the query string and the server applies its
/// own defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records_number: Option<u32>,
    /// Return builds older than this build id; used to walk further back.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_build_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

impl HistoryQuery {
    pub fn records(records_number: u32) -> Self {
        Self {
            records_number: Some(records_number),
            ..Self::default()
        }
    }

    pub fn start_build_id(mut self, build_id: u64) -> Self {
        self.start_build_id = Some(build_id);
        self
    }

    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }
}

/// Source control providers accepted when adding a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RepositoryProvider {
    GitHub,
    BitBucket,
    Vso,
    GitLab,
    Kiln,
    Stash,
    Git,
    Mercurial,
    Subversion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserPassword {
    /// AppVeyor generates a password and mails it to the user.
    Generate,
    Explicit(String),
}

/// A team member to add to the account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub role_id: u64,
    pub password: UserPassword,
}

impl NewUser {
    pub(crate) fn to_json(&self) -> Value {
        let mut body = json!({
            "fullName": self.full_name,
            "email": self.email,
            "roleId": self.role_id,
            "generatePassword": self.password == UserPassword::Generate,
        });
        if let UserPassword::Explicit(password) = &self.password {
            body["password"] = json!(password);
            body["confirmPassword"] = json!(password);
        }
        body
    }
}

/// What a new build should check out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildTarget {
    /// Most recent commit on the branch.
    Branch(String),
    /// A specific commit on a branch.
    Commit { branch: String, commit_id: String },
    /// A GitHub pull request.
    PullRequest(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartBuild {
    pub account_name: String,
    pub project_slug: String,
    pub target: BuildTarget,
    /// Sent only when non-empty.
    pub environment_variables: BTreeMap<String, String>,
}

impl StartBuild {
    pub fn new(
        account_name: impl Into<String>,
        project_slug: impl Into<String>,
        target: BuildTarget,
    ) -> Self {
        Self {
            account_name: account_name.into(),
            project_slug: project_slug.into(),
            target,
            environment_variables: BTreeMap::new(),
        }
    }

    pub fn env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment_variables.insert(name.into(), value.into());
        self
    }

    pub(crate) fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("accountName".into(), json!(self.account_name));
        body.insert("projectSlug".into(), json!(self.project_slug));
        match &self.target {
            BuildTarget::Branch(branch) => {
                body.insert("branch".into(), json!(branch));
            }
            BuildTarget::Commit { branch, commit_id } => {
                body.insert("branch".into(), json!(branch));
                body.insert("commitId".into(), json!(commit_id));
            }
            BuildTarget::PullRequest(number) => {
                body.insert("pullRequestId".into(), json!(number));
            }
        }
        if !self.environment_variables.is_empty() {
            body.insert("environmentVariables".into(), json!(self.environment_variables));
        }
        Value::Object(body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartDeployment {
    pub environment_name: String,
    pub account_name: String,
    pub project_slug: String,
    /// Build to deploy.
    pub build_version: String,
    /// Job whose artifacts are deployed, when the build has several jobs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_job_id: Option<String>,
    pub environment_variables: BTreeMap<String, String>,
}
