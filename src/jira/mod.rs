//! Jira access: the `IssueTracker` port plus its REST implementation.
//!
//! The dispatcher in [`crate::tools`] only ever talks to `dyn IssueTracker`,
//! so tests can swap in an in-memory tracker while production uses
//! [`JiraClient`] against the Jira REST API v2.

pub mod client;
pub mod error;
#[cfg(test)]
pub(crate) mod fake;
pub mod types;

use async_trait::async_trait;
use serde_json::{Map, Value};

pub use client::JiraClient;
pub use error::{JiraError, Result};
pub use types::{CreatedIssue, Issue, IssueFields, NamedRef, NewIssue, Transition, User};

/// The seven remote calls the tools are built on.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Fetch a single issue by key (e.g. `PROJ-123`).
    async fn get_issue(&self, key: &str) -> Result<Issue>;

    /// Run a JQL query, returning at most `max_results` issues in Jira's order.
    async fn search_issues(&self, jql: &str, max_results: u32) -> Result<Vec<Issue>>;

    async fn create_issue(&self, issue: &NewIssue) -> Result<CreatedIssue>;

    async fn add_comment(&self, key: &str, body: &str) -> Result<()>;

    /// Apply `fields` verbatim as the issue's `fields` update.
    async fn update_issue(&self, key: &str, fields: &Map<String, Value>) -> Result<()>;

    /// Transitions currently available to the issue.
    async fn transitions(&self, key: &str) -> Result<Vec<Transition>>;

    async fn transition_issue(&self, key: &str, transition_id: &str) -> Result<()>;
}
