use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::jira::{Issue, Transition, User};

pub const UNASSIGNED: &str = "Unassigned";
pub const NO_PRIORITY: &str = "None";
pub const UNKNOWN_USER: &str = "Unknown";

// ---------------------------------------------------------------------------
// Tool catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

// ---------------------------------------------------------------------------
// Tool results
// ---------------------------------------------------------------------------

/// Full projection of an issue, as returned by `get_issue`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IssueSnapshot {
    pub key: String,
    pub summary: String,
    pub description: String,
    pub status: String,
    pub assignee: String,
    pub reporter: String,
    pub created: String,
    pub updated: String,
    pub priority: String,
    pub issue_type: String,
}

impl From<&Issue> for IssueSnapshot {
    fn from(issue: &Issue) -> Self {
        let f = &issue.fields;
        Self {
            key: issue.key.clone(),
            summary: f.summary.clone(),
            description: f.description.clone().unwrap_or_default(),
            status: f.status.as_ref().map(|s| s.name.clone()).unwrap_or_default(),
            assignee: display_name(f.assignee.as_ref(), UNASSIGNED),
            reporter: display_name(f.reporter.as_ref(), UNKNOWN_USER),
            created: f.created.clone().unwrap_or_default(),
            updated: f.updated.clone().unwrap_or_default(),
            priority: f
                .priority
                .as_ref()
                .map(|p| p.name.clone())
                .unwrap_or_else(|| NO_PRIORITY.to_string()),
            issue_type: f.issue_type.as_ref().map(|t| t.name.clone()).unwrap_or_default(),
        }
    }
}

/// Abbreviated projection used for search results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IssueSummary {
    pub key: String,
    pub summary: String,
    pub status: String,
    pub assignee: String,
}

impl From<&Issue> for IssueSummary {
    fn from(issue: &Issue) -> Self {
        let f = &issue.fields;
        Self {
            key: issue.key.clone(),
            summary: f.summary.clone(),
            status: f.status.as_ref().map(|s| s.name.clone()).unwrap_or_default(),
            assignee: display_name(f.assignee.as_ref(), UNASSIGNED),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransitionDescriptor {
    pub id: String,
    pub name: String,
}

impl From<&Transition> for TransitionDescriptor {
    fn from(t: &Transition) -> Self {
        Self {
            id: t.id.clone(),
            name: t.name.clone(),
        }
    }
}

fn display_name(user: Option<&User>, sentinel: &str) -> String {
    user.map(|u| u.display_name.clone())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| sentinel.to_string())
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub app: String,
    pub uptime_seconds: u64,
    pub jira_connected: bool,
}
