//! Wire types for the subset of the Jira REST API v2 this server touches.
//!
//! Only the fields the tools actually read are declared; everything else in
//! Jira's (very large) payloads is ignored by serde.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub key: String,
    pub fields: IssueFields,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueFields {
    #[serde(default)]
    pub summary: String,
    /// Plain text in API v2; may be null.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<NamedRef>,
    #[serde(default)]
    pub assignee: Option<User>,
    #[serde(default)]
    pub reporter: Option<User>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(default)]
    pub priority: Option<NamedRef>,
    #[serde(default, rename = "issuetype")]
    pub issue_type: Option<NamedRef>,
}

/// Status, priority and issue type all share the `{ "name": ... }` shape.
#[derive(Debug, Clone, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    #[serde(rename = "displayName")]
    pub display_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub issues: Vec<Issue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedIssue {
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transition {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransitionList {
    #[serde(default)]
    pub transitions: Vec<Transition>,
}

/// Field set accepted by `POST /rest/api/2/issue`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIssue {
    pub project: String,
    pub summary: String,
    pub description: String,
    pub issue_type: String,
}

impl NewIssue {
    pub fn to_payload(&self) -> Value {
        serde_json::json!({
            "fields": {
                "project": { "key": self.project },
                "summary": self.summary,
                "description": self.description,
                "issuetype": { "name": self.issue_type },
            }
        })
    }
}

/// Jira's standard error body: `{"errorMessages": [...], "errors": {...}}`.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default, rename = "errorMessages")]
    pub error_messages: Vec<String>,
    #[serde(default)]
    pub errors: serde_json::Map<String, Value>,
}

impl ErrorBody {
    /// Flatten into one line, e.g. `Issue does not exist; summary: required`.
    pub fn summarize(&self) -> Option<String> {
        let mut parts: Vec<String> = self.error_messages.clone();
        parts.extend(self.errors.iter().map(|(field, msg)| match msg.as_str() {
            Some(text) => format!("{field}: {text}"),
            None => format!("{field}: {msg}"),
        }));
        (!parts.is_empty()).then(|| parts.join("; "))
    }
}
