//! In-memory `IssueTracker` used by unit tests. Records every call.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Map, Value};

use super::types::{IssueFields, NamedRef, User};
use super::{CreatedIssue, Issue, IssueTracker, JiraError, NewIssue, Result, Transition};
use crate::state::{AppState, TrackerHandle};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetIssue(String),
    Search { jql: String, max_results: u32 },
    Create(NewIssue),
    Comment { key: String, body: String },
    Update { key: String, fields: Map<String, Value> },
    Transitions(String),
    Transition { key: String, id: String },
}

#[derive(Default)]
pub struct FakeTracker {
    pub issues: Vec<Issue>,
    pub transitions: Vec<Transition>,
    /// When set, every call fails with this message (HTTP 400).
    pub fail_with: Option<String>,
    pub log: Mutex<Vec<Call>>,
}

impl FakeTracker {
    pub fn calls(&self) -> Vec<Call> {
        self.log.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> Result<()> {
        self.log.lock().unwrap().push(call);
        match &self.fail_with {
            Some(message) => Err(JiraError::Status {
                status: StatusCode::BAD_REQUEST,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

pub fn issue(key: &str, summary: &str, assignee: Option<&str>) -> Issue {
    Issue {
        key: key.to_string(),
        fields: IssueFields {
            summary: summary.to_string(),
            description: None,
            status: Some(NamedRef { name: "Open".into() }),
            assignee: assignee.map(|name| User { display_name: name.into() }),
            reporter: Some(User { display_name: "Reporter".into() }),
            created: Some("2024-03-01T10:00:00.000+0000".into()),
            updated: Some("2024-03-02T11:30:00.000+0000".into()),
            priority: None,
            issue_type: Some(NamedRef { name: "Task".into() }),
        },
    }
}

pub fn transition(id: &str, name: &str) -> Transition {
    Transition {
        id: id.to_string(),
        name: name.to_string(),
    }
}

pub fn state_with(fake: Arc<FakeTracker>) -> AppState {
    AppState::new(TrackerHandle::new(move || {
        Ok(fake.clone() as Arc<dyn IssueTracker>)
    }))
}

#[async_trait]
impl IssueTracker for FakeTracker {
    async fn get_issue(&self, key: &str) -> Result<Issue> {
        self.record(Call::GetIssue(key.to_string()))?;
        self.issues
            .iter()
            .find(|i| i.key == key)
            .cloned()
            .ok_or_else(|| JiraError::Status {
                status: StatusCode::NOT_FOUND,
                message: "Issue does not exist or you do not have permission to see it.".into(),
            })
    }

    async fn search_issues(&self, jql: &str, max_results: u32) -> Result<Vec<Issue>> {
        self.record(Call::Search {
            jql: jql.to_string(),
            max_results,
        })?;
        Ok(self.issues.iter().take(max_results as usize).cloned().collect())
    }

    async fn create_issue(&self, issue: &NewIssue) -> Result<CreatedIssue> {
        self.record(Call::Create(issue.clone()))?;
        Ok(CreatedIssue {
            key: format!("{}-42", issue.project),
        })
    }

    async fn add_comment(&self, key: &str, body: &str) -> Result<()> {
        self.record(Call::Comment {
            key: key.to_string(),
            body: body.to_string(),
        })
    }

    async fn update_issue(&self, key: &str, fields: &Map<String, Value>) -> Result<()> {
        self.record(Call::Update {
            key: key.to_string(),
            fields: fields.clone(),
        })
    }

    async fn transitions(&self, key: &str) -> Result<Vec<Transition>> {
        self.record(Call::Transitions(key.to_string()))?;
        Ok(self.transitions.clone())
    }

    async fn transition_issue(&self, key: &str, transition_id: &str) -> Result<()> {
        self.record(Call::Transition {
            key: key.to_string(),
            id: transition_id.to_string(),
        })
    }
}
