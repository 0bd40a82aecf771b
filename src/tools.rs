//! Jira tools exposed over MCP.
//!
//! Provides 7 tools an agent can invoke:
//! - `get_issue`: full snapshot of one issue
//! - `search_issues`: JQL search, single bounded page (default 50)
//! - `create_issue`: create an issue, returns the new key
//! - `add_comment`: append a comment
//! - `update_issue`: apply a field mapping verbatim
//! - `get_transitions`: list available workflow transitions
//! - `transition_issue`: apply a transition by id or name
//!
//! [`execute_tool`] never fails: domain errors come back as `Error: ...`
//! text and an unknown tool name comes back as a plain informational result.

use serde_json::{Map, Value, json};

use crate::jira::{IssueTracker, JiraError, NewIssue};
use crate::models::{IssueSnapshot, IssueSummary, ToolDescriptor, TransitionDescriptor};
use crate::state::AppState;

pub const DEFAULT_MAX_RESULTS: u32 = 50;
pub const DEFAULT_ISSUE_TYPE: &str = "Task";

// ---------------------------------------------------------------------------
// Tool output / errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub text: String,
    /// `true` when `text` carries an `Error: ...` message.
    pub is_error: bool,
}

impl ToolOutput {
    pub fn text(s: String) -> Self {
        Self { text: s, is_error: false }
    }

    pub fn error(s: String) -> Self {
        Self { text: s, is_error: true }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Missing required argument: {0}")]
    MissingArgument(&'static str),

    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    #[error("Transition '{requested}' is not available for {issue_key} (available: {available})")]
    UnknownTransition {
        issue_key: String,
        requested: String,
        available: String,
    },

    #[error(transparent)]
    Jira(#[from] JiraError),

    #[error("Failed to render result: {0}")]
    Render(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// All tools, in the order they are advertised by `tools/list`.
pub fn catalog() -> Vec<ToolDescriptor> {
    vec![
        tool("get_issue", "Get details of a Jira issue by key (e.g. PROJ-123).", json!({
            "type": "object",
            "properties": {
                "issue_key": { "type": "string", "description": "Jira issue key (e.g. PROJ-123)" }
            },
            "required": ["issue_key"]
        })),
        tool("search_issues", "Search Jira issues using JQL (Jira Query Language).", json!({
            "type": "object",
            "properties": {
                "jql": { "type": "string", "description": "JQL query string" },
                "max_results": {
                    "type": "number",
                    "description": "Maximum number of results",
                    "default": DEFAULT_MAX_RESULTS
                }
            },
            "required": ["jql"]
        })),
        tool("create_issue", "Create a new Jira issue.", json!({
            "type": "object",
            "properties": {
                "project": { "type": "string", "description": "Project key" },
                "summary": { "type": "string", "description": "Issue summary / title" },
                "description": {
                    "type": "string",
                    "description": "Detailed issue description",
                    "default": ""
                },
                "issue_type": {
                    "type": "string",
                    "description": "Issue type (e.g. Bug, Task, Story)",
                    "default": DEFAULT_ISSUE_TYPE
                }
            },
            "required": ["project", "summary"]
        })),
        tool("add_comment", "Add a comment to a Jira issue.", json!({
            "type": "object",
            "properties": {
                "issue_key": { "type": "string", "description": "Jira issue key" },
                "comment": { "type": "string", "description": "Comment text" }
            },
            "required": ["issue_key", "comment"]
        })),
        tool("update_issue", "Update fields of a Jira issue.", json!({
            "type": "object",
            "properties": {
                "issue_key": { "type": "string", "description": "Jira issue key" },
                "fields": {
                    "type": "object",
                    "description": "Fields to update (e.g. {\"summary\": \"New title\"})"
                }
            },
            "required": ["issue_key", "fields"]
        })),
        tool("get_transitions", "Get the status transitions currently available for a Jira issue.", json!({
            "type": "object",
            "properties": {
                "issue_key": { "type": "string", "description": "Jira issue key" }
            },
            "required": ["issue_key"]
        })),
        tool("transition_issue", "Change the status of a Jira issue.", json!({
            "type": "object",
            "properties": {
                "issue_key": { "type": "string", "description": "Jira issue key" },
                "transition": { "type": "string", "description": "Transition name or ID" }
            },
            "required": ["issue_key", "transition"]
        })),
    ]
}

fn tool(name: &str, description: &str, input_schema: Value) -> ToolDescriptor {
    ToolDescriptor {
        name: name.to_string(),
        description: description.to_string(),
        input_schema,
    }
}

// ---------------------------------------------------------------------------
// Typed calls
// ---------------------------------------------------------------------------

/// A tool invocation with its arguments checked and defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    GetIssue { issue_key: String },
    SearchIssues { jql: String, max_results: u32 },
    CreateIssue(NewIssue),
    AddComment { issue_key: String, comment: String },
    UpdateIssue { issue_key: String, fields: Map<String, Value> },
    GetTransitions { issue_key: String },
    TransitionIssue { issue_key: String, transition: String },
}

impl ToolCall {
    /// Returns `Ok(None)` for a name outside the catalog.
    pub fn parse(name: &str, args: &Value) -> Result<Option<Self>, ToolError> {
        let call = match name {
            "get_issue" => Self::GetIssue {
                issue_key: required_str(args, "issue_key")?,
            },
            "search_issues" => Self::SearchIssues {
                jql: required_str(args, "jql")?,
                max_results: max_results(args)?,
            },
            "create_issue" => Self::CreateIssue(NewIssue {
                project: required_str(args, "project")?,
                summary: required_str(args, "summary")?,
                description: optional_str(args, "description")?.unwrap_or_default(),
                issue_type: optional_str(args, "issue_type")?
                    .unwrap_or_else(|| DEFAULT_ISSUE_TYPE.to_string()),
            }),
            "add_comment" => Self::AddComment {
                issue_key: required_str(args, "issue_key")?,
                comment: required_str(args, "comment")?,
            },
            "update_issue" => {
                let issue_key = required_str(args, "issue_key")?;
                let fields = match args.get("fields") {
                    None | Some(Value::Null) => return Err(ToolError::MissingArgument("fields")),
                    Some(Value::Object(map)) => map.clone(),
                    Some(_) => {
                        return Err(ToolError::InvalidArgument {
                            name: "fields",
                            reason: "expected an object".to_string(),
                        });
                    }
                };
                Self::UpdateIssue { issue_key, fields }
            }
            "get_transitions" => Self::GetTransitions {
                issue_key: required_str(args, "issue_key")?,
            },
            "transition_issue" => Self::TransitionIssue {
                issue_key: required_str(args, "issue_key")?,
                transition: required_str(args, "transition")?,
            },
            _ => return Ok(None),
        };
        Ok(Some(call))
    }

    /// Perform the remote call(s) and render the result text.
    pub async fn execute(self, jira: &dyn IssueTracker) -> Result<String, ToolError> {
        match self {
            Self::GetIssue { issue_key } => {
                let issue = jira.get_issue(&issue_key).await?;
                Ok(serde_json::to_string_pretty(&IssueSnapshot::from(&issue))?)
            }
            Self::SearchIssues { jql, max_results } => {
                let issues = jira.search_issues(&jql, max_results).await?;
                let summaries: Vec<IssueSummary> = issues.iter().map(IssueSummary::from).collect();
                Ok(serde_json::to_string_pretty(&summaries)?)
            }
            Self::CreateIssue(new_issue) => {
                let created = jira.create_issue(&new_issue).await?;
                Ok(format!("Created issue: {}", created.key))
            }
            Self::AddComment { issue_key, comment } => {
                jira.add_comment(&issue_key, &comment).await?;
                Ok(format!("Comment added to {issue_key}"))
            }
            Self::UpdateIssue { issue_key, fields } => {
                jira.update_issue(&issue_key, &fields).await?;
                Ok(format!("Updated issue: {issue_key}"))
            }
            Self::GetTransitions { issue_key } => {
                let transitions = jira.transitions(&issue_key).await?;
                let descriptors: Vec<TransitionDescriptor> =
                    transitions.iter().map(TransitionDescriptor::from).collect();
                Ok(serde_json::to_string_pretty(&descriptors)?)
            }
            Self::TransitionIssue { issue_key, transition } => {
                let id = resolve_transition(jira, &issue_key, &transition).await?;
                jira.transition_issue(&issue_key, &id).await?;
                Ok(format!("Transitioned issue: {issue_key}"))
            }
        }
    }
}

/// Numeric values are transition ids and are sent as is. Anything else is
/// looked up by name (case-insensitive) among the issue's current transitions.
async fn resolve_transition(
    jira: &dyn IssueTracker,
    issue_key: &str,
    requested: &str,
) -> Result<String, ToolError> {
    if !requested.is_empty() && requested.chars().all(|c| c.is_ascii_digit()) {
        return Ok(requested.to_string());
    }

    let available = jira.transitions(issue_key).await?;
    available
        .iter()
        .find(|t| t.name.eq_ignore_ascii_case(requested) || t.id == requested)
        .map(|t| t.id.clone())
        .ok_or_else(|| ToolError::UnknownTransition {
            issue_key: issue_key.to_string(),
            requested: requested.to_string(),
            available: available
                .iter()
                .map(|t| t.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        })
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Route a tool call to the Jira client and render the outcome as text.
pub async fn execute_tool(name: &str, args: &Value, state: &AppState) -> ToolOutput {
    match run_tool(name, args, state).await {
        Ok(text) => ToolOutput::text(text),
        Err(e) => {
            tracing::error!(tool = %name, "tool execution failed: {}", e);
            ToolOutput::error(format!("Error: {e}"))
        }
    }
}

async fn run_tool(name: &str, args: &Value, state: &AppState) -> Result<String, ToolError> {
    let Some(call) = ToolCall::parse(name, args)? else {
        tracing::warn!(tool = %name, "unknown tool requested");
        return Ok(format!("Unknown tool: {name}"));
    };
    let jira = state.tracker().await?;
    call.execute(jira.as_ref()).await
}

// ---------------------------------------------------------------------------
// Argument helpers
// ---------------------------------------------------------------------------

fn required_str(args: &Value, name: &'static str) -> Result<String, ToolError> {
    optional_str(args, name)?.ok_or(ToolError::MissingArgument(name))
}

/// Strings pass through; numbers are accepted and stringified (agents often
/// send ids as numbers). `null` counts as absent.
fn optional_str(args: &Value, name: &'static str) -> Result<Option<String>, ToolError> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(ToolError::InvalidArgument {
            name,
            reason: format!("expected a string, got {other}"),
        }),
    }
}

fn max_results(args: &Value) -> Result<u32, ToolError> {
    let invalid = |reason: &str| ToolError::InvalidArgument {
        name: "max_results",
        reason: reason.to_string(),
    };
    match args.get("max_results") {
        None | Some(Value::Null) => Ok(DEFAULT_MAX_RESULTS),
        Some(Value::Number(n)) => {
            if let Some(v) = n.as_u64() {
                return Ok(u32::try_from(v).unwrap_or(u32::MAX));
            }
            match n.as_f64() {
                Some(f) if f >= 0.0 && f.fract() == 0.0 => Ok(f.min(f64::from(u32::MAX)) as u32),
                _ => Err(invalid("expected a non-negative integer")),
            }
        }
        Some(_) => Err(invalid("expected a number")),
    }
}
