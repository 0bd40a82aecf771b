// Mock Jira REST API v2 served by axum on an ephemeral port.
// Records every request so tests can assert on what the client sent.
// `spawn()` behaves like Jira Cloud (enhanced `search/jql`), while
// `spawn_server_edition()` only has the legacy `search` route.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

use jira_mcp_server::config::JiraCredentials;

pub const EMAIL: &str = "dev@example.com";
pub const API_TOKEN: &str = "api-token";
/// `Basic base64("dev@example.com:api-token")`
pub const EXPECTED_AUTH: &str = "Basic ZGV2QGV4YW1wbGUuY29tOmFwaS10b2tlbg==";
pub const EXPECTED_BEARER: &str = "Bearer api-token";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub authorization: Option<String>,
    pub body: Value,
}

type Log = Arc<Mutex<Vec<Recorded>>>;

#[derive(Clone)]
struct Shared {
    log: Log,
    enhanced_search: bool,
}

pub struct MockJira {
    pub base_url: String,
    log: Log,
}

impl MockJira {
    pub async fn spawn() -> Self {
        Self::start(true).await
    }

    pub async fn spawn_server_edition() -> Self {
        Self::start(false).await
    }

    async fn start(enhanced_search: bool) -> Self {
        let log: Log = Arc::default();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().fallback(handle).with_state(Shared {
            log: log.clone(),
            enhanced_search,
        });
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            base_url: format!("http://{addr}"),
            log,
        }
    }

    /// Basic auth (email + API token).
    pub fn credentials(&self) -> JiraCredentials {
        self.credentials_with(None)
    }

    /// Personal access token sent as a bearer token; no email configured.
    pub fn bearer_credentials(&self) -> JiraCredentials {
        self.credentials_with(Some("bearer"))
    }

    fn credentials_with(&self, auth_type: Option<&'static str>) -> JiraCredentials {
        let base_url = self.base_url.clone();
        JiraCredentials::from_lookup(move |key| match key {
            "JIRA_URL" => Some(base_url.clone()),
            "JIRA_EMAIL" if auth_type.is_none() => Some(EMAIL.to_string()),
            "JIRA_API_TOKEN" => Some(API_TOKEN.to_string()),
            "JIRA_AUTH_TYPE" => auth_type.map(String::from),
            _ => None,
        })
        .unwrap()
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Recorded {
        self.requests().pop().expect("no request recorded")
    }
}

fn issue_json(key: &str, summary: &str, assignee: Option<&str>) -> Value {
    json!({
        "id": "10000",
        "key": key,
        "self": format!("https://example.atlassian.net/rest/api/2/issue/{key}"),
        "fields": {
            "summary": summary,
            "description": null,
            "status": { "name": "In Progress", "id": "3" },
            "assignee": assignee.map(|name| json!({ "displayName": name, "active": true })),
            "reporter": { "displayName": "Rita Reporter" },
            "created": "2024-03-01T10:00:00.000+0000",
            "updated": "2024-03-02T11:30:00.000+0000",
            "priority": { "name": "High" },
            "issuetype": { "name": "Bug", "subtask": false }
        }
    })
}

fn jira_error(status: StatusCode, messages: &[&str], errors: Value) -> Response {
    (status, axum::Json(json!({ "errorMessages": messages, "errors": errors }))).into_response()
}

fn not_found_page() -> Response {
    (StatusCode::NOT_FOUND, "<html>Not Found</html>").into_response()
}

fn search_response(query: &[(String, String)]) -> Response {
    let jql = query
        .iter()
        .find(|(k, _)| k == "jql")
        .map(|(_, v)| v.as_str())
        .unwrap_or("");
    let issues = if jql.contains("EMPTY") {
        vec![]
    } else {
        vec![
            issue_json("PROJ-2", "Second", Some("Ana Lima")),
            issue_json("PROJ-1", "Login fails", None),
        ]
    };
    axum::Json(json!({ "issues": issues, "isLast": true })).into_response()
}

async fn handle(
    State(shared): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let query: Vec<(String, String)> = uri
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    shared.log.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: path.clone(),
        query: query.clone(),
        authorization: authorization.clone(),
        body: body.clone(),
    });

    if !matches!(authorization.as_deref(), Some(EXPECTED_AUTH | EXPECTED_BEARER)) {
        return (StatusCode::UNAUTHORIZED, "Client must be authenticated to access this resource.")
            .into_response();
    }

    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    match (method, segments.as_slice()) {
        (Method::GET, ["rest", "api", "2", "issue", "PROJ-1"]) => {
            axum::Json(issue_json("PROJ-1", "Login fails", None)).into_response()
        }
        (Method::GET, ["rest", "api", "2", "issue", _]) => jira_error(
            StatusCode::NOT_FOUND,
            &["Issue does not exist or you do not have permission to see it."],
            json!({}),
        ),
        (Method::GET, ["rest", "api", "2", "search", "jql"]) if shared.enhanced_search => {
            search_response(&query)
        }
        (Method::GET, ["rest", "api", "2", "search"]) if !shared.enhanced_search => {
            search_response(&query)
        }
        (Method::POST, ["rest", "api", "2", "issue"]) => {
            let summary = body.pointer("/fields/summary").and_then(Value::as_str).unwrap_or("");
            if summary.is_empty() {
                return jira_error(
                    StatusCode::BAD_REQUEST,
                    &[],
                    json!({ "summary": "You must specify a summary of the issue." }),
                );
            }
            (
                StatusCode::CREATED,
                axum::Json(json!({ "id": "10043", "key": "PROJ-43", "self": "https://example.atlassian.net/rest/api/2/issue/10043" })),
            )
                .into_response()
        }
        (Method::POST, ["rest", "api", "2", "issue", "GONE-1", "comment"]) => not_found_page(),
        (Method::POST, ["rest", "api", "2", "issue", _, "comment"]) => {
            (StatusCode::CREATED, axum::Json(json!({ "id": "20001", "body": body["body"] }))).into_response()
        }
        (Method::PUT, ["rest", "api", "2", "issue", _]) => StatusCode::NO_CONTENT.into_response(),
        (Method::GET, ["rest", "api", "2", "issue", _, "transitions"]) => axum::Json(json!({
            "expand": "transitions",
            "transitions": [
                { "id": "11", "name": "To Do", "to": { "name": "To Do" } },
                { "id": "31", "name": "Done", "to": { "name": "Done" } }
            ]
        }))
        .into_response(),
        (Method::POST, ["rest", "api", "2", "issue", _, "transitions"]) => {
            StatusCode::NO_CONTENT.into_response()
        }
        _ => not_found_page(),
    }
}
