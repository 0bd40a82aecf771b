//! Jira REST API v2 client (reqwest). Authenticates with Basic
//! (email + API token, Jira Cloud) or Bearer (personal access token,
//! Server / Data Center).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use url::Url;

use super::error::{JiraError, Result};
use super::types::{CreatedIssue, ErrorBody, Issue, NewIssue, SearchResult, Transition, TransitionList};
use super::IssueTracker;
use crate::config::{ConfigError, JiraAuth, JiraCredentials};

const API_PREFIX: [&str; 3] = ["rest", "api", "2"];

/// Fields requested for search results (the abbreviated snapshot).
const SEARCH_FIELDS: &str = "summary,status,assignee";

/// Max characters of a non-JSON error body kept in error messages.
const MAX_ERROR_BODY: usize = 500;

pub struct JiraClient {
    http: Client,
    base_url: Url,
    auth: JiraAuth,
    api_token: String,
}

impl JiraClient {
    pub fn new(credentials: JiraCredentials) -> Result<Self> {
        let http = Client::builder()
            .pool_max_idle_per_host(4)
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self::with_http_client(credentials, http))
    }

    pub fn with_http_client(credentials: JiraCredentials, http: Client) -> Self {
        Self {
            http,
            base_url: credentials.base_url,
            auth: credentials.auth,
            api_token: credentials.api_token,
        }
    }

    /// `{base}/rest/api/2/{segments...}`, with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ConfigError::InvalidUrl {
                value: self.base_url.to_string(),
                reason: "URL cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(API_PREFIX)
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        tracing::debug!(method = %method, url = %url, "jira request");
        let builder = self
            .http
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");
        match &self.auth {
            JiraAuth::Basic { email } => builder.basic_auth(email, Some(&self.api_token)),
            JiraAuth::Bearer => builder.bearer_auth(&self.api_token),
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.summarize())
            .unwrap_or_else(|| truncate_str(&body, MAX_ERROR_BODY));
        Err(JiraError::Status { status, message })
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| JiraError::Decode(e.to_string()))
    }

    async fn search_at(&self, segments: &[&str], jql: &str, max_results: u32) -> Result<Vec<Issue>> {
        let url = self.endpoint(segments)?;
        let builder = self.request(Method::GET, url).query(&[
            ("jql", jql.to_string()),
            ("maxResults", max_results.to_string()),
            ("fields", SEARCH_FIELDS.to_string()),
        ]);
        let response = self.send(builder).await?;
        let result: SearchResult = Self::read_json(response).await?;
        Ok(result.issues)
    }
}

#[async_trait]
impl IssueTracker for JiraClient {
    async fn get_issue(&self, key: &str) -> Result<Issue> {
        let url = self.endpoint(&["issue", key])?;
        let response = self.send(self.request(Method::GET, url)).await?;
        Self::read_json(response).await
    }

    /// Jira Cloud only serves `search/jql`; Server / Data Center only has
    /// the legacy `search`, so a 404 on the former falls back to the latter.
    async fn search_issues(&self, jql: &str, max_results: u32) -> Result<Vec<Issue>> {
        match self.search_at(&["search", "jql"], jql, max_results).await {
            Err(JiraError::Status { status, .. }) if status == StatusCode::NOT_FOUND => {
                tracing::debug!("search/jql not available, using legacy search endpoint");
                self.search_at(&["search"], jql, max_results).await
            }
            result => result,
        }
    }

    async fn create_issue(&self, issue: &NewIssue) -> Result<CreatedIssue> {
        let url = self.endpoint(&["issue"])?;
        let builder = self.request(Method::POST, url).json(&issue.to_payload());
        let response = self.send(builder).await?;
        Self::read_json(response).await
    }

    async fn add_comment(&self, key: &str, body: &str) -> Result<()> {
        let url = self.endpoint(&["issue", key, "comment"])?;
        let builder = self.request(Method::POST, url).json(&json!({ "body": body }));
        self.send(builder).await?;
        Ok(())
    }

    async fn update_issue(&self, key: &str, fields: &Map<String, Value>) -> Result<()> {
        let url = self.endpoint(&["issue", key])?;
        let builder = self.request(Method::PUT, url).json(&json!({ "fields": fields }));
        self.send(builder).await?;
        Ok(())
    }

    async fn transitions(&self, key: &str) -> Result<Vec<Transition>> {
        let url = self.endpoint(&["issue", key, "transitions"])?;
        let response = self.send(self.request(Method::GET, url)).await?;
        let list: TransitionList = Self::read_json(response).await?;
        Ok(list.transitions)
    }

    async fn transition_issue(&self, key: &str, transition_id: &str) -> Result<()> {
        let url = self.endpoint(&["issue", key, "transitions"])?;
        let builder = self
            .request(Method::POST, url)
            .json(&json!({ "transition": { "id": transition_id } }));
        self.send(builder).await?;
        Ok(())
    }
}

fn truncate_str(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let boundary = s
            .char_indices()
            .take_while(|(i, _)| *i < max_len)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(max_len);
        format!("{}...", &s[..boundary])
    }
}
