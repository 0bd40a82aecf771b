// Application state shared by both transports.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::OnceCell;

use crate::config::JiraCredentials;
use crate::jira::{IssueTracker, JiraClient, JiraError};

type TrackerFactory = dyn Fn() -> Result<Arc<dyn IssueTracker>, JiraError> + Send + Sync;

// ── Tracker handle ──────────────────────────────────────────────────────────
/// Lazily-constructed, process-wide Jira client.
///
/// The factory runs on the first `get()`; every later call returns the same
/// `Arc`. Concurrent first calls still construct once. A failed construction
/// is not cached, so the error is reported again on the next call.
pub struct TrackerHandle {
    cell: OnceCell<Arc<dyn IssueTracker>>,
    factory: Box<TrackerFactory>,
}

impl TrackerHandle {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn IssueTracker>, JiraError> + Send + Sync + 'static,
    {
        Self {
            cell: OnceCell::new(),
            factory: Box::new(factory),
        }
    }

    /// Production factory: read `JIRA_*` from the environment and build a
    /// [`JiraClient`].
    pub fn from_env() -> Self {
        Self::new(|| {
            let credentials = JiraCredentials::from_env()?;
            connect(credentials)
        })
    }

    /// Fixed credentials, still connected lazily.
    pub fn with_credentials(credentials: JiraCredentials) -> Self {
        Self::new(move || connect(credentials.clone()))
    }

    pub async fn get(&self) -> Result<Arc<dyn IssueTracker>, JiraError> {
        self.cell
            .get_or_try_init(|| async { (self.factory)() })
            .await
            .cloned()
    }

    pub fn is_connected(&self) -> bool {
        self.cell.initialized()
    }
}

fn connect(credentials: JiraCredentials) -> Result<Arc<dyn IssueTracker>, JiraError> {
    let url = credentials.base_url.to_string();
    let client = JiraClient::new(credentials)?;
    tracing::info!(url = %url, "connected to Jira");
    Ok(Arc::new(client))
}

// ── AppState ────────────────────────────────────────────────────────────────
/// Central application state. Cheap to clone; everything shared sits behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<TrackerHandle>,
    pub start_time: Instant,
    /// Optional bearer secret for `/mcp` in HTTP mode. None = no auth.
    pub auth_secret: Option<String>,
}

impl AppState {
    pub fn new(tracker: TrackerHandle) -> Self {
        Self {
            tracker: Arc::new(tracker),
            start_time: Instant::now(),
            auth_secret: None,
        }
    }

    pub fn with_auth_secret(mut self, secret: Option<String>) -> Self {
        if secret.is_some() {
            tracing::info!("AUTH_SECRET configured, /mcp requires a bearer token");
        }
        self.auth_secret = secret;
        self
    }

    /// Resolve the shared Jira client, constructing it on first use.
    pub async fn tracker(&self) -> Result<Arc<dyn IssueTracker>, JiraError> {
        self.tracker.get().await
    }
}
