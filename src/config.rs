//! Environment-driven configuration.
//!
//! Jira credentials are read lazily, on the first tool call that needs a
//! client. Server settings (transport, port, auth secret) are read once at
//! startup by `main`.

use std::fmt;

use url::Url;

pub const JIRA_URL: &str = "JIRA_URL";
pub const JIRA_EMAIL: &str = "JIRA_EMAIL";
pub const JIRA_API_TOKEN: &str = "JIRA_API_TOKEN";
pub const JIRA_AUTH_TYPE: &str = "JIRA_AUTH_TYPE";

const DEFAULT_PORT: u16 = 8091;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing Jira credentials in environment: {}", .missing.join(", "))]
    MissingCredentials { missing: Vec<&'static str> },

    #[error("Invalid JIRA_URL '{value}': {reason}")]
    InvalidUrl { value: String, reason: String },

    #[error("Invalid JIRA_AUTH_TYPE '{0}' (expected 'basic' or 'bearer')")]
    InvalidAuthType(String),

    #[error("Invalid MCP_TRANSPORT '{0}' (expected 'stdio' or 'http')")]
    InvalidTransport(String),

    #[error("Invalid PORT '{0}'")]
    InvalidPort(String),
}

// ── Jira credentials ────────────────────────────────────────────────────────

/// How the API token is presented to Jira.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JiraAuth {
    /// Jira Cloud: `email:api_token` as HTTP Basic credentials.
    Basic { email: String },
    /// Server / Data Center personal access token, sent as `Bearer <token>`.
    Bearer,
}

#[derive(Clone)]
pub struct JiraCredentials {
    pub base_url: Url,
    pub auth: JiraAuth,
    pub api_token: String,
}

// Keep the token out of logs.
impl fmt::Debug for JiraCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JiraCredentials")
            .field("base_url", &self.base_url.as_str())
            .field("auth", &self.auth)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

impl JiraCredentials {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build credentials from an arbitrary key lookup. Absent and empty
    /// values are both treated as missing, and every missing key is named.
    ///
    /// `JIRA_AUTH_TYPE` selects `basic` (default) or `bearer`; `JIRA_EMAIL`
    /// is only required for `basic`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bearer = match read(JIRA_AUTH_TYPE).map(|v| v.to_ascii_lowercase()).as_deref() {
            None | Some("basic") => false,
            Some("bearer") => true,
            Some(other) => return Err(ConfigError::InvalidAuthType(other.to_string())),
        };

        let url = read(JIRA_URL);
        let email = read(JIRA_EMAIL);
        let token = read(JIRA_API_TOKEN);

        let missing: Vec<&'static str> = [
            (JIRA_URL, url.is_none()),
            (JIRA_EMAIL, !bearer && email.is_none()),
            (JIRA_API_TOKEN, token.is_none()),
        ]
        .into_iter()
        .filter_map(|(key, absent)| absent.then_some(key))
        .collect();

        let (Some(url), Some(api_token), true) = (url, token, missing.is_empty()) else {
            return Err(ConfigError::MissingCredentials { missing });
        };

        let auth = match email {
            Some(email) if !bearer => JiraAuth::Basic { email },
            _ => JiraAuth::Bearer,
        };
        Ok(Self {
            base_url: parse_base_url(&url)?,
            auth,
            api_token,
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        value: raw.to_string(),
        reason,
    };

    let mut url = Url::parse(raw.trim_end_matches('/')).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    // Endpoint paths are joined onto the base, so it must end with a slash.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

// ── Server settings ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Stdio,
    Http,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub transport: Transport,
    pub port: u16,
    /// Optional bearer secret for the HTTP transport. `None` = no auth.
    pub auth_secret: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let transport = match lookup("MCP_TRANSPORT").as_deref().map(str::trim) {
            None | Some("") | Some("stdio") => Transport::Stdio,
            Some("http") => Transport::Http,
            Some(other) => return Err(ConfigError::InvalidTransport(other.to_string())),
        };

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let auth_secret = lookup("AUTH_SECRET").filter(|s| !s.is_empty());

        Ok(Self {
            transport,
            port,
            auth_secret,
        })
    }
}
