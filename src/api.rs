// API client module: a small blocking HTTP client for the GitHub REST API.
// Every call is synchronous; the interactive loop waits on it.

use anyhow::Context;
use base64::Engine;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{CliError, Result};

const GITHUB_V3_JSON: &str = "application/vnd.github.v3+json";

/// Blocking client holding the reqwest connection pool and the settings it
/// was built from. It keeps no credentials: the token lives in
/// [`crate::session::Session`] and is passed to the calls that need it.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    config: ClientConfig,
}

/// Snapshot of `GET /users/{username}`.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub login: String,
    /// GitHub sends `null` for users who never set a display name.
    #[serde(default)]
    pub name: Option<String>,
    pub public_repos: u64,
    pub followers: u64,
    pub following: u64,
    pub public_gists: u64,
    pub avatar_url: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EventRepo {
    pub name: String,
}

/// One entry of `GET /users/{username}/events`. The payload is kept raw;
/// [`ActivityEvent::detail`] decodes it according to `kind`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ActivityEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub repo: EventRepo,
    pub created_at: String,
    #[serde(default)]
    pub payload: Map<String, Value>,
}

/// The part of an event payload worth showing for each known event type.
#[derive(Debug, Clone, PartialEq)]
pub enum EventDetail {
    Push { git_ref: String },
    PullRequest { action: String },
    IssueComment { body: String },
    Other(Value),
}

/// Entry of `GET /users/{username}/repos`.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    pub name: String,
    pub html_url: String,
}

/// Identity behind a token, from `GET /user`.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub login: String,
}

/// Result of an accepted fork request.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ForkedRepository {
    pub html_url: String,
}

#[derive(Deserialize)]
struct ReadmeResponse {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct PushPayload {
    #[serde(rename = "ref", default)]
    git_ref: String,
}

#[derive(Deserialize)]
struct PullRequestPayload {
    #[serde(default)]
    action: String,
}

#[derive(Deserialize)]
struct IssueCommentPayload {
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    comment: Option<CommentBody>,
}

#[derive(Deserialize)]
struct CommentBody {
    #[serde(default)]
    body: String,
}

type DetailDecoder = fn(Value) -> serde_json::Result<EventDetail>;

/// Payload decoders keyed by event type. Types not listed here are shown raw.
const DETAIL_DECODERS: &[(&str, DetailDecoder)] = &[
    ("PushEvent", decode_push),
    ("PullRequestEvent", decode_pull_request),
    ("IssueCommentEvent", decode_issue_comment),
];

fn decode_push(payload: Value) -> serde_json::Result<EventDetail> {
    let p: PushPayload = serde_json::from_value(payload)?;
    Ok(EventDetail::Push { git_ref: p.git_ref })
}

fn decode_pull_request(payload: Value) -> serde_json::Result<EventDetail> {
    let p: PullRequestPayload = serde_json::from_value(payload)?;
    Ok(EventDetail::PullRequest { action: p.action })
}

fn decode_issue_comment(payload: Value) -> serde_json::Result<EventDetail> {
    let p: IssueCommentPayload = serde_json::from_value(payload)?;
    let body = p
        .body
        .or_else(|| p.comment.map(|c| c.body))
        .unwrap_or_default();
    Ok(EventDetail::IssueComment { body })
}

impl ActivityEvent {
    /// Decode the payload for this event's type. Fails only when a known
    /// type carries a payload of the wrong shape.
    pub fn detail(&self) -> serde_json::Result<EventDetail> {
        let payload = Value::Object(self.payload.clone());
        match DETAIL_DECODERS.iter().find(|(kind, _)| *kind == self.kind) {
            Some((_, decode)) => decode(payload),
            None => Ok(EventDetail::Other(payload)),
        }
    }
}

impl ApiClient {
    /// Build a client for the given settings.
    pub fn new(config: ClientConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_V3_JSON));
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Send a request and decode a 200 response body as JSON.
    fn fetch_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let res = req.send()?;
        let status = res.status();
        debug!(url = %res.url(), %status, "response received");
        if status != StatusCode::OK {
            return Err(CliError::Status { status });
        }
        let body = res.text()?;
        Ok(serde_json::from_str(&body)?)
    }

    /// `GET /users/{username}`.
    pub fn fetch_user(&self, username: &str) -> Result<UserProfile> {
        let url = self.url(&format!("/users/{username}"));
        self.fetch_json(self.client.get(&url))
    }

    /// `GET /users/{username}/events`, in the order the API returns them.
    pub fn fetch_activity(&self, username: &str) -> Result<Vec<ActivityEvent>> {
        let url = self.url(&format!("/users/{username}/events"));
        self.fetch_json(self.client.get(&url))
    }

    /// `GET /users/{username}/repos`, first page only.
    pub fn list_repositories(&self, username: &str) -> Result<Vec<RepositoryRef>> {
        let url = self.url(&format!("/users/{username}/repos"));
        self.fetch_json(self.client.get(&url))
    }

    /// Fetch README.md from the `master` ref and return it decoded. An empty
    /// file comes back as an empty string, not an error.
    pub fn fetch_readme(&self, owner: &str, repo: &str) -> Result<String> {
        let url = self.url(&format!("/repos/{owner}/{repo}/contents/README.md"));
        let resp: ReadmeResponse = self.fetch_json(self.client.get(&url).query(&[("ref", "master")]))?;
        let encoded = resp.content.ok_or(CliError::MissingContent)?;

        // GitHub wraps the base64 text at 60 columns.
        let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let bytes = base64::engine::general_purpose::STANDARD.decode(compact)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// `GET /user` with the given token. A 200 means the token is usable.
    pub fn authenticate(&self, token: &str) -> Result<AuthenticatedUser> {
        let url = self.url("/user");
        let res = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("token {token}"))
            .send()?;
        let status = res.status();
        debug!(%status, "token validation response");
        if status != StatusCode::OK {
            return Err(CliError::TokenRejected { status });
        }
        let body = res.text()?;
        Ok(serde_json::from_str(&body)?)
    }

    /// `POST /repos/{owner}/{repo}/forks`. Only `202 Accepted` counts as
    /// success; the body is then parsed for the new repository URL.
    pub fn fork_repository(&self, owner: &str, repo: &str, token: &str) -> Result<ForkedRepository> {
        let url = self.url(&format!("/repos/{owner}/{repo}/forks"));
        let res = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("token {token}"))
            .json(&serde_json::json!({}))
            .timeout(self.config.fork_timeout)
            .send()?;
        let status = res.status();
        let body = res.text()?;
        debug!(%status, %body, "fork response");
        if status != StatusCode::ACCEPTED {
            return Err(CliError::Status { status });
        }
        Ok(serde_json::from_str(&body)?)
    }
}
