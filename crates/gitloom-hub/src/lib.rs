//! GitHub hosting API client.
//!
//! The orchestrator only needs a handful of REST v3 calls: create a repository
//! and get its clone URL, enumerate owned repositories, delete one, and flip
//! visibility. The token is carried in headers and never logged.

use anyhow::{bail, Context, Result};
use serde::Deserialize;

const DEFAULT_BASE: &str = "https://api.github.com";
const ACCEPT: &str = "application/vnd.github.v3+json";
const PAGE_SIZE: u32 = 100;

/// One repository as reported by the listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteRepo {
    pub name: String,
    pub private: bool,
    #[serde(default)]
    pub fork: bool,
    pub owner: RepoOwner,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepoOwner {
    pub login: String,
}

#[derive(Debug, Deserialize)]
struct CreatedRepo {
    clone_url: String,
}

pub struct HubClient {
    http: reqwest::Client,
    token: String,
    base: String,
}

impl HubClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base(token, DEFAULT_BASE)
    }

    /// Point the client at a different API root. Used by tests.
    pub fn with_base(token: impl Into<String>, base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            token: token.into(),
            base: base.into(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{path}", self.base))
            .header("Authorization", format!("token {}", self.token))
            .header("Accept", ACCEPT)
            .header("User-Agent", "gitloom")
    }

    /// Create a repository under the authenticated user and return its clone
    /// URL. The repository is created empty (no auto-init) so the first push
    /// defines its history.
    pub async fn create_repo(&self, name: &str, private: bool) -> Result<String> {
        let body = serde_json::json!({
            "name": name,
            "private": private,
            "auto_init": false,
            "default_branch": "main",
        });
        let resp = self
            .request(reqwest::Method::POST, "/user/repos")
            .json(&body)
            .send()
            .await
            .context("create repository request")?;
        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            bail!("creating repository {name} failed ({status}): {detail}");
        }
        let created: CreatedRepo = resp.json().await.context("parse created repository")?;
        Ok(created.clone_url)
    }

    /// All repositories owned by the authenticated user, public and private,
    /// following pagination until an empty page.
    pub async fn list_owned(&self) -> Result<Vec<RemoteRepo>> {
        let mut repos = Vec::new();
        let mut page = 1u32;
        loop {
            let path = format!(
                "/user/repos?per_page={PAGE_SIZE}&page={page}&affiliation=owner&visibility=all"
            );
            let resp = self
                .request(reqwest::Method::GET, &path)
                .send()
                .await
                .context("list repositories request")?;
            let status = resp.status();
            if !status.is_success() {
                let detail = resp.text().await.unwrap_or_default();
                bail!("listing repositories failed ({status}): {detail}");
            }
            let batch: Vec<RemoteRepo> = resp.json().await.context("parse repository page")?;
            if batch.is_empty() {
                break;
            }
            tracing::debug!(page, count = batch.len(), "fetched repository page");
            repos.extend(batch);
            page += 1;
        }
        Ok(repos)
    }

    pub async fn delete_repo(&self, owner: &str, name: &str) -> Result<()> {
        let resp = self
            .request(reqwest::Method::DELETE, &format!("/repos/{owner}/{name}"))
            .send()
            .await
            .context("delete repository request")?;
        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            bail!("deleting {owner}/{name} failed ({status}): {detail}");
        }
        Ok(())
    }

    pub async fn set_private(&self, owner: &str, name: &str) -> Result<()> {
        let resp = self
            .request(reqwest::Method::PATCH, &format!("/repos/{owner}/{name}"))
            .json(&serde_json::json!({ "private": true }))
            .send()
            .await
            .context("set visibility request")?;
        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            bail!("setting {owner}/{name} private failed ({status}): {detail}");
        }
        Ok(())
    }

    /// OAuth scopes granted to the token, from the `x-oauth-scopes` header of
    /// GET /user. Destructive commands check these before acting.
    pub async fn token_scopes(&self) -> Result<Vec<String>> {
        let resp = self
            .request(reqwest::Method::GET, "/user")
            .send()
            .await
            .context("token verification request")?;
        let status = resp.status();
        if !status.is_success() {
            bail!("token verification failed ({status})");
        }
        let header = resp
            .headers()
            .get("x-oauth-scopes")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        Ok(parse_scopes(header))
    }
}

/// Split the comma-separated `x-oauth-scopes` header into scope names.
pub fn parse_scopes(header: &str) -> Vec<String> {
    header
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Embed the token into an HTTPS clone URL so pushes authenticate without a
/// credential helper.
pub fn authenticated_url(clone_url: &str, token: &str) -> String {
    clone_url.replacen("https://", &format!("https://{token}@"), 1)
}
