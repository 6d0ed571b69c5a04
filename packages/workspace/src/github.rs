//! GitHub contents API store.
//!
//! Documents live at `content/site.<locale>.json` on one branch of a
//! repository. The blob `sha` is the version token: GitHub refuses a PUT
//! whose `sha` is not the file's current one.

use crate::errors::{PersistError, PersistResult};
use crate::store::{to_pretty_json, ContentStore, StoreMode, StoredContent};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use folio_common::Locale;
use folio_editor::{ContentDocument, VersionToken};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str = "https://api.github.com";

#[derive(Clone)]
pub struct GitHubStore {
    client: reqwest::Client,
    api_base: String,
    token: String,
    repo: String,
    branch: String,
}

#[derive(Deserialize)]
struct ContentsResponse {
    sha: String,
    content: String,
}

#[derive(Serialize)]
struct PutRequest<'a> {
    message: String,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    branch: &'a str,
}

#[derive(Deserialize)]
struct PutResponse {
    content: Option<PutContent>,
}

#[derive(Deserialize)]
struct PutContent {
    sha: Option<String>,
}

impl GitHubStore {
    /// `repo` is `owner/name`
    pub fn new(token: String, repo: String, branch: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            token,
            repo,
            branch,
        }
    }

    /// Point the store at another API host
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    fn contents_url(&self, locale: Locale) -> String {
        format!(
            "{}/repos/{}/contents/content/{}",
            self.api_base,
            self.repo,
            locale.file_name()
        )
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "folio-server")
    }
}

async fn backend_error(response: reqwest::Response) -> PersistError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    PersistError::Backend { status, body }
}

#[async_trait]
impl ContentStore for GitHubStore {
    fn mode(&self) -> StoreMode {
        StoreMode::Remote
    }

    async fn read(&self, locale: Locale) -> PersistResult<StoredContent> {
        let url = format!("{}?ref={}", self.contents_url(locale), self.branch);
        let response = self
            .request(reqwest::Method::GET, &url)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(PersistError::NotFound(locale));
        }
        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }

        let contents: ContentsResponse = response.json().await?;
        // The API wraps base64 bodies at 60 columns
        let encoded: String = contents.content.split_whitespace().collect();
        let raw = STANDARD
            .decode(encoded)
            .map_err(|e| PersistError::Corrupt(e.to_string()))?;
        let document = ContentDocument::parse(serde_json::from_slice(&raw)?)?;
        tracing::debug!(%locale, sha = %contents.sha, "Loaded content from GitHub");

        Ok(StoredContent {
            document,
            version: VersionToken::new(contents.sha),
        })
    }

    async fn write(
        &self,
        locale: Locale,
        document: &ContentDocument,
        expected: Option<&VersionToken>,
    ) -> PersistResult<VersionToken> {
        let body = PutRequest {
            message: format!("chore(content): update {} via Admin UI", locale.file_name()),
            content: STANDARD.encode(to_pretty_json(document)?),
            sha: expected.map(VersionToken::as_str),
            branch: &self.branch,
        };

        let response = self
            .request(reqwest::Method::PUT, &self.contents_url(locale))
            .json(&body)
            .send()
            .await?;

        match response.status() {
            StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                tracing::warn!(%locale, "GitHub rejected stale sha");
                return Err(PersistError::Conflict(locale));
            }
            status if !status.is_success() => return Err(backend_error(response).await),
            _ => {}
        }

        let committed: PutResponse = response.json().await?;
        let sha = committed
            .content
            .and_then(|content| content.sha)
            .or_else(|| expected.map(|token| token.as_str().to_string()))
            .ok_or_else(|| PersistError::Corrupt("commit response carried no sha".to_string()))?;
        tracing::info!(%locale, %sha, repo = %self.repo, "Committed content to GitHub");

        Ok(VersionToken::new(sha))
    }
}
