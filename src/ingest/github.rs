/// GitHub raw-file supplier
///
/// Thin reqwest wrapper over the GitHub contents API: directory listings and
/// raw file downloads. Every request carries an explicit 30-second timeout;
/// non-success responses surface as ordinary errors so the ingestion
/// pipeline can skip the item and continue the batch.

use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::time::Duration;

/// Per-request timeout for listing and download calls
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent required by the GitHub API
const USER_AGENT: &str = "workflow-catalog/0.1";

/// One entry of a repository directory listing
#[derive(Debug, Clone, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    pub path: String,
    /// "file" or "dir"
    #[serde(rename = "type")]
    pub entry_type: String,
    /// Raw download reference; absent for directories
    pub download_url: Option<String>,
    /// Browser-facing URL, recorded as the record's source_url
    pub html_url: Option<String>,
}

impl ContentEntry {
    pub fn is_file(&self) -> bool {
        self.entry_type == "file"
    }

    pub fn is_dir(&self) -> bool {
        self.entry_type == "dir"
    }
}

/// HTTP client for the GitHub contents API
#[derive(Debug, Clone)]
pub struct GithubClient {
    client: reqwest::Client,
}

impl GithubClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    /// List the contents of a repository path
    ///
    /// GET https://api.github.com/repos/{repo}/contents/{path}
    pub async fn list_contents(&self, repo: &str, path: &str) -> Result<Vec<ContentEntry>> {
        let url = format!("https://api.github.com/repos/{}/contents/{}", repo, path);
        tracing::debug!("📡 Listing repository contents: {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("GitHub listing {} returned {}", url, response.status()));
        }

        Ok(response.json().await?)
    }

    /// Download a raw file body
    pub async fn download(&self, url: &str) -> Result<String> {
        tracing::debug!("📥 Downloading workflow file: {}", url);

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("Download {} returned {}", url, response.status()));
        }

        Ok(response.text().await?)
    }
}
