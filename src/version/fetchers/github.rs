//! GitHub commits API lookup: the newest commit touching a file is its version

use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::version::error::FetchError;
use crate::version::source::GithubBlob;

/// Entry of the GitHub list-commits response
#[derive(Debug, Deserialize)]
struct Commit {
    sha: String,
}

pub struct GithubCommitLookup {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl GithubCommitLookup {
    pub fn new(client: Client, base_url: &str, token: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Returns the SHA of the most recent commit to `blob.path` on `blob.branch`
    pub async fn latest_commit(&self, blob: &GithubBlob) -> Result<String, FetchError> {
        let commits = self.commits(blob).await?;

        let latest = commits.into_iter().next().ok_or_else(|| FetchError::NoCommits {
            repo: format!("{}/{}", blob.owner, blob.repo),
            path: blob.path.clone(),
            branch: blob.branch.clone(),
        })?;
        debug!(
            "Latest commit for {}/{}/{} is {}",
            blob.owner, blob.repo, blob.path, latest.sha
        );

        Ok(latest.sha)
    }

    async fn commits(&self, blob: &GithubBlob) -> Result<Vec<Commit>, FetchError> {
        let endpoint = format!(
            "{}/repos/{}/{}/commits",
            self.base_url, blob.owner, blob.repo
        );
        let mut url = Url::parse(&endpoint)
            .map_err(|_| FetchError::MalformedGithubUrl(endpoint.clone()))?;
        url.query_pairs_mut()
            .append_pair("path", &blob.path)
            .append_pair("sha", &blob.branch);

        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        let status = response.status();

        if !status.is_success() {
            warn!("GitHub API returned status {}: {}", status, endpoint);
            return Err(FetchError::Status {
                url: endpoint,
                status: status.as_u16(),
            });
        }

        response.json().await.map_err(|e| {
            warn!("Failed to parse GitHub commits response: {}", e);
            FetchError::InvalidResponse(e.to_string())
        })
    }
}
