//! Fetcher trait for resolving bundle versions from upstream sources

#[cfg(test)]
use mockall::automock;

use crate::version::error::FetchError;
use crate::version::source::{GithubBlob, Source};

/// Result of resolving a source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fetched {
    /// Resolved version (a version string or a commit SHA)
    pub version: Option<String>,
    /// Bundle content, when the strategy already downloaded it
    pub content: Option<String>,
}

impl Fetched {
    pub fn new(version: Option<String>, content: Option<String>) -> Self {
        Self { version, content }
    }
}

/// Trait for resolving versions and downloading bundle content
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Resolves the latest version for a classified source
    ///
    /// # Returns
    /// * `Ok(Fetched)` - Version (possibly absent) and content if it was downloaded
    /// * `Err(FetchError)` - If the source could not be fetched
    async fn fetch(&self, source: &Source) -> Result<Fetched, FetchError>;

    /// Downloads the raw text at `url`
    async fn download(&self, url: &str) -> Result<String, FetchError>;

    /// Raw-content URL for a GitHub-hosted file
    fn raw_url(&self, blob: &GithubBlob) -> String;
}
