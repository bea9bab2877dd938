//! Fetch strategies and the HTTP-backed `Fetcher`

pub mod github;
pub mod line_scanner;
pub mod raw;
pub mod selector;

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::config::UpdaterConfig;
use crate::version::error::FetchError;
use crate::version::extractor::VersionExtractor;
use crate::version::fetcher::{Fetched, Fetcher};
use crate::version::source::{GithubBlob, Source};

pub use github::GithubCommitLookup;
pub use line_scanner::LineScanner;
pub use raw::RawDownloader;
pub use selector::CssSelectorScraper;

/// `Fetcher` that dispatches each source kind to its strategy over one shared client
pub struct HttpFetcher {
    downloader: RawDownloader,
    line_scanner: LineScanner,
    github: GithubCommitLookup,
    selector: CssSelectorScraper,
    github_raw_url: String,
}

impl HttpFetcher {
    /// Builds the fetcher; fails only when a configured pattern does not compile
    pub fn new(config: &UpdaterConfig, github_token: Option<String>) -> Result<Self, regex::Error> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .expect("Failed to create HTTP client");
        let extractor = VersionExtractor::new(&config.strict, &config.loose)?;
        let downloader = RawDownloader::new(client.clone());

        Ok(Self {
            line_scanner: LineScanner::new(downloader.clone(), extractor.clone(), config.lines),
            github: GithubCommitLookup::new(client, &config.github_api_url, github_token),
            selector: CssSelectorScraper::new(downloader.clone(), extractor),
            downloader,
            github_raw_url: config.github_raw_url.clone(),
        })
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, source: &Source) -> Result<Fetched, FetchError> {
        debug!("Fetching {} source {:?}", source.kind(), source);
        match source {
            Source::Selector { url, selector } => self.selector.fetch(url, selector).await,
            Source::GitHub(blob) => {
                let sha = self.github.latest_commit(blob).await?;
                Ok(Fetched::new(Some(sha), None))
            }
            Source::Raw(url) => self.line_scanner.fetch(url).await,
        }
    }

    async fn download(&self, url: &str) -> Result<String, FetchError> {
        self.downloader.download(url).await
    }

    fn raw_url(&self, blob: &GithubBlob) -> String {
        blob.raw_url(&self.github_raw_url)
    }
}
