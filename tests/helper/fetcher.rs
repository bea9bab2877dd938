//! Fetcher test double that records every call

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use bundle_updater::version::error::FetchError;
use bundle_updater::version::fetcher::{Fetched, Fetcher};
use bundle_updater::version::source::{GithubBlob, Source};

type ErrorFn = fn() -> FetchError;

/// Mock fetcher keyed by descriptor
#[derive(Default)]
pub struct MockFetcher {
    results: Vec<(Source, Fetched)>,
    errors: Vec<(Source, ErrorFn)>,
    downloads: HashMap<String, String>,
    fetch_calls: Mutex<Vec<Source>>,
    download_calls: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(mut self, descriptor: &str, version: &str, content: Option<&str>) -> Self {
        self.results.push((
            Source::classify(descriptor),
            Fetched::new(Some(version.to_string()), content.map(str::to_string)),
        ));
        self
    }

    pub fn with_error(mut self, descriptor: &str, error: ErrorFn) -> Self {
        self.errors.push((Source::classify(descriptor), error));
        self
    }

    pub fn with_download(mut self, url: &str, content: &str) -> Self {
        self.downloads.insert(url.to_string(), content.to_string());
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_calls.lock().unwrap().len()
    }

    pub fn download_calls(&self) -> Vec<String> {
        self.download_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, source: &Source) -> Result<Fetched, FetchError> {
        self.fetch_calls.lock().unwrap().push(source.clone());

        if let Some((_, error)) = self.errors.iter().find(|(s, _)| s == source) {
            return Err(error());
        }
        self.results
            .iter()
            .find(|(s, _)| s == source)
            .map(|(_, fetched)| fetched.clone())
            .ok_or_else(|| FetchError::InvalidResponse(format!("unexpected source {:?}", source)))
    }

    async fn download(&self, url: &str) -> Result<String, FetchError> {
        self.download_calls.lock().unwrap().push(url.to_string());

        self.downloads.get(url).cloned().ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 404,
        })
    }

    fn raw_url(&self, blob: &GithubBlob) -> String {
        blob.raw_url("https://raw.github.com")
    }
}
