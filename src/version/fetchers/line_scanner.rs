//! Version lookup from the header lines of a downloaded file

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::version::error::FetchError;
use crate::version::extractor::VersionExtractor;
use crate::version::fetcher::Fetched;
use crate::version::fetchers::raw::RawDownloader;

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r\n|\r|\n").expect("valid line break pattern"));

/// Downloads a file and looks for a version in its first `lines` lines
pub struct LineScanner {
    downloader: RawDownloader,
    extractor: VersionExtractor,
    lines: usize,
}

impl LineScanner {
    pub fn new(downloader: RawDownloader, extractor: VersionExtractor, lines: usize) -> Self {
        Self {
            downloader,
            extractor,
            lines,
        }
    }

    pub async fn fetch(&self, url: &str) -> Result<Fetched, FetchError> {
        let content = self.downloader.download(url).await?;

        let version = scan_lines(&self.extractor, &content, self.lines)
            .ok_or_else(|| FetchError::NoVersionFound(url.to_string()))?;
        debug!("Found version {} in {}", version, url);

        Ok(Fetched::new(Some(version), Some(content)))
    }
}

/// Returns the version from the first of the leading `lines` lines that has one.
pub fn scan_lines(extractor: &VersionExtractor, content: &str, lines: usize) -> Option<String> {
    LINE_BREAK
        .split(content)
        .take(lines)
        .find_map(|line| extractor.extract(line))
}
