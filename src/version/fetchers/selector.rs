//! Version lookup from an element of an HTML page

use scraper::{Html, Selector};
use tracing::debug;

use crate::version::error::FetchError;
use crate::version::extractor::VersionExtractor;
use crate::version::fetcher::Fetched;
use crate::version::fetchers::raw::RawDownloader;

pub struct CssSelectorScraper {
    downloader: RawDownloader,
    extractor: VersionExtractor,
}

impl CssSelectorScraper {
    pub fn new(downloader: RawDownloader, extractor: VersionExtractor) -> Self {
        Self {
            downloader,
            extractor,
        }
    }

    /// Fetches `url` and resolves a version from the text under `selector`.
    ///
    /// The page itself is not bundle content, so `content` is left empty.
    pub async fn fetch(&self, url: &str, selector: &str) -> Result<Fetched, FetchError> {
        if Selector::parse(selector).is_err() {
            return Err(FetchError::InvalidSelector(selector.to_string()));
        }

        let page = self.downloader.download(url).await?;

        let text = select_text(&page, selector).ok_or_else(|| FetchError::SelectorNotFound {
            url: url.to_string(),
            selector: selector.to_string(),
        })?;
        debug!("Selector {} at {} yielded {:?}", selector, url, text);

        Ok(Fetched::new(self.extractor.extract(&text), None))
    }
}

/// Text of the first element matching `selector`, whitespace-joined
pub fn select_text(html: &str, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let document = Html::parse_document(html);

    document.select(&selector).next().map(|element| {
        element
            .text()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    })
}
