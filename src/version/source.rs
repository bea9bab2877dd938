//! Classification of bundle `latest` descriptors

use std::sync::LazyLock;

use regex::Regex;

use crate::version::error::FetchError;

static GITHUB_BLOB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://)?(?:www\.)?github\.com/([^/]+)/([^/]+)/blob/([^/]+)/(.+)$")
        .expect("valid GitHub pattern")
});

/// Where a bundle's latest version is resolved from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// `url#selector`: text of the first element matching `selector` on the page
    Selector { url: String, selector: String },
    /// GitHub blob URL: the newest commit touching the file
    GitHub(GithubBlob),
    /// Any other URL: first lines of the downloaded file
    Raw(String),
}

impl Source {
    /// Classifies a descriptor once; the first `#` splits page URL from selector.
    pub fn classify(descriptor: &str) -> Self {
        if let Some((url, selector)) = descriptor.split_once('#') {
            return Source::Selector {
                url: url.to_string(),
                selector: selector.to_string(),
            };
        }

        match GithubBlob::parse(descriptor) {
            Ok(blob) => Source::GitHub(blob),
            Err(_) => Source::Raw(descriptor.to_string()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Source::Selector { .. } => "selector",
            Source::GitHub(_) => "github",
            Source::Raw(_) => "raw",
        }
    }
}

/// A file on a GitHub branch, parsed from `github.com/{owner}/{repo}/blob/{branch}/{path}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubBlob {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub path: String,
}

impl GithubBlob {
    pub fn parse(url: &str) -> Result<Self, FetchError> {
        let caps = GITHUB_BLOB
            .captures(url)
            .ok_or_else(|| FetchError::MalformedGithubUrl(url.to_string()))?;

        Ok(Self {
            owner: caps[1].to_string(),
            repo: caps[2].to_string(),
            branch: caps[3].to_string(),
            path: caps[4].to_string(),
        })
    }

    /// Raw-content URL for this file under `base` (e.g. `https://raw.github.com`)
    pub fn raw_url(&self, base: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            base.trim_end_matches('/'),
            self.owner,
            self.repo,
            self.branch,
            self.path
        )
    }
}
