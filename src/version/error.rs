use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Empty content from {0}")]
    EmptyContent(String),

    #[error("No version found in {0}")]
    NoVersionFound(String),

    #[error("Malformed GitHub URL: {0}")]
    MalformedGithubUrl(String),

    #[error("No commits found for {path} in {repo} on {branch}")]
    NoCommits {
        repo: String,
        path: String,
        branch: String,
    },

    #[error("Invalid CSS selector: {0}")]
    InvalidSelector(String),

    #[error("Selector {selector} matched nothing at {url}")]
    SelectorNotFound { url: String, selector: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("Failed to fetch {key}: {source}")]
    Fetch {
        key: String,
        #[source]
        source: FetchError,
    },

    #[error("unable to find and parse the version for {key}")]
    NoVersionFound { key: String },

    #[error("Failed to write {}: {source}", path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize manifest: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read manifest {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse manifest: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Manifest has no \"bundle\" object")]
    MissingBundle,
}
