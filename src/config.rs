use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::version::extractor::{DEFAULT_LOOSE_PATTERN, DEFAULT_STRICT_PATTERN};

// =============================================================================
// Fetch-related constants
// =============================================================================

/// Number of leading lines scanned for a version string
pub const DEFAULT_SCAN_LINES: usize = 10;

/// Timeout for each HTTP request in milliseconds (30 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Delay between starting each fetch request to avoid rate limiting (10ms)
pub const DEFAULT_STAGGER_DELAY_MS: u64 = 10;

/// Default base URL for GitHub API
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Default host serving raw GitHub file contents
pub const DEFAULT_GITHUB_RAW_URL: &str = "https://raw.github.com";

pub const DEFAULT_USER_AGENT: &str = "bundle-updater";

/// Updater configuration structure
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdaterConfig {
    /// Primary version pattern (major, minor, patch capture groups)
    pub strict: String,
    /// Fallback version pattern tried when `strict` finds nothing
    pub loose: String,
    /// Line window scanned by the line scanner
    pub lines: usize,
    /// HTTP request timeout in milliseconds
    pub timeout_ms: u64,
    /// Delay between starting each bundle's fetch in milliseconds
    pub stagger_delay_ms: u64,
    pub github_api_url: String,
    pub github_raw_url: String,
    pub user_agent: String,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            strict: DEFAULT_STRICT_PATTERN.to_string(),
            loose: DEFAULT_LOOSE_PATTERN.to_string(),
            lines: DEFAULT_SCAN_LINES,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            stagger_delay_ms: DEFAULT_STAGGER_DELAY_MS,
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            github_raw_url: DEFAULT_GITHUB_RAW_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl UpdaterConfig {
    /// Loads configuration from a JSON file, filling missing fields with defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&text)?;
        Ok(config)
    }
}

/// Returns the path to the data directory for bundle-updater.
/// Uses $XDG_DATA_HOME/bundle-updater if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/bundle-updater,
/// or ./bundle-updater if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the default log file.
pub fn log_path() -> PathBuf {
    data_dir().join("bundle-updater.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("bundle-updater")
}
