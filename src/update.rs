//! Bundle update orchestration
//!
//! Resolves every third-party bundle concurrently, then merges the results into
//! the manifest one key at a time so manifest writes never interleave.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use futures::future::join_all;
use indexmap::IndexMap;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::manifest::Manifest;
use crate::version::error::{FetchError, UpdateError};
use crate::version::fetcher::Fetcher;
use crate::version::source::{GithubBlob, Source};

/// Final state of one bundle after a run
#[derive(Debug)]
pub enum BundleOutcome {
    /// No `latest` descriptor
    Skipped,
    Unchanged {
        version: String,
    },
    /// Newer version found but not written (check runs)
    Outdated {
        from: String,
        to: String,
    },
    Updated {
        from: String,
        to: String,
    },
    Failed(UpdateError),
}

impl fmt::Display for BundleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BundleOutcome::Skipped => write!(f, "skipped"),
            BundleOutcome::Unchanged { version } => write!(f, "up to date ({})", version),
            BundleOutcome::Outdated { from, to } => write!(f, "outdated ({} -> {})", from, to),
            BundleOutcome::Updated { from, to } => write!(f, "updated ({} -> {})", from, to),
            BundleOutcome::Failed(e) => write!(f, "failed: {}", e),
        }
    }
}

/// Per-bundle outcomes in manifest order
#[derive(Debug, Default)]
pub struct UpdateReport {
    outcomes: IndexMap<String, BundleOutcome>,
}

impl UpdateReport {
    pub fn outcomes(&self) -> &IndexMap<String, BundleOutcome> {
        &self.outcomes
    }

    pub fn get(&self, key: &str) -> Option<&BundleOutcome> {
        self.outcomes.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Keys that were written with a new version
    pub fn updated(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, BundleOutcome::Updated { .. }))
            .map(|(key, _)| key.as_str())
            .collect()
    }

    pub fn errors(&self) -> impl Iterator<Item = &UpdateError> {
        self.outcomes.values().filter_map(|outcome| match outcome {
            BundleOutcome::Failed(e) => Some(e),
            _ => None,
        })
    }

    fn log_errors(&self) {
        for e in self.errors() {
            error!("{}", e);
        }
    }
}

/// A bundle that has a `latest` descriptor, captured before fetching
#[derive(Debug, Clone)]
struct Pending {
    key: String,
    descriptor: String,
    source: Source,
    recorded: String,
    download: bool,
}

/// What a bundle's fetch resolved to
#[derive(Debug)]
enum Resolution {
    Unchanged(String),
    Changed {
        version: String,
        content: Option<String>,
    },
}

/// Checks every bundle with a `latest` descriptor and writes new versions.
///
/// Fetch failures are isolated per bundle and logged at the end of the run.
/// A manifest without a file path is left alone: nothing is fetched or written.
pub async fn update_bundles(
    manifest: &mut Manifest,
    fetcher: &dyn Fetcher,
    stagger: Duration,
) -> UpdateReport {
    if manifest.path().is_none() {
        info!("Manifest has no file path; skipping bundle updates");
        return UpdateReport::default();
    }

    let pending = pending_bundles(manifest);
    let mut resolved = resolve_all(fetcher, &pending, stagger, true).await;

    let keys: Vec<String> = manifest.bundle().keys().cloned().collect();
    let mut report = UpdateReport::default();

    for key in keys {
        let outcome = match resolved.remove(&key) {
            None => BundleOutcome::Skipped,
            Some(Err(e)) => BundleOutcome::Failed(e),
            Some(Ok(Resolution::Unchanged(version))) => BundleOutcome::Unchanged { version },
            Some(Ok(Resolution::Changed { version, content })) => {
                let from = manifest
                    .entry(&key)
                    .map(|entry| entry.version.clone())
                    .unwrap_or_default();
                let content = content.unwrap_or_default();
                match manifest.persist_update(&key, &version, &content) {
                    Ok(()) => {
                        info!("Updated {} from {} to {}", key, from, version);
                        BundleOutcome::Updated { from, to: version }
                    }
                    Err(e) => BundleOutcome::Failed(e),
                }
            }
        };
        report.outcomes.insert(key, outcome);
    }

    report.log_errors();
    report
}

/// Resolves every bundle's latest version without downloading or writing anything.
pub async fn check_bundles(
    manifest: &Manifest,
    fetcher: &dyn Fetcher,
    stagger: Duration,
) -> UpdateReport {
    let pending = pending_bundles(manifest);
    let mut resolved = resolve_all(fetcher, &pending, stagger, false).await;

    let mut report = UpdateReport::default();
    for (key, entry) in manifest.bundle() {
        let outcome = match resolved.remove(key) {
            None => BundleOutcome::Skipped,
            Some(Err(e)) => BundleOutcome::Failed(e),
            Some(Ok(Resolution::Unchanged(version))) => BundleOutcome::Unchanged { version },
            Some(Ok(Resolution::Changed { version, .. })) => {
                info!("{} is outdated: {} -> {}", key, entry.version, version);
                BundleOutcome::Outdated {
                    from: entry.version.clone(),
                    to: version,
                }
            }
        };
        report.outcomes.insert(key.clone(), outcome);
    }

    report.log_errors();
    report
}

fn pending_bundles(manifest: &Manifest) -> Vec<Pending> {
    manifest
        .bundle()
        .iter()
        .filter_map(|(key, entry)| {
            let descriptor = entry.latest.as_ref()?;
            Some(Pending {
                key: key.clone(),
                descriptor: descriptor.clone(),
                source: Source::classify(descriptor),
                recorded: entry.version.clone(),
                download: entry.download,
            })
        })
        .collect()
}

/// Resolves all pending bundles in parallel with staggered start times
async fn resolve_all(
    fetcher: &dyn Fetcher,
    pending: &[Pending],
    stagger: Duration,
    with_content: bool,
) -> HashMap<String, Result<Resolution, UpdateError>> {
    let futures = pending.iter().enumerate().map(|(i, bundle)| async move {
        sleep(start_delay(stagger, i)).await;
        let result = resolve(fetcher, bundle, with_content).await;
        (bundle.key.clone(), result)
    });

    join_all(futures).await.into_iter().collect()
}

/// Start offset of the `index`-th fetch, saturating instead of overflowing
fn start_delay(stagger: Duration, index: usize) -> Duration {
    let index = u32::try_from(index).unwrap_or(u32::MAX);
    stagger.saturating_mul(index)
}

async fn resolve(
    fetcher: &dyn Fetcher,
    bundle: &Pending,
    with_content: bool,
) -> Result<Resolution, UpdateError> {
    let into_update_error = |e: FetchError| match e {
        FetchError::NoVersionFound(_) => UpdateError::NoVersionFound {
            key: bundle.key.clone(),
        },
        source => UpdateError::Fetch {
            key: bundle.key.clone(),
            source,
        },
    };

    debug!(
        "Resolving {} via {} source {}",
        bundle.key,
        bundle.source.kind(),
        bundle.descriptor
    );
    let fetched = fetcher
        .fetch(&bundle.source)
        .await
        .map_err(into_update_error)?;

    let version = fetched.version.ok_or_else(|| UpdateError::NoVersionFound {
        key: bundle.key.clone(),
    })?;

    if version == bundle.recorded {
        debug!("{} is up to date ({})", bundle.key, version);
        return Ok(Resolution::Unchanged(version));
    }

    if !with_content {
        return Ok(Resolution::Changed {
            version,
            content: None,
        });
    }

    let content = match fetched.content {
        Some(content) => content,
        None => {
            let url = download_url(fetcher, bundle).map_err(into_update_error)?;
            debug!("Downloading {} from {}", bundle.key, url);
            fetcher.download(&url).await.map_err(into_update_error)?
        }
    };

    Ok(Resolution::Changed {
        version,
        content: Some(content),
    })
}

/// Raw GitHub URL when `download` is set or the version came from commits, else the page URL
fn download_url(fetcher: &dyn Fetcher, bundle: &Pending) -> Result<String, FetchError> {
    let url = match &bundle.source {
        Source::Selector { url, .. } | Source::Raw(url) => url.as_str(),
        Source::GitHub(_) => bundle.descriptor.as_str(),
    };

    if bundle.download || matches!(bundle.source, Source::GitHub(_)) {
        let blob = GithubBlob::parse(url)?;
        return Ok(fetcher.raw_url(&blob));
    }

    Ok(url.to_string())
}
