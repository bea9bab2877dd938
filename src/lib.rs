//! Keeps vendored third-party bundles in sync with their upstream sources.
//!
//! # Modules
//!
//! - [`config`]: Updater configuration and default constants
//! - [`logging`]: Tracing subscriber setup
//! - [`manifest`]: Manifest loading and in-place persistence of bundle updates
//! - [`update`]: Concurrent freshness checks and the single-writer update pass
//! - [`version`]: Source classification, fetch strategies and version extraction

pub mod config;
pub mod logging;
pub mod manifest;
pub mod update;
pub mod version;
