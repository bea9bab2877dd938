//! Version resolution layer for vendored bundles
//!
//! This module resolves the latest upstream version of a bundle from its
//! `latest` descriptor and downloads new content when needed.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Source    │────▶│   Fetcher   │────▶│  Fetchers   │
//! │ (classify)  │     │   (trait)   │     │ (strategies)│
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                                                ▼
//!                                         ┌─────────────┐
//!                                         │  Extractor  │
//!                                         │(regex match)│
//!                                         └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`source`]: Descriptor classification and GitHub blob/raw URL handling
//! - [`fetcher`]: Fetcher trait the update orchestrator depends on
//! - [`fetchers`]: Raw download, line scanning, GitHub commits and CSS selector strategies
//! - [`extractor`]: Strict/loose regex version extraction
//! - [`error`]: Error types for fetching, updating and manifest loading

pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod fetchers;
pub mod source;
