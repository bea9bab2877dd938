//! Shared helpers for integration tests

#![allow(dead_code)]

pub mod fetcher;
pub mod manifest;

#[allow(unused_imports)]
pub use fetcher::MockFetcher;
#[allow(unused_imports)]
pub use manifest::write_project;
