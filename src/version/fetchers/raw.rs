//! Plain HTTP download of bundle content

use reqwest::Client;
use tracing::warn;

use crate::version::error::FetchError;

/// Downloads text over HTTP, accepting only `200 OK` with a non-empty body
#[derive(Clone)]
pub struct RawDownloader {
    client: Client,
}

impl RawDownloader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn download(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();

        if status != reqwest::StatusCode::OK {
            warn!("Download returned status {}: {}", status, url);
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;

        if body.is_empty() {
            return Err(FetchError::EmptyContent(url.to_string()));
        }

        Ok(body)
    }
}
