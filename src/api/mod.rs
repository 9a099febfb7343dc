pub mod collections;
pub mod types;

use reqwest::Response;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

pub use collections::{FeedSource, fetch_collections};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ApiClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error (status {status}): {detail}")]
    ApiError { status: u16, detail: String },
    #[error("deserialization error: {0}")]
    Deserialize(String),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

// ---------------------------------------------------------------------------
// API client
// ---------------------------------------------------------------------------

pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

/// HTTP client for the three read-only collection endpoints.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http_client: reqwest::Client,
    base_url: Url,
}

impl FeedClient {
    pub fn new(base_url: &str) -> Result<Self, ApiClientError> {
        let mut base_url = Url::parse(base_url)?;
        // `Url::join` drops the last path segment unless the base ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            http_client: reqwest::Client::new(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Issue a GET request for a collection path and decode the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiClientError> {
        let url = self.url(path)?;
        tracing::debug!(%url, "fetching collection");
        let resp = self.http_client.get(url).send().await?;
        self.handle_response(resp).await
    }

    /// Check status and deserialize the body.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: Response,
    ) -> Result<T, ApiClientError> {
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiClientError::ApiError {
                status: status.as_u16(),
                detail: body,
            });
        }

        let body = resp.text().await?;
        decode_body(&body)
    }

    /// Build a full URL from a collection path (e.g. "posts").
    pub(crate) fn url(&self, path: &str) -> Result<Url, ApiClientError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }
}

fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiClientError> {
    serde_json::from_str::<T>(body).map_err(|e| {
        // Bodies can be large; keep the diagnostic readable.
        let excerpt: String = body.chars().take(200).collect();
        ApiClientError::Deserialize(format!("{e}: {excerpt}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Post;

    #[test]
    fn url_joins_collection_path() {
        let client = FeedClient::new(DEFAULT_BASE_URL).unwrap();
        assert_eq!(
            client.url("posts").unwrap().as_str(),
            "https://jsonplaceholder.typicode.com/posts"
        );
    }

    #[test]
    fn url_keeps_base_path_prefix() {
        let client = FeedClient::new("http://localhost:8080/api/v1").unwrap();
        assert_eq!(
            client.url("/comments").unwrap().as_str(),
            "http://localhost:8080/api/v1/comments"
        );
    }

    #[test]
    fn new_rejects_malformed_base_url() {
        assert!(matches!(
            FeedClient::new("not a url"),
            Err(ApiClientError::Url(_))
        ));
    }

    #[test]
    fn decode_body_reports_schema_mismatch() {
        let err = decode_body::<Vec<Post>>(r#"[{"id": "seven"}]"#).unwrap_err();
        assert!(matches!(err, ApiClientError::Deserialize(_)));
    }
}
