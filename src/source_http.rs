//! HTTP document source.
//!
//! Fetches the index and book documents relative to a base URL, the way a
//! browser client fetches them next to the page. Locations that are
//! already absolute `http(s)://` URLs are used as-is.
//!
//! The core enforces no timeout; this source applies the configured
//! `corpus.timeout_secs` to every request.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use lectern_core::source::DocumentSource;

pub struct HttpSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Absolute URL for `location`.
    pub fn url_for(&self, location: &str) -> String {
        if location.starts_with("http://") || location.starts_with("https://") {
            location.to_string()
        } else {
            format!("{}/{}", self.base_url, location.trim_start_matches('/'))
        }
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    async fn fetch(&self, location: &str) -> Result<String> {
        let url = self.url_for(location);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Request failed: {}", url))?
            .error_for_status()
            .with_context(|| format!("Bad response from {}", url))?;
        response
            .text()
            .await
            .with_context(|| format!("Failed to read body of {}", url))
    }

    fn describe(&self) -> String {
        format!("http:{}", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_and_absolute_locations() {
        let source = HttpSource::new("https://example.org/bible/", Duration::from_secs(5)).unwrap();
        assert_eq!(
            source.url_for("john.json"),
            "https://example.org/bible/john.json"
        );
        assert_eq!(
            source.url_for("/nt/john.json"),
            "https://example.org/bible/nt/john.json"
        );
        assert_eq!(
            source.url_for("https://cdn.example.org/john.json"),
            "https://cdn.example.org/john.json"
        );
    }

    #[tokio::test]
    async fn fetches_documents_and_rejects_error_statuses() {
        use axum::{routing::get, Router};

        let app = Router::new().route("/bible/john.json", get(|| async { r#"{"3": {}}"# }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let source =
            HttpSource::new(&format!("http://{}/bible", addr), Duration::from_secs(5)).unwrap();
        assert_eq!(source.fetch("john.json").await.unwrap(), r#"{"3": {}}"#);

        let err = source.fetch("jude.json").await.unwrap_err();
        assert!(format!("{:#}", err).contains("jude.json"));
    }
}
