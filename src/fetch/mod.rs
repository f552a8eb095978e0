//! Retrieval of feed payloads from a URL or a local file.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};
use tracing::debug;

/// GETs `url` and returns the body. Non-2xx responses are errors.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?.error_for_status()?;
    let bytes = resp.bytes().await?.to_vec();
    debug!(url, bytes = bytes.len(), "Feed payload received");
    Ok(bytes)
}

/// Loads a payload from an `http(s)` URL or a local file path.
#[tracing::instrument(skip(client))]
pub async fn load_source<C: HttpClient>(client: &C, source: &str) -> Result<Vec<u8>> {
    if is_url(source) {
        fetch_bytes(client, source)
            .await
            .with_context(|| format!("fetching {source}"))
    } else {
        std::fs::read(source).with_context(|| format!("reading {source}"))
    }
}

pub fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct NoNetwork;

    #[async_trait]
    impl HttpClient for NoNetwork {
        async fn execute(&self, _req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
            panic!("unexpected HTTP request");
        }
    }

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/odata/Items"));
        assert!(is_url("http://localhost:8080"));
        assert!(!is_url("data/items.json"));
        assert!(!is_url("httpdump.json"));
    }

    #[tokio::test]
    async fn test_load_source_reads_file() {
        let path = format!("{}/giro_report_fetch_test.json", std::env::temp_dir().display());
        std::fs::write(&path, b"[]").unwrap();

        let bytes = load_source(&NoNetwork, &path).await.unwrap();
        assert_eq!(bytes, b"[]");
        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_load_source_missing_file_errors() {
        let err = load_source(&NoNetwork, "/definitely/not/here.json").await.unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
