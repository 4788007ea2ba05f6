//! HTTP client for the upstream catalog service.
//!
//! # Responsibilities
//! - Build product and page URLs from the configured base
//! - Map transport, status and body problems onto `UpstreamError`

use reqwest::header::ACCEPT;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::config::UpstreamConfig;
use crate::upstream::types::{CatalogUpstream, UpstreamError, UpstreamResult};

/// reqwest-backed implementation of [`CatalogUpstream`].
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpCatalogClient {
    /// Create a client for the configured upstream.
    pub fn new(config: &UpstreamConfig) -> UpstreamResult<Self> {
        let base_url = parse_base_url(&config.base_url)?;
        let timeout = config.timeout();

        if config.accept_invalid_certs {
            tracing::warn!(
                base_url = %base_url,
                "TLS certificate validation disabled for upstream catalog"
            );
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .user_agent(concat!("resilient-catalog/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| UpstreamError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/{id}/`
    pub fn product_url(&self, id: &str) -> UpstreamResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| UpstreamError::Client(format!("cannot extend base URL {}", self.base_url)))?
            .pop_if_empty()
            .push(id)
            .push("");
        Ok(url)
    }

    /// `{base}/?page={n}`
    pub fn page_url(&self, page: u32) -> UpstreamResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| UpstreamError::Client(format!("cannot extend base URL {}", self.base_url)))?
            .pop_if_empty()
            .push("");
        url.query_pairs_mut().append_pair("page", &page.to_string());
        Ok(url)
    }

    async fn get_json(&self, url: Url) -> UpstreamResult<Value> {
        tracing::debug!(url = %url, "Calling upstream catalog");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(|e| self.map_reqwest_error(e))?;
        if body.is_empty() {
            return Err(UpstreamError::Malformed("empty body".to_string()));
        }
        serde_json::from_slice(&body).map_err(|e| UpstreamError::Malformed(e.to_string()))
    }

    fn map_reqwest_error(&self, e: reqwest::Error) -> UpstreamError {
        if e.is_timeout() {
            UpstreamError::Timeout(self.timeout)
        } else {
            UpstreamError::Transport(e.to_string())
        }
    }
}

impl CatalogUpstream for HttpCatalogClient {
    async fn get_product(&self, id: &str) -> UpstreamResult<Value> {
        let url = self.product_url(id)?;
        self.get_json(url).await
    }

    async fn get_page(&self, page: u32) -> UpstreamResult<Value> {
        let url = self.page_url(page)?;
        self.get_json(url).await
    }
}

fn parse_base_url(raw: &str) -> UpstreamResult<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| UpstreamError::Client(format!("invalid base URL '{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(UpstreamError::Client(format!(
            "unsupported scheme '{}' in base URL '{}'",
            other, raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> HttpCatalogClient {
        let config = UpstreamConfig {
            base_url: base_url.to_string(),
            ..UpstreamConfig::default()
        };
        HttpCatalogClient::new(&config).unwrap()
    }

    #[test]
    fn test_product_url() {
        let c = client("https://catalog.example.com/api/product");
        assert_eq!(
            c.product_url("abc-1").unwrap().as_str(),
            "https://catalog.example.com/api/product/abc-1/"
        );

        // Trailing slash on the base does not double up
        let c = client("https://catalog.example.com/api/product/");
        assert_eq!(
            c.product_url("abc-1").unwrap().as_str(),
            "https://catalog.example.com/api/product/abc-1/"
        );
    }

    #[test]
    fn test_product_url_escapes_id() {
        let c = client("http://localhost:8000/products");
        assert_eq!(
            c.product_url("a/b c").unwrap().as_str(),
            "http://localhost:8000/products/a%2Fb%20c/"
        );
    }

    #[test]
    fn test_page_url() {
        let c = client("http://localhost:8000/products");
        assert_eq!(
            c.page_url(2).unwrap().as_str(),
            "http://localhost:8000/products/?page=2"
        );
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let config = UpstreamConfig {
            base_url: "ftp://catalog.example.com".to_string(),
            ..UpstreamConfig::default()
        };
        assert!(matches!(
            HttpCatalogClient::new(&config),
            Err(UpstreamError::Client(_))
        ));

        let config = UpstreamConfig {
            base_url: "not a url".to_string(),
            ..UpstreamConfig::default()
        };
        assert!(HttpCatalogClient::new(&config).is_err());
    }
}
