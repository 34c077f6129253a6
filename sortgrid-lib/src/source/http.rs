//! HTTP data source.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::DataSource;
use crate::error::FetchError;
use crate::model::Row;
use crate::query::Query;

/// Configuration for [`HttpSource`].
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use sortgrid_lib::source::HttpSourceConfig;
///
/// let config = HttpSourceConfig::new("https://shop.example.com/api/rest/products")
///     .with_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    /// Endpoint returning a JSON array of row objects.
    pub url: String,
    /// Per-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl HttpSourceConfig {
    /// Creates a config for the given endpoint.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: None,
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Fetches rows with `GET <url>?_sort=..&_order=..&_start=..&_end=..`.
///
/// Query parameters already present in the configured URL are kept, unless
/// the query sets the same key.
#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: Url,
    timeout: Option<Duration>,
    http_client: Client,
}

impl HttpSource {
    /// Creates a source with its own HTTP client.
    pub fn new(config: HttpSourceConfig) -> Result<Self, FetchError> {
        Self::with_client(config, Client::new())
    }

    /// Creates a source that shares an existing HTTP client.
    pub fn with_client(config: HttpSourceConfig, http_client: Client) -> Result<Self, FetchError> {
        let base_url = Url::parse(&config.url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", config.url, e)))?;
        Ok(Self {
            base_url,
            timeout: config.timeout,
            http_client,
        })
    }

    /// Base endpoint.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full request URL for a query.
    pub fn url_for(&self, query: &Query) -> Url {
        let pairs = query.to_pairs();
        let mut url = self.base_url.clone();

        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| !pairs.iter().any(|(key, _)| key == k))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .extend_pairs(pairs);
        url
    }
}

#[async_trait]
impl DataSource for HttpSource {
    async fn fetch(&self, query: &Query) -> Result<Vec<Row>, FetchError> {
        let url = self.url_for(query);
        log::trace!("GET {}", url);

        let mut request = self.http_client.get(url);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| self.map_error(e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::http(status, body));
        }

        let body = response.text().await.map_err(|e| self.map_error(e))?;
        serde_json::from_str::<Vec<Row>>(&body)
            .map_err(|e| FetchError::parse(format!("expected a JSON array of objects: {}", e)))
    }
}

impl HttpSource {
    fn map_error(&self, error: reqwest::Error) -> FetchError {
        match self.timeout {
            Some(timeout) if error.is_timeout() => FetchError::Timeout(timeout),
            _ => FetchError::Network(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::Direction;

    #[test]
    fn test_invalid_url() {
        let err = HttpSource::new(HttpSourceConfig::new("not a url")).unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }

    #[test]
    fn test_url_for_keeps_base_params() {
        let source = HttpSource::new(HttpSourceConfig::new(
            "https://shop.example.com/api/dashboard/bestsellers?from=a&_start=999",
        ))
        .unwrap();
        let query = Query::new()
            .with_sort("title", Direction::Descending)
            .with_page(30, 30);
        let url = source.url_for(&query);
        assert_eq!(url.path(), "/api/dashboard/bestsellers");
        assert_eq!(
            url.query(),
            Some("from=a&_sort=title&_order=desc&_start=30&_end=60")
        );
    }

    #[test]
    fn test_url_for_encodes_params() {
        let source = HttpSource::new(HttpSourceConfig::new("https://shop.example.com/p")).unwrap();
        let query = Query::new()
            .with_page(0, 30)
            .with_param("from", "2024-01-01T00:00:00.000Z");
        let url = source.url_for(&query);
        assert_eq!(
            url.query(),
            Some("_start=0&_end=30&from=2024-01-01T00%3A00%3A00.000Z")
        );
    }
}
