use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::HttpConfig;
use crate::error::{ConfigError, FetchError};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Minimal GET capability shared by scrapers and the detail extractor.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    /// Fetch `url` and return the body of a 2xx response.
    async fn get(&self, url: &str) -> Result<String, FetchError>;
}

/// `HttpFetch` backed by reqwest, with bounded retries on transient failures.
pub struct ReqwestFetcher {
    client: Client,
    max_retries: u32,
    retry_backoff: Duration,
}

impl ReqwestFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        let language =
            HeaderValue::from_str(&config.accept_language).map_err(|e| ConfigError::InvalidValue {
                field: "http.accept_language",
                reason: e.to_string(),
            })?;
        headers.insert(ACCEPT_LANGUAGE, language);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                field: "http",
                reason: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        })
    }

    async fn get_once(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await.map_err(|source| {
            if source.is_timeout() {
                FetchError::Timeout { url: url.to_string() }
            } else {
                FetchError::Network {
                    url: url.to_string(),
                    source,
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| {
            if source.is_timeout() {
                FetchError::Timeout { url: url.to_string() }
            } else {
                FetchError::Body {
                    url: url.to_string(),
                    source,
                }
            }
        })
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetcher {
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        retry_transient(url, self.max_retries, self.retry_backoff, || self.get_once(url)).await
    }
}

/// Run `attempt` until it succeeds, fails with a non-transient error, or
/// `max_retries` retries are spent. The delay grows linearly per retry.
async fn retry_transient<F, Fut>(
    url: &str,
    max_retries: u32,
    backoff: Duration,
    mut attempt: F,
) -> Result<String, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, FetchError>>,
{
    let mut retries = 0;
    loop {
        debug!("Fetching URL: {} (attempt {})", url, retries + 1);
        match attempt().await {
            Ok(body) => {
                debug!("Downloaded {} bytes from {}", body.len(), url);
                return Ok(body);
            }
            Err(e) if e.is_transient() && retries < max_retries => {
                retries += 1;
                let delay = backoff * retries;
                warn!("{}; retrying in {:?}", e, delay);
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
