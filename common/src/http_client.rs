use crate::errors::AppError;
use reqwest::Client;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use std::time::Duration;
use tracing::{error, info, instrument, warn};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; PriceFetcher/1.0)";
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "tr-TR,tr;q=0.9,en-US;q=0.8,en;q=0.7";

/// HTTP client for fetching listing pages
pub struct HttpClient {
    client: Client,
    max_retries: u32,
}

impl HttpClient {
    /// Builds a client that sends `user_agent` and `accept_language` on every
    /// request. Without a `timeout` a request waits for the upstream as long
    /// as it takes.
    pub fn new(
        user_agent: &str,
        accept_language: &str,
        timeout: Option<Duration>,
        max_retries: u32,
    ) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        let language = HeaderValue::from_str(accept_language)
            .map_err(|e| AppError::internal(format!("Invalid Accept-Language header: {}", e)))?;
        headers.insert(ACCEPT_LANGUAGE, language);

        let mut builder = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_retries,
        })
    }

    /// Fetch a page body as text, retrying transport failures with
    /// exponential backoff
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get_text(&self, url: &str) -> Result<String, AppError> {
        let mut attempt = 0;

        loop {
            match self.fetch(url).await {
                Ok(body) => {
                    info!(url = %url, attempt = attempt + 1, bytes = body.len(), "Request successful");
                    return Ok(body);
                }
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    let backoff = Duration::from_millis(2_u64.pow(attempt) * 100);
                    warn!(
                        url = %url,
                        attempt = attempt + 1,
                        backoff_ms = backoff.as_millis(),
                        error = %e,
                        "Request failed, retrying with exponential backoff"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!(url = %url, attempts = attempt + 1, error = %e, "Request failed");
                    return Err(e);
                }
            }
        }
    }

    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::timeout(format!("Request to {} timed out", url))
            } else {
                AppError::NetworkError(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::http(
                status.as_u16(),
                format!("HTTP error: {}", status),
            ));
        }

        response.text().await.map_err(AppError::NetworkError)
    }
}
