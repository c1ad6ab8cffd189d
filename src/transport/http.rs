use crate::{Error, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::Proxy;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

pub const DEFAULT_API_BASE: &str = "https://api.moondream.ai/v1";
pub const AUTH_HEADER: &str = "X-Moondream-Auth";
pub const DEFAULT_TIMEOUT_MS: u64 = 25_000;

/// Shared request primitive for every vision operation.
///
/// The credential and base URL are read-only after construction; a single
/// transport can serve concurrent calls.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
        proxy_url: Option<&str>,
    ) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .connect_timeout(timeout);

        if let Some(proxy_url) = proxy_url {
            let proxy = Proxy::all(proxy_url).map_err(|e| {
                Error::configuration(format!("Invalid proxy URL {}: {}", proxy_url, e))
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| Error::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// POST `payload` to `{base_url}/{endpoint}` and parse the JSON response.
    ///
    /// `label` only shows up in logs and in transport-shaped error messages.
    /// The deadline covers the whole round trip; on expiry the request future
    /// is dropped, which aborts the connection.
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        payload: &serde_json::Value,
        label: &str,
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let call_id = Uuid::new_v4();
        let span = info_span!("vision_request", label, endpoint, %call_id);

        async move {
            let started = Instant::now();
            debug!(
                url = %url,
                payload_size = payload.to_string().len(),
                payload_keys = ?payload.as_object().map(|o| o.keys().cloned().collect::<Vec<_>>()),
                "starting request"
            );

            let outcome = tokio::time::timeout(self.timeout, self.round_trip(&url, payload, label)).await;
            let elapsed_ms = started.elapsed().as_millis() as u64;

            match outcome {
                Ok(Ok(data)) => {
                    info!(elapsed_ms, "request completed");
                    Ok(data)
                }
                Ok(Err(e)) => {
                    error!(elapsed_ms, error = %e, "request failed");
                    Err(e)
                }
                Err(_) => {
                    let timeout_ms = self.timeout.as_millis() as u64;
                    warn!(elapsed_ms, timeout_ms, "request aborted at deadline");
                    Err(Error::Timeout {
                        label: label.to_string(),
                        timeout_ms,
                    })
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn round_trip<T: DeserializeOwned>(
        &self,
        url: &str,
        payload: &serde_json::Value,
        label: &str,
    ) -> Result<T> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTH_HEADER, &self.api_key)
            .json(payload)
            .send()
            .await
            .map_err(|e| Error::transport(label, TransportError::Http(e)))?;

        let status = response.status();
        debug!(status = status.as_u16(), "response received");

        if !status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| Error::transport(label, TransportError::Http(e)))?;
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::transport(label, TransportError::Http(e)))?;
        serde_json::from_slice(&bytes).map_err(|e| Error::Decode {
            label: label.to_string(),
            message: e.to_string(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),
}
