//! Vision client: the four typed operations on top of the HTTP transport.

use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

use super::types::{
    CaptionArgs, CaptionOutput, CaptionResponse, DetectArgs, DetectOutput, DetectResponse,
    PointArgs, PointOutput, PointResponse, QueryArgs, QueryOutput, QueryResponse,
    VisionOperation,
};
use crate::config::VisionConfig;
use crate::image_ref::ImageReference;
use crate::transport::HttpTransport;
use crate::{Error, ErrorContext, Result};

/// The operations the tool layer dispatches to.
///
/// Every method validates its arguments before touching the network and
/// makes at most one request.
#[async_trait]
pub trait VisionService: Send + Sync {
    async fn query(&self, args: &QueryArgs) -> Result<QueryOutput>;
    async fn detect(&self, args: &DetectArgs) -> Result<DetectOutput>;
    async fn point(&self, args: &PointArgs) -> Result<PointOutput>;
    async fn caption(&self, args: &CaptionArgs) -> Result<CaptionOutput>;
}

/// Client for the hosted Moondream API.
#[derive(Debug, Clone)]
pub struct VisionClient {
    transport: HttpTransport,
}

impl VisionClient {
    pub fn builder() -> VisionClientBuilder {
        VisionClientBuilder::new()
    }

    /// Build from environment variables and the OS keyring.
    pub fn from_env() -> Result<Self> {
        VisionClientBuilder::new().build()
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    pub fn timeout(&self) -> Duration {
        self.transport.timeout()
    }
}

#[async_trait]
impl VisionService for VisionClient {
    async fn query(&self, args: &QueryArgs) -> Result<QueryOutput> {
        let op = VisionOperation::Query;
        let image = ImageReference::parse(&args.image_url)?;
        require_non_empty(&args.question, "question")?;
        debug!(
            question = %args.question,
            image_len = image.len(),
            image_preview = %image,
            "{} called", op.label()
        );

        let payload = json!({
            "image_url": image.as_str(),
            "question": args.question,
        });
        let data: QueryResponse = self
            .transport
            .post_json(op.endpoint(), &payload, op.label())
            .await?;

        info!(
            request_id = %data.request_id,
            answer_len = data.answer.len(),
            "{} succeeded", op.label()
        );
        Ok(QueryOutput {
            answer: data.answer,
            request_id: data.request_id,
        })
    }

    async fn detect(&self, args: &DetectArgs) -> Result<DetectOutput> {
        let op = VisionOperation::Detect;
        let image = ImageReference::parse(&args.image_url)?;
        require_non_empty(&args.object, "object")?;
        debug!(
            object = %args.object,
            image_len = image.len(),
            image_preview = %image,
            "{} called", op.label()
        );

        let payload = json!({
            "image_url": image.as_str(),
            "object": args.object,
        });
        let data: DetectResponse = self
            .transport
            .post_json(op.endpoint(), &payload, op.label())
            .await?;

        info!(
            request_id = %data.request_id,
            objects_found = data.objects.len(),
            "{} succeeded", op.label()
        );
        Ok(DetectOutput::new(
            image.as_str(),
            args.object.as_str(),
            data.objects.into_iter().map(Into::into).collect(),
            data.request_id,
        ))
    }

    async fn point(&self, args: &PointArgs) -> Result<PointOutput> {
        let op = VisionOperation::Point;
        let image = ImageReference::parse(&args.image_url)?;
        require_non_empty(&args.object, "object")?;
        debug!(
            object = %args.object,
            image_len = image.len(),
            image_preview = %image,
            "{} called", op.label()
        );

        let payload = json!({
            "image_url": image.as_str(),
            "object": args.object,
        });
        let data: PointResponse = self
            .transport
            .post_json(op.endpoint(), &payload, op.label())
            .await?;

        info!(
            request_id = %data.request_id,
            points_found = data.points.len(),
            "{} succeeded", op.label()
        );
        Ok(PointOutput::new(
            image.as_str(),
            args.object.as_str(),
            data.points.into_iter().map(Into::into).collect(),
            data.request_id,
        ))
    }

    async fn caption(&self, args: &CaptionArgs) -> Result<CaptionOutput> {
        let op = VisionOperation::Caption;
        let image = ImageReference::parse(&args.image_url)?;
        let length = args.length.unwrap_or_default();
        // Forwarded as-is; the reply is always read as a single JSON document.
        let stream = args.stream.unwrap_or(false);
        debug!(
            length = length.as_str(),
            stream,
            image_len = image.len(),
            image_preview = %image,
            "{} called", op.label()
        );

        let payload = json!({
            "image_url": image.as_str(),
            "length": length.as_str(),
            "stream": stream,
        });
        let data: CaptionResponse = self
            .transport
            .post_json(op.endpoint(), &payload, op.label())
            .await?;

        info!(
            caption_len = data.caption.len(),
            finish_reason = %data.finish_reason,
            has_metrics = data.metrics.is_some(),
            "{} succeeded", op.label()
        );
        Ok(CaptionOutput {
            caption: data.caption,
            metrics: data.metrics.map(Into::into),
            finish_reason: data.finish_reason,
        })
    }
}

fn require_non_empty(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation_with_context(
            format!("{} must not be empty", field),
            ErrorContext::new()
                .with_field_path(field)
                .with_source("vision_client"),
        ));
    }
    Ok(())
}

/// Builder for [`VisionClient`]. Unset values fall back to the environment.
#[derive(Debug, Default)]
pub struct VisionClientBuilder {
    explicit: VisionConfig,
    file: VisionConfig,
}

impl VisionClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.explicit.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.explicit.base_url = Some(url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.explicit.timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn proxy_url(mut self, url: impl Into<String>) -> Self {
        self.explicit.proxy_url = Some(url.into());
        self
    }

    /// Layer a config file underneath explicit settings.
    pub fn config(mut self, config: VisionConfig) -> Self {
        self.file = config;
        self
    }

    pub fn build(self) -> Result<VisionClient> {
        let config = self.explicit.or(self.file).or(VisionConfig::from_env());

        let api_key = config.resolve_api_key().ok_or_else(|| {
            Error::configuration_with_context(
                "API key required",
                ErrorContext::new().with_field_path(crate::config::ENV_API_KEY),
            )
        })?;

        let base_url = config.base_url_or_default().to_string();
        let parsed = url::Url::parse(&base_url).map_err(|e| {
            Error::configuration_with_context(
                "invalid API base URL",
                ErrorContext::new()
                    .with_field_path(crate::config::ENV_API_BASE)
                    .with_details(e.to_string()),
            )
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::configuration_with_context(
                "API base URL must be http or https",
                ErrorContext::new()
                    .with_field_path(crate::config::ENV_API_BASE)
                    .with_details(base_url),
            ));
        }

        let timeout = config.timeout();
        if timeout.is_zero() {
            return Err(Error::configuration("timeout must be greater than zero"));
        }

        let transport =
            HttpTransport::new(base_url, api_key, timeout, config.proxy_url.as_deref())?;
        Ok(VisionClient { transport })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> VisionClient {
        VisionClient::builder()
            .api_key("test-key")
            .base_url("http://127.0.0.1:9/v1/")
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_defaults_and_trailing_slash() {
        let c = client();
        assert_eq!(c.base_url(), "http://127.0.0.1:9/v1");
        assert_eq!(c.timeout(), Duration::from_millis(25_000));
    }

    #[test]
    fn test_builder_rejects_bad_base_url() {
        let err = VisionClient::builder()
            .api_key("k")
            .base_url("file:///etc/passwd")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_builder_rejects_zero_timeout() {
        assert!(VisionClient::builder()
            .api_key("k")
            .timeout(Duration::ZERO)
            .build()
            .is_err());
    }

    #[tokio::test]
    async fn test_empty_object_rejected_before_network() {
        // Port 9 (discard) is never contacted: validation fails first.
        let err = client()
            .detect(&DetectArgs {
                image_url: "https://example.com/a.jpg".into(),
                object: "  ".into(),
            })
            .await
            .unwrap_err();
        assert!(err.is_rejected_locally());
        assert!(err.to_string().contains("object must not be empty"));
    }

    #[tokio::test]
    async fn test_empty_image_rejected_before_network() {
        let err = client()
            .query(&QueryArgs {
                image_url: String::new(),
                question: "what is this?".into(),
            })
            .await
            .unwrap_err();
        assert!(err.is_rejected_locally());
    }
}
