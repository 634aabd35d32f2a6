use crate::{
    config::{ProviderAuth, ProviderConfig},
    error::{ImageGenError, Result},
    models::{extract_error_message, ImageGenerationBody, ImageGenerationResponse},
};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, StatusCode,
};
use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Issues the generation call against one configured provider.
#[derive(Debug, Clone)]
pub struct ImageClient {
    http: Client,
    provider: ProviderConfig,
    timeout: Duration,
}

impl ImageClient {
    pub fn new(http: Client, provider: ProviderConfig, timeout: Duration) -> Self {
        Self {
            http,
            provider,
            timeout,
        }
    }

    pub fn provider(&self) -> &ProviderConfig {
        &self.provider
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        match &self.provider.auth {
            ProviderAuth::Bearer(token) => {
                headers.insert(AUTHORIZATION, header_value(&format!("Bearer {}", token))?);
            }
            ProviderAuth::RapidApi { key, host } => {
                headers.insert(HeaderName::from_static("x-rapidapi-key"), header_value(key)?);
                headers.insert(
                    HeaderName::from_static("x-rapidapi-host"),
                    header_value(host)?,
                );
            }
        }

        Ok(headers)
    }

    pub async fn generate(&self, prompt: &str) -> Result<ImageGenerationResponse> {
        self.generate_with_cancel(prompt, &CancellationToken::new())
            .await
    }

    /// Run one generation, giving up early if `cancel` fires.
    pub async fn generate_with_cancel(
        &self,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<ImageGenerationResponse> {
        if prompt.trim().is_empty() {
            return Err(ImageGenError::Validation("Prompt must not be empty".into()));
        }

        let request_id = Uuid::new_v4().to_string();

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                log::warn!("[req:{}] Generation cancelled", request_id);
                Err(ImageGenError::Cancelled)
            }
            result = self.send(prompt, &request_id) => result,
        }
    }

    async fn send(&self, prompt: &str, request_id: &str) -> Result<ImageGenerationResponse> {
        let body = ImageGenerationBody::build(&self.provider.shape, prompt);

        log::info!(
            "[req:{}] Generating image with provider: {}",
            request_id,
            self.provider.kind
        );
        log::debug!(
            "[req:{}] POST {} (image URL expected at {})",
            request_id,
            self.provider.endpoint,
            self.provider.response_path
        );

        let response = self
            .http
            .post(&self.provider.endpoint)
            .headers(self.build_headers()?)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;

        match self.interpret(status, &bytes) {
            Ok(url) => {
                log::info!("[req:{}] Image generated ({})", request_id, status);
                Ok(ImageGenerationResponse {
                    url,
                    provider: self.provider.kind.to_string(),
                    request_id: request_id.to_string(),
                })
            }
            Err(e) => {
                log::error!(
                    "[req:{}] Generation failed with status {}: {}",
                    request_id,
                    status,
                    String::from_utf8_lossy(&bytes)
                );
                Err(e)
            }
        }
    }

    fn interpret(&self, status: StatusCode, body: &[u8]) -> Result<String> {
        let parsed: Option<Value> = serde_json::from_slice(body).ok();

        if status.is_success() {
            parsed
                .as_ref()
                .and_then(|value| self.provider.response_path.resolve_str(value))
                .map(String::from)
                .ok_or_else(|| {
                    ImageGenError::MalformedResponse(self.provider.missing_url_message.clone())
                })
        } else {
            Err(ImageGenError::RemoteRejected {
                status: status.as_u16(),
                message: parsed.as_ref().and_then(extract_error_message),
            })
        }
    }

    fn classify(&self, err: reqwest::Error) -> ImageGenError {
        if err.is_timeout() {
            ImageGenError::Timeout(self.timeout)
        } else if err.is_builder() {
            ImageGenError::Config(format!("Invalid request to {}: {}", self.provider.endpoint, err))
        } else if err.is_connect() || err.is_request() {
            ImageGenError::Network(err.to_string())
        } else {
            ImageGenError::Unknown(err.to_string())
        }
    }
}

fn header_value(raw: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(raw)
        .map_err(|_| ImageGenError::Config("Credential contains invalid header characters".into()))
}
