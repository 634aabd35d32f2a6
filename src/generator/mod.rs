pub mod exporter;
pub mod image_client;

use crate::{
    config::GeneratorConfig,
    error::{ImageGenError, Result},
    session::GenerationSession,
};
use reqwest::Client;

pub use exporter::ImageExporter;
pub use image_client::ImageClient;

/// Entry point: owns the shared HTTP client and hands out the
/// generation client, the exporter, and UI sessions bound to both.
#[derive(Debug, Clone)]
pub struct ImageGenerator {
    image_client: ImageClient,
    exporter: ImageExporter,
}

impl ImageGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        config.validate()?;

        let http = Client::builder()
            .user_agent(concat!("rgenimg/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ImageGenError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_http_client(config, http))
    }

    /// Use a custom `reqwest::Client` (proxies, TLS, connection pooling).
    pub fn with_http_client(config: GeneratorConfig, http: Client) -> Self {
        log::debug!(
            "Image generator configured for {} (timeout {:?}, export to {})",
            config.provider.kind,
            config.timeout,
            config.output_path().display()
        );

        Self {
            image_client: ImageClient::new(http.clone(), config.provider, config.timeout),
            exporter: ImageExporter::new(
                http,
                config.output_dir,
                config.filename,
                config.export_timeout,
            )
            .with_max_bytes(config.max_image_bytes),
        }
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }

    pub fn exporter(&self) -> &ImageExporter {
        &self.exporter
    }

    /// A fresh, empty form session.
    pub fn session(&self) -> GenerationSession {
        GenerationSession::new(self.image_client.clone(), self.exporter.clone())
    }
}
