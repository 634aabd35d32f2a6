use crate::{
    config::DEFAULT_MAX_IMAGE_BYTES,
    error::{describe_duration, ImageGenError, Result},
    models::ExportedImage,
};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Downloads a generated image and writes it under a fixed filename.
#[derive(Debug, Clone)]
pub struct ImageExporter {
    http: Client,
    output_dir: PathBuf,
    filename: String,
    timeout: Duration,
    max_bytes: u64,
}

impl ImageExporter {
    pub fn new(
        http: Client,
        output_dir: impl Into<PathBuf>,
        filename: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            output_dir: output_dir.into(),
            filename: filename.into(),
            timeout,
            max_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }

    /// Refuse downloads larger than `max_bytes`.
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.filename)
    }

    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        log::info!("Downloading image from {}", url);

        let mut response = self
            .http
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageGenError::Export(format!(
                "image host returned HTTP {}",
                status.as_u16()
            )));
        }

        if let Some(length) = response.content_length() {
            if length > self.max_bytes {
                return Err(self.too_large());
            }
        }

        // Content-Length is optional.
        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| self.transport_error(e))? {
            if (bytes.len() + chunk.len()) as u64 > self.max_bytes {
                return Err(self.too_large());
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }

    fn too_large(&self) -> ImageGenError {
        ImageGenError::Export(format!("image is larger than {} bytes", self.max_bytes))
    }

    /// Fetch `url` and write it to [`ImageExporter::output_path`].
    pub async fn save(&self, url: &str) -> Result<ExportedImage> {
        let bytes = self.fetch(url).await?;
        let path = self.output_path();
        write_image(&path, &bytes).await?;

        log::info!("Saved {} bytes to {}", bytes.len(), path.display());
        Ok(ExportedImage {
            path,
            bytes: bytes.len(),
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> ImageGenError {
        if err.is_timeout() {
            ImageGenError::Export(format!("timed out after {}", describe_duration(&self.timeout)))
        } else {
            ImageGenError::Export(err.to_string())
        }
    }
}

async fn write_image(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            ImageGenError::Export(format!("could not create {}: {}", parent.display(), e))
        })?;
    }
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| ImageGenError::Export(format!("could not write {}: {}", path.display(), e)))
}
