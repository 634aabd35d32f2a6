use crate::error::{ImageGenError, Result};
use crate::models::ResponsePath;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/images/generations";
pub const RAPIDAPI_HOST: &str = "ai-text-to-image-generator-api.p.rapidapi.com";
pub const DEFAULT_IMAGE_SIZE: &str = "1024x1024";
pub const DEFAULT_FILENAME: &str = "generated-image.jpg";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 32 * 1024 * 1024;

const OPENAI_KEY_VARS: [&str; 2] = ["OPENAI_API_KEY", "REACT_APP_OPENAI_API_KEY"];
const RAPIDAPI_KEY_VARS: [&str; 2] = ["RAPIDAPI_KEY", "REACT_APP_RAPIDAPI_KEY"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    RapidApi,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::RapidApi => "rapidapi",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON body layout the provider expects.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestShape {
    /// `{"prompt": .., "n": .., "size": ..}`
    OpenAi { n: u32, size: String },
    /// `{"inputs": ..}`
    Inputs,
}

#[derive(Clone, PartialEq)]
pub enum ProviderAuth {
    Bearer(String),
    RapidApi { key: String, host: String },
}

impl ProviderAuth {
    fn secret(&self) -> &str {
        match self {
            ProviderAuth::Bearer(token) => token,
            ProviderAuth::RapidApi { key, .. } => key,
        }
    }
}

// Keeps credentials out of logs and panics.
impl fmt::Debug for ProviderAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderAuth::Bearer(token) => f
                .debug_tuple("Bearer")
                .field(&format!("<{} chars>", token.len()))
                .finish(),
            ProviderAuth::RapidApi { key, host } => f
                .debug_struct("RapidApi")
                .field("key", &format!("<{} chars>", key.len()))
                .field("host", host)
                .finish(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub endpoint: String,
    pub auth: ProviderAuth,
    pub shape: RequestShape,
    pub response_path: ResponsePath,
    pub missing_url_message: String,
}

impl ProviderConfig {
    pub fn openai(token: impl Into<String>) -> Self {
        ProviderConfig {
            kind: ProviderKind::OpenAi,
            endpoint: OPENAI_ENDPOINT.to_string(),
            auth: ProviderAuth::Bearer(token.into()),
            shape: RequestShape::OpenAi {
                n: 1,
                size: DEFAULT_IMAGE_SIZE.to_string(),
            },
            response_path: ResponsePath::new().key("data").index(0).key("url"),
            missing_url_message: "Unexpected API response structure".to_string(),
        }
    }

    pub fn rapidapi(key: impl Into<String>) -> Self {
        ProviderConfig {
            kind: ProviderKind::RapidApi,
            endpoint: format!("https://{}/realistic", RAPIDAPI_HOST),
            auth: ProviderAuth::RapidApi {
                key: key.into(),
                host: RAPIDAPI_HOST.to_string(),
            },
            shape: RequestShape::Inputs,
            response_path: ResponsePath::new().key("url"),
            missing_url_message: "Image URL not found in the API response.".to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Only meaningful for RapidAPI; other providers ignore it.
    pub fn with_host(mut self, new_host: impl Into<String>) -> Self {
        if let ProviderAuth::RapidApi { ref mut host, .. } = self.auth {
            *host = new_host.into();
        }
        self
    }

    /// Only meaningful for the OpenAI body shape.
    pub fn with_size(mut self, new_size: impl Into<String>) -> Self {
        if let RequestShape::OpenAi { ref mut size, .. } = self.shape {
            *size = new_size.into();
        }
        self
    }

    pub fn with_response_path(mut self, path: ResponsePath) -> Self {
        self.response_path = path;
        self
    }

    /// Resolve the provider from the process environment.
    ///
    /// Exactly one of the OpenAI and RapidAPI credentials must be present.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(None, |name| env::var(name).ok())
    }

    /// Like [`ProviderConfig::from_env`], but picks `kind` when both
    /// credentials are set.
    pub fn from_env_for(kind: ProviderKind) -> Result<Self> {
        Self::from_lookup(Some(kind), |name| env::var(name).ok())
    }

    pub fn from_lookup<F>(preferred: Option<ProviderKind>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |names: &[&str]| {
            names
                .iter()
                .filter_map(|name| lookup(*name))
                .find(|value| !value.trim().is_empty())
        };

        let openai_key = first(&OPENAI_KEY_VARS[..]);
        let rapid_key = first(&RAPIDAPI_KEY_VARS[..]);

        let mut config = match (preferred, openai_key, rapid_key) {
            (Some(ProviderKind::OpenAi), Some(key), _) => Self::openai(key),
            (Some(ProviderKind::RapidApi), _, Some(key)) => Self::rapidapi(key),
            (Some(kind), _, _) => {
                return Err(ImageGenError::Config(format!(
                    "No credential found for provider '{}'",
                    kind
                )))
            }
            (None, Some(key), None) => Self::openai(key),
            (None, None, Some(key)) => Self::rapidapi(key),
            (None, Some(_), Some(_)) => {
                return Err(ImageGenError::Config(
                    "Both OPENAI_API_KEY and RAPIDAPI_KEY are set; choose one provider".into(),
                ))
            }
            (None, None, None) => {
                return Err(ImageGenError::Config(
                    "Missing credential: set OPENAI_API_KEY or RAPIDAPI_KEY".into(),
                ))
            }
        };

        if let Some(endpoint) = lookup("IMAGE_API_ENDPOINT") {
            config = config.with_endpoint(endpoint);
        }
        if let Some(host) = lookup("RAPIDAPI_HOST") {
            config = config.with_host(host);
        }
        if let Some(size) = lookup("IMAGE_SIZE") {
            config = config.with_size(size);
        }
        if let Some(raw) = lookup("IMAGE_API_RESPONSE_PATH") {
            let path = ResponsePath::parse(raw.trim()).ok_or_else(|| {
                ImageGenError::Config(format!(
                    "IMAGE_API_RESPONSE_PATH is not a valid path: {}",
                    raw
                ))
            })?;
            config = config.with_response_path(path);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.auth.secret().trim().is_empty() {
            return Err(ImageGenError::Config(format!(
                "Credential for provider '{}' is empty",
                self.kind
            )));
        }
        if let ProviderAuth::RapidApi { host, .. } = &self.auth {
            if host.trim().is_empty() {
                return Err(ImageGenError::Config("RapidAPI host is empty".into()));
            }
        }
        if self.endpoint.trim().is_empty() {
            return Err(ImageGenError::Config("Endpoint is empty".into()));
        }
        if self.response_path.is_empty() {
            return Err(ImageGenError::Config("Response path is empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub provider: ProviderConfig,
    pub timeout: Duration,
    pub export_timeout: Duration,
    pub output_dir: PathBuf,
    pub filename: String,
    pub max_image_bytes: u64,
}

impl GeneratorConfig {
    pub fn new(provider: ProviderConfig) -> Self {
        GeneratorConfig {
            provider,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            export_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            output_dir: PathBuf::from("."),
            filename: DEFAULT_FILENAME.to_string(),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(ProviderConfig::from_env()?, |name| env::var(name).ok())
    }

    pub fn from_lookup<F>(provider: ProviderConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new(provider);

        if let Some(raw) = lookup("IMAGE_API_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ImageGenError::Config(format!("IMAGE_API_TIMEOUT_SECS is not a number: {}", raw))
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(dir) = lookup("IMAGE_OUTPUT_DIR") {
            config = config.with_output_dir(dir);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_export_timeout(mut self, timeout: Duration) -> Self {
        self.export_timeout = timeout;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_max_image_bytes(mut self, max_bytes: u64) -> Self {
        self.max_image_bytes = max_bytes;
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.filename)
    }

    pub fn validate(&self) -> Result<()> {
        self.provider.validate()?;
        if self.timeout.is_zero() || self.export_timeout.is_zero() {
            return Err(ImageGenError::Config("Timeout must be greater than zero".into()));
        }
        if self.filename.trim().is_empty() {
            return Err(ImageGenError::Config("Export filename is empty".into()));
        }
        if self.max_image_bytes == 0 {
            return Err(ImageGenError::Config("Image size limit must be greater than zero".into()));
        }
        Ok(())
    }
}
