use crate::config::RequestShape;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpenAiImageRequest {
    pub prompt: String,
    pub n: u32,
    pub size: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputsImageRequest {
    pub inputs: String,
}

/// Body sent to the provider; serializes to exactly the provider's shape.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ImageGenerationBody {
    OpenAi(OpenAiImageRequest),
    Inputs(InputsImageRequest),
}

impl ImageGenerationBody {
    pub fn build(shape: &RequestShape, prompt: &str) -> Self {
        match shape {
            RequestShape::OpenAi { n, size } => ImageGenerationBody::OpenAi(OpenAiImageRequest {
                prompt: prompt.to_string(),
                n: *n,
                size: size.clone(),
            }),
            RequestShape::Inputs => ImageGenerationBody::Inputs(InputsImageRequest {
                inputs: prompt.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageGenerationResponse {
    pub url: String,
    pub provider: String,
    pub request_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportedImage {
    pub path: std::path::PathBuf,
    pub bytes: usize,
}
