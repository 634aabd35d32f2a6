//! Shared fixtures for the integration tests.

#![allow(dead_code)]

pub mod mock_provider;

use mock_provider::MockProvider;
use rgenimg::{GenerationSession, GeneratorConfig, ImageGenerator, ProviderConfig};
use std::path::Path;
use std::time::Duration;

pub const GENERATE_PATH: &str = "/v1/images/generations";

pub fn openai_ok(url: &str) -> String {
    serde_json::json!({"created": 1700000000, "data": [{"url": url}]}).to_string()
}

pub fn generator(provider: ProviderConfig, output_dir: &Path) -> ImageGenerator {
    let config = GeneratorConfig::new(provider)
        .with_timeout(Duration::from_secs(5))
        .with_export_timeout(Duration::from_secs(5))
        .with_output_dir(output_dir);
    ImageGenerator::new(config).expect("generator config is valid")
}

pub fn openai_session(mock: &MockProvider, output_dir: &Path) -> GenerationSession {
    let provider = ProviderConfig::openai("sk-test").with_endpoint(mock.url(GENERATE_PATH));
    generator(provider, output_dir).session()
}

/// An address nothing is listening on.
pub fn closed_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}{}", addr, GENERATE_PATH)
}
