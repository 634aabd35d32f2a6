//! # rgenimg
//!
//! Text-to-image client for hosted image-generation APIs.
//!
//! One [`GenerationSession`] models a prompt form: submit a prompt, get back
//! an image URL or a single human-readable error, optionally save the image
//! to disk. The provider (OpenAI images or a RapidAPI text-to-image service)
//! is plain injected configuration.
//!
//! ```no_run
//! use rgenimg::{GeneratorConfig, ImageGenerator, ProviderConfig};
//!
//! # async fn example() -> rgenimg::Result<()> {
//! let config = GeneratorConfig::new(ProviderConfig::openai("sk-..."));
//! let generator = ImageGenerator::new(config)?;
//!
//! let session = generator.session();
//! match session.submit_prompt("a lighthouse in a storm, oil painting").await {
//!     Ok(url) => println!("{}", url),
//!     Err(_) => println!("Error: {}", session.error().unwrap_or_default()),
//! }
//! session.export().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod generator;
pub mod logger;
pub mod models;
pub mod session;

pub use config::{GeneratorConfig, ProviderAuth, ProviderConfig, ProviderKind, RequestShape};
pub use error::{ImageGenError, Result};
pub use generator::{ImageClient, ImageExporter, ImageGenerator};
pub use models::*;
pub use session::GenerationSession;
