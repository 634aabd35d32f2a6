use rgenimg::{GeneratorConfig, ImageGenerator};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    match dotenv::dotenv() {
        Ok(_) => log::info!("✅ .env file loaded"),
        Err(_) => log::warn!("⚠️  No .env file found"),
    }
    rgenimg::logger::init()?;

    let prompt = env::args()
        .nth(1)
        .unwrap_or_else(|| "a lighthouse on a cliff at dusk, watercolor".to_string());

    let config = GeneratorConfig::from_env()?;
    let generator = ImageGenerator::new(config)?;
    let session = generator.session();

    match session.submit_prompt(prompt).await {
        Ok(url) => println!("{}", url),
        Err(_) => {
            println!("Error: {}", session.error().unwrap_or_default());
            return Ok(());
        }
    }

    if let Some(image) = session.export().await? {
        println!("Saved {} bytes to {}", image.bytes, image.path.display());
    }

    Ok(())
}
