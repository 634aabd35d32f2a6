use clap::{Parser, ValueEnum};
use rgenimg::logger::{self, LogLevel, LoggerConfig};
use rgenimg::{
    GenerationSession, GeneratorConfig, ImageGenerator, ProviderConfig, ProviderKind,
    SessionSnapshot,
};
use std::env;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Parser)]
#[command(name = "rgenimg", version, about = "Generate an image from a text prompt")]
struct Cli {
    /// Image description. Omit to enter prompts interactively.
    prompt: Option<String>,

    /// Save the generated image to the output directory.
    #[arg(short, long)]
    download: bool,

    /// Directory the image is saved into.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Request timeout in seconds.
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Provider to use when both credentials are configured.
    #[arg(short, long, value_enum)]
    provider: Option<ProviderArg>,

    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines.
    #[arg(long)]
    json_logs: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProviderArg {
    Openai,
    Rapidapi,
}

impl From<ProviderArg> for ProviderKind {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Openai => ProviderKind::OpenAi,
            ProviderArg::Rapidapi => ProviderKind::RapidApi,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };
    logger::init_with_config(
        LoggerConfig::new()
            .with_level(level)
            .with_json_output(cli.json_logs)
            .with_colors(!cli.json_logs),
    )?;

    if dotenv_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::debug!("No .env file found, using system environment variables");
    }
    logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(ExitCode::from(2));
        }
    };
    logger::log_config_info(&config);

    let generator = ImageGenerator::new(config)?;
    let session = generator.session();

    match cli.prompt {
        Some(prompt) => Ok(run_once(&session, prompt, cli.download).await),
        None => {
            run_interactive(&session).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn build_config(cli: &Cli) -> rgenimg::Result<GeneratorConfig> {
    let provider = match cli.provider {
        Some(arg) => ProviderConfig::from_env_for(arg.into())?,
        None => ProviderConfig::from_env()?,
    };

    let mut config = GeneratorConfig::from_lookup(provider, |name| env::var(name).ok())?;
    if let Some(secs) = cli.timeout {
        config = config
            .with_timeout(Duration::from_secs(secs))
            .with_export_timeout(Duration::from_secs(secs));
    }
    if let Some(dir) = &cli.output_dir {
        config = config.with_output_dir(dir);
    }

    config.validate()?;
    Ok(config)
}

async fn run_once(session: &GenerationSession, prompt: String, download: bool) -> ExitCode {
    session.set_prompt(prompt);
    eprintln!("Generating...");

    if submit(session).await.is_err() {
        render(&session.snapshot());
        return ExitCode::FAILURE;
    }
    render(&session.snapshot());

    if download && !export(session).await {
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run_interactive(session: &GenerationSession) -> std::io::Result<()> {
    println!("Enter an image description (:save to download, :quit to exit)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.trim() {
            "" => continue,
            ":quit" | ":q" => break,
            ":save" => {
                export(session).await;
            }
            prompt => {
                session.set_prompt(prompt);
                println!("{}", session.snapshot().submit_label());
                let _ = submit(session).await;
                render(&session.snapshot());
            }
        }
    }
    Ok(())
}

/// Submit the session's prompt; Ctrl-C cancels the call.
async fn submit(session: &GenerationSession) -> rgenimg::Result<String> {
    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let _timer = logger::timer("Image generation");
    let outcome = session.submit_with_cancel(&cancel).await;
    watcher.abort();
    outcome
}

async fn export(session: &GenerationSession) -> bool {
    match session.export().await {
        Ok(Some(image)) => {
            println!("Saved {} ({} bytes)", image.path.display(), image.bytes);
            true
        }
        Ok(None) => {
            println!("Nothing to save yet");
            true
        }
        Err(_) => {
            render(&session.snapshot());
            false
        }
    }
}

fn render(snapshot: &SessionSnapshot) {
    if let Some(error) = &snapshot.error {
        eprintln!("Error: {}", error);
    } else if let Some(url) = &snapshot.result {
        println!("{}", url);
    }
}
