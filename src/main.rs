use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::AsyncBufReadExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use acuarela::models::{AppConfig, PaletteResult};
use acuarela::services::{SessionController, SessionState, Typewriter};
use acuarela::RawImage;
use photo_normalize::{Normalize, Normalizer};

#[derive(Parser)]
#[command(name = "acuarela")]
#[command(about = "Watercolor palette suggestions from a photograph")]
struct Cli {
    /// YAML config file (defaults to $CONFIG_FILE)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a photo and print the suggested palette
    Analyze {
        /// Image file (JPEG, PNG, WebP, GIF, BMP)
        image: PathBuf,

        /// Override the inference service URL
        #[arg(short, long)]
        endpoint: Option<String>,

        /// Print the advice at once instead of revealing it
        #[arg(long)]
        no_reveal: bool,
    },
    /// Write the normalized JPEG that would be sent for analysis
    Normalize {
        /// Image file
        image: PathBuf,

        /// Output JPEG file path
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "acuarela=info,photo_normalize=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    let config_file = cli
        .config
        .or_else(|| std::env::var("CONFIG_FILE").ok().map(PathBuf::from));
    let mut config = AppConfig::load(config_file.as_deref());

    match cli.command {
        Some(Commands::Analyze {
            image,
            endpoint,
            no_reveal,
        }) => {
            if let Some(endpoint) = endpoint {
                config.endpoint = endpoint;
            }
            run_analyze_command(&config, &image, no_reveal).await
        }
        Some(Commands::Normalize { image, output }) => {
            run_normalize_command(&config, &image, &output)
        }
        None => {
            run_status_command(&config, config_file.as_deref());
            Ok(())
        }
    }
}

/// Select, analyze and print; offer a retry on failure
async fn run_analyze_command(
    config: &AppConfig,
    image: &Path,
    no_reveal: bool,
) -> anyhow::Result<()> {
    let session = SessionController::from_config(config)?;

    let bytes = tokio::fs::read(image)
        .await
        .with_context(|| format!("Failed to read {}", image.display()))?;

    let selected = session.select_image(RawImage::sniff(bytes)).await;
    if let SessionState::Failed(message) = selected {
        anyhow::bail!(message);
    }

    eprintln!("Analyzing {} ...", image.display());
    let mut state = session.analyze().await.unwrap_or_else(|| session.state());

    loop {
        match state {
            SessionState::Success(result) => {
                print_palette(&result, config, no_reveal).await?;
                return Ok(());
            }
            SessionState::Failed(message) => {
                eprintln!("Something went wrong: {message}");
                if session.can_retry() && confirm_retry().await? {
                    state = session.retry().await.unwrap_or_else(|| session.state());
                    continue;
                }
                anyhow::bail!(message);
            }
            other => anyhow::bail!("Analysis ended in unexpected state: {}", other.label()),
        }
    }
}

/// Ask on stdin; anything but "y"/"yes" declines
async fn confirm_retry() -> anyhow::Result<bool> {
    eprint!("Retry? [y/N] ");
    std::io::stderr().flush()?;

    let mut line = String::new();
    tokio::io::BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await?;

    let answer = line.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

async fn print_palette(
    result: &PaletteResult,
    config: &AppConfig,
    no_reveal: bool,
) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout();

    if result.colors.is_empty() {
        writeln!(stdout, "No colors suggested.")?;
    }
    for swatch in &result.colors {
        let block = match swatch.rgb() {
            Ok((r, g, b)) => format!("\x1b[48;2;{r};{g};{b}m    \x1b[0m"),
            Err(e) => {
                tracing::debug!(hex = %swatch.hex, error = %e, "Unparseable swatch color");
                "    ".to_string()
            }
        };
        writeln!(stdout, "{block} {:<24} {:<8} {}", swatch.name, swatch.hex, swatch.reason)?;
    }
    writeln!(stdout)?;

    if no_reveal || result.advice.is_empty() {
        writeln!(stdout, "{}", result.advice)?;
        return Ok(());
    }

    let mut typewriter = Typewriter::new(config.reveal_delay());
    let mut reveal = typewriter.reveal(result.advice.clone());
    let mut shown = 0;

    loop {
        tokio::select! {
            prefix = reveal.next() => {
                let Some(prefix) = prefix else { break };
                write!(stdout, "{}", &prefix[shown..])?;
                stdout.flush()?;
                shown = prefix.len();
            }
            _ = tokio::signal::ctrl_c() => {
                typewriter.cancel();
                break;
            }
        }
    }
    writeln!(stdout)?;

    Ok(())
}

/// Write the normalized JPEG to disk
fn run_normalize_command(config: &AppConfig, image: &Path, output: &Path) -> anyhow::Result<()> {
    let bytes =
        std::fs::read(image).with_context(|| format!("Failed to read {}", image.display()))?;

    let normalizer = Normalizer::new(config.normalizer_options());
    let payload = normalizer.normalize(&RawImage::sniff(bytes))?;
    let jpeg = payload.to_jpeg()?;

    std::fs::write(output, &jpeg)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    let options = normalizer.options();
    println!(
        "Wrote {} ({}, quality {}, max width {}, {} bytes, {} base64 chars)",
        output.display(),
        payload.dimensions(),
        options.jpeg_quality(),
        options.max_width,
        jpeg.len(),
        payload.encoded_len()
    );

    Ok(())
}

/// Display version and effective configuration
fn run_status_command(config: &AppConfig, config_file: Option<&Path>) {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    println!("Acuarela v{VERSION}");
    println!("Watercolor palette suggestions from a photograph\n");

    println!("Configuration:");
    println!(
        "  Source          = {}",
        config_file
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(defaults)".to_string())
    );
    println!("  endpoint        = {}", config.endpoint);
    println!("  timeout_secs    = {}", config.timeout_secs);
    println!("  max_width       = {}", config.max_width);
    println!("  jpeg_quality    = {}", config.jpeg_quality);
    println!("  max_input_bytes = {}", config.max_input_bytes);
    println!("  reveal_delay_ms = {}", config.reveal_delay_ms);

    println!("\nCommands:");
    println!("  acuarela analyze <IMAGE>             Suggest a palette for a photo");
    println!("  acuarela normalize <IMAGE> -o <OUT>  Write the normalized JPEG");
    println!("\nRun 'acuarela --help' for more details.");
}
