//! Telegram bot binary for office2pdf.
//!
//! A thin shim over the library crate that maps CLI flags and environment
//! variables to `BotConfig` and runs the polling loop.

use anyhow::{Context, Result};
use clap::Parser;
use office2pdf::{telegram, BotConfig, ConvertConfig};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Run with the token from the environment
  BOT_TOKEN=123456:abc office2pdf-bot

  # Use a non-default LibreOffice binary and a shorter timeout
  office2pdf-bot --converter-bin libreoffice --timeout 60

ENVIRONMENT VARIABLES:
  BOT_TOKEN                 Telegram Bot API token (required)
  OFFICE2PDF_CONVERTER      Converter binary (default: soffice)
  OFFICE2PDF_TIMEOUT        Conversion timeout in seconds (default: 90)
  OFFICE2PDF_SCRATCH_ROOT   Parent dir for scratch directories (default: system temp)

SETUP:
  1. Create a bot with @BotFather and copy the token.
  2. Install LibreOffice so `soffice` is on PATH.
  3. BOT_TOKEN=... office2pdf-bot
"#;

/// Convert .docx and .pptx files sent over Telegram into PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "office2pdf-bot",
    version,
    about = "Telegram bot that converts Office documents to PDF via LibreOffice",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Telegram Bot API token.
    #[arg(long, env = "BOT_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Converter binary name or path.
    #[arg(long, env = "OFFICE2PDF_CONVERTER", default_value = "soffice")]
    converter_bin: PathBuf,

    /// Hard wall-clock timeout per conversion, in seconds.
    #[arg(long, env = "OFFICE2PDF_TIMEOUT", default_value_t = 90)]
    timeout: u64,

    /// Parent directory for per-request scratch directories.
    #[arg(long, env = "OFFICE2PDF_SCRATCH_ROOT")]
    scratch_root: Option<PathBuf>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let mut builder = ConvertConfig::builder()
        .converter_bin(&cli.converter_bin)
        .timeout_secs(cli.timeout);
    if let Some(ref root) = cli.scratch_root {
        builder = builder.scratch_root(root);
    }
    let convert = builder.build().context("Invalid configuration")?;

    // Missing or placeholder token is fatal: refuse to enter the serving loop.
    let config = BotConfig::new(cli.token.unwrap_or_default(), convert)
        .context("Cannot start without a valid bot token")?;

    // ── Serve ────────────────────────────────────────────────────────────
    telegram::run(config).await.context("Bot loop failed")?;
    Ok(())
}
