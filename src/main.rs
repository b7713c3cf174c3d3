//! skritter-export binary
//!
//! # Usage
//!
//! ```bash
//! # Token from ./skritter.properties, Anki import file in the current directory
//! skritter-export
//!
//! # Skritter-style list written to ~/exports, token from the environment
//! SKRITTER_BEARER_TOKEN=... skritter-export --style skritter --output-dir ~/exports
//! ```

use clap::{Parser, ValueEnum};
use skritter_export::config::{Config, ExportStyle, resolve_bearer_token};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Export studied Skritter vocabulary into an import file
#[derive(Parser, Debug)]
#[command(name = "skritter-export")]
#[command(version, about, long_about = None)]
struct Args {
    /// Properties file holding the Bearer-Token property
    #[arg(short, long)]
    properties: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Import file flavor
    #[arg(short, long, value_enum)]
    style: Option<StyleArg>,

    /// Directory the import file is written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Base URL of the Skritter API
    #[arg(long)]
    base_url: Option<String>,

    /// Polling budget per batch job, in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Log requests and responses
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StyleArg {
    Anki,
    Skritter,
}

impl From<StyleArg> for ExportStyle {
    fn from(style: StyleArg) -> Self {
        match style {
            StyleArg::Anki => ExportStyle::Anki,
            StyleArg::Skritter => ExportStyle::Skritter,
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn build_config(args: &Args) -> skritter_export::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };

    if let Some(style) = args.style {
        config.export.style = style.into();
    }
    if let Some(dir) = &args.output_dir {
        config.export.output_dir = dir.clone();
    }
    if let Some(url) = &args.base_url {
        config.api.base_url = url.clone();
    }
    if let Some(secs) = args.timeout_secs {
        config.batch.timeout = Duration::from_secs(secs);
    }

    config.api.bearer_token = resolve_bearer_token(args.properties.as_deref())?;
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    // .env may supply SKRITTER_BEARER_TOKEN
    dotenvy::dotenv().ok();

    let result = match build_config(&args) {
        Ok(config) => skritter_export::run_export_with_shutdown(&config).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(path) => {
            info!(path = %path.display(), "export complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(code = e.error_code(), "export failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
