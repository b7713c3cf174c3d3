//! # skritter-export
//!
//! Export the vocabulary a user has studied on Skritter into a file Anki can
//! import.
//!
//! ## Design Philosophy
//!
//! The Skritter API answers large queries through asynchronous batch jobs.
//! skritter-export drives each job through submit, status polling and
//! result retrieval, splits large id sets into chunks of bounded size, and
//! merges the per-chunk results without losing or duplicating entries:
//! - **Sequential** - one job at a time, one chunk at a time
//! - **Fail fast** - any HTTP or payload error aborts the whole export
//! - **Bounded** - polling stops at a configured budget or on cancellation
//!
//! ## Quick Start
//!
//! ```no_run
//! use skritter_export::{Config, run_export};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.api.bearer_token = Some("my-token".to_string());
//!
//!     let path = run_export(&config).await?;
//!     println!("wrote {}", path.display());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Skritter API client (decomposed into focused submodules)
pub mod client;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Import file rendering
pub mod export;
/// Item id helpers
pub mod items;
/// Pinyin tone marks
pub mod pinyin;
/// Simplified/traditional conversion table
pub mod simptrad;
/// HTTP transport seam
pub mod transport;
/// Batch API wire types
pub mod types;
/// File naming and writing
pub mod utils;
/// Vocabulary records
pub mod vocab;

// Re-export commonly used types
pub use client::ApiClient;
pub use config::{ApiConfig, BatchConfig, ChunkStrategy, Config, ExportConfig, ExportStyle};
pub use error::{Error, Result};
pub use export::Exporter;
pub use simptrad::SimpleTradMap;
pub use transport::{HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use types::{BatchJob, DoneAt, SpawnedRequest, SpawnedResponse};
pub use vocab::{Vocab, WritingStyle};

use std::path::PathBuf;
use tracing::info;

/// Run a complete export and return the path of the written file
///
/// Builds a client from `config`, which fails before any request when no
/// bearer token is configured, then runs [`export_with_client`].
pub async fn run_export(config: &Config) -> Result<PathBuf> {
    let client = ApiClient::new(config)?;
    export_with_client(&client, &config.export).await
}

/// Run the export pipeline with an existing client
///
/// 1. discover the ids of every studied item
/// 2. keep the writing items and extract their vocab ids
/// 3. drop banned vocabs
/// 4. look up the remaining vocabs in chunks
/// 5. download the conversion table, render and write the file
pub async fn export_with_client(client: &ApiClient, export: &ExportConfig) -> Result<PathBuf> {
    let item_ids = client.get_item_ids(None).await?;
    let item_ids = items::filter_item_ids(&item_ids, &[items::WRITING_SUFFIX]);
    let mut vocab_ids = items::item_ids_to_vocab_ids(&item_ids, &[items::WRITING_SUFFIX])?;
    info!(items = item_ids.len(), vocabs = vocab_ids.len(), "writing items resolved");

    let banned = client.get_banned_vocabs().await?;
    items::remove_banned_vocab_ids(&banned, &mut vocab_ids);
    info!(banned = banned.len(), remaining = vocab_ids.len(), "banned vocabs removed");

    let vocabs = client.get_vocabs(&vocab_ids).await?;
    let table = client.get_simple_trad_map().await?;

    let data = Exporter::with_table(&table, &vocabs).export(export.style);
    utils::write_import_file(&export.output_dir, export.style, &data).await
}

/// Run an export that stops polling on a termination signal
///
/// - **Unix:** listens for SIGTERM and SIGINT.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// A signal received while a batch job is being polled ends the export
/// with [`Error::Cancelled`].
pub async fn run_export_with_shutdown(config: &Config) -> Result<PathBuf> {
    let client = ApiClient::new(config)?;
    let cancel_token = client.cancellation_token();

    let watcher_token = cancel_token.clone();
    let watcher = tokio::spawn(async move {
        tokio::select! {
            _ = wait_for_signal() => watcher_token.cancel(),
            _ = watcher_token.cancelled() => {}
        }
    });

    let result = export_with_client(&client, &config.export).await;

    // stop the signal watcher
    cancel_token.cancel();
    let _ = watcher.await;
    result
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // registration may fail in restricted environments
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register signal handlers, using ctrl_c fallback");
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Received Ctrl+C signal");
            } else {
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
            std::future::pending::<()>().await;
        }
    }
}
