//! CLI binary for preextract.
//!
//! A thin shim over the library crate: reads an ingestion-event JSON
//! document, builds the HTTP clients from the environment, runs the handler
//! once, and prints the structured result to stdout. Useful for replaying
//! platform events locally and for wiring the handler into a custom runtime.

use anyhow::{Context, Result};
use clap::Parser;
use preextract::{
    AnthropicMessagesClient, EnrichConfig, Enricher, HttpObjectStore, IngestionEvent,
    InvocationContext,
};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "preextract",
    version,
    about = "Transcribe a PDF's pages with a Vision Language Model and upload the page-ordered text artifact",
    after_help = "ENVIRONMENT:\n  \
        STORAGE_ENDPOINT  Object store base URL\n  \
        STORAGE_TOKEN     Bearer token for the object store\n  \
        MODEL_ENDPOINT    Model runtime base URL\n  \
        MODEL_API_KEY     API key for the model runtime\n  \
        RUST_LOG          Log filter (e.g. preextract=debug)"
)]
struct Cli {
    /// Ingestion-event JSON file, or '-' to read from stdin
    event: String,

    /// Run identifier (defaults to a fresh UUID)
    #[arg(long)]
    request_id: Option<String>,

    /// Concurrent model calls during transcription
    #[arg(long, default_value_t = 8)]
    concurrency: usize,

    /// Token budget per page
    #[arg(long, default_value_t = 200_000)]
    max_tokens: usize,

    /// Model identifier
    #[arg(long, default_value = "anthropic.claude-3-sonnet-20240229-v1:0")]
    model_id: String,

    /// Scratch root directory (defaults to the system temp dir)
    #[arg(long)]
    scratch_root: Option<PathBuf>,

    /// File containing a custom transcription prompt
    #[arg(long)]
    prompt_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let event_json = if cli.event == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read event JSON from stdin")?;
        buf
    } else {
        std::fs::read_to_string(&cli.event)
            .with_context(|| format!("Failed to read event file '{}'", cli.event))?
    };
    let event = IngestionEvent::from_json(&event_json).context("Failed to parse event JSON")?;

    let mut builder = EnrichConfig::builder()
        .concurrency(cli.concurrency)
        .max_tokens(cli.max_tokens)
        .model_id(cli.model_id.clone());
    if let Some(root) = cli.scratch_root {
        builder = builder.scratch_root(root);
    }
    if let Some(prompt_file) = &cli.prompt_file {
        let prompt = std::fs::read_to_string(prompt_file)
            .with_context(|| format!("Failed to read prompt file '{}'", prompt_file.display()))?;
        builder = builder.prompt(prompt);
    }
    let config = builder.build().context("Invalid configuration")?;

    let http = reqwest::Client::new();
    let store = Arc::new(HttpObjectStore::from_env(http.clone()).context("Storage client")?);
    let model =
        Arc::new(AnthropicMessagesClient::from_env(http, &config).context("Model client")?);

    let ctx = match cli.request_id {
        Some(id) => InvocationContext::with_request_id(id),
        None => InvocationContext::new(),
    };

    let enricher = Enricher::new(store, model, config);
    let result = enricher
        .handle(&event, &ctx)
        .await
        .context("Enrichment failed")?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
