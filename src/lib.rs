//! # preextract
//!
//! Document pre-extraction enrichment: transcribe the pages of a PDF with a
//! Vision Language Model and write a page-ordered text artifact back to
//! object storage.
//!
//! ## Why this crate?
//!
//! Document-QA indexes choke on PDFs whose content lives in text images:
//! scans, faxes, letters rendered as pictures. This crate is the enrichment
//! hook an ingestion pipeline invokes once per document: it rasterises each
//! page, lets a VLM read it as a human would, and hands the platform a plain
//! text rendition it can actually index.
//!
//! ## Pipeline Overview
//!
//! ```text
//! ingestion event
//!  │
//!  ├─ 1. Resolve    bucket + percent-decoded key from event attributes
//!  ├─ 2. Download   source document into run-scoped scratch
//!  ├─ 3. Rasterize  one page_{n}.png per page via pdfium (spawn_blocking)
//!  ├─ 4. Transcribe concurrent VLM calls, re-sorted by page number
//!  ├─ 5. Upload     pre-extraction/{key}.txt back to the source bucket
//!  └─ 6. Report     { version, s3ObjectKey, metadataUpdates: [] }
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use preextract::{
//!     AnthropicMessagesClient, EnrichConfig, Enricher, HttpObjectStore,
//!     IngestionEvent, InvocationContext,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let http = reqwest::Client::new();
//!     let config = EnrichConfig::default();
//!     let store = Arc::new(HttpObjectStore::from_env(http.clone())?);
//!     let model = Arc::new(AnthropicMessagesClient::from_env(http, &config)?);
//!
//!     let enricher = Enricher::new(store, model, config);
//!     let event = IngestionEvent::from_json(&std::fs::read_to_string("event.json")?)?;
//!     let result = enricher.handle(&event, &InvocationContext::new()).await?;
//!     println!("{}", serde_json::to_string_pretty(&result)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Failure model
//!
//! Every error is fatal for the invocation: there is no per-page retry and
//! no partial artifact. Either the full aggregate is uploaded or nothing is;
//! the invoking platform owns retries. Scratch space is released on all exit
//! paths.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod enrich;
pub mod error;
pub mod event;
pub mod model;
pub mod pipeline;
pub mod prompts;
pub mod result;
pub mod scratch;
pub mod storage;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{EnrichConfig, EnrichConfigBuilder};
pub use enrich::{derived_key, Enricher};
pub use error::EnrichError;
pub use event::{AttributeValue, EventAttribute, EventMetadata, IngestionEvent};
pub use model::{AnthropicMessagesClient, VisionModel};
pub use result::{EnrichmentResult, InvocationContext};
pub use storage::{HttpObjectStore, ObjectStore};
