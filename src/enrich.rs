//! The pipeline orchestrator: the event handler itself.
//!
//! One linear sequence, each step a hard dependency on the previous one
//! succeeding. No retry, no partial output: an error at any step fails the
//! invocation, and the invoking platform applies its own retry policy.
//!
//! The storage and model clients are constructor-injected seams rather than
//! process-wide singletons, so tests run the full handler against doubles.

use crate::config::EnrichConfig;
use crate::error::EnrichError;
use crate::event::IngestionEvent;
use crate::model::VisionModel;
use crate::pipeline::{aggregate, rasterize};
use crate::result::{EnrichmentResult, InvocationContext};
use crate::scratch::ScratchSpace;
use crate::storage::ObjectStore;
use std::sync::Arc;
use tracing::{debug, info};

/// Prefix segment of every derived artifact key.
const ARTIFACT_PREFIX: &str = "pre-extraction/";

/// Suffix appended to the source key to form the artifact key.
const ARTIFACT_SUFFIX: &str = ".txt";

/// Key of the derived aggregate artifact for a given source key.
pub fn derived_key(source_key: &str) -> String {
    format!("{ARTIFACT_PREFIX}{source_key}{ARTIFACT_SUFFIX}")
}

/// The document enrichment handler.
pub struct Enricher {
    store: Arc<dyn ObjectStore>,
    model: Arc<dyn VisionModel>,
    config: EnrichConfig,
}

impl Enricher {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        model: Arc<dyn VisionModel>,
        config: EnrichConfig,
    ) -> Self {
        Self {
            store,
            model,
            config,
        }
    }

    /// Process one ingestion event end to end.
    ///
    /// Downloads the source document, rasterizes it, transcribes every page
    /// concurrently, uploads the page-ordered aggregate under
    /// `pre-extraction/{source_key}.txt` in the source bucket, and returns
    /// the structured result describing that artifact.
    pub async fn handle(
        &self,
        event: &IngestionEvent,
        ctx: &InvocationContext,
    ) -> Result<EnrichmentResult, EnrichError> {
        info!("Enrichment run {} starting", ctx.request_id);

        // ── Step 1: Resolve the source document ──────────────────────────
        let bucket = event.s3_bucket.as_str();
        let source_key = event.source_key()?;
        debug!("Source document: s3://{}/{}", bucket, source_key);

        // ── Step 2: Download into scratch ────────────────────────────────
        // The scratch space releases itself on drop, so every early return
        // below still cleans up the downloaded document and page images.
        let scratch = ScratchSpace::create(&self.config.scratch_root, &ctx.request_id)?;
        let document = scratch.document_path(&source_key);
        self.store.get(bucket, &source_key, &document).await?;

        // ── Step 3: Rasterize pages ──────────────────────────────────────
        let pages_dir = scratch.pages_dir();
        let page_images = rasterize::rasterize_to_dir(&document, &pages_dir, &self.config).await?;
        info!("Rasterized {} pages", page_images.len());

        // ── Step 4: Transcribe and aggregate ─────────────────────────────
        let transcript = scratch.transcript_path();
        let page_count = aggregate::aggregate_transcriptions(
            &self.model,
            &page_images,
            &transcript,
            self.config.concurrency,
        )
        .await?;

        // ── Step 5: Upload the artifact ──────────────────────────────────
        let artifact_key = derived_key(&source_key);
        self.store.put(&transcript, bucket, &artifact_key).await?;

        // ── Step 6: Release scratch ──────────────────────────────────────
        scratch.release()?;

        info!(
            "Enrichment run {} complete: {} pages → s3://{}/{}",
            ctx.request_id, page_count, bucket, artifact_key
        );

        // ── Step 7: Report the artifact ──────────────────────────────────
        Ok(EnrichmentResult::for_key(artifact_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_key_joins_prefix_source_key_and_suffix() {
        assert_eq!(
            derived_key("folder/file.pdf"),
            "pre-extraction/folder/file.pdf.txt"
        );
    }

    #[test]
    fn derived_key_keeps_existing_prefix_verbatim() {
        assert_eq!(
            derived_key("pre-extraction/a.pdf"),
            "pre-extraction/pre-extraction/a.pdf.txt"
        );
    }
}
