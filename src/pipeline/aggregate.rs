//! Page aggregation: concurrent transcription, strict page ordering, one
//! text artifact.
//!
//! Transcription calls fan out over a bounded worker pool and complete in
//! whatever order the network dictates; the aggregate order is restored by
//! an explicit sort on page number after all results are in. Any page's
//! failure aborts the whole aggregation; there is no best-effort partial
//! artifact.

use crate::error::EnrichError;
use crate::model::VisionModel;
use crate::pipeline::transcribe::{transcribe_page, PageTranscription};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Transcribe every page image concurrently and write the page-ordered
/// aggregate to `out_file`. Returns the number of pages aggregated.
pub async fn aggregate_transcriptions(
    model: &Arc<dyn VisionModel>,
    page_images: &[PathBuf],
    out_file: &Path,
    concurrency: usize,
) -> Result<usize, EnrichError> {
    let results: Vec<Result<PageTranscription, EnrichError>> =
        stream::iter(page_images.iter().map(|path| {
            let model = Arc::clone(model);
            let path = path.clone();
            async move { transcribe_page(model.as_ref(), &path).await }
        }))
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    // All-or-nothing: the first error discards every completed page.
    let mut pages: Vec<PageTranscription> =
        results.into_iter().collect::<Result<Vec<_>, _>>()?;

    pages.sort_by_key(|p| p.page);

    let blob = render_aggregate(&pages);
    tokio::fs::write(out_file, &blob)
        .await
        .map_err(|e| EnrichError::scratch(out_file, e))?;

    info!(
        "Aggregated {} pages ({} bytes) into {}",
        pages.len(),
        blob.len(),
        out_file.display()
    );
    Ok(pages.len())
}

/// Render sorted page transcriptions into the aggregate text blob.
///
/// Each page contributes a `Page Number: {n}` line, its normalized text, and
/// a blank-line separator.
pub fn render_aggregate(pages: &[PageTranscription]) -> String {
    let mut blob = String::new();
    for p in pages {
        blob.push_str(&format!("Page Number: {}\n", p.page));
        blob.push_str(&normalize_text(&p.text));
        blob.push_str("\n\n");
    }
    blob
}

/// Trim leading/trailing whitespace from every line (not the whole block)
/// and re-join the lines in their original order.
pub fn normalize_text(text: &str) -> String {
    text.split('\n')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(n: usize, text: &str) -> PageTranscription {
        PageTranscription {
            page: n,
            text: text.to_string(),
        }
    }

    #[test]
    fn normalize_trims_each_line_independently() {
        assert_eq!(normalize_text("Hello\n  World  "), "Hello\nWorld");
        assert_eq!(normalize_text("  a  \n\n  b"), "a\n\nb");
    }

    #[test]
    fn render_prefixes_each_page_and_separates_with_blank_line() {
        let blob = render_aggregate(&[page(1, "Hello\n  World  ")]);
        assert_eq!(blob, "Page Number: 1\nHello\nWorld\n\n");
    }

    #[test]
    fn render_keeps_strictly_increasing_page_order() {
        let blob = render_aggregate(&[page(1, "a"), page(2, "b"), page(3, "c")]);
        assert_eq!(
            blob,
            "Page Number: 1\na\n\nPage Number: 2\nb\n\nPage Number: 3\nc\n\n"
        );
    }

    #[test]
    fn render_of_no_pages_is_empty() {
        assert_eq!(render_aggregate(&[]), "");
    }
}
