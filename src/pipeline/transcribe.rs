//! Page transcription: one rasterized page image → `(page number, text)`.
//!
//! The page number is authoritative data here, not bookkeeping: it is the
//! ordering key the aggregator sorts on, and it is recovered from the
//! `page_{n}.png` filename the rasterizer wrote. The model sees only the
//! image bytes.

use crate::error::EnrichError;
use crate::model::VisionModel;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::debug;

static RE_PAGE_FILE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^page_(\d+)\.png$").unwrap());

/// A single page's transcription, keyed by its 1-based page number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTranscription {
    pub page: usize,
    pub text: String,
}

/// Recover the 1-based page number from a `page_{n}.png` path.
///
/// The rasterizer owns this naming contract; anything else in the pages
/// directory is an internal error, not a page to skip.
pub fn page_number(image_path: &Path) -> Result<usize, EnrichError> {
    image_path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| RE_PAGE_FILE.captures(n))
        .and_then(|c| c[1].parse().ok())
        .ok_or_else(|| EnrichError::UnrecognisedPageImage {
            path: image_path.to_path_buf(),
        })
}

/// Transcribe one page image through the model seam.
///
/// Model errors are not caught here: a failed page fails the invocation.
pub async fn transcribe_page(
    model: &dyn VisionModel,
    image_path: &Path,
) -> Result<PageTranscription, EnrichError> {
    let page = page_number(image_path)?;

    let png = tokio::fs::read(image_path)
        .await
        .map_err(|e| EnrichError::scratch(image_path, e))?;

    debug!("Transcribing page {} ({} bytes)", page, png.len());
    let text = model.transcribe(page, &png).await?;

    Ok(PageTranscription { page, text })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn page_number_parses_one_based_index() {
        assert_eq!(page_number(Path::new("/tmp/pages/page_1.png")).unwrap(), 1);
        assert_eq!(page_number(Path::new("page_42.png")).unwrap(), 42);
    }

    #[test]
    fn page_number_rejects_foreign_filenames() {
        for name in ["page_.png", "page_1.jpg", "cover.png", "page_one.png"] {
            let err = page_number(&PathBuf::from(name)).unwrap_err();
            assert!(matches!(err, EnrichError::UnrecognisedPageImage { .. }));
        }
    }
}
