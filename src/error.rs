//! Error types for the preextract library.
//!
//! Every error here is **fatal for the invocation**: the pipeline has no
//! partial-success contract. Either the full aggregate artifact is produced
//! and uploaded, or nothing is. A single page's model-call failure therefore
//! surfaces through the same type as a corrupt document or a failed upload,
//! and the invoking platform decides whether to retry the whole document.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the preextract library.
#[derive(Debug, Error)]
pub enum EnrichError {
    // ── Input-resolution errors ───────────────────────────────────────────
    /// The triggering event carries no `_source_uri` attribute.
    #[error("Event metadata has no '_source_uri' attribute; cannot resolve the source document")]
    MissingSourceUri,

    /// The `_source_uri` attribute exists but no storage key could be
    /// recovered from it.
    #[error("Could not extract a storage key from source URI '{uri}'")]
    InvalidSourceUri { uri: String },

    /// The percent-encoded storage key did not decode to valid UTF-8.
    #[error("Source key '{key}' is not valid percent-encoded UTF-8: {detail}")]
    UndecodableSourceKey { key: String, detail: String },

    // ── Storage errors ────────────────────────────────────────────────────
    /// Fetching the source object failed.
    #[error("Failed to download s3://{bucket}/{key}: {reason}")]
    DownloadFailed {
        bucket: String,
        key: String,
        reason: String,
    },

    /// Storing the derived artifact failed.
    #[error("Failed to upload s3://{bucket}/{key}: {reason}")]
    UploadFailed {
        bucket: String,
        key: String,
        reason: String,
    },

    // ── Document errors ───────────────────────────────────────────────────
    /// The source document could not be opened or parsed.
    #[error("Document '{path}' is corrupt or unreadable: {detail}")]
    CorruptDocument { path: PathBuf, detail: String },

    /// pdfium returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// A scratch page image does not follow the `page_{n}.png` naming the
    /// rasterizer guarantees.
    #[error("Unrecognised page image filename: '{path}'")]
    UnrecognisedPageImage { path: PathBuf },

    // ── Model errors ──────────────────────────────────────────────────────
    /// The vision-language model call failed (network, throttling, non-2xx).
    #[error("Model invocation failed for page {page}: {message}")]
    ModelInvocation { page: usize, message: String },

    /// The model responded, but not with the expected content layout.
    #[error("Malformed model response for page {page}: {detail}")]
    MalformedModelResponse { page: usize, detail: String },

    /// A client was constructed without the environment it needs.
    #[error("Client '{client}' is not configured: {hint}")]
    ClientNotConfigured { client: String, hint: String },

    // ── Scratch I/O errors ────────────────────────────────────────────────
    /// Reading or writing invocation-scoped scratch files failed.
    #[error("Scratch I/O failed at '{path}': {source}")]
    Scratch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
         Install libpdfium, or set PDFIUM_LIB_PATH=/path/to/libpdfium."
    )]
    PdfiumBindingFailed(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EnrichError {
    /// Wrap an I/O error with the path it occurred at.
    pub(crate) fn scratch(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EnrichError::Scratch {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_failed_display() {
        let e = EnrichError::DownloadFailed {
            bucket: "docs".into(),
            key: "folder/file.pdf".into(),
            reason: "HTTP 404".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("s3://docs/folder/file.pdf"), "got: {msg}");
        assert!(msg.contains("404"));
    }

    #[test]
    fn model_invocation_display_names_page() {
        let e = EnrichError::ModelInvocation {
            page: 3,
            message: "connection reset".into(),
        };
        assert!(e.to_string().contains("page 3"));
    }

    #[test]
    fn missing_source_uri_display() {
        assert!(EnrichError::MissingSourceUri
            .to_string()
            .contains("_source_uri"));
    }
}
