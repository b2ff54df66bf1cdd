//! Document rasterization: render every PDF page to a PNG file via pdfium.
//!
//! pdfium wraps a C++ library with thread-local state that is not safe to
//! call from async contexts, so the rendering runs under
//! `tokio::task::spawn_blocking` on the dedicated blocking pool.
//!
//! Output files are named `page_{n}.png` with 1-based page numbers matching
//! the document's native page order; the transcriber recovers the page
//! index by parsing that filename. The source document is deleted once all
//! pages are written; it has no further use after rasterization.

use crate::config::EnrichConfig;
use crate::error::EnrichError;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Rasterise every page of `pdf_path` into `out_dir`, one PNG per page.
///
/// Creates `out_dir` if absent, deletes `pdf_path` on completion, and
/// returns the written image paths in page order.
pub async fn rasterize_to_dir(
    pdf_path: &Path,
    out_dir: &Path,
    config: &EnrichConfig,
) -> Result<Vec<PathBuf>, EnrichError> {
    let pdf = pdf_path.to_path_buf();
    let dir = out_dir.to_path_buf();
    let max_pixels = config.max_rendered_pixels;

    tokio::task::spawn_blocking(move || rasterize_blocking(&pdf, &dir, max_pixels))
        .await
        .map_err(|e| EnrichError::Internal(format!("Rasterize task panicked: {e}")))?
}

/// Bind to the pdfium dynamic library: `PDFIUM_LIB_PATH` first, then the
/// system library.
fn bind_pdfium() -> Result<Pdfium, EnrichError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(path) => Pdfium::bind_to_library(Path::new(&path)),
        Err(_) => Pdfium::bind_to_system_library(),
    };
    bindings
        .map(Pdfium::new)
        .map_err(|e| EnrichError::PdfiumBindingFailed(format!("{e:?}")))
}

/// Blocking implementation of page rasterization.
fn rasterize_blocking(
    pdf_path: &Path,
    out_dir: &Path,
    max_pixels: u32,
) -> Result<Vec<PathBuf>, EnrichError> {
    std::fs::create_dir_all(out_dir).map_err(|e| EnrichError::scratch(out_dir, e))?;

    let mut written = Vec::new();

    // Scope the document so pdfium closes it before the file is removed.
    {
        let pdfium = bind_pdfium()?;

        let document =
            pdfium
                .load_pdf_from_file(pdf_path, None)
                .map_err(|e| EnrichError::CorruptDocument {
                    path: pdf_path.to_path_buf(),
                    detail: format!("{e:?}"),
                })?;

        let pages = document.pages();
        let total_pages = pages.len() as usize;
        info!("Document loaded: {} pages", total_pages);

        let render_config = PdfRenderConfig::new()
            .set_target_width(max_pixels as i32)
            .set_maximum_height(max_pixels as i32);

        written.reserve(total_pages);

        for idx in 0..total_pages {
            let page_num = idx + 1;

            let page = pages
                .get(idx as u16)
                .map_err(|e| EnrichError::RasterisationFailed {
                    page: page_num,
                    detail: format!("{e:?}"),
                })?;

            let bitmap =
                page.render_with_config(&render_config)
                    .map_err(|e| EnrichError::RasterisationFailed {
                        page: page_num,
                        detail: format!("{e:?}"),
                    })?;

            let image = bitmap.as_image();
            let out_path = out_dir.join(format!("page_{page_num}.png"));
            image
                .save_with_format(&out_path, image::ImageFormat::Png)
                .map_err(|e| EnrichError::RasterisationFailed {
                    page: page_num,
                    detail: format!("PNG write failed: {e}"),
                })?;

            debug!(
                "Rendered page {} → {} ({}x{} px)",
                page_num,
                out_path.display(),
                image.width(),
                image.height()
            );
            written.push(out_path);
        }
    }

    // The rasterized pages fully replace the source document in scratch.
    std::fs::remove_file(pdf_path).map_err(|e| EnrichError::scratch(pdf_path, e))?;

    Ok(written)
}
