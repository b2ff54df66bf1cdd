//! Pipeline stages for document enrichment.
//!
//! Each submodule implements exactly one transformation step, independently
//! testable behind the storage/model seams.
//!
//! ## Data Flow
//!
//! ```text
//! rasterize ──▶ transcribe ──▶ aggregate
//! (pdfium)      (VLM seam)     (order + normalize + write)
//! ```
//!
//! 1. [`rasterize`]  — render every page to `page_{n}.png`; runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 2. [`transcribe`] — one page image → `(page number, text)` via the model
//!    seam; the only stage with network I/O
//! 3. [`aggregate`]  — bounded fan-out, restore page order, normalize lines,
//!    write the single text artifact

pub mod aggregate;
pub mod rasterize;
pub mod transcribe;
