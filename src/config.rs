//! Configuration for the enrichment pipeline.
//!
//! All pipeline behaviour is controlled through [`EnrichConfig`], built via
//! its [`EnrichConfigBuilder`]. The struct carries pipeline knobs only:
//! endpoints and credentials for the storage and model clients live with the
//! clients themselves (see [`crate::storage`] and [`crate::model`]), so a
//! config can be logged or diffed without leaking secrets.

use crate::error::EnrichError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for one enrichment pipeline instance.
///
/// Built via [`EnrichConfig::builder()`] or [`EnrichConfig::default()`].
///
/// # Example
/// ```rust
/// use preextract::EnrichConfig;
///
/// let config = EnrichConfig::builder()
///     .concurrency(4)
///     .max_tokens(100_000)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichConfig {
    /// Root directory for invocation-scoped scratch files. Default: the
    /// system temp directory.
    ///
    /// Every invocation namespaces its scratch paths with its run identifier
    /// underneath this root, so concurrent invocations sharing a root never
    /// collide.
    pub scratch_root: PathBuf,

    /// Number of concurrent model calls during page transcription. Default: 8.
    ///
    /// The model API is network-bound; fanning out over the page images cuts
    /// wall-clock time roughly linearly until the provider starts throttling.
    /// Lower this if the provider returns 429s under load.
    pub concurrency: usize,

    /// Maximum rendered image dimension (width or height) in pixels.
    /// Default: 2000.
    ///
    /// Caps either dimension regardless of the page's physical size, scaling
    /// the other proportionally, so pdfium never allocates more than roughly
    /// `max_rendered_pixels²` bytes of pixels for a single page.
    pub max_rendered_pixels: u32,

    /// Token budget passed to the model per page. Default: 200000.
    pub max_tokens: usize,

    /// Model identifier sent with each invocation.
    /// Default: `anthropic.claude-3-sonnet-20240229-v1:0`.
    pub model_id: String,

    /// Custom transcription prompt. If None, uses the built-in default.
    pub prompt: Option<String>,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            scratch_root: std::env::temp_dir(),
            concurrency: 8,
            max_rendered_pixels: 2000,
            max_tokens: 200_000,
            model_id: "anthropic.claude-3-sonnet-20240229-v1:0".to_string(),
            prompt: None,
        }
    }
}

impl EnrichConfig {
    /// Create a new builder for `EnrichConfig`.
    pub fn builder() -> EnrichConfigBuilder {
        EnrichConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`EnrichConfig`].
#[derive(Debug)]
pub struct EnrichConfigBuilder {
    config: EnrichConfig,
}

impl EnrichConfigBuilder {
    pub fn scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.scratch_root = root.into();
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn model_id(mut self, id: impl Into<String>) -> Self {
        self.config.model_id = id.into();
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.prompt = Some(prompt.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<EnrichConfig, EnrichError> {
        let c = &self.config;
        if c.concurrency == 0 {
            return Err(EnrichError::InvalidConfig("Concurrency must be ≥ 1".into()));
        }
        if c.max_tokens == 0 {
            return Err(EnrichError::InvalidConfig(
                "Token budget must be positive".into(),
            ));
        }
        if c.model_id.is_empty() {
            return Err(EnrichError::InvalidConfig("Model id must be set".into()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_observed_constants() {
        let c = EnrichConfig::default();
        assert_eq!(c.concurrency, 8);
        assert_eq!(c.max_tokens, 200_000);
        assert_eq!(c.model_id, "anthropic.claude-3-sonnet-20240229-v1:0");
        assert!(c.prompt.is_none());
    }

    #[test]
    fn concurrency_is_clamped_to_one() {
        let c = EnrichConfig::builder().concurrency(0).build().unwrap();
        assert_eq!(c.concurrency, 1);
    }

    #[test]
    fn empty_model_id_rejected() {
        let err = EnrichConfig::builder().model_id("").build().unwrap_err();
        assert!(err.to_string().contains("Model id"));
    }
}
