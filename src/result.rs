//! Output types returned to the ingestion platform.

use crate::event::EventAttribute;
use serde::{Deserialize, Serialize};

/// Version tag of the enrichment-result format the platform expects.
pub const RESULT_VERSION: &str = "v0";

/// The structured result of one enrichment invocation.
///
/// `metadata_updates` is a placeholder for the platform's richer
/// metadata-enrichment contract; this pipeline derives a text artifact only
/// and always returns the list empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentResult {
    pub version: String,

    /// Storage key of the derived aggregate artifact.
    #[serde(rename = "s3ObjectKey")]
    pub s3_object_key: String,

    #[serde(rename = "metadataUpdates")]
    pub metadata_updates: Vec<EventAttribute>,
}

impl EnrichmentResult {
    /// Result describing an artifact stored under `key`.
    pub fn for_key(key: impl Into<String>) -> Self {
        Self {
            version: RESULT_VERSION.to_string(),
            s3_object_key: key.into(),
            metadata_updates: Vec::new(),
        }
    }
}

/// Identity of one pipeline run, used to namespace scratch paths so that
/// concurrent invocations on the same host never collide.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    pub request_id: String,
}

impl InvocationContext {
    /// Context with a fresh random run identifier.
    pub fn new() -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Context carrying the platform-assigned request id.
    pub fn with_request_id(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }
}

impl Default for InvocationContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_serialises_with_platform_field_names() {
        let r = EnrichmentResult::for_key("pre-extraction/folder/file.pdf.txt");
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["version"], "v0");
        assert_eq!(json["s3ObjectKey"], "pre-extraction/folder/file.pdf.txt");
        assert_eq!(json["metadataUpdates"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn fresh_contexts_are_distinct() {
        assert_ne!(
            InvocationContext::new().request_id,
            InvocationContext::new().request_id
        );
    }
}
