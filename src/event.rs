//! Trigger-event model and source-key resolution.
//!
//! The ingestion platform invokes the enrichment hook once per document with
//! a structured payload naming the source bucket and a list of document
//! attributes. The storage key of the source document is not a top-level
//! field: it is embedded, percent-encoded, in the `_source_uri` attribute's
//! URL after the `s3.amazonaws.com/` marker, and must be decoded before it
//! can be used as a storage key.

use crate::error::EnrichError;
use serde::{Deserialize, Serialize};

/// Marker separating the endpoint host from the object key in `_source_uri`.
const SOURCE_URI_MARKER: &str = "s3.amazonaws.com/";

/// The attribute carrying the source document's URI.
const SOURCE_URI_ATTRIBUTE: &str = "_source_uri";

/// The payload the ingestion platform delivers per document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionEvent {
    /// Bucket holding the source document (and receiving the artifact).
    #[serde(rename = "s3Bucket")]
    pub s3_bucket: String,

    /// Document metadata declared by the platform.
    pub metadata: EventMetadata,
}

/// The `metadata` envelope: an ordered list of name/value attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMetadata {
    pub attributes: Vec<EventAttribute>,
}

/// One platform attribute. Attributes other than `_source_uri` (e.g.
/// `_data_source_id`) are carried through untouched and ignored here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventAttribute {
    pub name: String,
    pub value: AttributeValue,
}

/// The platform's tagged scalar value. Only string values are consumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeValue {
    #[serde(rename = "stringValue")]
    pub string_value: String,
}

impl IngestionEvent {
    /// Parse an event from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, EnrichError> {
        serde_json::from_str(json).map_err(|e| EnrichError::Internal(format!("event JSON: {e}")))
    }

    /// Resolve the source document's storage key from the event attributes.
    ///
    /// The first `_source_uri` attribute wins. Its value embeds the key after
    /// the `s3.amazonaws.com/` marker, percent-encoded; the decoded key is
    /// returned (`folder%2Ffile.pdf` → `folder/file.pdf`).
    pub fn source_key(&self) -> Result<String, EnrichError> {
        let uri = self
            .metadata
            .attributes
            .iter()
            .find(|a| a.name == SOURCE_URI_ATTRIBUTE)
            .map(|a| a.value.string_value.as_str())
            .ok_or(EnrichError::MissingSourceUri)?;

        let (_, encoded) =
            uri.split_once(SOURCE_URI_MARKER)
                .ok_or_else(|| EnrichError::InvalidSourceUri {
                    uri: uri.to_string(),
                })?;

        if encoded.is_empty() {
            return Err(EnrichError::InvalidSourceUri {
                uri: uri.to_string(),
            });
        }

        let key = urlencoding::decode(encoded).map_err(|e| EnrichError::UndecodableSourceKey {
            key: encoded.to_string(),
            detail: e.to_string(),
        })?;

        Ok(key.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_with_uri(uri: &str) -> IngestionEvent {
        IngestionEvent {
            s3_bucket: "docs".into(),
            metadata: EventMetadata {
                attributes: vec![
                    EventAttribute {
                        name: "_data_source_id".into(),
                        value: AttributeValue {
                            string_value: "ds-1234".into(),
                        },
                    },
                    EventAttribute {
                        name: "_source_uri".into(),
                        value: AttributeValue {
                            string_value: uri.into(),
                        },
                    },
                ],
            },
        }
    }

    #[test]
    fn source_key_is_percent_decoded() {
        let ev = event_with_uri("https://docs.s3.amazonaws.com/folder%2Ffile.pdf");
        assert_eq!(ev.source_key().unwrap(), "folder/file.pdf");
    }

    #[test]
    fn source_key_decodes_spaces() {
        let ev = event_with_uri("https://docs.s3.amazonaws.com/demand%20letter.pdf");
        assert_eq!(ev.source_key().unwrap(), "demand letter.pdf");
    }

    #[test]
    fn missing_source_uri_attribute_is_fatal() {
        let ev = IngestionEvent {
            s3_bucket: "docs".into(),
            metadata: EventMetadata { attributes: vec![] },
        };
        assert!(matches!(
            ev.source_key(),
            Err(EnrichError::MissingSourceUri)
        ));
    }

    #[test]
    fn uri_without_marker_is_fatal() {
        let ev = event_with_uri("https://example.com/file.pdf");
        assert!(matches!(
            ev.source_key(),
            Err(EnrichError::InvalidSourceUri { .. })
        ));
    }

    #[test]
    fn event_round_trips_platform_json() {
        let json = r#"{
            "s3Bucket": "docs",
            "metadata": {
                "attributes": [
                    {"name": "_source_uri",
                     "value": {"stringValue": "https://docs.s3.amazonaws.com/a%20b.pdf"}}
                ]
            }
        }"#;
        let ev = IngestionEvent::from_json(json).unwrap();
        assert_eq!(ev.s3_bucket, "docs");
        assert_eq!(ev.source_key().unwrap(), "a b.pdf");
    }
}
