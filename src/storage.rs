//! Object storage seam: download the source document, upload the artifact.
//!
//! The pipeline never talks to storage directly: it holds an
//! `Arc<dyn ObjectStore>` handed to it at construction, so tests substitute
//! an in-memory double and deployments pick the HTTP implementation below.

use crate::error::EnrichError;
use std::path::Path;
use tracing::{debug, info};

/// Async seam over the object store the platform reads from and writes to.
///
/// Objects are addressed by `(bucket, key)`; keys may contain `/` and are
/// used verbatim (already percent-decoded by the event layer).
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch the object at `(bucket, key)` into the local file `dest`.
    async fn get(&self, bucket: &str, key: &str, dest: &Path) -> Result<(), EnrichError>;

    /// Store the local file `src` as the object at `(bucket, key)`.
    async fn put(&self, src: &Path, bucket: &str, key: &str) -> Result<(), EnrichError>;
}

/// S3-compatible HTTP object store with path-style addressing.
///
/// Requests go to `{endpoint}/{bucket}/{key}` with a bearer token, the
/// scheme spoken by S3-compatible gateways fronted by service tokens. Key
/// segments are percent-encoded when the URL is built; the `/` separators
/// are preserved.
pub struct HttpObjectStore {
    endpoint: String,
    token: String,
    client: reqwest::Client,
}

impl HttpObjectStore {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token: token.into(),
            client,
        }
    }

    /// Build a store from `STORAGE_ENDPOINT` and `STORAGE_TOKEN`.
    pub fn from_env(client: reqwest::Client) -> Result<Self, EnrichError> {
        let endpoint =
            std::env::var("STORAGE_ENDPOINT").map_err(|_| EnrichError::ClientNotConfigured {
                client: "storage".into(),
                hint: "Set STORAGE_ENDPOINT to the object store base URL".into(),
            })?;
        let token = std::env::var("STORAGE_TOKEN").map_err(|_| EnrichError::ClientNotConfigured {
            client: "storage".into(),
            hint: "Set STORAGE_TOKEN to a bearer token with read/write access".into(),
        })?;
        Ok(Self::new(client, endpoint, token))
    }

    fn object_url(&self, bucket: &str, key: &str) -> String {
        let encoded_key: Vec<String> = key
            .split('/')
            .map(|seg| urlencoding::encode(seg).into_owned())
            .collect();
        format!("{}/{}/{}", self.endpoint, bucket, encoded_key.join("/"))
    }
}

#[async_trait::async_trait]
impl ObjectStore for HttpObjectStore {
    async fn get(&self, bucket: &str, key: &str, dest: &Path) -> Result<(), EnrichError> {
        let url = self.object_url(bucket, key);
        debug!("GET {}", url);

        let fail = |reason: String| EnrichError::DownloadFailed {
            bucket: bucket.to_string(),
            key: key.to_string(),
            reason,
        };

        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| fail(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(fail(format!("HTTP {}", resp.status())));
        }

        let bytes = resp.bytes().await.map_err(|e| fail(e.to_string()))?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| EnrichError::scratch(parent, e))?;
        }
        tokio::fs::write(dest, &bytes)
            .await
            .map_err(|e| EnrichError::scratch(dest, e))?;

        info!(
            "Downloaded s3://{}/{} ({} bytes) to {}",
            bucket,
            key,
            bytes.len(),
            dest.display()
        );
        Ok(())
    }

    async fn put(&self, src: &Path, bucket: &str, key: &str) -> Result<(), EnrichError> {
        let body = tokio::fs::read(src)
            .await
            .map_err(|e| EnrichError::scratch(src, e))?;
        let url = self.object_url(bucket, key);
        debug!("PUT {} ({} bytes)", url, body.len());

        let fail = |reason: String| EnrichError::UploadFailed {
            bucket: bucket.to_string(),
            key: key.to_string(),
            reason,
        };

        let resp = self
            .client
            .put(&url)
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(body)
            .send()
            .await
            .map_err(|e| fail(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(fail(format!("HTTP {}", resp.status())));
        }

        info!("Uploaded s3://{}/{}", bucket, key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_url_encodes_key_segments_but_keeps_separators() {
        let store = HttpObjectStore::new(
            reqwest::Client::new(),
            "https://store.example.com/",
            "tok",
        );
        assert_eq!(
            store.object_url("docs", "folder/demand letter.pdf"),
            "https://store.example.com/docs/folder/demand%20letter.pdf"
        );
    }

    #[test]
    fn endpoint_trailing_slash_is_normalised() {
        let store = HttpObjectStore::new(reqwest::Client::new(), "http://s/", "t");
        assert_eq!(store.object_url("b", "k"), "http://s/b/k");
    }
}
