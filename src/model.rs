//! Vision-language model seam: one page image in, transcription text out.
//!
//! The wire format is the messages protocol the hosted runtime consumes: a
//! fixed protocol version tag, a token budget, and a single user message
//! carrying the base64 page image plus the instructional prompt. The
//! transcription is the text of the first content segment of the response.
//!
//! There is deliberately no retry here: a failed page invocation fails the
//! whole document, and the invoking platform owns any retry policy.

use crate::error::EnrichError;
use crate::prompts::DEFAULT_TRANSCRIBE_PROMPT;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Protocol version tag the hosted runtime requires in every request.
pub const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Async seam over the hosted vision-language model.
///
/// `page` is carried for error attribution only; implementations must not
/// let it influence the transcription.
#[async_trait::async_trait]
pub trait VisionModel: Send + Sync {
    /// Transcribe one PNG page image into Markdown text.
    async fn transcribe(&self, page: usize, png: &[u8]) -> Result<String, EnrichError>;
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct InvokeRequest<'a> {
    anthropic_version: &'a str,
    max_tokens: usize,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: Vec<ContentBlock<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ContentBlock<'a> {
    #[serde(rename = "image")]
    Image { source: ImageSource<'a> },
    #[serde(rename = "text")]
    Text { text: &'a str },
}

#[derive(Serialize)]
struct ImageSource<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    media_type: &'a str,
    data: String,
}

#[derive(Deserialize)]
struct InvokeResponse {
    content: Vec<ResponseSegment>,
}

#[derive(Deserialize)]
struct ResponseSegment {
    #[serde(default)]
    text: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────────

/// HTTP client for the hosted model runtime.
pub struct AnthropicMessagesClient {
    endpoint: String,
    api_key: String,
    model_id: String,
    max_tokens: usize,
    prompt: String,
    client: reqwest::Client,
}

impl AnthropicMessagesClient {
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model_id: impl Into<String>,
        max_tokens: usize,
        prompt: Option<String>,
    ) -> Self {
        let endpoint = endpoint.into();
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model_id: model_id.into(),
            max_tokens,
            prompt: prompt.unwrap_or_else(|| DEFAULT_TRANSCRIBE_PROMPT.to_string()),
            client,
        }
    }

    /// Build a client from `MODEL_ENDPOINT` and `MODEL_API_KEY`, taking the
    /// model id, token budget, and prompt override from the pipeline config.
    pub fn from_env(
        client: reqwest::Client,
        config: &crate::config::EnrichConfig,
    ) -> Result<Self, EnrichError> {
        let endpoint =
            std::env::var("MODEL_ENDPOINT").map_err(|_| EnrichError::ClientNotConfigured {
                client: "model".into(),
                hint: "Set MODEL_ENDPOINT to the model runtime base URL".into(),
            })?;
        let api_key = std::env::var("MODEL_API_KEY").map_err(|_| EnrichError::ClientNotConfigured {
            client: "model".into(),
            hint: "Set MODEL_API_KEY to an API key for the model runtime".into(),
        })?;
        Ok(Self::new(
            client,
            endpoint,
            api_key,
            config.model_id.clone(),
            config.max_tokens,
            config.prompt.clone(),
        ))
    }

    fn invoke_url(&self) -> String {
        format!("{}/model/{}/invoke", self.endpoint, self.model_id)
    }

    fn build_request(&self, png: &[u8]) -> InvokeRequest<'_> {
        InvokeRequest {
            anthropic_version: ANTHROPIC_VERSION,
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: "user",
                content: vec![
                    ContentBlock::Image {
                        source: ImageSource {
                            kind: "base64",
                            media_type: "image/png",
                            data: STANDARD.encode(png),
                        },
                    },
                    ContentBlock::Text { text: &self.prompt },
                ],
            }],
        }
    }
}

#[async_trait::async_trait]
impl VisionModel for AnthropicMessagesClient {
    async fn transcribe(&self, page: usize, png: &[u8]) -> Result<String, EnrichError> {
        let body = self.build_request(png);
        debug!("Invoking {} for page {}", self.model_id, page);

        let fail = |message: String| EnrichError::ModelInvocation { page, message };

        let resp = self
            .client
            .post(self.invoke_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| fail(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(fail(format!("HTTP {status}: {text}")));
        }

        let parsed: InvokeResponse = resp
            .json()
            .await
            .map_err(|e| EnrichError::MalformedModelResponse {
                page,
                detail: e.to_string(),
            })?;

        let first = parsed
            .content
            .first()
            .ok_or_else(|| EnrichError::MalformedModelResponse {
                page,
                detail: "empty content list".into(),
            })?;

        first
            .text
            .clone()
            .ok_or_else(|| EnrichError::MalformedModelResponse {
                page,
                detail: "first content segment carries no text".into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> AnthropicMessagesClient {
        AnthropicMessagesClient::new(
            reqwest::Client::new(),
            "https://runtime.example.com/",
            "key",
            "anthropic.claude-3-sonnet-20240229-v1:0",
            200_000,
            None,
        )
    }

    #[test]
    fn invoke_url_embeds_model_id() {
        assert_eq!(
            client().invoke_url(),
            "https://runtime.example.com/model/anthropic.claude-3-sonnet-20240229-v1:0/invoke"
        );
    }

    #[test]
    fn request_body_carries_version_budget_image_and_prompt() {
        let c = client();
        let body = serde_json::to_value(c.build_request(&[1, 2, 3])).unwrap();
        assert_eq!(body["anthropic_version"], ANTHROPIC_VERSION);
        assert_eq!(body["max_tokens"], 200_000);

        let content = body["messages"][0]["content"].as_array().unwrap();
        assert_eq!(content.len(), 2);
        assert_eq!(content[0]["type"], "image");
        assert_eq!(content[0]["source"]["media_type"], "image/png");
        assert_eq!(content[0]["source"]["data"], STANDARD.encode([1, 2, 3]));
        assert_eq!(content[1]["type"], "text");
        assert!(content[1]["text"]
            .as_str()
            .unwrap()
            .contains("Transcribe the text content"));
    }

    #[test]
    fn response_parsing_takes_first_text_segment() {
        let parsed: InvokeResponse = serde_json::from_str(
            r##"{"content": [{"type": "text", "text": "# Page"}, {"type": "text", "text": "ignored"}]}"##,
        )
        .unwrap();
        assert_eq!(parsed.content[0].text.as_deref(), Some("# Page"));
    }
}
