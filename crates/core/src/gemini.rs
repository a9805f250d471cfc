use crate::config::Config;
use crate::error::{AppError, Result};
use crate::image_processing::ImageUpload;
use crate::text::strip_wrapping_quotes;
use async_trait::async_trait;
use gemini_rust::{Blob, Content, Gemini, Message, Part, Role};

/// Instruction sent alongside the image.
pub const DESCRIBE_INSTRUCTION: &str = "Analyze this image in detail. Generate a rich, artistic, and descriptive prompt for an AI image generator. The prompt should capture the main subject, the environment/background, the atmosphere and mood, the lighting conditions, and the artistic style (e.g., photorealistic, watercolor, fantasy art). The output must be ONLY the prompt itself, without any extra text, labels, or explanations. For example: 'Photorealistic shot of a majestic lion with a glowing mane, standing on a skyscraper in a futuristic neon-lit city at night, cinematic lighting, dramatic atmosphere, ultra-detailed.'";

/// Substring Gemini puts in the failure body when the key is rejected.
const INVALID_KEY_MARKER: &str = "API key not valid";

/// Turns an image into a text prompt.
#[async_trait]
pub trait DescribeImage: Send + Sync {
    /// Fails with [`AppError::MissingCredential`] before any request when
    /// `api_key` is blank.
    async fn describe_image(&self, image: &ImageUpload, api_key: &str) -> Result<String>;
}

pub struct GeminiClient {
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Self {
        let base_url = if config.gemini_base_url.ends_with('/') {
            config.gemini_base_url.clone()
        } else {
            format!("{}/", config.gemini_base_url)
        };

        Self {
            model: config.gemini_model.clone(),
            base_url,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    // The key comes from settings and may change between calls
    fn connect(&self, api_key: &str) -> Result<Gemini> {
        let base_url = url::Url::parse(&self.base_url)
            .map_err(|e| AppError::config(format!("Invalid base URL: {}", e)))?;

        let model_name = if self.model.starts_with("models/") {
            self.model.clone()
        } else {
            format!("models/{}", self.model)
        };
        let model_url = format!("{}{}", self.base_url, model_name);

        Gemini::with_model_and_base_url(api_key, model_url, base_url)
            .map_err(|e| AppError::config(format!("Failed to create Gemini client: {}", e)))
    }
}

#[async_trait]
impl DescribeImage for GeminiClient {
    async fn describe_image(&self, image: &ImageUpload, api_key: &str) -> Result<String> {
        if api_key.trim().is_empty() {
            return Err(AppError::MissingCredential);
        }

        let client = self.connect(api_key.trim())?;

        let image_part = Part::InlineData {
            inline_data: Blob {
                mime_type: image.mime_type().to_string(),
                data: image.to_base64(),
            },
        };
        let text_part = Part::Text {
            text: DESCRIBE_INSTRUCTION.to_string(),
            thought: None,
            thought_signature: None,
        };
        let message = Message {
            role: Role::User,
            content: Content {
                role: Some(Role::User),
                parts: Some(vec![image_part, text_part]),
            },
        };

        tracing::debug!(
            "Describing {} ({} bytes, {}) with {}",
            image.file_name(),
            image.size(),
            image.mime_type(),
            self.model
        );

        let response = client
            .generate_content()
            .with_messages(vec![message])
            .execute()
            .await
            .map_err(|e| {
                let failure = classify_failure(format!("{:?}", e));
                tracing::error!("Gemini request failed: {}", failure);
                failure
            })?;

        let text = response
            .candidates
            .first()
            .and_then(|candidate| candidate.content.parts.as_ref())
            .and_then(|parts| {
                parts.iter().find_map(|part| match part {
                    Part::Text { text, .. } => Some(text.clone()),
                    _ => None,
                })
            })
            .map(|text| strip_wrapping_quotes(&text))
            .unwrap_or_default();

        if text.is_empty() {
            tracing::warn!("Gemini returned no text for {}", image.file_name());
            return Err(AppError::EmptyResult);
        }

        tracing::info!("Generated prompt from {} ({} chars)", image.file_name(), text.len());
        Ok(text)
    }
}

/// Maps a failed Gemini call onto the user-facing error.
pub(crate) fn classify_failure(message: String) -> AppError {
    if message.contains(INVALID_KEY_MARKER) {
        AppError::InvalidCredential
    } else {
        AppError::transport("generate prompt", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_answering(response: ResponseTemplate) -> (MockServer, GeminiClient) {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r":generateContent$"))
            .respond_with(response)
            .mount(&server)
            .await;

        let config = Config::builder()
            .with_gemini_base_url(format!("{}/v1beta/", server.uri()))
            .build()
            .unwrap();
        (server, GeminiClient::new(&config))
    }

    fn candidate(content: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": content, "finishReason": "STOP", "index": 0 }]
        }))
    }

    fn upload() -> ImageUpload {
        ImageUpload::from_bytes("cat.png", vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A])
            .unwrap()
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_request() {
        // Unroutable base: any request attempt would produce a transport error instead
        let config = Config::builder()
            .with_gemini_base_url("http://127.0.0.1:9/v1beta/")
            .build()
            .unwrap();
        let client = GeminiClient::new(&config);

        let err = client.describe_image(&upload(), "").await.unwrap_err();
        assert!(matches!(err, AppError::MissingCredential));

        let err = client.describe_image(&upload(), "   ").await.unwrap_err();
        assert!(matches!(err, AppError::MissingCredential));
    }

    #[tokio::test]
    async fn test_reply_is_unquoted() {
        let (_server, client) = client_answering(candidate(json!({
            "role": "model",
            "parts": [{ "text": "\"A lion\"\n" }]
        })))
        .await;

        let prompt = client.describe_image(&upload(), "test-key").await.unwrap();
        assert_eq!(prompt, "A lion");
    }

    #[tokio::test]
    async fn test_reply_without_parts_is_empty_result() {
        let (_server, client) = client_answering(candidate(json!({ "role": "model" }))).await;

        let err = client.describe_image(&upload(), "test-key").await.unwrap_err();
        assert!(matches!(err, AppError::EmptyResult));
    }

    #[tokio::test]
    async fn test_rejected_key_from_server() {
        let (_server, client) = client_answering(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT"
            }
        })))
        .await;

        let err = client.describe_image(&upload(), "bad-key").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredential));
    }

    #[tokio::test]
    async fn test_server_error_is_network_error() {
        let (_server, client) =
            client_answering(ResponseTemplate::new(500).set_body_string("internal")).await;

        let err = client.describe_image(&upload(), "test-key").await.unwrap_err();
        assert!(matches!(err, AppError::Network { context: "generate prompt", .. }));
    }

    #[test]
    fn test_invalid_key_is_classified() {
        let err = classify_failure(
            "BadResponse { code: 400, description: Some(\"API key not valid. Please pass a valid API key.\") }"
                .to_string(),
        );
        assert!(matches!(err, AppError::InvalidCredential));
        assert_eq!(
            err.to_string(),
            "Your Gemini API key is not valid. Please check it in the settings."
        );
    }

    #[test]
    fn test_other_failures_are_network_errors() {
        let err = classify_failure("connection reset".to_string());
        assert_eq!(err.to_string(), "Failed to generate prompt: connection reset");
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let config = Config::builder()
            .with_gemini_base_url("https://example.com/v1beta")
            .with_model("gemini-2.5-flash")
            .build()
            .unwrap();
        let client = GeminiClient::new(&config);
        assert_eq!(client.base_url, "https://example.com/v1beta/");
        assert_eq!(client.model(), "gemini-2.5-flash");
    }
}
