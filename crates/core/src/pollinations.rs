//! Pollinations image and text endpoints.
//!
//! Image generation needs no request from this side: the URL built by
//! [`build_image_url`] *is* the request, and the UI simply loads it. Prompt
//! enhancement and the model catalogue are plain GET requests.

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::text::strip_wrapping_quotes;
use rand::Rng;
use reqwest::Client;
use url::Url;

/// Models that must appear as a path segment instead of a `model` query parameter.
pub const PATH_BASED_MODELS: &[&str] = &["gptimage", "dall-e-3"];

/// Offered when the model catalogue cannot be fetched.
pub const FALLBACK_MODELS: &[&str] = &["flux", "turbo", "gptimage", "dall-e-3"];

/// Seeds are drawn uniformly from `0..SEED_RANGE`.
pub const SEED_RANGE: u32 = 100_000;

const ENHANCE_INSTRUCTION: &str = "You are a creative assistant for an AI image generator. Your task is to take a user's simple idea and expand it into a rich, detailed, and artistic prompt. Focus on visual details, atmosphere, lighting, artistic style, and composition. The output must be only the prompt itself, without any extra text or explanation. Here is the user's idea: ";

pub fn is_path_based_model(model: &str) -> bool {
    PATH_BASED_MODELS.contains(&model)
}

pub fn random_seed() -> u32 {
    rand::thread_rng().gen_range(0..SEED_RANGE)
}

/// Wraps a user idea in the fixed enhancement instruction.
pub fn enhancement_instruction(idea: &str) -> String {
    format!("{}\"{}\"", ENHANCE_INSTRUCTION, idea)
}

/// Builds the image generation URL for one candidate image.
///
/// Path-based models go into the path (`/prompt/<model>/<prompt>`); any other
/// non-empty model is sent as `?model=`. `width`, `height`, `seed` and
/// `nofeed=true` are always appended, in that order.
pub fn build_image_url(
    base: &Url,
    prompt: &str,
    model: &str,
    width: u32,
    height: u32,
    seed: u32,
) -> Url {
    let encoded_prompt = urlencoding::encode(prompt);
    let base_path = base.path().trim_end_matches('/');
    let path_based = is_path_based_model(model);

    let mut url = base.clone();
    if path_based {
        url.set_path(&format!("{}/prompt/{}/{}", base_path, model, encoded_prompt));
    } else {
        url.set_path(&format!("{}/prompt/{}", base_path, encoded_prompt));
    }
    url.set_query(None);

    {
        let mut query = url.query_pairs_mut();
        if !path_based && !model.is_empty() {
            query.append_pair("model", model);
        }
        query
            .append_pair("width", &width.to_string())
            .append_pair("height", &height.to_string())
            .append_pair("seed", &seed.to_string())
            .append_pair("nofeed", "true");
    }

    url
}

/// File name offered when saving a generated image.
///
/// Takes the first 30 characters of the prompt, replaces everything that is
/// not an ASCII letter or digit with `_` and lower-cases the result.
pub fn download_file_name(prompt: &str) -> String {
    let safe: String = prompt
        .chars()
        .take(30)
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();

    if safe.is_empty() {
        "arafat-imagen-art.png".to_string()
    } else {
        format!("arafat-imagen-{}.png", safe)
    }
}

fn parse_base(name: &str, value: &str) -> Result<Url> {
    let url = Url::parse(value)
        .map_err(|e| AppError::config(format!("Invalid {} '{}': {}", name, value, e)))?;
    if url.cannot_be_a_base() {
        return Err(AppError::config(format!("{} '{}' cannot be a base URL", name, value)));
    }
    Ok(url)
}

pub struct PollinationsClient {
    client: Client,
    image_base: Url,
    text_base: Url,
}

impl PollinationsClient {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: &Config, client: Client) -> Result<Self> {
        Ok(Self {
            client,
            image_base: parse_base("image base URL", &config.image_base_url)?,
            text_base: parse_base("text base URL", &config.text_base_url)?,
        })
    }

    /// Builds a candidate image URL with a fresh random seed.
    pub fn image_url(&self, prompt: &str, model: &str, width: u32, height: u32) -> String {
        build_image_url(&self.image_base, prompt, model, width, height, random_seed()).into()
    }

    /// Expands a short idea into a detailed prompt.
    ///
    /// Returns an empty string without contacting the service when the idea
    /// is empty or whitespace-only.
    pub async fn enhance_prompt(&self, idea: &str) -> Result<String> {
        if idea.trim().is_empty() {
            return Ok(String::new());
        }

        let url = format!(
            "{}/{}",
            self.text_base.as_str().trim_end_matches('/'),
            urlencoding::encode(&enhancement_instruction(idea))
        );

        tracing::debug!("Requesting prompt enhancement ({} chars)", idea.len());
        let body = self.get_text(&url, "enhance prompt").await?;
        let enhanced = strip_wrapping_quotes(&body);

        tracing::info!("Prompt enhanced ({} -> {} chars)", idea.len(), enhanced.len());
        Ok(enhanced)
    }

    /// Fetches the list of image model identifiers.
    ///
    /// Accepts a JSON array of names, an array of objects with a `name`
    /// field, or an object keyed by model name.
    pub async fn fetch_image_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/models", self.image_base.as_str().trim_end_matches('/'));
        let body = self.get_text(&url, "fetch image models").await?;
        let value: serde_json::Value = serde_json::from_str(&body)?;

        let models: Vec<String> = match value {
            serde_json::Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    serde_json::Value::String(name) => Some(name),
                    serde_json::Value::Object(map) => map
                        .get("name")
                        .and_then(|n| n.as_str())
                        .map(str::to_string),
                    _ => None,
                })
                .collect(),
            serde_json::Value::Object(map) => map.keys().cloned().collect(),
            _ => Vec::new(),
        };

        if models.is_empty() {
            return Err(AppError::status(
                "fetch image models",
                200,
                "response did not contain any model names",
            ));
        }

        tracing::debug!("Fetched {} image models", models.len());
        Ok(models)
    }

    /// Loads the rendered image bytes behind a generated URL.
    pub async fn load_image(&self, url: &str) -> Result<Vec<u8>> {
        self.get_bytes(url, "load image").await
    }

    /// Re-fetches a generated image for saving to disk.
    pub async fn download_image(&self, url: &str) -> Result<Vec<u8>> {
        self.get_bytes(url, "download image").await
    }

    async fn send(&self, url: &str, context: &'static str) -> Result<reqwest::Response> {
        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::error!("Request to {} failed: {}", context, e);
            AppError::transport(context, e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("Pollinations error while trying to {} (status {})", context, status);
            return Err(AppError::status(
                context,
                status.as_u16(),
                format!("request returned status {}", status.as_u16()),
            ));
        }

        Ok(response)
    }

    async fn get_text(&self, url: &str, context: &'static str) -> Result<String> {
        self.send(url, context)
            .await?
            .text()
            .await
            .map_err(|e| AppError::transport(context, e.to_string()))
    }

    async fn get_bytes(&self, url: &str, context: &'static str) -> Result<Vec<u8>> {
        let bytes = self
            .send(url, context)
            .await?
            .bytes()
            .await
            .map_err(|e| AppError::transport(context, e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
