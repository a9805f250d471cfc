use crate::error::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use url::Url;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-flash-latest";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.pollinations.ai";
pub const DEFAULT_TEXT_BASE_URL: &str = "https://text.pollinations.ai";

#[derive(Clone, Debug)]
pub struct Config {
    /// Fallback credential, used only when the settings file holds none.
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub image_base_url: String,
    pub text_base_url: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load .env file if it exists, ignore if it doesn't
        let _ = dotenv();

        let mut builder = Self::builder();
        if let Ok(key) = env::var("GEMINI_API_KEY") {
            builder = builder.with_api_key(key);
        }
        if let Ok(model) = env::var("GEMINI_MODEL") {
            builder = builder.with_model(model);
        }
        if let Ok(url) = env::var("GEMINI_BASE_URL") {
            builder = builder.with_gemini_base_url(url);
        }
        if let Ok(url) = env::var("POLLINATIONS_IMAGE_URL") {
            builder = builder.with_image_base_url(url);
        }
        if let Ok(url) = env::var("POLLINATIONS_TEXT_URL") {
            builder = builder.with_text_base_url(url);
        }
        builder.build()
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            text_base_url: DEFAULT_TEXT_BASE_URL.to_string(),
        }
    }
}

#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.config.gemini_api_key = if key.trim().is_empty() { None } else { Some(key) };
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.config.gemini_model = model.into();
        self
    }

    pub fn with_gemini_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.gemini_base_url = url.into();
        self
    }

    pub fn with_image_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.image_base_url = url.into();
        self
    }

    pub fn with_text_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.text_base_url = url.into();
        self
    }

    pub fn build(self) -> Result<Config> {
        let mut config = self.config;
        for (name, value) in [
            ("Gemini base URL", &config.gemini_base_url),
            ("image base URL", &config.image_base_url),
            ("text base URL", &config.text_base_url),
        ] {
            Url::parse(value)
                .map_err(|e| AppError::config(format!("Invalid {} '{}': {}", name, value, e)))?;
        }

        // Pollinations URLs are joined with '/' by hand
        config.image_base_url = config.image_base_url.trim_end_matches('/').to_string();
        config.text_base_url = config.text_base_url.trim_end_matches('/').to_string();

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = Config::builder().build().unwrap();
        assert_eq!(config.gemini_model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.image_base_url, DEFAULT_IMAGE_BASE_URL);
        assert!(config.gemini_api_key.is_none());
    }

    #[test]
    fn test_builder_trims_trailing_slash() {
        let config = Config::builder()
            .with_image_base_url("http://127.0.0.1:9000/")
            .build()
            .unwrap();
        assert_eq!(config.image_base_url, "http://127.0.0.1:9000");
    }

    #[test]
    fn test_blank_api_key_is_treated_as_absent() {
        let config = Config::builder().with_api_key("   ").build().unwrap();
        assert!(config.gemini_api_key.is_none());
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let err = Config::builder()
            .with_text_base_url("not a url")
            .build()
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
