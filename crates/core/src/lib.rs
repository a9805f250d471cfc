//! Imagen Core Library
//!
//! Core functionality for the Imagen desktop client: turning text prompts
//! into images with Pollinations, and turning images back into prompts with
//! Google's Gemini.
//!
//! # Overview
//!
//! - **Prompt enhancement and image URLs**: the Pollinations client in [`pollinations`]
//! - **Image description**: the Gemini vision call in [`gemini`]
//! - **Flows**: pure state machines for both tabs in [`state`]
//! - **Preferences**: API key and theme persistence via [`settings`]
//! - **User Interface**: the egui window in [`ui`]
//!
//! # Quick Start
//!
//! ```ignore
//! use imagen_core::Imagen;
//!
//! let app = Imagen::new()?;
//! app.run(Default::default())?;
//! ```
//!
//! # Module Structure
//!
//! - [`config`]: Configuration loading and management
//! - [`error`]: Error types and result aliases
//! - [`gemini`]: Gemini vision client
//! - [`image_processing`]: Upload validation and decoding
//! - [`pollinations`]: Image URL construction, enhancement and model catalogue
//! - [`settings`]: Persisted user preferences
//! - [`state`]: Text-to-image and image-to-prompt reducers
//! - [`text`]: Response text cleanup
//! - [`theme`]: Accent color themes
//! - [`ui`]: User interface

pub mod config;
pub mod error;
pub mod gemini;
pub mod image_processing;
pub mod pollinations;
pub mod settings;
pub mod state;
pub mod text;
pub mod theme;
pub mod ui;

pub use config::Config;
pub use error::{AppError, Result, ValidationError};
pub use gemini::{DescribeImage, GeminiClient};
pub use image_processing::ImageUpload;
pub use pollinations::PollinationsClient;
pub use settings::SettingsStore;
pub use theme::Theme;
pub use ui::{LaunchOptions, Tab};

/// Main entry point for the Imagen application.
///
/// Holds the resolved configuration and launches the window with it.
pub struct Imagen {
    config: Config,
}

impl Imagen {
    /// Loads configuration from the environment (including `.env` files).
    ///
    /// # Errors
    ///
    /// Returns an error if a configured endpoint is not a valid URL.
    pub fn new() -> Result<Self> {
        Ok(Self {
            config: Config::load()?,
        })
    }

    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Allows overriding values such as the vision model after loading.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Opens the main window and blocks until it is closed.
    pub fn run(&self, options: LaunchOptions) -> Result<()> {
        ui::run(self.config.clone(), options)
    }
}

/// Loads `.env` files if present.
///
/// Call once at startup before reading configuration.
pub fn init() {
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }
}
