//! Desktop front end.
//!
//! # Architecture
//!
//! - [`app`]: the `eframe::App` that owns both flow states
//! - [`state`]: tab selection and background task results
//! - `tasks`: tokio runtime and channel that carry work off the UI thread
//! - `rendering`: theme visuals and shared widgets
//! - `text_to_image`, `image_to_prompt`, `settings`: one panel each
//!
//! # Usage
//!
//! ```ignore
//! use imagen_core::{Config, ui};
//!
//! let config = Config::load()?;
//! ui::run(config, ui::LaunchOptions::default())?;
//! ```

pub mod app;
mod image_to_prompt;
mod rendering;
mod settings;
pub mod state;
mod tasks;
mod text_to_image;

pub use app::ImagenApp;
pub use state::Tab;

use crate::config::Config;
use crate::error::{AppError, Result};
use eframe::egui;
use std::path::PathBuf;

pub const APP_TITLE: &str = "Arafat Imagen";

/// Startup choices made on the command line.
#[derive(Clone, Debug, Default)]
pub struct LaunchOptions {
    pub initial_tab: Tab,
    /// Overrides the per-user settings file.
    pub settings_path: Option<PathBuf>,
    /// Show the settings dialog on the first frame.
    pub open_settings: bool,
}

/// Opens the main window and blocks until it is closed.
pub fn run(config: Config, options: LaunchOptions) -> Result<()> {
    let native = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(APP_TITLE)
            .with_inner_size([1100.0, 820.0])
            .with_min_inner_size([640.0, 480.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        APP_TITLE,
        native,
        Box::new(move |cc| {
            let app = ImagenApp::new(cc, config, options)?;
            Ok(Box::new(app) as Box<dyn eframe::App>)
        }),
    )
    .map_err(|e| AppError::ui(format!("Failed to run UI: {}", e)))
}
