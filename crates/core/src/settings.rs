//! User settings persistence.
//!
//! Two entries survive between sessions: the Gemini API key and the selected
//! theme id. Both are read once at startup and written back immediately on
//! every change.

use crate::error::Result;
use crate::theme::{DEFAULT_THEME_ID, Theme};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// User-configurable settings persisted between sessions.
///
/// Stored as JSON in the user's config directory
/// (e.g. `~/.config/imagen/settings.json` on Linux).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "geminiApiKey", default)]
    pub api_key: String,
    #[serde(rename = "appTheme", default = "default_theme_id")]
    pub theme_id: String,
}

fn default_theme_id() -> String {
    DEFAULT_THEME_ID.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            theme_id: default_theme_id(),
        }
    }
}

/// Owns the loaded [`Settings`] and the file they live in.
pub struct SettingsStore {
    path: Option<PathBuf>,
    settings: Settings,
    // Environment key, never written to disk
    fallback_api_key: String,
}

impl SettingsStore {
    /// Default location of the settings file, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "arafat", "imagen").map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Opens the store at [`SettingsStore::default_path`].
    pub fn open_default() -> Self {
        match Self::default_path() {
            Some(path) => Self::open(path),
            None => {
                tracing::warn!("No config directory available; settings will not persist");
                Self {
                    path: None,
                    settings: Settings::default(),
                    fallback_api_key: String::new(),
                }
            }
        }
    }

    /// Loads settings from `path`, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let settings = fs::read_to_string(&path)
            .ok()
            .and_then(|content| match serde_json::from_str(&content) {
                Ok(settings) => Some(settings),
                Err(e) => {
                    tracing::warn!("Ignoring malformed settings file {}: {}", path.display(), e);
                    None
                }
            })
            .unwrap_or_default();

        Self {
            path: Some(path),
            settings,
            fallback_api_key: String::new(),
        }
    }

    /// Key used for this session whenever no key has been saved.
    pub fn with_fallback_api_key(mut self, key: impl Into<String>) -> Self {
        self.fallback_api_key = key.into();
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Saved key, or the fallback key when none is saved.
    pub fn api_key(&self) -> &str {
        if self.settings.api_key.trim().is_empty() {
            &self.fallback_api_key
        } else {
            &self.settings.api_key
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key().trim().is_empty()
    }

    /// Active theme; unknown stored ids resolve to the default theme.
    pub fn theme(&self) -> Theme {
        Theme::by_id(&self.settings.theme_id)
    }

    /// Stores a new API key and writes it to disk.
    pub fn set_api_key(&mut self, key: impl Into<String>) -> Result<()> {
        self.settings.api_key = key.into();
        tracing::info!("API key updated");
        self.save()
    }

    /// Stores a new theme and writes it to disk.
    pub fn set_theme(&mut self, theme: &Theme) -> Result<()> {
        self.settings.theme_id = theme.id.to_string();
        tracing::info!("Theme changed to {}", theme.id);
        self.save()
    }

    /// Persists settings to disk.
    ///
    /// # Errors
    /// Returns an error if serialization or file writing fails.
    fn save(&self) -> Result<()> {
        if let Some(path) = &self.path {
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir)?;
            }
            let json = serde_json::to_string_pretty(&self.settings)?;
            fs::write(path, json)?;
        }
        Ok(())
    }
}
