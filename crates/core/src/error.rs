//! Error types for the imagen-core library.
//!
//! Every failure a flow can surface maps to one variant here. The `Display`
//! output of each variant is the message shown inline in the UI, so the
//! wording is part of the contract.

use thiserror::Error;

/// Maximum accepted upload size for the image-to-prompt flow (4 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 4 * 1024 * 1024;

/// Input problems caught before any network request is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Generation was requested with an empty final prompt.
    #[error("Please enter a prompt to generate an image.")]
    EmptyPrompt,

    /// Enhancement was requested with an empty idea.
    #[error("Please enter a prompt to enhance.")]
    EmptyEnhancePrompt,

    /// Image-to-prompt was requested before a file was accepted.
    #[error("Please upload an image first.")]
    NoImageSelected,

    /// The selected file is over [`MAX_UPLOAD_BYTES`].
    #[error("Image size cannot exceed 4MB.")]
    FileTooLarge {
        /// Size of the rejected file in bytes.
        size: u64,
    },

    /// The selected file is not a PNG, JPEG, GIF or WebP image.
    #[error("Unsupported file type. Please choose a PNG, JPEG, GIF or WebP image.")]
    UnsupportedImage,
}

/// Errors that can occur within the imagen-core library.
#[derive(Error, Debug)]
pub enum AppError {
    /// Rejected input; never reaches the network.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No Gemini API key configured. Callers should open the settings.
    #[error("Gemini API Key is not set. Please add it in the settings.")]
    MissingCredential,

    /// The Gemini service rejected the configured API key.
    #[error("Your Gemini API key is not valid. Please check it in the settings.")]
    InvalidCredential,

    /// Non-success HTTP status or transport failure.
    #[error("Failed to {context}: {message}")]
    Network {
        /// What the request was doing, e.g. `enhance prompt`.
        context: &'static str,
        /// HTTP status code, when the server answered at all.
        status: Option<u16>,
        /// Server body or transport error text.
        message: String,
    },

    /// The service answered successfully but returned nothing usable.
    #[error(
        "The model did not return a prompt. The image might be unsupported or the content policy was triggered."
    )]
    EmptyResult,

    /// Image decoding or encoding failed.
    #[error("Image processing failed: {0}")]
    ImageProcessing(String),

    /// Configuration-related errors (invalid base URLs and similar).
    #[error("Configuration error: {0}")]
    Config(String),

    /// UI-related errors (window creation, runtime startup).
    #[error("UI error: {0}")]
    Ui(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Creates a network error for a response with a non-success status.
    pub fn status(context: &'static str, status: u16, message: impl Into<String>) -> Self {
        Self::Network {
            context,
            status: Some(status),
            message: message.into(),
        }
    }

    /// Creates a network error for a request that never got a response.
    pub fn transport(context: &'static str, message: impl Into<String>) -> Self {
        Self::Network {
            context,
            status: None,
            message: message.into(),
        }
    }

    /// Creates an image processing error with the given message.
    pub fn image(msg: impl Into<String>) -> Self {
        Self::ImageProcessing(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a UI error with the given message.
    pub fn ui(msg: impl Into<String>) -> Self {
        Self::Ui(msg.into())
    }

    /// HTTP status carried by a [`AppError::Network`] error.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Network { status, .. } => *status,
            _ => None,
        }
    }
}

/// A convenient alias for Result with [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages_are_user_facing() {
        let err: AppError = ValidationError::FileTooLarge { size: 5_000_000 }.into();
        assert_eq!(err.to_string(), "Image size cannot exceed 4MB.");
        assert_eq!(
            AppError::from(ValidationError::EmptyPrompt).to_string(),
            "Please enter a prompt to generate an image."
        );
    }

    #[test]
    fn test_network_error_carries_status_and_context() {
        let err = AppError::status("enhance prompt", 503, "unavailable");
        assert_eq!(err.http_status(), Some(503));
        assert_eq!(err.to_string(), "Failed to enhance prompt: unavailable");
        assert_eq!(AppError::transport("load image", "reset").http_status(), None);
    }
}
