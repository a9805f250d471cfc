//! Image-to-prompt flow state.
//!
//! `Idle --FileSelected--> Ready --GenerateRequested--> Loading --DescribeSucceeded/Failed--> Ready`
//!
//! Drag-and-drop and the file picker both enter through `FileSelected`, or
//! `FileRejected` when the file could not be read or validated.

use crate::error::{AppError, MAX_UPLOAD_BYTES, ValidationError};
use crate::image_processing::ImageUpload;

pub const CLIPBOARD_FAILED: &str = "Could not copy text to clipboard.";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImageToPromptState {
    pub image: Option<ImageUpload>,
    /// `data:` URL of the selected image.
    pub preview: Option<String>,
    pub generated_prompt: String,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ImageToPromptEvent {
    FileSelected(ImageUpload),
    /// A file could not be accepted; carries the user-facing reason.
    FileRejected(String),
    GenerateRequested { has_credential: bool },
    DescribeSucceeded(String),
    DescribeFailed(String),
    ClipboardFailed,
    ErrorDismissed,
}

/// Side effects the caller has to perform after a transition.
#[derive(Clone, Debug, PartialEq)]
pub enum ImageToPromptCommand {
    /// Send the image to the vision service.
    Describe { image: ImageUpload },
    /// Ask the user for a credential.
    OpenSettings,
}

impl ImageToPromptState {
    pub fn reduce(mut self, event: ImageToPromptEvent) -> (Self, Option<ImageToPromptCommand>) {
        use ImageToPromptEvent::*;

        let command = match event {
            FileSelected(image) => {
                if image.size() > MAX_UPLOAD_BYTES {
                    self.error = Some(
                        ValidationError::FileTooLarge { size: image.size() }.to_string(),
                    );
                } else {
                    tracing::debug!("Accepted {} ({} bytes)", image.file_name(), image.size());
                    self.preview = Some(image.data_url());
                    self.image = Some(image);
                    self.generated_prompt.clear();
                    self.error = None;
                }
                None
            }
            FileRejected(reason) => {
                self.error = Some(reason);
                None
            }
            GenerateRequested { has_credential } => {
                if self.is_loading {
                    None
                } else if self.image.is_none() {
                    self.error = Some(ValidationError::NoImageSelected.to_string());
                    None
                } else if !has_credential {
                    self.error = Some(AppError::MissingCredential.to_string());
                    Some(ImageToPromptCommand::OpenSettings)
                } else {
                    self.is_loading = true;
                    self.error = None;
                    self.generated_prompt.clear();
                    self.image
                        .clone()
                        .map(|image| ImageToPromptCommand::Describe { image })
                }
            }
            DescribeSucceeded(prompt) => {
                self.generated_prompt = prompt;
                self.is_loading = false;
                None
            }
            DescribeFailed(message) => {
                self.error = Some(message);
                self.is_loading = false;
                None
            }
            ClipboardFailed => {
                self.error = Some(CLIPBOARD_FAILED.to_string());
                None
            }
            ErrorDismissed => {
                self.error = None;
                None
            }
        };

        (self, command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    fn png(name: &str, len: usize) -> ImageUpload {
        let mut bytes = PNG_MAGIC.to_vec();
        bytes.resize(len.max(PNG_MAGIC.len()), 0);
        ImageUpload::from_bytes(name, bytes).unwrap()
    }

    fn selected() -> ImageToPromptState {
        ImageToPromptState::default()
            .reduce(ImageToPromptEvent::FileSelected(png("a.png", 16)))
            .0
    }

    #[test]
    fn test_selecting_clears_previous_result_and_error() {
        let state = ImageToPromptState {
            generated_prompt: "old prompt".to_string(),
            error: Some("old error".to_string()),
            ..Default::default()
        };
        let (state, command) = state.reduce(ImageToPromptEvent::FileSelected(png("b.png", 8)));
        assert_eq!(command, None);
        assert_eq!(state.generated_prompt, "");
        assert_eq!(state.error, None);
        assert_eq!(state.image.as_ref().map(|i| i.file_name()), Some("b.png"));
        assert_eq!(
            state.preview.as_deref(),
            Some("data:image/png;base64,iVBORw0KGgo=")
        );
    }

    #[test]
    fn test_oversize_file_only_sets_error() {
        let before = ImageToPromptState {
            generated_prompt: "keep me".to_string(),
            ..selected()
        };
        let mut bytes = PNG_MAGIC.to_vec();
        bytes.resize(MAX_UPLOAD_BYTES as usize + 1, 0);
        let oversize = ImageUpload::unchecked("huge.png", "image/png", bytes);

        let (after, command) = before
            .clone()
            .reduce(ImageToPromptEvent::FileSelected(oversize));
        assert_eq!(command, None);
        assert_eq!(after.error.as_deref(), Some("Image size cannot exceed 4MB."));
        assert_eq!(
            ImageToPromptState {
                error: None,
                ..after
            },
            before
        );
    }

    #[test]
    fn test_exactly_four_mib_is_accepted() {
        let (state, _) = ImageToPromptState::default().reduce(ImageToPromptEvent::FileSelected(
            png("edge.png", MAX_UPLOAD_BYTES as usize),
        ));
        assert!(state.image.is_some());
        assert_eq!(state.error, None);
    }

    #[test]
    fn test_generate_without_image() {
        let (state, command) = ImageToPromptState::default()
            .reduce(ImageToPromptEvent::GenerateRequested { has_credential: true });
        assert_eq!(command, None);
        assert_eq!(state.error.as_deref(), Some("Please upload an image first."));
        assert!(!state.is_loading);
    }

    #[test]
    fn test_generate_without_credential_opens_settings() {
        let (state, command) =
            selected().reduce(ImageToPromptEvent::GenerateRequested { has_credential: false });
        assert_eq!(command, Some(ImageToPromptCommand::OpenSettings));
        assert!(!state.is_loading);
        assert_eq!(
            state.error.as_deref(),
            Some("Gemini API Key is not set. Please add it in the settings.")
        );
    }

    #[test]
    fn test_generate_and_succeed() {
        let state = ImageToPromptState {
            generated_prompt: "previous".to_string(),
            ..selected()
        };
        let (state, command) =
            state.reduce(ImageToPromptEvent::GenerateRequested { has_credential: true });
        assert!(matches!(command, Some(ImageToPromptCommand::Describe { .. })));
        assert!(state.is_loading);
        assert_eq!(state.generated_prompt, "");

        // Re-entry while loading is ignored
        let (state, again) =
            state.reduce(ImageToPromptEvent::GenerateRequested { has_credential: true });
        assert_eq!(again, None);

        let (state, _) =
            state.reduce(ImageToPromptEvent::DescribeSucceeded("A lion at dusk".to_string()));
        assert!(!state.is_loading);
        assert_eq!(state.generated_prompt, "A lion at dusk");
    }

    #[test]
    fn test_describe_failure() {
        let (state, _) =
            selected().reduce(ImageToPromptEvent::GenerateRequested { has_credential: true });
        let (state, _) = state.reduce(ImageToPromptEvent::DescribeFailed(
            "Your Gemini API key is not valid. Please check it in the settings.".to_string(),
        ));
        assert!(!state.is_loading);
        assert!(state.error.unwrap().contains("not valid"));
    }

    #[test]
    fn test_rejected_file_and_clipboard_errors() {
        let (state, _) = selected().reduce(ImageToPromptEvent::FileRejected("nope".to_string()));
        assert_eq!(state.error.as_deref(), Some("nope"));
        assert!(state.image.is_some());

        let (state, _) = state.reduce(ImageToPromptEvent::ClipboardFailed);
        assert_eq!(state.error.as_deref(), Some(CLIPBOARD_FAILED));

        let (state, _) = state.reduce(ImageToPromptEvent::ErrorDismissed);
        assert_eq!(state.error, None);
    }
}
