//! Text-to-image flow state.
//!
//! ```text
//! Idle --EnhanceRequested--> Enhancing --EnhanceSucceeded/Failed--> Idle
//! Idle --GenerateRequested--> Generating --ImagesReady--> Loading(2)
//!      --ImageLoaded/ImageFailed (per slot)--> Idle once every slot settled
//! ```
//!
//! Every generation gets a fresh token, and a new generation may start while
//! the previous one is still loading. Events carrying an older token are
//! dropped, so loads from a superseded generation cannot touch the state.

use crate::error::ValidationError;

/// Shown once when any image of a generation fails to load.
pub const IMAGE_LOAD_FAILED: &str =
    "Failed to load an image. One of the models might be offline or the prompt was refused.";

pub const DEFAULT_PROMPT: &str =
    "A majestic lion in a futuristic city, cinematic lighting, ultra detailed";
pub const DEFAULT_MODEL: &str = "flux";

/// Number of candidate images per generation.
pub const IMAGES_PER_GENERATION: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AspectRatio {
    pub label: &'static str,
    pub width: u32,
    pub height: u32,
}

pub const ASPECT_RATIOS: &[AspectRatio] = &[
    AspectRatio {
        label: "Square (1:1)",
        width: 1024,
        height: 1024,
    },
    AspectRatio {
        label: "Portrait (2:3)",
        width: 683,
        height: 1024,
    },
    AspectRatio {
        label: "Landscape (3:2)",
        width: 1024,
        height: 683,
    },
    AspectRatio {
        label: "Widescreen (16:9)",
        width: 1024,
        height: 576,
    },
    AspectRatio {
        label: "Tall (9:16)",
        width: 576,
        height: 1024,
    },
];

impl AspectRatio {
    pub fn by_label(label: &str) -> Option<AspectRatio> {
        ASPECT_RATIOS.iter().find(|a| a.label == label).copied()
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        ASPECT_RATIOS[0]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Loaded,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedImage {
    pub url: String,
    pub status: LoadStatus,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextToImageState {
    pub prompt: String,
    pub enhanced_prompt: String,
    pub use_enhanced: bool,
    pub aspect_ratio: AspectRatio,
    pub model: String,
    /// Empty, or one entry per candidate of the current generation.
    pub images: Vec<GeneratedImage>,
    pub is_generating: bool,
    pub is_enhancing: bool,
    pub error: Option<String>,
    generation: u64,
}

impl Default for TextToImageState {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            enhanced_prompt: String::new(),
            use_enhanced: false,
            aspect_ratio: AspectRatio::default(),
            model: DEFAULT_MODEL.to_string(),
            images: Vec::new(),
            is_generating: false,
            is_enhancing: false,
            error: None,
            generation: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextToImageEvent {
    PromptEdited(String),
    EnhancedPromptEdited(String),
    UseEnhancedToggled(bool),
    AspectRatioSelected(AspectRatio),
    ModelSelected(String),
    EnhanceRequested,
    EnhanceSucceeded(String),
    EnhanceFailed(String),
    GenerateRequested,
    ImagesReady { token: u64, urls: Vec<String> },
    ImageLoaded { token: u64, index: usize },
    ImageFailed { token: u64, index: usize },
    ErrorDismissed,
}

/// Side effects the caller has to perform after a transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextToImageCommand {
    /// Call the enhancement endpoint with `prompt`.
    Enhance { prompt: String },
    /// Build [`IMAGES_PER_GENERATION`] URLs and report them with `ImagesReady`.
    GenerateImages {
        token: u64,
        prompt: String,
        model: String,
        width: u32,
        height: u32,
    },
}

impl TextToImageState {
    /// The prompt a generation would use right now.
    pub fn final_prompt(&self) -> &str {
        if self.use_enhanced && !self.enhanced_prompt.is_empty() {
            &self.enhanced_prompt
        } else {
            &self.prompt
        }
    }

    /// Token of the most recent generation (0 before the first one).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn reduce(mut self, event: TextToImageEvent) -> (Self, Option<TextToImageCommand>) {
        use TextToImageEvent::*;

        let command = match event {
            PromptEdited(prompt) => {
                self.prompt = prompt;
                None
            }
            EnhancedPromptEdited(text) => {
                self.enhanced_prompt = text;
                None
            }
            UseEnhancedToggled(on) => {
                self.use_enhanced = on;
                None
            }
            AspectRatioSelected(aspect) => {
                self.aspect_ratio = aspect;
                None
            }
            ModelSelected(model) => {
                self.model = model;
                None
            }
            EnhanceRequested => {
                if self.is_enhancing {
                    None
                } else if self.prompt.trim().is_empty() {
                    self.error = Some(ValidationError::EmptyEnhancePrompt.to_string());
                    None
                } else {
                    self.is_enhancing = true;
                    self.error = None;
                    Some(TextToImageCommand::Enhance {
                        prompt: self.prompt.clone(),
                    })
                }
            }
            EnhanceSucceeded(text) => {
                self.enhanced_prompt = text;
                self.use_enhanced = true;
                self.is_enhancing = false;
                None
            }
            EnhanceFailed(message) => {
                self.error = Some(message);
                self.is_enhancing = false;
                None
            }
            GenerateRequested => {
                if self.final_prompt().trim().is_empty() {
                    self.error = Some(ValidationError::EmptyPrompt.to_string());
                    None
                } else {
                    self.generation += 1;
                    self.is_generating = true;
                    self.error = None;
                    self.images.clear();
                    tracing::debug!("Starting generation {}", self.generation);
                    Some(TextToImageCommand::GenerateImages {
                        token: self.generation,
                        prompt: self.final_prompt().to_string(),
                        model: self.model.clone(),
                        width: self.aspect_ratio.width,
                        height: self.aspect_ratio.height,
                    })
                }
            }
            ImagesReady { token, urls } => {
                if token == self.generation && self.is_generating {
                    self.images = urls
                        .into_iter()
                        .map(|url| GeneratedImage {
                            url,
                            status: LoadStatus::Loading,
                        })
                        .collect();
                    if self.images.is_empty() {
                        self.is_generating = false;
                    }
                } else {
                    tracing::debug!("Dropping URLs of stale generation {}", token);
                }
                None
            }
            ImageLoaded { token, index } => {
                self.settle(token, index, LoadStatus::Loaded);
                None
            }
            ImageFailed { token, index } => {
                self.settle(token, index, LoadStatus::Failed);
                None
            }
            ErrorDismissed => {
                self.error = None;
                None
            }
        };

        (self, command)
    }

    fn settle(&mut self, token: u64, index: usize, status: LoadStatus) {
        if token != self.generation {
            tracing::debug!("Ignoring load result of stale generation {}", token);
            return;
        }
        let Some(image) = self.images.get_mut(index) else {
            return;
        };
        if image.status != LoadStatus::Loading {
            return;
        }

        image.status = status;
        if status == LoadStatus::Failed {
            self.error = Some(IMAGE_LOAD_FAILED.to_string());
        }
        if self.images.iter().all(|i| i.status != LoadStatus::Loading) {
            self.is_generating = false;
            tracing::debug!("Generation {} settled", self.generation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn generate(state: TextToImageState) -> (TextToImageState, u64) {
        let (state, command) = state.reduce(TextToImageEvent::GenerateRequested);
        match command {
            Some(TextToImageCommand::GenerateImages { token, .. }) => (state, token),
            other => panic!("expected GenerateImages, got {:?}", other),
        }
    }

    fn ready(state: TextToImageState, token: u64) -> TextToImageState {
        state
            .reduce(TextToImageEvent::ImagesReady {
                token,
                urls: vec!["u1".to_string(), "u2".to_string()],
            })
            .0
    }

    #[test]
    fn test_enhance_requires_prompt() {
        let state = TextToImageState {
            prompt: "   ".to_string(),
            ..Default::default()
        };
        let (state, command) = state.reduce(TextToImageEvent::EnhanceRequested);
        assert_eq!(command, None);
        assert!(!state.is_enhancing);
        assert_eq!(state.error.as_deref(), Some("Please enter a prompt to enhance."));
    }

    #[test]
    fn test_enhance_success_enables_enhanced_prompt() {
        let state = TextToImageState {
            prompt: "a cat".to_string(),
            error: Some("old".to_string()),
            ..Default::default()
        };
        let (state, command) = state.reduce(TextToImageEvent::EnhanceRequested);
        assert_eq!(
            command,
            Some(TextToImageCommand::Enhance {
                prompt: "a cat".to_string()
            })
        );
        assert!(state.is_enhancing);
        assert_eq!(state.error, None);

        let (state, _) = state.reduce(TextToImageEvent::EnhanceSucceeded(
            "A whimsical cat lounging...".to_string(),
        ));
        assert!(!state.is_enhancing);
        assert!(state.use_enhanced);
        assert_eq!(state.final_prompt(), "A whimsical cat lounging...");
    }

    #[test]
    fn test_enhance_failure_clears_flag() {
        let state = TextToImageState::default();
        let (state, _) = state.reduce(TextToImageEvent::EnhanceRequested);
        let (state, _) = state.reduce(TextToImageEvent::EnhanceFailed("boom".to_string()));
        assert!(!state.is_enhancing);
        assert_eq!(state.error.as_deref(), Some("boom"));
        assert!(!state.use_enhanced);
    }

    #[test]
    fn test_enhanced_prompt_only_used_when_enabled_and_non_empty() {
        let mut state = TextToImageState {
            prompt: "plain".to_string(),
            enhanced_prompt: "fancy".to_string(),
            ..Default::default()
        };
        assert_eq!(state.final_prompt(), "plain");
        state.use_enhanced = true;
        assert_eq!(state.final_prompt(), "fancy");
        state.enhanced_prompt.clear();
        assert_eq!(state.final_prompt(), "plain");
    }

    #[test]
    fn test_generate_requires_prompt() {
        let state = TextToImageState {
            prompt: String::new(),
            ..Default::default()
        };
        let (state, command) = state.reduce(TextToImageEvent::GenerateRequested);
        assert_eq!(command, None);
        assert!(!state.is_generating);
        assert_eq!(state.generation(), 0);
        assert_eq!(
            state.error.as_deref(),
            Some("Please enter a prompt to generate an image.")
        );
    }

    #[test]
    fn test_generate_uses_aspect_and_model() {
        let state = TextToImageState {
            prompt: "dragon".to_string(),
            aspect_ratio: AspectRatio::by_label("Widescreen (16:9)").unwrap(),
            model: "turbo".to_string(),
            ..Default::default()
        };
        let (state, command) = state.reduce(TextToImageEvent::GenerateRequested);
        assert_eq!(
            command,
            Some(TextToImageCommand::GenerateImages {
                token: 1,
                prompt: "dragon".to_string(),
                model: "turbo".to_string(),
                width: 1024,
                height: 576,
            })
        );
        assert!(state.is_generating);
    }

    #[test]
    fn test_new_generation_clears_images() {
        let (state, token) = generate(TextToImageState::default());
        let state = ready(state, token);
        let (state, _) = state.reduce(TextToImageEvent::ImageLoaded { token, index: 0 });
        let (state, _) = state.reduce(TextToImageEvent::ImageLoaded { token, index: 1 });
        assert!(!state.is_generating);
        assert_eq!(state.images.len(), 2);

        let (state, next) = generate(state);
        assert_eq!(next, token + 1);
        assert!(state.images.is_empty());
        assert!(state.is_generating);
    }

    #[test]
    fn test_generating_clears_only_after_both_settle() {
        let (state, token) = generate(TextToImageState::default());
        let state = ready(state, token);

        let (state, _) = state.reduce(TextToImageEvent::ImageLoaded { token, index: 1 });
        assert!(state.is_generating);
        let (state, _) = state.reduce(TextToImageEvent::ImageFailed { token, index: 0 });
        assert!(!state.is_generating);
        assert_eq!(state.images[0].status, LoadStatus::Failed);
        assert_eq!(state.images[1].status, LoadStatus::Loaded);
        assert_eq!(state.error.as_deref(), Some(IMAGE_LOAD_FAILED));
    }

    #[test]
    fn test_both_failures_settle_once() {
        let (state, token) = generate(TextToImageState::default());
        let state = ready(state, token);

        let (state, _) = state.reduce(TextToImageEvent::ImageFailed { token, index: 0 });
        let (state, _) = state.reduce(TextToImageEvent::ImageFailed { token, index: 1 });
        assert!(!state.is_generating);
        assert_eq!(state.error.as_deref(), Some(IMAGE_LOAD_FAILED));

        // A repeated callback for a settled slot changes nothing
        let before = state.clone();
        let (state, _) = state.reduce(TextToImageEvent::ImageFailed { token, index: 1 });
        assert_eq!(state, before);
    }

    #[test]
    fn test_stale_generation_events_are_ignored() {
        let (state, old) = generate(TextToImageState::default());
        let state = ready(state, old);
        let (state, _) = state.reduce(TextToImageEvent::ImageLoaded { token: old, index: 0 });

        // Second generation supersedes the first while it is still loading
        let (state, current) = generate(state);
        let (state, _) = state.reduce(TextToImageEvent::ImagesReady {
            token: old,
            urls: vec!["stale".to_string()],
        });
        assert!(state.images.is_empty());

        let state = ready(state, current);
        let (state, _) = state.reduce(TextToImageEvent::ImageFailed { token: old, index: 1 });
        assert!(state.is_generating);
        assert_eq!(state.error, None);
        assert!(state.images.iter().all(|i| i.status == LoadStatus::Loading));
    }

    #[test]
    fn test_out_of_range_index_is_ignored() {
        let (state, token) = generate(TextToImageState::default());
        let state = ready(state, token);
        let (state, _) = state.reduce(TextToImageEvent::ImageLoaded { token, index: 7 });
        assert!(state.is_generating);
    }

    #[test]
    fn test_error_dismissed() {
        let state = TextToImageState {
            error: Some("x".to_string()),
            ..Default::default()
        };
        let (state, _) = state.reduce(TextToImageEvent::ErrorDismissed);
        assert_eq!(state.error, None);
    }
}
