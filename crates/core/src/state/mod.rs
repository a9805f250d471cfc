//! Flow state machines.
//!
//! Each flow is a plain struct with a `reduce(self, event)` method that
//! returns the next state and, when the transition needs one, a command
//! describing the side effect to run. Nothing in here touches the network or
//! the UI.

pub mod image_to_prompt;
pub mod text_to_image;

pub use image_to_prompt::{ImageToPromptCommand, ImageToPromptEvent, ImageToPromptState};
pub use text_to_image::{
    ASPECT_RATIOS, AspectRatio, GeneratedImage, LoadStatus, TextToImageCommand,
    TextToImageEvent, TextToImageState,
};
