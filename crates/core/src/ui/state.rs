//! UI-level types: tabs and the results background tasks send back.

use crate::error::Result;
use crate::image_processing::DecodedImage;
use std::collections::HashSet;
use std::path::PathBuf;

/// Top-level view selected in the header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    TextToImage,
    ImageToPrompt,
}

impl Tab {
    pub fn title(self) -> &'static str {
        match self {
            Tab::TextToImage => "Text to Image",
            Tab::ImageToPrompt => "Image to Prompt",
        }
    }
}

/// Results delivered from background tasks to the UI thread.
///
/// Sent through a channel and drained once per frame.
pub(crate) enum TaskEvent {
    /// Enhancement request finished.
    Enhanced(Result<String>),
    /// One candidate image of generation `token` finished loading.
    ImageFetched {
        token: u64,
        index: usize,
        result: Result<DecodedImage>,
    },
    /// Vision description finished.
    Described(Result<String>),
    /// Model catalogue request finished.
    ModelsFetched(Result<Vec<String>>),
    /// Image `index` of generation `token` was saved (or failed to save).
    Downloaded {
        token: u64,
        index: usize,
        result: Result<PathBuf>,
    },
}

/// Slots of the current generation with a download in flight.
///
/// Completions from an older generation are ignored, so they cannot release
/// a slot that a newer generation is downloading.
#[derive(Debug, Default)]
pub(crate) struct Downloads {
    token: u64,
    active: HashSet<usize>,
}

impl Downloads {
    /// Forgets all in-flight slots and tracks generation `token` from now on.
    pub(crate) fn reset(&mut self, token: u64) {
        self.token = token;
        self.active.clear();
    }

    /// Marks `index` busy. Returns `false` if it already was.
    pub(crate) fn start(&mut self, index: usize) -> bool {
        self.active.insert(index)
    }

    pub(crate) fn finish(&mut self, token: u64, index: usize) {
        if token == self.token {
            self.active.remove(&index);
        } else {
            tracing::debug!("Ignoring download of stale generation {}", token);
        }
    }

    pub(crate) fn token(&self) -> u64 {
        self.token
    }

    pub(crate) fn is_busy(&self, index: usize) -> bool {
        self.active.contains(&index)
    }
}
