use std::path::PathBuf;

use crate::audio::error::AudioError;

/// Everything that flows over the app channel. Background tasks never touch
/// the controller directly; they send one of these instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    // Events
    Media(MediaEvent),
    PlayResolved {
        generation: u64,
        result: Result<(), AudioError>,
    },
    RestoreSeek {
        generation: u64,
        position: f64,
    },
    DownloadFinished(Result<PathBuf, String>),

    // Commands
    TogglePlay,
    Next,
    Previous,
    Play(usize),
    /// Slider position, 0–100.
    SetProgress(f64),
    /// Relative slider move, in percent.
    SeekBy(f64),
    Download(usize),
    Quit,
}

/// Lifecycle notifications from the media resource.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    LoadedMetadata,
    TimeUpdate,
    Ended,
    Error(AudioError),
}
