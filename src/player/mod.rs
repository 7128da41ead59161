//! The playback controller and the seams it talks through.

pub mod controller;
pub mod error;
pub mod format;
pub mod persist;
pub mod view;

pub use controller::{Phase, PlaybackController, PlaybackState};
pub use error::PlayerError;
pub use persist::{FileStateStore, MemoryStateStore, PersistedState, StateStore};
pub use view::{NowPlaying, PlayerView, ProgressDisplay};

#[cfg(test)]
mod tests;
