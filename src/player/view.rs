use crate::{config::DisplaySettings, playlist::Track};

/// What the controller pushes to whatever draws the player.
pub trait PlayerView {
    fn render_playlist(&mut self, tracks: &[Track]);
    fn set_now_playing(&mut self, now_playing: &NowPlaying);
    fn set_progress_display(&mut self, progress: &ProgressDisplay);
    fn set_playing_icon(&mut self, playing: bool);
    fn show_error(&mut self, message: &str);
}

/// Metadata for the loaded track with the display defaults already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct NowPlaying {
    pub index: usize,
    pub title: String,
    pub artist: String,
    pub cover: String,
}

impl NowPlaying {
    pub fn for_track(index: usize, track: &Track, display: &DisplaySettings) -> Self {
        Self {
            index,
            title: track.title_or(&display.unknown_title).to_string(),
            artist: track.artist_or(&display.unknown_artist).to_string(),
            cover: track.cover_or(&display.default_cover).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressDisplay {
    pub current: String,
    pub total: String,
    /// Slider position, 0–100.
    pub percent: f64,
}

impl Default for ProgressDisplay {
    fn default() -> Self {
        Self {
            current: "0:00".to_string(),
            total: "0:00".to_string(),
            percent: 0.0,
        }
    }
}
