use crate::{
    config::DisplaySettings,
    player::{NowPlaying, PlayerView, ProgressDisplay},
    playlist::Track,
};

const MAX_ERRORS: usize = 3;

/// One row of the rendered playlist.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistEntry {
    pub title: String,
    pub artist: String,
    pub is_new: bool,
}

/// Render state for the terminal player.
///
/// The controller writes into it through [`PlayerView`]; the draw pass only
/// reads. The cursor is local to the terminal and independent of the track
/// that is currently loaded.
#[derive(Debug)]
pub struct TuiView {
    display: DisplaySettings,
    entries: Vec<PlaylistEntry>,
    now_playing: Option<NowPlaying>,
    progress: ProgressDisplay,
    playing: bool,
    errors: Vec<String>,
    status: Option<String>,
    cursor: usize,
}

impl TuiView {
    pub fn new(display: DisplaySettings) -> Self {
        Self {
            display,
            entries: Vec::new(),
            now_playing: None,
            progress: ProgressDisplay::default(),
            playing: false,
            errors: Vec::new(),
            status: None,
            cursor: 0,
        }
    }

    pub fn entries(&self) -> &[PlaylistEntry] {
        &self.entries
    }

    pub fn now_playing(&self) -> Option<&NowPlaying> {
        self.now_playing.as_ref()
    }

    pub fn progress(&self) -> &ProgressDisplay {
        &self.progress
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Index under the cursor, `None` while the playlist is empty.
    pub fn selected(&self) -> Option<usize> {
        (!self.entries.is_empty()).then_some(self.cursor)
    }

    /// Move the cursor by `delta` rows, stopping at either end.
    pub fn move_cursor(&mut self, delta: isize) {
        if self.entries.is_empty() {
            return;
        }
        let last = self.entries.len() - 1;
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);
    }

    pub fn select(&mut self, index: usize) {
        if index < self.entries.len() {
            self.cursor = index;
        }
    }
}

impl PlayerView for TuiView {
    fn render_playlist(&mut self, tracks: &[Track]) {
        self.entries = tracks
            .iter()
            .map(|track| PlaylistEntry {
                title: track.title_or(&self.display.unknown_title).to_string(),
                artist: track.artist_or(&self.display.unknown_artist).to_string(),
                is_new: track.is_new,
            })
            .collect();
        self.cursor = self.cursor.min(self.entries.len().saturating_sub(1));
    }

    fn set_now_playing(&mut self, now_playing: &NowPlaying) {
        self.cursor = now_playing.index;
        self.now_playing = Some(now_playing.clone());
    }

    fn set_progress_display(&mut self, progress: &ProgressDisplay) {
        self.progress = progress.clone();
    }

    fn set_playing_icon(&mut self, playing: bool) {
        self.playing = playing;
    }

    fn show_error(&mut self, message: &str) {
        if self.errors.len() == MAX_ERRORS {
            self.errors.remove(0);
        }
        self.errors.push(message.to_string());
    }
}
