use std::time::Duration;

use flume::Sender;
use tracing::{debug, error, info, warn};

use crate::{
    audio::{AudioError, MediaResource},
    config::{DisplaySettings, PlaybackSettings, Settings},
    event::{Event, MediaEvent},
    player::{
        error::PlayerError,
        format::format_time,
        persist::{PersistedState, StateStore},
        view::{NowPlaying, PlayerView, ProgressDisplay},
    },
    playlist::{PlaylistSource, Track},
    util::task::TaskManager,
};

const PLAY_TASK: &str = "play";
const RESTORE_TASK: &str = "restore";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Loading,
    Ready,
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlaybackState {
    pub current_index: usize,
    pub is_playing: bool,
    /// Seconds.
    pub current_position: f64,
}

/// Binds one playlist to one media resource and one view.
///
/// All mutation happens through `&mut self` on the app's event loop.
/// Asynchronous work (play requests, the delayed restore seek) runs on
/// spawned tasks that report back through the event channel; results are
/// tagged with the generation of the track they were issued for and are
/// dropped if another track has been loaded since.
pub struct PlaybackController<M, V, S> {
    media: M,
    view: V,
    store: S,
    source: Box<dyn PlaylistSource>,
    playback: PlaybackSettings,
    display: DisplaySettings,
    events: Sender<Event>,

    tracks: Vec<Track>,
    state: PlaybackState,
    progress: ProgressDisplay,
    phase: Phase,
    generation: u64,
    consecutive_errors: usize,
    tasks: TaskManager,
}

impl<M, V, S> PlaybackController<M, V, S>
where
    M: MediaResource,
    V: PlayerView,
    S: StateStore,
{
    pub fn new(
        mut media: M,
        view: V,
        store: S,
        source: Box<dyn PlaylistSource>,
        settings: &Settings,
        events: Sender<Event>,
    ) -> Self {
        media.subscribe(events.clone());

        Self {
            media,
            view,
            store,
            source,
            playback: settings.playback.clone(),
            display: settings.display.clone(),
            events,
            tracks: Vec::new(),
            state: PlaybackState::default(),
            progress: ProgressDisplay::default(),
            phase: Phase::Uninitialized,
            generation: 0,
            consecutive_errors: 0,
            tasks: TaskManager::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Fetch the playlist, render it and load the first (or restored) track.
    pub async fn initialize(&mut self) -> Result<(), PlayerError> {
        self.phase = Phase::Loading;

        let tracks = match self.fetch_tracks().await {
            Ok(tracks) => tracks,
            Err(e) => {
                self.phase = Phase::Failed;
                error!(location = %self.source.location(), "player initialization failed: {e}");
                self.report_error(&format!("Could not load the playlist: {e}"));
                return Err(e);
            }
        };

        self.tracks = tracks;
        self.view.render_playlist(&self.tracks);
        self.phase = Phase::Ready;
        self.restore_playback_state();
        Ok(())
    }

    async fn fetch_tracks(&self) -> Result<Vec<Track>, PlayerError> {
        let document = self.source.fetch().await?;
        let mut tracks = document.into_tracks();
        for track in &mut tracks {
            track.url = self.source.resolve(&track.url);
        }

        if tracks.is_empty() {
            return Err(PlayerError::EmptyPlaylist);
        }
        info!(
            count = tracks.len(),
            location = %self.source.location(),
            "playlist loaded"
        );
        Ok(tracks)
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Media(MediaEvent::TimeUpdate) => {
                self.update_progress();
                self.save_playback_state();
            }
            Event::Media(MediaEvent::LoadedMetadata) => {
                self.consecutive_errors = 0;
                self.update_total_time();
            }
            Event::Media(MediaEvent::Ended) => self.on_track_ended(),
            Event::Media(MediaEvent::Error(e)) => self.handle_resource_error(&e),
            Event::PlayResolved { generation, result } => self.on_play_resolved(generation, result),
            Event::RestoreSeek {
                generation,
                position,
            } => self.apply_restored_position(generation, position),
            Event::TogglePlay => self.toggle_play(),
            Event::Next => self.next_track(),
            Event::Previous => self.previous_track(),
            Event::Play(index) => self.play_specific_track(index),
            Event::SetProgress(value) => self.set_progress(value),
            Event::SeekBy(delta) => self.seek_by(delta),
            Event::Download(_) | Event::DownloadFinished(_) | Event::Quit => {}
        }
    }

    /// Point the resource at track `index` and reset the display for it.
    /// Returns `false` (and does nothing) when the index is out of range.
    pub fn load_track(&mut self, index: usize) -> bool {
        let Some(track) = self.tracks.get(index) else {
            error!(index, len = self.tracks.len(), "invalid track index");
            return false;
        };

        self.generation += 1;
        self.tasks.abort(PLAY_TASK);
        self.tasks.abort(RESTORE_TASK);

        debug!(index, url = track.url.as_str(), "loading track");
        self.media.load(&track.url);
        self.state = PlaybackState {
            current_index: index,
            is_playing: false,
            current_position: 0.0,
        };

        self.view
            .set_now_playing(&NowPlaying::for_track(index, track, &self.display));
        self.progress = ProgressDisplay::default();
        self.view.set_progress_display(&self.progress);
        self.view.set_playing_icon(false);
        true
    }

    pub fn toggle_play(&mut self) {
        if self.phase != Phase::Ready {
            debug!(phase = ?self.phase, "toggle ignored before the playlist is ready");
            return;
        }

        if self.media.is_paused() {
            self.start_playback();
        } else {
            self.tasks.abort(PLAY_TASK);
            self.media.pause();
            self.state.is_playing = false;
            self.view.set_playing_icon(false);
        }
    }

    pub fn next_track(&mut self) {
        if !self.can_navigate() {
            return;
        }
        let len = self.tracks.len();
        self.advance_to((self.state.current_index + 1) % len);
    }

    pub fn previous_track(&mut self) {
        if !self.can_navigate() {
            return;
        }
        let len = self.tracks.len();
        self.advance_to((self.state.current_index + len - 1) % len);
    }

    pub fn play_specific_track(&mut self, index: usize) {
        if self.phase != Phase::Ready || self.tracks.is_empty() {
            debug!(index, "track jump ignored before the playlist is ready");
            return;
        }
        self.advance_to(index);
    }

    pub fn update_progress(&mut self) {
        let Some(duration) = self.known_duration() else {
            return;
        };
        let current = self.media.current_time();
        if !current.is_finite() {
            return;
        }

        self.state.current_position = current;
        self.progress.current = format_time(current);
        self.progress.percent = (current / duration * 100.0).clamp(0.0, 100.0);
        self.view.set_progress_display(&self.progress);
    }

    pub fn update_total_time(&mut self) {
        let Some(duration) = self.known_duration() else {
            return;
        };
        self.progress.total = format_time(duration);
        self.view.set_progress_display(&self.progress);
    }

    /// Seek to `value` percent of the current track.
    pub fn set_progress(&mut self, value: f64) {
        let Some(duration) = self.known_duration() else {
            debug!(value, "seek ignored, duration unknown");
            return;
        };

        let target = value.clamp(0.0, 100.0) / 100.0 * duration;
        if !target.is_finite() {
            warn!(value, "non-finite seek target");
            return;
        }

        match self.media.seek(target) {
            Ok(()) => {
                self.state.current_position = target;
                self.update_progress();
            }
            Err(e) => warn!(target, "seek failed: {e}"),
        }
    }

    fn seek_by(&mut self, delta_percent: f64) {
        let Some(duration) = self.known_duration() else {
            return;
        };
        let current = self.media.current_time() / duration * 100.0;
        self.set_progress(current + delta_percent);
    }

    /// Skip a track the resource could not play.
    pub fn handle_resource_error(&mut self, error: &AudioError) {
        error!(index = self.state.current_index, "media error: {error}");
        self.state.is_playing = false;
        self.view.set_playing_icon(false);
        self.report_error("Could not play audio");

        if self.phase != Phase::Ready || self.tracks.is_empty() {
            return;
        }

        self.consecutive_errors += 1;
        if self.consecutive_errors > self.tracks.len() {
            error!(
                failures = self.consecutive_errors,
                "every track failed in a row, not skipping further"
            );
            return;
        }

        let next = (self.state.current_index + 1) % self.tracks.len();
        self.advance_to(next);
    }

    /// Snapshot the current track and position. Does nothing unless a
    /// playlist is loaded, so a failed start keeps the previous session.
    pub fn save_playback_state(&mut self) {
        if self.phase != Phase::Ready {
            debug!(phase = ?self.phase, "not saving playback state");
            return;
        }
        let position = self.media.current_time();
        if !position.is_finite() {
            return;
        }

        self.state.current_position = position;
        let snapshot = PersistedState::new(self.state.current_index, position);
        if let Err(e) = self.store.save(&snapshot) {
            warn!("failed to save playback state: {e}");
        }
    }

    /// Load the saved track (or track 0) and schedule the saved seek.
    pub fn restore_playback_state(&mut self) {
        let saved = self.store.load().unwrap_or_else(|e| {
            warn!("failed to read playback state: {e}");
            PersistedState::default()
        });

        let index = saved
            .track_index
            .and_then(|i| usize::try_from(i).ok())
            .filter(|&i| i < self.tracks.len());

        let Some(index) = index else {
            debug!(saved = ?saved.track_index, "no usable saved track, starting from the top");
            self.load_track(0);
            return;
        };

        info!(index, position = ?saved.position, "restoring playback state");
        self.load_track(index);

        if let Some(position) = saved.position.filter(|p| p.is_finite() && *p >= 0.0) {
            let generation = self.generation;
            let events = self.events.clone();
            let delay = Duration::from_millis(self.playback.restore_delay_ms);
            self.tasks.spawn(RESTORE_TASK, async move {
                tokio::time::sleep(delay).await;
                let _ = events.send(Event::RestoreSeek {
                    generation,
                    position,
                });
            });
        }
    }

    fn apply_restored_position(&mut self, generation: u64, position: f64) {
        if generation != self.generation {
            debug!(position, "track changed before the saved position was applied");
            return;
        }

        match self.media.seek(position) {
            Ok(()) => {
                self.state.current_position = position;
                self.progress.current = format_time(position);
                self.view.set_progress_display(&self.progress);
                self.update_progress();
            }
            Err(e) => warn!(position, "could not restore position: {e}"),
        }
    }

    fn on_track_ended(&mut self) {
        info!(index = self.state.current_index, "track ended");
        self.state.is_playing = false;
        self.view.set_playing_icon(false);

        if self.phase == Phase::Ready && !self.tracks.is_empty() {
            let next = (self.state.current_index + 1) % self.tracks.len();
            self.advance_to(next);
        }
    }

    fn on_play_resolved(&mut self, generation: u64, result: Result<(), AudioError>) {
        if generation != self.generation {
            debug!(generation, current = self.generation, "stale play result");
            return;
        }

        match result {
            Ok(()) => {
                self.consecutive_errors = 0;
                self.state.is_playing = true;
                self.view.set_playing_icon(true);
            }
            Err(AudioError::Superseded) => {
                debug!("play request superseded");
            }
            Err(e) => {
                error!(index = self.state.current_index, "playback start failed: {e}");
                self.state.is_playing = false;
                self.view.set_playing_icon(false);
                self.report_error("Could not play the track");
            }
        }
    }

    fn can_navigate(&self) -> bool {
        if self.phase != Phase::Ready || self.tracks.is_empty() {
            debug!(phase = ?self.phase, "navigation ignored before the playlist is ready");
            return false;
        }
        if self.playback.advance_only_while_playing && !self.state.is_playing {
            debug!("navigation ignored while paused");
            return false;
        }
        true
    }

    fn advance_to(&mut self, index: usize) {
        if self.load_track(index) {
            self.start_playback();
        }
    }

    fn start_playback(&mut self) {
        let request = self.media.play();
        let generation = self.generation;
        let events = self.events.clone();
        self.tasks.spawn(PLAY_TASK, async move {
            let result = request.await;
            let _ = events.send(Event::PlayResolved { generation, result });
        });
    }

    fn known_duration(&self) -> Option<f64> {
        self.media
            .duration()
            .filter(|d| d.is_finite() && *d > 0.0)
    }

    fn report_error(&mut self, message: &str) {
        if self.display.show_errors {
            self.view.show_error(message);
        }
    }
}
