use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use flume::{Receiver, Sender};
use futures::FutureExt;

use super::*;
use crate::{
    audio::{AudioError, MediaResource, PlayFuture},
    config::Settings,
    event::{Event, MediaEvent},
    playlist::{PlaylistDocument, PlaylistError, PlaylistSource, Track, TrackEntry},
};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Load(String),
    Play,
    Pause,
    Seek(f64),
}

struct MediaState {
    calls: Vec<Call>,
    paused: bool,
    duration: Option<f64>,
    position: f64,
    play_result: Result<(), AudioError>,
    subscribed: bool,
}

/// Scriptable media resource; the test keeps a handle to its state.
#[derive(Clone)]
struct FakeMedia(Arc<Mutex<MediaState>>);

impl FakeMedia {
    fn new() -> Self {
        Self(Arc::new(Mutex::new(MediaState {
            calls: Vec::new(),
            paused: true,
            duration: None,
            position: 0.0,
            play_result: Ok(()),
            subscribed: false,
        })))
    }

    fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().calls.clone()
    }

    fn loads(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Load(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    fn seeks(&self) -> Vec<f64> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Seek(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    fn clear_calls(&self) {
        self.0.lock().unwrap().calls.clear();
    }

    fn set_duration(&self, duration: Option<f64>) {
        self.0.lock().unwrap().duration = duration;
    }

    fn set_position(&self, position: f64) {
        self.0.lock().unwrap().position = position;
    }

    fn fail_next_play(&self, error: AudioError) {
        self.0.lock().unwrap().play_result = Err(error);
    }
}

impl MediaResource for FakeMedia {
    fn subscribe(&mut self, _listener: Sender<Event>) {
        self.0.lock().unwrap().subscribed = true;
    }

    fn load(&mut self, url: &str) {
        let mut state = self.0.lock().unwrap();
        state.calls.push(Call::Load(url.to_string()));
        state.paused = true;
        state.position = 0.0;
    }

    fn play(&mut self) -> PlayFuture {
        let shared = self.0.clone();
        let result = {
            let mut state = shared.lock().unwrap();
            state.calls.push(Call::Play);
            std::mem::replace(&mut state.play_result, Ok(()))
        };
        async move {
            if result.is_ok() {
                shared.lock().unwrap().paused = false;
            }
            result
        }
        .boxed()
    }

    fn pause(&mut self) {
        let mut state = self.0.lock().unwrap();
        state.calls.push(Call::Pause);
        state.paused = true;
    }

    fn seek(&mut self, seconds: f64) -> Result<(), AudioError> {
        let mut state = self.0.lock().unwrap();
        state.calls.push(Call::Seek(seconds));
        state.position = seconds;
        Ok(())
    }

    fn current_time(&self) -> f64 {
        self.0.lock().unwrap().position
    }

    fn duration(&self) -> Option<f64> {
        self.0.lock().unwrap().duration
    }

    fn is_paused(&self) -> bool {
        self.0.lock().unwrap().paused
    }
}

#[derive(Default)]
struct RecordingView {
    playlist: Vec<Track>,
    now_playing: Option<NowPlaying>,
    progress: ProgressDisplay,
    playing: bool,
    errors: Vec<String>,
}

impl PlayerView for RecordingView {
    fn render_playlist(&mut self, tracks: &[Track]) {
        self.playlist = tracks.to_vec();
    }

    fn set_now_playing(&mut self, now_playing: &NowPlaying) {
        self.now_playing = Some(now_playing.clone());
    }

    fn set_progress_display(&mut self, progress: &ProgressDisplay) {
        self.progress = progress.clone();
    }

    fn set_playing_icon(&mut self, playing: bool) {
        self.playing = playing;
    }

    fn show_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}

struct StaticSource {
    entries: Option<Vec<TrackEntry>>,
}

#[async_trait]
impl PlaylistSource for StaticSource {
    async fn fetch(&self) -> Result<PlaylistDocument, PlaylistError> {
        match &self.entries {
            Some(entries) => Ok(PlaylistDocument {
                tracks: entries.clone(),
            }),
            None => Err(PlaylistError::InvalidLocation("offline".to_string())),
        }
    }

    fn resolve(&self, locator: &str) -> String {
        format!("https://cdn.test/{locator}")
    }

    fn location(&self) -> String {
        "static".to_string()
    }
}

fn entry(url: Option<&str>, title: Option<&str>, artist: Option<&str>) -> TrackEntry {
    TrackEntry {
        url: url.map(str::to_string),
        title: title.map(str::to_string),
        artist: artist.map(str::to_string),
        ..TrackEntry::default()
    }
}

fn three_tracks() -> Vec<TrackEntry> {
    vec![
        entry(Some("one.mp3"), Some("One"), Some("Alpha")),
        entry(Some("two.mp3"), None, None),
        entry(Some("three.mp3"), Some("Three"), Some("Gamma")),
    ]
}

type Controller = PlaybackController<FakeMedia, RecordingView, MemoryStateStore>;

struct Harness {
    controller: Controller,
    media: FakeMedia,
    store: MemoryStateStore,
    rx: Receiver<Event>,
}

fn harness_with(entries: Option<Vec<TrackEntry>>, saved: &str, settings: Settings) -> Harness {
    let (tx, rx) = flume::unbounded();
    let media = FakeMedia::new();
    let store = MemoryStateStore::with_raw(saved);
    let controller = PlaybackController::new(
        media.clone(),
        RecordingView::default(),
        store.clone(),
        Box::new(StaticSource { entries }),
        &settings,
        tx,
    );
    Harness {
        controller,
        media,
        store,
        rx,
    }
}

fn harness(entries: Vec<TrackEntry>) -> Harness {
    harness_with(Some(entries), "", Settings::default())
}

async fn ready(entries: Vec<TrackEntry>) -> Harness {
    let mut h = harness(entries);
    h.controller.initialize().await.unwrap();
    h.media.clear_calls();
    h
}

impl Harness {
    /// Deliver everything background tasks send until the channel goes quiet.
    async fn pump(&mut self) {
        while let Ok(Ok(event)) =
            tokio::time::timeout(Duration::from_millis(10), self.rx.recv_async()).await
        {
            self.controller.handle_event(event);
        }
    }

    fn index(&self) -> usize {
        self.controller.state().current_index
    }
}

#[tokio::test(start_paused = true)]
async fn initialize_renders_and_loads_first_track() {
    let mut h = harness(three_tracks());
    assert!(h.media.0.lock().unwrap().subscribed);
    assert_eq!(h.controller.phase(), Phase::Uninitialized);

    h.controller.initialize().await.unwrap();

    assert_eq!(h.controller.phase(), Phase::Ready);
    assert_eq!(h.controller.view().playlist.len(), 3);
    assert_eq!(h.controller.tracks()[0].url, "https://cdn.test/one.mp3");
    assert_eq!(h.media.loads(), vec!["https://cdn.test/one.mp3"]);
    assert_eq!(h.index(), 0);
}

#[tokio::test(start_paused = true)]
async fn load_track_shows_fields_or_defaults() {
    let mut h = ready(three_tracks()).await;

    assert!(h.controller.load_track(0));
    let shown = h.controller.view().now_playing.clone().unwrap();
    assert_eq!(shown.title, "One");
    assert_eq!(shown.artist, "Alpha");
    assert_eq!(shown.cover, "kraken-logo.svg");

    assert!(h.controller.load_track(1));
    let shown = h.controller.view().now_playing.clone().unwrap();
    assert_eq!(shown.index, 1);
    assert_eq!(shown.title, "Unknown track");
    assert_eq!(shown.artist, "Unknown artist");

    let view = h.controller.view();
    assert_eq!(view.progress, ProgressDisplay::default());
    assert!(!view.playing);
}

#[tokio::test(start_paused = true)]
async fn load_track_out_of_range_is_a_no_op() {
    let mut h = ready(three_tracks()).await;
    h.controller.load_track(2);
    h.media.clear_calls();

    assert!(!h.controller.load_track(3));
    assert!(h.media.calls().is_empty());
    assert_eq!(h.index(), 2);
    assert_eq!(h.controller.view().now_playing.as_ref().unwrap().index, 2);
}

#[tokio::test(start_paused = true)]
async fn next_and_previous_wrap_around() {
    let mut h = ready(three_tracks()).await;

    h.controller.previous_track();
    assert_eq!(h.index(), 2);
    h.controller.next_track();
    assert_eq!(h.index(), 0);
    h.controller.next_track();
    h.controller.next_track();
    assert_eq!(h.index(), 2);
    h.controller.next_track();
    assert_eq!(h.index(), 0);

    assert_eq!(
        h.media.loads(),
        vec![
            "https://cdn.test/three.mp3",
            "https://cdn.test/one.mp3",
            "https://cdn.test/two.mp3",
            "https://cdn.test/three.mp3",
            "https://cdn.test/one.mp3",
        ]
    );
    assert_eq!(
        h.media.calls().iter().filter(|c| **c == Call::Play).count(),
        5
    );
}

#[tokio::test(start_paused = true)]
async fn navigation_waits_for_initialization() {
    let mut h = harness(three_tracks());
    h.controller.next_track();
    h.controller.previous_track();
    h.controller.play_specific_track(1);
    h.controller.toggle_play();
    assert!(h.media.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn navigation_can_be_gated_on_playing() {
    let mut settings = Settings::default();
    settings.playback.advance_only_while_playing = true;
    let mut h = harness_with(Some(three_tracks()), "", settings);
    h.controller.initialize().await.unwrap();

    h.controller.next_track();
    assert_eq!(h.index(), 0);

    h.controller.toggle_play();
    h.pump().await;
    assert!(h.controller.state().is_playing);

    h.controller.next_track();
    assert_eq!(h.index(), 1);
}

#[tokio::test(start_paused = true)]
async fn toggle_play_starts_and_pauses() {
    let mut h = ready(three_tracks()).await;

    h.controller.toggle_play();
    assert!(!h.controller.state().is_playing);
    h.pump().await;
    assert!(h.controller.state().is_playing);
    assert!(h.controller.view().playing);

    h.controller.toggle_play();
    assert!(!h.controller.state().is_playing);
    assert!(!h.controller.view().playing);
    assert!(h.media.is_paused());
    assert_eq!(h.media.calls(), vec![Call::Play, Call::Pause]);
}

#[tokio::test(start_paused = true)]
async fn rejected_play_stays_paused_and_reports() {
    let mut h = ready(three_tracks()).await;
    h.media
        .fail_next_play(AudioError::DeviceError("no output".to_string()));

    h.controller.toggle_play();
    h.pump().await;

    assert!(!h.controller.state().is_playing);
    assert!(!h.controller.view().playing);
    assert_eq!(h.controller.view().errors, vec!["Could not play the track"]);

    h.controller.toggle_play();
    h.pump().await;
    assert!(h.controller.state().is_playing);
}

#[tokio::test(start_paused = true)]
async fn stale_play_result_is_ignored() {
    let mut h = ready(three_tracks()).await;
    h.controller.play_specific_track(1);
    h.controller.play_specific_track(2);
    h.controller.handle_event(Event::PlayResolved {
        generation: 0,
        result: Ok(()),
    });
    assert!(!h.controller.state().is_playing);

    h.pump().await;
    assert_eq!(h.index(), 2);
    assert!(h.controller.state().is_playing);
}

#[tokio::test(start_paused = true)]
async fn set_progress_seeks_by_percentage() {
    let mut h = ready(three_tracks()).await;
    h.media.set_duration(Some(200.0));

    h.controller.set_progress(50.0);
    assert_eq!(h.media.seeks(), vec![100.0]);
    assert_eq!(h.controller.view().progress.current, "1:40");
    assert_eq!(h.controller.view().progress.percent, 50.0);
}

#[tokio::test(start_paused = true)]
async fn set_progress_without_duration_is_ignored() {
    let mut h = ready(three_tracks()).await;

    h.controller.set_progress(50.0);
    h.media.set_duration(Some(f64::NAN));
    h.controller.set_progress(50.0);
    h.media.set_duration(Some(f64::INFINITY));
    h.controller.set_progress(50.0);
    h.media.set_duration(Some(200.0));
    h.controller.set_progress(f64::NAN);

    assert!(h.media.seeks().is_empty());
}

#[tokio::test(start_paused = true)]
async fn empty_playlist_fails_initialization() {
    let mut h = harness(vec![
        entry(None, Some("no url"), None),
        entry(Some(""), Some("blank"), None),
    ]);

    let err = h.controller.initialize().await.unwrap_err();
    assert!(matches!(err, PlayerError::EmptyPlaylist));
    assert_eq!(h.controller.phase(), Phase::Failed);
    assert!(h.controller.view().playlist.is_empty());
    assert!(h.controller.view().now_playing.is_none());
    assert!(h.media.calls().is_empty());
    assert_eq!(h.controller.view().errors.len(), 1);

    h.controller.next_track();
    assert!(h.media.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn fetch_failure_fails_initialization_quietly_when_asked() {
    let mut settings = Settings::default();
    settings.display.show_errors = false;
    let mut h = harness_with(None, "", settings);

    let err = h.controller.initialize().await.unwrap_err();
    assert!(matches!(err, PlayerError::Playlist(_)));
    assert_eq!(h.controller.phase(), Phase::Failed);
    assert!(h.controller.view().errors.is_empty());
}

#[tokio::test(start_paused = true)]
async fn failed_start_keeps_previous_session() {
    let mut h = harness_with(
        None,
        "currentTrackIndex=2; currentTime=30",
        Settings::default(),
    );
    assert!(h.controller.initialize().await.is_err());

    h.controller.save_playback_state();
    h.controller.handle_event(Event::Media(MediaEvent::TimeUpdate));
    assert_eq!(h.store.raw(), "currentTrackIndex=2; currentTime=30");
}

#[tokio::test(start_paused = true)]
async fn restores_saved_track_and_seeks_after_delay() {
    let mut h = harness_with(
        Some(three_tracks()),
        "currentTrackIndex=1; currentTime=42.5",
        Settings::default(),
    );
    h.controller.initialize().await.unwrap();

    assert_eq!(h.index(), 1);
    assert_eq!(h.media.loads(), vec!["https://cdn.test/two.mp3"]);

    h.pump().await;
    assert!(h.media.seeks().is_empty());

    tokio::time::sleep(Duration::from_millis(150)).await;
    h.pump().await;
    assert_eq!(h.media.seeks(), vec![42.5]);
    assert_eq!(h.controller.state().current_position, 42.5);
    assert_eq!(h.controller.view().progress.current, "0:42");
}

#[tokio::test(start_paused = true)]
async fn saved_index_out_of_bounds_falls_back_to_first_track() {
    let mut h = harness_with(
        Some(three_tracks()),
        "currentTrackIndex=7; currentTime=42.5",
        Settings::default(),
    );
    h.controller.initialize().await.unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;
    h.pump().await;

    assert_eq!(h.index(), 0);
    assert!(h.media.seeks().is_empty());
}

#[tokio::test(start_paused = true)]
async fn restore_seek_is_dropped_when_track_changes_first() {
    let mut h = harness_with(
        Some(three_tracks()),
        "currentTrackIndex=2; currentTime=30",
        Settings::default(),
    );
    h.controller.initialize().await.unwrap();
    h.controller.play_specific_track(0);

    tokio::time::sleep(Duration::from_millis(150)).await;
    h.pump().await;
    assert!(h.media.seeks().is_empty());
}

#[tokio::test(start_paused = true)]
async fn resource_error_skips_to_next_track() {
    let mut h = ready(three_tracks()).await;
    h.controller.load_track(2);
    h.media.clear_calls();

    h.controller
        .handle_event(Event::Media(MediaEvent::Error(AudioError::StreamError(
            "404".to_string(),
        ))));

    assert_eq!(h.index(), 0);
    assert_eq!(
        h.media.calls(),
        vec![Call::Load("https://cdn.test/one.mp3".to_string()), Call::Play]
    );
    assert_eq!(h.controller.view().errors, vec!["Could not play audio"]);
}

#[tokio::test(start_paused = true)]
async fn skipping_stops_after_every_track_failed() {
    let mut h = ready(three_tracks()).await;
    let broken = || Event::Media(MediaEvent::Error(AudioError::DecodingError("bad".into())));

    for _ in 0..3 {
        h.controller.handle_event(broken());
    }
    assert_eq!(h.index(), 0);
    h.media.clear_calls();

    h.controller.handle_event(broken());
    assert!(h.media.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn ended_track_advances() {
    let mut h = ready(three_tracks()).await;
    h.controller.toggle_play();
    h.pump().await;

    h.controller.handle_event(Event::Media(MediaEvent::Ended));
    assert_eq!(h.index(), 1);
    h.pump().await;
    assert!(h.controller.state().is_playing);
}

#[tokio::test(start_paused = true)]
async fn time_updates_refresh_display_and_persist() {
    let mut h = ready(three_tracks()).await;
    h.controller.load_track(2);
    h.media.set_duration(Some(200.0));
    h.controller.handle_event(Event::Media(MediaEvent::LoadedMetadata));
    assert_eq!(h.controller.view().progress.total, "3:20");

    h.media.set_position(65.25);
    h.controller.handle_event(Event::Media(MediaEvent::TimeUpdate));

    let progress = &h.controller.view().progress;
    assert_eq!(progress.current, "1:05");
    assert!((progress.percent - 32.625).abs() < 1e-9);
    assert_eq!(h.store.raw(), "currentTrackIndex=2; currentTime=65.25");
}

#[tokio::test(start_paused = true)]
async fn unknown_duration_still_persists_position() {
    let mut h = ready(three_tracks()).await;
    h.media.set_position(12.0);
    h.controller.handle_event(Event::Media(MediaEvent::TimeUpdate));

    assert_eq!(h.controller.view().progress, ProgressDisplay::default());
    assert_eq!(h.store.raw(), "currentTrackIndex=0; currentTime=12");
}

#[tokio::test(start_paused = true)]
async fn seek_by_moves_relative_to_position() {
    let mut h = ready(three_tracks()).await;
    h.media.set_duration(Some(100.0));
    h.media.set_position(50.0);

    h.controller.handle_event(Event::SeekBy(5.0));
    h.controller.handle_event(Event::SeekBy(-80.0));
    assert_eq!(h.media.seeks(), vec![55.0, 0.0]);
}
