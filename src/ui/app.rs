use std::time::Duration;

use flume::{Receiver, Sender};
use ratatui::{
    Frame,
    style::Style,
    widgets::{Block, ListState},
};
use tracing::{info, warn};

use crate::{
    audio::RodioMedia,
    config::Settings,
    event::Event,
    player::{FileStateStore, PlaybackController},
    playlist::{download::download_track, source_for},
    ui::{
        components::{
            controls::ControlsWidget, now_playing::NowPlayingWidget, playlist::PlaylistWidget,
            progress::ProgressWidget,
        },
        input::InputHandler,
        layout::AppLayout,
        tui::Tui,
        util::handler::EventHandler,
        view::TuiView,
    },
    util::{
        colors,
        log::{get_data_dir, get_download_dir},
        task::TaskManager,
    },
};

const STATE_FILE: &str = "playback_state";
const DOWNLOAD_TASK: &str = "download";

pub type Controller = PlaybackController<RodioMedia, TuiView, FileStateStore>;

pub struct App {
    pub event_rx: Receiver<Event>,
    pub event_tx: Sender<Event>,
    pub controller: Controller,
    pub client: reqwest::Client,
    pub settings: Settings,
    pub input: InputHandler,
    pub layout: AppLayout,
    pub playlist_state: ListState,
    pub task_manager: TaskManager,
    pub has_focus: bool,
    pub should_quit: bool,
}

impl App {
    /// Build the player for `location`, or for the configured playlist
    /// source when no location is given.
    pub async fn new(location: Option<String>) -> color_eyre::Result<Self> {
        let mut settings = Settings::load_or_default();
        if let Some(location) = location {
            settings.playlist.source = location;
        }
        info!(source = %settings.playlist.source, "starting player");

        let (event_tx, event_rx) = flume::unbounded();
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let source = source_for(&settings.playlist.source, client.clone())?;
        let media = RodioMedia::new(
            client.clone(),
            Duration::from_millis(settings.playback.tick_ms),
        )?;
        let store = FileStateStore::new(
            settings
                .state
                .path
                .clone()
                .unwrap_or_else(|| get_data_dir().join(STATE_FILE)),
        );
        let view = TuiView::new(settings.display.clone());
        let controller =
            PlaybackController::new(media, view, store, source, &settings, event_tx.clone());

        Ok(Self {
            event_rx,
            event_tx,
            controller,
            client,
            input: InputHandler::new(settings.playback.seek_step_percent),
            settings,
            layout: AppLayout::default(),
            playlist_state: ListState::default(),
            task_manager: TaskManager::new(),
            has_focus: true,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> color_eyre::Result<()> {
        let mut tui = Tui::new()?.mouse(true);
        tui.enter()?;
        tui.draw(|f| self.ui(f))?;

        // A failed load is already on screen; keep the UI up so it can be read.
        if let Err(e) = self.controller.initialize().await {
            warn!("continuing without a playlist: {e}");
        }

        while !self.should_quit {
            tui.draw(|f| self.ui(f))?;
            while !EventHandler::handle_events(self, &mut tui).await? && !self.should_quit {}
        }

        tui.exit()?;
        Ok(())
    }

    /// Save track `index` to the download directory in the background.
    /// Starting another download cancels the one in flight.
    pub fn download(&mut self, index: usize) {
        let Some(track) = self.controller.tracks().get(index).cloned() else {
            warn!(index, "no track to download");
            return;
        };
        let dir = self
            .settings
            .downloads
            .dir
            .clone()
            .unwrap_or_else(get_download_dir);

        self.controller.view_mut().set_status(format!(
            "Downloading {}…",
            track.title_or(&self.settings.display.unknown_title)
        ));

        let client = self.client.clone();
        let tx = self.event_tx.clone();
        self.task_manager.spawn(DOWNLOAD_TASK, async move {
            let result = download_track(&client, &track, &dir).await.map_err(|e| {
                warn!(url = track.url.as_str(), "download failed: {e}");
                e.to_string()
            });
            let _ = tx.send(Event::DownloadFinished(result));
        });
    }

    fn ui(&mut self, frame: &mut Frame) {
        let area = frame.area();
        self.layout = AppLayout::new(area);
        frame.render_widget(Block::new().style(Style::new().bg(colors::BACKGROUND)), area);

        let view = self.controller.view();
        let now_playing = view.now_playing();

        self.playlist_state.select(view.selected());
        frame.render_stateful_widget(
            PlaylistWidget::new(
                view.entries(),
                now_playing.map(|n| n.index),
                view.is_playing(),
            ),
            self.layout.playlist,
            &mut self.playlist_state,
        );

        frame.render_widget(
            NowPlayingWidget::new(now_playing, view.errors(), view.status()),
            self.layout.now_playing,
        );

        frame.render_widget(
            ProgressWidget::new(
                view.progress(),
                now_playing.map_or("No track", |n| n.title.as_str()),
                now_playing.map(|n| n.artist.as_str()),
                view.is_playing(),
            ),
            self.layout.progress,
        );
        frame.render_widget(ControlsWidget, self.layout.controls);
    }
}
