use ratatui::crossterm::event::{KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use tracing::debug;

use crate::{
    event::Event,
    ui::{
        app::App,
        components::{playlist::index_at, progress::percent_at},
        input::Action,
        tui::{TerminalEvent, Tui},
    },
};

pub struct EventHandler;

impl EventHandler {
    /// Wait for the next terminal or app event and apply it, then drain
    /// whatever else is already queued on the app channel. Returns whether
    /// the frame needs redrawing.
    pub async fn handle_events(app: &mut App, tui: &mut Tui) -> color_eyre::Result<bool> {
        let terminal = tui.event_rx.clone();
        let events = app.event_rx.clone();

        let mut should_render = tokio::select! {
            evt = terminal.recv_async() => match evt {
                Ok(evt) => Self::handle_terminal_event(app, evt, tui)?,
                Err(_) => {
                    app.should_quit = true;
                    false
                }
            },
            Ok(evt) = events.recv_async() => {
                Self::handle_action(app, evt);
                true
            }
        };

        while let Ok(evt) = app.event_rx.try_recv() {
            Self::handle_action(app, evt);
            should_render = true;
        }

        Ok(should_render)
    }

    pub fn handle_terminal_event(
        app: &mut App,
        evt: TerminalEvent,
        tui: &mut Tui,
    ) -> color_eyre::Result<bool> {
        match evt {
            TerminalEvent::Tick => return Ok(app.has_focus),
            TerminalEvent::FocusGained => {
                app.has_focus = true;
                tui.clear()?;
            }
            TerminalEvent::FocusLost => app.has_focus = false,
            TerminalEvent::Key(key) => Self::handle_key_event(app, key),
            TerminalEvent::Mouse(mouse) => Self::handle_mouse_event(app, mouse),
            TerminalEvent::Resize(..) => {}
        }

        Ok(true)
    }

    pub fn handle_action(app: &mut App, evt: Event) {
        match evt {
            Event::Quit => {
                app.controller.save_playback_state();
                app.should_quit = true;
            }
            Event::Download(index) => app.download(index),
            Event::DownloadFinished(result) => {
                let status = match result {
                    Ok(path) => format!("Saved to {}", path.display()),
                    Err(e) => format!("Download failed: {e}"),
                };
                app.controller.view_mut().set_status(status);
            }
            evt => app.controller.handle_event(evt),
        }
    }

    fn handle_key_event(app: &mut App, key: KeyEvent) {
        let Some(action) = app.input.handle_key(key) else {
            return;
        };

        match action {
            Action::Send(evt) => Self::handle_action(app, evt),
            Action::MoveCursor(delta) => app.controller.view_mut().move_cursor(delta),
            Action::PlaySelected => {
                if let Some(index) = app.controller.view().selected() {
                    Self::handle_action(app, Event::Play(index));
                }
            }
            Action::DownloadSelected => {
                if let Some(index) = app.controller.view().selected() {
                    Self::handle_action(app, Event::Download(index));
                }
            }
        }
    }

    fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
        let progress = app.layout.progress;
        let playlist = app.layout.playlist;
        let in_rows = |area: ratatui::layout::Rect| mouse.row >= area.y && mouse.row < area.bottom();
        let in_columns =
            |area: ratatui::layout::Rect| mouse.column >= area.x && mouse.column < area.right();

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) if in_rows(progress) => {
                if let Some(percent) = percent_at(progress, mouse.column) {
                    debug!(percent, "seek from progress bar");
                    Self::handle_action(app, Event::SetProgress(percent));
                }
            }
            MouseEventKind::Down(MouseButton::Left) if in_columns(playlist) => {
                let len = app.controller.tracks().len();
                if let Some(index) = index_at(playlist, &app.playlist_state, mouse.row, len) {
                    app.controller.view_mut().select(index);
                    Self::handle_action(app, Event::Play(index));
                }
            }
            MouseEventKind::ScrollDown if in_columns(playlist) => {
                app.controller.view_mut().move_cursor(1)
            }
            MouseEventKind::ScrollUp if in_columns(playlist) => {
                app.controller.view_mut().move_cursor(-1)
            }
            _ => {}
        }
    }
}
