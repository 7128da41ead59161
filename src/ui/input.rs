use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::event::Event;

/// What a key press asks for. Cursor movement stays in the view; everything
/// else becomes an app [`Event`].
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Send(Event),
    MoveCursor(isize),
    PlaySelected,
    DownloadSelected,
}

pub struct InputHandler {
    seek_step: f64,
}

impl InputHandler {
    pub fn new(seek_step: f64) -> Self {
        Self { seek_step }
    }

    pub fn handle_key(&self, key: KeyEvent) -> Option<Action> {
        let send = |event| Some(Action::Send(event));

        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => send(Event::Quit),
            (KeyCode::Char('q'), _) => send(Event::Quit),
            (KeyCode::Char(' '), _) => send(Event::TogglePlay),
            (KeyCode::Char('n') | KeyCode::Right, _) => send(Event::Next),
            (KeyCode::Char('p') | KeyCode::Left, _) => send(Event::Previous),
            (KeyCode::Char('h'), _) => send(Event::SeekBy(-self.seek_step)),
            (KeyCode::Char('l'), _) => send(Event::SeekBy(self.seek_step)),
            (KeyCode::Char(digit @ '0'..='9'), _) => {
                let tenth = f64::from(digit.to_digit(10).unwrap_or(0));
                send(Event::SetProgress(tenth * 10.0))
            }
            (KeyCode::Char('j') | KeyCode::Down, _) => Some(Action::MoveCursor(1)),
            (KeyCode::Char('k') | KeyCode::Up, _) => Some(Action::MoveCursor(-1)),
            (KeyCode::PageDown, _) => Some(Action::MoveCursor(10)),
            (KeyCode::PageUp, _) => Some(Action::MoveCursor(-10)),
            (KeyCode::Enter, _) => Some(Action::PlaySelected),
            (KeyCode::Char('d'), _) => Some(Action::DownloadSelected),
            _ => None,
        }
    }
}
