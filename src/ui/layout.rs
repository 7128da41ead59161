use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::ui::components::controls::ControlsWidget;

const PLAYER_HEIGHT: u16 = 3;
const DETAILS_WIDTH: u16 = 40;

/// Screen regions for one frame. Kept after drawing so mouse events can be
/// matched against what was on screen.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AppLayout {
    pub playlist: Rect,
    pub now_playing: Rect,
    pub progress: Rect,
    pub controls: Rect,
}

impl AppLayout {
    pub fn new(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(PLAYER_HEIGHT)])
            .split(area);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(DETAILS_WIDTH)])
            .split(rows[0]);

        let player = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Min(10),
                Constraint::Length(ControlsWidget::width()),
            ])
            .split(rows[1]);

        Self {
            playlist: body[0],
            now_playing: body[1],
            progress: player[0],
            controls: player[1],
        }
    }
}
