use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Stylize,
    symbols::{self, border},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use unicode_width::UnicodeWidthStr;

use crate::util::colors;

const HINTS: &[(&str, &str)] = &[
    ("␣", "play"),
    ("n/p", "skip"),
    ("h/l", "seek"),
    ("⏎", "select"),
    ("d", "save"),
    ("q", "quit"),
];

/// Key hints next to the progress bar.
pub struct ControlsWidget;

impl ControlsWidget {
    pub fn width() -> u16 {
        let text: usize = HINTS
            .iter()
            .map(|(key, action)| key.width() + action.width() + 3)
            .sum();
        text as u16 + 1
    }
}

impl Widget for ControlsWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut line = Line::default();
        for (key, action) in HINTS {
            line.push_span(Span::from(*key).fg(colors::ACCENT).bold());
            line.push_span(Span::from(format!(" {action}  ")).fg(colors::NEUTRAL));
        }

        Paragraph::new(line)
            .block(
                Block::default()
                    .borders(Borders::TOP | Borders::RIGHT | Borders::BOTTOM)
                    .border_set(border::Set {
                        top_left: symbols::line::ROUNDED.horizontal_down,
                        bottom_left: symbols::line::ROUNDED.horizontal_up,
                        ..symbols::border::ROUNDED
                    }),
            )
            .centered()
            .render(area, buf);
    }
}
