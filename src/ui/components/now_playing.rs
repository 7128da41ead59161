use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::Stylize,
    symbols::{self, border},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::{player::NowPlaying, ui::components::fit_width, util::colors};

/// Details of the loaded track followed by recent errors and the status line.
pub struct NowPlayingWidget<'a> {
    now_playing: Option<&'a NowPlaying>,
    errors: &'a [String],
    status: Option<&'a str>,
}

impl<'a> NowPlayingWidget<'a> {
    pub fn new(
        now_playing: Option<&'a NowPlaying>,
        errors: &'a [String],
        status: Option<&'a str>,
    ) -> Self {
        Self {
            now_playing,
            errors,
            status,
        }
    }
}

impl Widget for NowPlayingWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = area.width.saturating_sub(2) as usize;
        let mut lines = Vec::new();

        match self.now_playing {
            Some(track) => {
                lines.push(Line::from(fit_width(&track.title, width)).fg(colors::PRIMARY).bold());
                lines.push(Line::from(fit_width(&track.artist, width)));
                lines.push(Line::default());
                lines.push(Line::from(vec![
                    Span::from("cover ").fg(colors::NEUTRAL),
                    Span::from(fit_width(&track.cover, width.saturating_sub(6))),
                ]));
            }
            None => lines.push(Line::from("Nothing loaded").fg(colors::NEUTRAL)),
        }

        if !self.errors.is_empty() {
            lines.push(Line::default());
            for error in self.errors {
                lines.push(Line::from(format!("✗ {error}")).fg(colors::ERROR));
            }
        }

        if let Some(status) = self.status {
            lines.push(Line::default());
            lines.push(Line::from(status.to_string()).fg(colors::ACCENT));
        }

        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title_top(" Now playing ")
                    .title_alignment(Alignment::Center)
                    .borders(Borders::TOP | Borders::RIGHT)
                    .border_set(border::Set {
                        top_left: symbols::line::ROUNDED.horizontal_down,
                        ..symbols::border::ROUNDED
                    }),
            )
            .render(area, buf);
    }
}
