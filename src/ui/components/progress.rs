use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Style, Stylize},
    symbols::{self, border},
    text::ToSpan,
    widgets::{Block, Borders, Gauge, Widget},
};

use crate::{player::ProgressDisplay, util::colors};

pub struct ProgressWidget<'a> {
    progress: &'a ProgressDisplay,
    track_title: &'a str,
    track_artist: Option<&'a str>,
    is_playing: bool,
}

impl<'a> ProgressWidget<'a> {
    pub fn new(
        progress: &'a ProgressDisplay,
        track_title: &'a str,
        track_artist: Option<&'a str>,
        is_playing: bool,
    ) -> Self {
        Self {
            progress,
            track_title,
            track_artist,
            is_playing,
        }
    }
}

impl Widget for ProgressWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let icon = if self.is_playing { "⏸" } else { "▶" };
        let mut track_info = format!("{icon}  {}", self.track_title);
        if let Some(artist) = self.track_artist {
            track_info = format!("{track_info} by {artist}");
        }

        let ratio = if self.progress.percent.is_finite() {
            (self.progress.percent / 100.0).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let label = format!("{} / {}", self.progress.current, self.progress.total);

        Gauge::default()
            .block(
                Block::default()
                    .title_top(track_info)
                    .title_alignment(Alignment::Center)
                    .borders(Borders::ALL)
                    .border_set(border::Set {
                        top_right: symbols::line::ROUNDED.horizontal_down,
                        bottom_right: symbols::line::ROUNDED.horizontal_up,
                        ..symbols::border::ROUNDED
                    }),
            )
            .gauge_style(Style::default().fg(colors::PRIMARY).bg(colors::BACKGROUND))
            .ratio(ratio)
            .label(label.to_span().fg(Color::White))
            .use_unicode(true)
            .render(area, buf);
    }
}

/// Fraction of the bar under column `x`, as a 0–100 progress value.
///
/// `area` is the full widget area including its border.
pub fn percent_at(area: Rect, x: u16) -> Option<f64> {
    let inner = Rect {
        x: area.x.saturating_add(1),
        width: area.width.saturating_sub(2),
        ..area
    };
    if inner.width == 0 || x < inner.x || x >= inner.x + inner.width {
        return None;
    }
    Some(f64::from(x - inner.x) / f64::from(inner.width) * 100.0)
}
