use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Style, Stylize},
    symbols::{self, border},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, StatefulWidget},
};
use unicode_width::UnicodeWidthStr;

use crate::{
    ui::{components::fit_width, util::active_track_icon, view::PlaylistEntry},
    util::colors,
};

const NEW_BADGE: &str = " NEW ";

pub struct PlaylistWidget<'a> {
    entries: &'a [PlaylistEntry],
    current: Option<usize>,
    is_playing: bool,
}

impl<'a> PlaylistWidget<'a> {
    pub fn new(
        entries: &'a [PlaylistEntry],
        current: Option<usize>,
        is_playing: bool,
    ) -> Self {
        Self {
            entries,
            current,
            is_playing,
        }
    }

    fn item(&self, index: usize, entry: &PlaylistEntry, width: usize) -> ListItem<'a> {
        let is_current = self.current == Some(index);
        let marker = if is_current {
            format!("{} ", active_track_icon(self.is_playing))
        } else {
            "  ".to_string()
        };
        let badge = if entry.is_new { NEW_BADGE.len() + 1 } else { 0 };
        let label = fit_width(
            &format!("{} – {}", entry.title, entry.artist),
            width.saturating_sub(marker.width() + badge),
        );

        let mut line = Line::default();
        line.push_span(Span::from(marker).fg(colors::PRIMARY));
        let label = Span::from(label);
        line.push_span(if is_current {
            label.fg(colors::PRIMARY).bold()
        } else {
            label.fg(Color::Reset)
        });
        if entry.is_new {
            line.push_span(" ");
            line.push_span(Span::from(NEW_BADGE).fg(colors::BACKGROUND).bg(colors::ACCENT));
        }
        ListItem::new(line)
    }
}

/// Rendered against the caller's [`ListState`] so the scroll offset survives
/// between frames and clicks can be mapped back to rows.
impl StatefulWidget for PlaylistWidget<'_> {
    type State = ListState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut ListState) {
        let block = Block::default()
            .title_top(format!(" Playlist ({}) ", self.entries.len()))
            .title_alignment(Alignment::Left)
            .borders(Borders::LEFT | Borders::TOP | Borders::RIGHT)
            .border_set(border::Set {
                bottom_left: symbols::line::ROUNDED.vertical_right,
                bottom_right: symbols::line::ROUNDED.vertical_left,
                ..symbols::border::ROUNDED
            });
        // borders plus the highlight symbol
        let width = area.width.saturating_sub(4) as usize;

        let items: Vec<ListItem> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| self.item(i, entry, width))
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_symbol("› ")
            .highlight_style(Style::default().bg(colors::SECONDARY));

        StatefulWidget::render(list, area, buf, state);
    }
}

/// Playlist index under terminal row `y`, given the area and state used for
/// the last render.
pub fn index_at(area: Rect, state: &ListState, y: u16, len: usize) -> Option<usize> {
    // one row of top border
    let first = area.y.saturating_add(1);
    if y < first || y >= area.bottom() {
        return None;
    }
    let index = state.offset() + usize::from(y - first);
    (index < len).then_some(index)
}
