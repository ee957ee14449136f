//! StationSelector component: the catalog as a list of selectable rows.
//!
//! Each entry is two rows: marker + name, then the slogan.  The keyboard
//! cursor only navigates; the filled marker follows `AppState` selection.

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

use playlist_core::catalog::Catalog;
use playlist_core::station::Station;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{C_MUTED, C_PLAYING, C_PRIMARY, C_SECONDARY, C_SELECTION_BG},
    widgets::{pane_chrome::pane_chrome, scrollable_list::ScrollableList},
};

pub const TITLE: &str = "Selecciona tu emisora";

/// Terminal rows per station entry.
const ENTRY_ROWS: u16 = 2;

pub struct StationSelector {
    pub list: ScrollableList<Station>,
}

impl StationSelector {
    pub fn new() -> Self {
        Self {
            list: ScrollableList::new(),
        }
    }

    pub fn sync_stations(&mut self, catalog: &Catalog) {
        self.list.set_items(catalog.stations().to_vec());
    }

    fn select_cursor(&self) -> Vec<Action> {
        match self.list.cursor_item() {
            Some(station) => vec![Action::SelectStation(station.id.clone())],
            None => vec![],
        }
    }

    fn render_item(
        station: &Station,
        is_selected: bool,
        is_cursor: bool,
        width: usize,
    ) -> ListItem<'static> {
        let (marker, marker_color) = if is_selected {
            ("●", C_PLAYING)
        } else {
            ("○", C_MUTED)
        };
        let name_color = if is_selected {
            C_PLAYING
        } else if is_cursor {
            C_PRIMARY
        } else {
            C_SECONDARY
        };

        let name_line = Line::from(vec![
            Span::styled(format!(" {} ", marker), Style::default().fg(marker_color)),
            Span::styled(
                truncate(&station.name, width.saturating_sub(3)),
                Style::default().fg(name_color).add_modifier(Modifier::BOLD),
            ),
        ]);
        let slogan_line = Line::from(Span::styled(
            format!("   {}", truncate(&station.slogan, width.saturating_sub(3))),
            Style::default().fg(C_SECONDARY),
        ));

        let bg = if is_cursor {
            Style::default().bg(C_SELECTION_BG)
        } else {
            Style::default()
        };
        ListItem::new(vec![name_line, slogan_line]).style(bg)
    }
}

/// Cut `s` to at most `max` display columns, marking the cut with `…`.
fn truncate(s: &str, max: usize) -> String {
    if s.width() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        used += w;
        out.push(c);
    }
    if max > 0 {
        out.push('…');
    }
    out
}

impl Component for StationSelector {
    fn id(&self) -> ComponentId {
        ComponentId::StationSelector
    }

    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.list.cursor_up(1),
            KeyCode::Down | KeyCode::Char('j') => self.list.cursor_down(1),
            KeyCode::PageUp => self.list.cursor_up(10),
            KeyCode::PageDown => self.list.cursor_down(10),
            KeyCode::Home | KeyCode::Char('g') => self.list.cursor_first(),
            KeyCode::End | KeyCode::Char('G') => self.list.cursor_last(),
            KeyCode::Enter | KeyCode::Char(' ') => return self.select_cursor(),
            _ => {}
        }
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, area: Rect, _state: &AppState) -> Vec<Action> {
        match event.kind {
            MouseEventKind::ScrollUp => self.list.cursor_up(1),
            MouseEventKind::ScrollDown => self.list.cursor_down(1),
            MouseEventKind::Down(MouseButton::Left) => {
                // +1 for the top border
                let top = area.y + 1;
                if event.row < top || event.row >= area.bottom().saturating_sub(1) {
                    return vec![];
                }
                let entry = ((event.row - top) / ENTRY_ROWS) as usize;
                if self.list.handle_click(entry).is_some() {
                    return self.select_cursor();
                }
            }
            _ => {}
        }
        vec![]
    }

    fn on_action(&mut self, action: &Action, state: &AppState) -> Vec<Action> {
        if let Action::SelectStation(id) = action {
            if let Some(pos) = state.catalog.position(id) {
                self.list.set_cursor(pos);
            }
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let block = pane_chrome(TITLE, focused, None);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.list.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "  no hay emisoras",
                    Style::default().fg(C_MUTED),
                )),
                inner,
            );
            return;
        }

        let rows = ((inner.height / ENTRY_ROWS) as usize).max(1);
        self.list.ensure_visible(rows);
        let cursor = self.list.cursor;
        let width = inner.width as usize;

        let items: Vec<ListItem> = self
            .list
            .visible_items(rows)
            .into_iter()
            .map(|(idx, station)| {
                Self::render_item(
                    station,
                    state.is_selected(&station.id),
                    focused && idx == cursor,
                    width,
                )
            })
            .collect();

        frame.render_widget(List::new(items), inner);
    }

    fn min_height(&self) -> u16 {
        // borders + at least one entry
        2 + ENTRY_ROWS
    }
}
