//! Header component: 2-row brand bar.
//!
//! Row 1: site title.  Row 2: tagline.  Not focusable.

use ratatui::crossterm::event::{KeyEvent, MouseEvent};
use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{style_title, C_SECONDARY},
};

pub const TITLE: &str = "Playlist.com.ar";
pub const TAGLINE: &str = "Tu estación de radio online favorita";

pub struct Header;

impl Header {
    pub fn new() -> Self {
        Self
    }
}

impl Component for Header {
    fn id(&self) -> ComponentId {
        ComponentId::Header
    }

    fn handle_key(&mut self, _key: KeyEvent, _state: &AppState) -> Vec<Action> {
        vec![]
    }

    fn handle_mouse(&mut self, _event: MouseEvent, _area: Rect, _state: &AppState) -> Vec<Action> {
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, _state: &AppState) {
        let mut lines = vec![Line::from(Span::styled(format!("📻 {}", TITLE), style_title()))];
        if area.height >= 2 {
            lines.push(Line::from(Span::styled(
                TAGLINE,
                Style::default().fg(C_SECONDARY),
            )));
        }
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
    }

    fn min_height(&self) -> u16 {
        2
    }
}
