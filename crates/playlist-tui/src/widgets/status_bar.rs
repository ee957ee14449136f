//! Status bar: footer notice and keybinding line.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::theme::{C_MUTED, C_SECONDARY, C_SEPARATOR};

pub const FOOTER_TEXT: &str = "© 2024 Playlist.com.ar - Todos los derechos reservados";

/// Draw a horizontal separator line.
pub fn draw_separator(frame: &mut Frame, area: Rect) {
    let line = Line::from(Span::styled(
        "─".repeat(area.width as usize),
        Style::default().fg(C_SEPARATOR),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

/// Draw the centred copyright notice (one row).
pub fn draw_footer(frame: &mut Frame, area: Rect) {
    let line = Line::from(Span::styled(FOOTER_TEXT, Style::default().fg(C_SECONDARY)));
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

/// Draw the keybindings bar (one row).  Playback keys are listed only while
/// there is a panel for them to act on.
pub fn draw_keys_bar(frame: &mut Frame, area: Rect, panel_visible: bool) {
    let keys = if panel_visible {
        " ↑↓/jk move  Enter select  Space play/pause  s stop  m mute  ←→ vol  0-9 vol presets  Tab panes  q quit"
    } else {
        " ↑↓/jk move  Enter/Space select  Tab panes  q quit"
    };

    let line = Line::from(vec![
        Span::styled(
            " RADIO ",
            Style::default().fg(C_SECONDARY).add_modifier(Modifier::BOLD),
        ),
        Span::styled(keys, Style::default().fg(C_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
