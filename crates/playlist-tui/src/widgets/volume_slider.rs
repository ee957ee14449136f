//! Smooth Unicode volume slider.

use ratatui::{
    style::Style,
    text::{Line, Span},
};

use crate::theme::{C_MUTED, C_PLAYING, C_SEPARATOR};

const BLOCKS: [char; 9] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉', '█'];

/// Build a slider line `width` cells wide for `value` in 0..=100.
/// Muted sliders keep the level but draw it dimmed.
pub fn slider_line(value: u8, width: usize, muted: bool) -> Line<'static> {
    if width == 0 {
        return Line::default();
    }

    // 8 eighths per cell
    let eighths = value.min(100) as usize * width * 8 / 100;
    let full_blocks = eighths / 8;
    let partial = eighths % 8;

    let mut filled = "█".repeat(full_blocks);
    let mut empty = String::new();
    if full_blocks < width {
        if partial > 0 {
            filled.push(BLOCKS[partial]);
            empty = "─".repeat(width - full_blocks - 1);
        } else {
            empty = "─".repeat(width - full_blocks);
        }
    }

    let fill_color = if muted { C_MUTED } else { C_PLAYING };
    Line::from(vec![
        Span::styled(filled, Style::default().fg(fill_color)),
        Span::styled(empty, Style::default().fg(C_SEPARATOR)),
    ])
}

/// Map a column offset inside a slider of `width` cells to 0..=100.
/// The last cell maps to 100 so the maximum is reachable with the mouse.
/// A slider narrower than two cells has no usable scale and yields `None`.
pub fn value_at(offset: u16, width: u16) -> Option<u8> {
    if width < 2 {
        return None;
    }
    let offset = offset.min(width - 1) as u32;
    Some(((offset * 100 + (width as u32 - 1) / 2) / (width as u32 - 1)) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_slider_width_is_stable() {
        for v in [0, 1, 33, 50, 99, 100] {
            let line = slider_line(v, 20, false);
            assert_eq!(text(&line).chars().count(), 20, "value {}", v);
        }
    }

    #[test]
    fn test_slider_extremes() {
        assert_eq!(text(&slider_line(0, 4, false)), "────");
        assert_eq!(text(&slider_line(100, 4, false)), "████");
        assert_eq!(text(&slider_line(50, 4, false)), "██──");
    }

    #[test]
    fn test_value_at() {
        assert_eq!(value_at(0, 21), Some(0));
        assert_eq!(value_at(10, 21), Some(50));
        assert_eq!(value_at(20, 21), Some(100));
        assert_eq!(value_at(99, 21), Some(100));
        assert_eq!(value_at(0, 2), Some(0));
        assert_eq!(value_at(1, 2), Some(100));
    }

    #[test]
    fn test_value_at_cramped_slider_has_no_value() {
        assert_eq!(value_at(0, 1), None);
        assert_eq!(value_at(0, 0), None);
        assert_eq!(value_at(5, 1), None);
    }
}
