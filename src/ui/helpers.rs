//! Helper functions for UI rendering

use crate::host::SafeAreaInsets;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

/// Helper: Create a stat paragraph with label and value
pub fn stat_widget(label: &str, value: String, label_color: Color, color: Color) -> Paragraph<'static> {
    Paragraph::new(vec![
        Line::from(Span::styled(
            label.to_string(),
            Style::default().fg(label_color),
        )),
        Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
    ])
    .alignment(Alignment::Center)
}

/// Shrink `area` by the host's safe-area insets, never below zero size.
pub fn inset(area: Rect, insets: SafeAreaInsets) -> Rect {
    let x = area.x.saturating_add(insets.left.min(area.width));
    let y = area.y.saturating_add(insets.top.min(area.height));
    let width = area
        .width
        .saturating_sub(insets.left)
        .saturating_sub(insets.right);
    let height = area
        .height
        .saturating_sub(insets.top)
        .saturating_sub(insets.bottom);
    Rect::new(x, y, width, height)
}

/// Horizontally centered column of at most `max_width` cells.
pub fn centered_column(area: Rect, max_width: u16) -> Rect {
    let width = area.width.min(max_width);
    let x = area.x + (area.width - width) / 2;
    Rect::new(x, area.y, width, area.height)
}

/// Truncate to `max_chars` characters, appending an ellipsis when cut.
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut out: String = s.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}
