//! Acorn stats card rendering.

use super::helpers::stat_widget;
use crate::stats::{format_epoch, format_number_full, format_reset};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Rows needed by the card, borders included.
pub const CARD_HEIGHT: u16 = 11;

impl super::App {
    /// ACORN STATS card: four counters, the tracking epoch and next reset.
    pub(super) fn render_stats_card(&self, frame: &mut Frame, area: Rect) {
        let colors = self.theme.colors();

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors.border_card))
            .title(
                Line::from(Span::styled(
                    " 🥜 Acorn Stats ",
                    Style::default()
                        .fg(colors.accent_amber)
                        .add_modifier(Modifier::BOLD),
                ))
                .alignment(Alignment::Center),
            );

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(inner);

        frame.render_widget(
            Paragraph::new(Span::styled(
                format!("Tracking since {}", format_epoch(self.settings.epoch)),
                Style::default().fg(colors.text_muted),
            ))
            .alignment(Alignment::Center),
            rows[0],
        );

        let snapshot = self.panel.snapshot();
        let quota = self.settings.quota;
        let remaining = self.panel.allowance_remaining(quota);

        let top = Self::two_columns(rows[2]);
        frame.render_widget(
            stat_widget(
                "Sent",
                format_number_full(snapshot.sent),
                colors.text_label,
                colors.text_primary,
            ),
            top[0],
        );
        frame.render_widget(
            stat_widget(
                "Received",
                format_number_full(snapshot.received),
                colors.text_label,
                colors.text_primary,
            ),
            top[1],
        );

        let bottom = Self::two_columns(rows[4]);
        frame.render_widget(
            stat_widget(
                "Daily Remaining",
                format!("{} / {}", remaining, quota.get()),
                colors.text_label,
                colors.allowance(remaining, quota.get()),
            ),
            bottom[0],
        );
        frame.render_widget(
            stat_widget(
                "Failed Attempts",
                format_number_full(snapshot.failed_attempts),
                colors.text_label,
                colors.error,
            ),
            bottom[1],
        );

        let next_reset = self.panel.reset_boundary(self.settings.reset_hour_utc);
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!("Next reset: {}", format_reset(next_reset)),
                Style::default().fg(colors.text_muted),
            ))
            .alignment(Alignment::Center),
            rows[6],
        );
    }

    fn two_columns(area: Rect) -> std::rc::Rc<[Rect]> {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area)
    }
}
