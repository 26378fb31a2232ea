mod helpers;
mod stats_panel;

use crate::config::Settings;
use crate::frame::FrameSession;
use crate::host::LocalHost;
use crate::panel::StatsPanel;
use crate::refresh::SystemClock;
use crate::theme::Theme;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use helpers::{centered_column, inset, truncate_with_ellipsis};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};
use stats_panel::CARD_HEIGHT;
use std::io;
use std::sync::Arc;
use std::time::Duration;

/// Width of the frame column, matching a narrow mobile card.
const FRAME_WIDTH: u16 = 44;

/// Longest the loop waits for input before checking host events and ticks.
const MAX_POLL: Duration = Duration::from_millis(100);

pub struct App {
    settings: Settings,
    host: Arc<LocalHost>,
    session: FrameSession,
    panel: StatsPanel<SystemClock>,
    theme: Theme,
    exit: bool,
    should_redraw: bool,
}

impl App {
    pub fn new(settings: Settings, host: Arc<LocalHost>) -> Self {
        let session = FrameSession::new(
            host.clone(),
            settings.api_url.clone(),
            settings.profile_base_url.clone(),
        );
        let panel = StatsPanel::new(SystemClock, settings.epoch, settings.refresh_interval);

        Self {
            settings,
            host,
            session,
            panel,
            theme: Theme,
            exit: false,
            should_redraw: true,
        }
    }

    pub fn run(&mut self, terminal: &mut ratatui::DefaultTerminal) -> io::Result<()> {
        // First frame shows the loading state before the host is contacted.
        terminal.draw(|frame| self.render(frame))?;

        self.session.load();
        self.panel.activate();
        self.should_redraw = true;

        let result = self.event_loop(terminal);

        self.panel.deactivate();
        log::info!("Stopped after {} stat refreshes", self.panel.refreshes());
        result
    }

    fn event_loop(&mut self, terminal: &mut ratatui::DefaultTerminal) -> io::Result<()> {
        while !self.exit {
            let timeout = self
                .panel
                .until_next_tick()
                .map_or(MAX_POLL, |d| d.min(MAX_POLL));

            if event::poll(timeout)? {
                while event::poll(Duration::from_millis(0))? {
                    match event::read()? {
                        Event::Key(key) => {
                            if key.kind == KeyEventKind::Press {
                                self.handle_key_event(key);
                                self.should_redraw = true;
                                if self.exit {
                                    return Ok(());
                                }
                            }
                        }
                        Event::Resize(_, _) => {
                            self.should_redraw = true;
                        }
                        Event::Mouse(_) | Event::FocusGained | Event::FocusLost | Event::Paste(_) => {}
                    }
                }
            }

            if self.session.poll_events() > 0 {
                self.should_redraw = true;
            }

            if self.panel.poll() > 0 {
                self.should_redraw = true;
            }

            if self.should_redraw {
                terminal.draw(|frame| self.render(frame))?;
                self.should_redraw = false;
            }
        }

        Ok(())
    }

    fn handle_key_event(&mut self, key: crossterm::event::KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.exit = true;
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.exit = true,
            KeyCode::Char('s') => self.session.open_share(),
            KeyCode::Char('p') => self.session.open_profile(),
            KeyCode::Char('a') => self.session.add_frame(),
            KeyCode::Char('n') => self.host.toggle_notifications(),
            KeyCode::Char('x') => self.host.remove_frame(),
            KeyCode::Enter => self.host.press_primary_button(),
            _ => {}
        }
    }

    fn render(&mut self, frame: &mut Frame) {
        let colors = self.theme.colors();
        frame.render_widget(
            Block::default().style(Style::default().bg(colors.bg_primary)),
            frame.area(),
        );

        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(frame.area());

        if !self.session.is_loaded() {
            let loading = Paragraph::new(Span::styled(
                "Loading...",
                Style::default().fg(colors.text_muted),
            ))
            .alignment(Alignment::Center);
            frame.render_widget(loading, main_chunks[0]);
            return;
        }

        let area = centered_column(inset(main_chunks[0], self.session.safe_area()), FRAME_WIDTH);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(CARD_HEIGHT),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(area);

        let width = area.width as usize;
        let title = Paragraph::new(vec![
            Line::from(Span::styled(
                truncate_with_ellipsis(&self.settings.project_title, width),
                Style::default()
                    .fg(colors.text_primary)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                truncate_with_ellipsis(&self.settings.project_description, width),
                Style::default().fg(colors.border_muted),
            )),
        ])
        .alignment(Alignment::Center);
        frame.render_widget(title, chunks[0]);

        self.render_stats_card(frame, chunks[1]);
        self.render_actions(frame, chunks[3]);
        self.render_frame_status(frame, chunks[4]);
        self.render_status_bar(frame, main_chunks[1]);
    }

    fn render_actions(&self, frame: &mut Frame, area: Rect) {
        let colors = self.theme.colors();
        let key = Style::default()
            .fg(colors.text_primary)
            .add_modifier(Modifier::BOLD);

        let profile_style = if self.session.username().is_some() {
            Style::default().bg(colors.accent_bark).fg(colors.text_primary)
        } else {
            Style::default().fg(colors.border_muted)
        };

        let actions = Paragraph::new(Line::from(vec![
            Span::styled(
                " 🌰 Share Stats ",
                Style::default().bg(colors.accent_amber).fg(colors.text_primary),
            ),
            Span::styled(" s ", key),
            Span::raw("  "),
            Span::styled(" 📊 Profile ", profile_style),
            Span::styled(" p ", key),
        ]))
        .alignment(Alignment::Center);
        frame.render_widget(actions, area);
    }

    fn render_frame_status(&self, frame: &mut Frame, area: Rect) {
        let colors = self.theme.colors();
        let line = match self.session.status() {
            Some(msg) => {
                let color = if msg.starts_with("Error") {
                    colors.error
                } else if msg.starts_with("Not added") {
                    colors.accent_acorn
                } else {
                    colors.info
                };
                Span::styled(
                    truncate_with_ellipsis(msg, area.width as usize),
                    Style::default().fg(color),
                )
            }
            None if self.session.is_added() => Span::styled(
                format!("Frame added · fid {}", self.session.fid()),
                Style::default().fg(colors.success),
            ),
            None => Span::styled(
                "Frame not added (a to add)",
                Style::default().fg(colors.text_muted),
            ),
        };
        frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let colors = self.theme.colors();
        let k = Style::default()
            .fg(colors.text_label)
            .add_modifier(Modifier::BOLD);
        let t = Style::default().fg(colors.border_muted);
        let sep = Span::styled(" │ ", Style::default().fg(colors.border_muted));

        let spans = vec![
            Span::styled("s", k),
            Span::styled(" share", t),
            sep.clone(),
            Span::styled("p", k),
            Span::styled(" profile", t),
            sep.clone(),
            Span::styled("a", k),
            Span::styled(" add", t),
            sep.clone(),
            Span::styled("x", k),
            Span::styled(" remove", t),
            sep.clone(),
            Span::styled("n", k),
            Span::styled(" notify", t),
            sep.clone(),
            Span::styled("Enter", k),
            Span::styled(" primary", t),
            sep,
            Span::styled("Esc/q", k),
            Span::styled(" quit", t),
        ];

        let status_bar = Paragraph::new(Line::from(spans))
            .style(Style::default().bg(colors.bg_status))
            .alignment(Alignment::Center);
        frame.render_widget(status_bar, area);
    }
}
