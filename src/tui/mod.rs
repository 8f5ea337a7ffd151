// src/tui/mod.rs
use crate::types::{Notification, UiEvent};
use crossterm::{
    cursor,
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Terminal,
};
use std::{io, time::Duration};
use tokio::sync::mpsc;

pub struct Dashboard {
    pub strategy: String,
    pub log_tail: usize,
    pub signals: usize,
    pub orders: usize,
    pub blocked: usize,
    pub notifications: Vec<String>,
    pub logs: Vec<String>,
}

impl Dashboard {
    pub fn new(strategy: String, log_tail: usize) -> Self {
        Self {
            strategy,
            log_tail: log_tail.max(1),
            signals: 0,
            orders: 0,
            blocked: 0,
            notifications: Vec::new(),
            logs: Vec::new(),
        }
    }

    pub fn on_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Notification(n) => {
                match &n {
                    Notification::SignalDetected { .. } => self.signals += 1,
                    Notification::OrderPlaced { .. } => self.orders += 1,
                    Notification::InsufficientMargin { .. } | Notification::OrderFailed { .. } => {
                        self.blocked += 1
                    }
                }
                self.notifications.push(describe(&n));
                if self.notifications.len() > self.log_tail {
                    self.notifications.remove(0);
                }
            }
            UiEvent::Log(msg) => {
                self.logs.push(msg);
                if self.logs.len() > self.log_tail {
                    self.logs.remove(0);
                }
            }
        }
    }
}

fn describe(n: &Notification) -> String {
    match n {
        Notification::SignalDetected {
            instrument,
            signal,
            last_price,
            reason,
            ..
        } => format!("{} {} @ {:.2} ({})", signal, instrument, last_price, reason),
        Notification::InsufficientMargin {
            instrument,
            needed,
            available,
            ..
        } => format!(
            "MARGIN {}: need {:.2}, have {:.2}",
            instrument, needed, available
        ),
        Notification::OrderPlaced {
            instrument,
            quantity,
            order_id,
        } => format!("ORDER {} x{} -> {}", instrument, quantity, order_id),
        Notification::OrderFailed { instrument, error } => {
            format!("FAILED {}: {}", instrument, error)
        }
    }
}

fn style_for(line: &str) -> Style {
    if line.starts_with("ORDER") {
        Style::default().fg(Color::Green)
    } else if line.starts_with("MARGIN") || line.starts_with("FAILED") {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Yellow)
    }
}

/// Runs `restore` when dropped, including on an early `?` return.
struct Teardown<F: FnMut()> {
    restore: F,
}

impl<F: FnMut()> Drop for Teardown<F> {
    fn drop(&mut self) {
        (self.restore)();
    }
}

fn restore_terminal() {
    // Best effort: the terminal may already be partly restored.
    let _ = disable_raw_mode();
    let _ = execute!(
        io::stdout(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        cursor::Show
    );
}

pub async fn run(
    mut rx: mpsc::Receiver<UiEvent>,
    strategy: String,
    log_tail: usize,
) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let _teardown = Teardown {
        restore: restore_terminal,
    };
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = Dashboard::new(strategy, log_tail);

    loop {
        terminal.draw(|f| ui(f, &app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if let KeyCode::Char('q') = key.code {
                    break;
                }
            }
        }

        while let Ok(event) = rx.try_recv() {
            app.on_event(event);
        }
    }

    Ok(())
}

fn ui(f: &mut ratatui::Frame, app: &Dashboard) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(12),
            ]
            .as_ref(),
        )
        .split(f.size());

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            format!("Notify + Auto-Buy [{}]", app.strategy),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | Signals: "),
        Span::styled(
            app.signals.to_string(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | Orders: "),
        Span::styled(
            app.orders.to_string(),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | Blocked/Failed: "),
        Span::styled(
            app.blocked.to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | q to quit"),
    ]))
    .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(header, chunks[0]);

    let notifications: Vec<ListItem> = app
        .notifications
        .iter()
        .rev()
        .map(|s| ListItem::new(Line::from(Span::styled(s, style_for(s)))))
        .collect();

    let notifications_list = List::new(notifications)
        .block(Block::default().borders(Borders::ALL).title("Notifications"));
    f.render_widget(notifications_list, chunks[1]);

    let logs: Vec<ListItem> = app
        .logs
        .iter()
        .rev()
        .map(|s| ListItem::new(Line::from(Span::raw(s))))
        .collect();

    let logs_list =
        List::new(logs).block(Block::default().borders(Borders::ALL).title("Execution Log"));
    f.render_widget(logs_list, chunks[2]);
}
