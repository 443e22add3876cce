//! Interactive terminal view of an intent/slot distribution.

use std::io::{self, stdout};
use std::time::{Duration, Instant};

use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

use crate::analyze::{Counter, Distribution, render_markdown};

const BAR_WIDTH: usize = 30;

// Which pane has focus
#[derive(Clone, Copy, PartialEq, Debug)]
enum Pane {
    Intents,
    Slots,
    Values,
}

impl Pane {
    fn next(self) -> Self {
        match self {
            Pane::Intents => Pane::Slots,
            Pane::Slots => Pane::Values,
            Pane::Values => Pane::Intents,
        }
    }
}

struct App<'a> {
    distribution: &'a Distribution,
    values_markdown: String,
    focus: Pane,
    scroll: [usize; 3],
    should_quit: bool,
    last_ctrl_c: Option<Instant>,
    status_message: Option<String>,
}

impl<'a> App<'a> {
    fn new(distribution: &'a Distribution, top_values: usize) -> Self {
        Self {
            distribution,
            values_markdown: render_markdown(distribution, top_values),
            focus: Pane::Intents,
            scroll: [0; 3],
            should_quit: false,
            last_ctrl_c: None,
            status_message: None,
        }
    }

    fn scroll_mut(&mut self) -> &mut usize {
        let idx = match self.focus {
            Pane::Intents => 0,
            Pane::Slots => 1,
            Pane::Values => 2,
        };
        &mut self.scroll[idx]
    }

    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        self.status_message = None;

        if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            if let Some(last) = self.last_ctrl_c {
                if last.elapsed().as_secs() < 2 {
                    self.should_quit = true;
                    return;
                }
            }
            self.last_ctrl_c = Some(Instant::now());
            self.status_message = Some("Press Ctrl+C again to quit".into());
            return;
        }

        match code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::Up => {
                let scroll = self.scroll_mut();
                *scroll = scroll.saturating_sub(1);
            }
            KeyCode::Down => {
                let scroll = self.scroll_mut();
                *scroll = scroll.saturating_add(1);
            }
            _ => {}
        }
    }
}

/// Run the view until the user quits. Restores the terminal on the way out.
pub fn run(distribution: &Distribution, top_values: usize) -> io::Result<()> {
    enable_raw_mode()?;
    if let Err(e) = stdout().execute(EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e);
    }

    let result = event_loop(distribution, top_values);

    // Restore both modes even if one of them fails
    let raw = disable_raw_mode();
    let screen = stdout().execute(LeaveAlternateScreen).map(|_| ());
    first_error([result, raw, screen])
}

/// The first error in order, so a failing view is reported over a failing restore.
fn first_error<const N: usize>(results: [io::Result<()>; N]) -> io::Result<()> {
    results.into_iter().collect()
}

fn event_loop(distribution: &Distribution, top_values: usize) -> io::Result<()> {
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    let mut app = App::new(distribution, top_values);

    while !app.should_quit {
        terminal.draw(|frame| ui(frame, &app))?;
        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code, key.modifiers);
                }
            }
        }
    }
    Ok(())
}

fn ui(frame: &mut Frame, app: &App) {
    let status_height = if app.status_message.is_some() { 1 } else { 0 };
    let rows = Layout::vertical([Constraint::Min(1), Constraint::Length(status_height)]).split(frame.area());

    let columns = Layout::horizontal([
        Constraint::Percentage(30),
        Constraint::Percentage(30),
        Constraint::Percentage(40),
    ])
    .split(rows[0]);

    let title = format!(" Intents ({} records) ", app.distribution.records);
    render_counter(frame, columns[0], app, Pane::Intents, &title, &app.distribution.intents);
    render_counter(frame, columns[1], app, Pane::Slots, " Slots ", &app.distribution.slots);
    render_values(frame, columns[2], app);

    if let Some(msg) = &app.status_message {
        let status = Paragraph::new(msg.as_str()).style(Style::default().fg(Color::Yellow).bold());
        frame.render_widget(status, rows[1]);
    }
}

fn border_style(app: &App, pane: Pane) -> Style {
    if app.focus == pane {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

/// `count` scaled against `max` as a bar of block characters.
fn bar(count: usize, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let width = (count * BAR_WIDTH).div_ceil(max).max(1);
    "█".repeat(width)
}

fn render_counter(frame: &mut Frame, area: Rect, app: &App, pane: Pane, title: &str, counter: &Counter) {
    let entries = counter.most_common();
    let max = entries.first().map(|(_, count)| *count).unwrap_or(0);
    let skip = app.scroll[pane as usize].min(entries.len().saturating_sub(1));

    let items: Vec<ListItem> = entries
        .iter()
        .skip(skip)
        .map(|(key, count)| {
            ListItem::new(vec![
                Line::from(vec![Span::styled(key.to_string(), Style::default().bold()), Span::raw(format!("  {}", count))]),
                Line::styled(bar(*count, max), Style::default().fg(Color::Green)),
            ])
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_style(border_style(app, pane)),
    );
    frame.render_widget(list, area);
}

fn render_values(frame: &mut Frame, area: Rect, app: &App) {
    let parsed = tui_markdown::from_str(&app.values_markdown);
    let lines: Vec<Line> = parsed.lines.iter().cloned().collect();

    let inner = Block::default().borders(Borders::ALL).inner(area);
    let max_scroll = lines.len().saturating_sub(inner.height as usize);
    let scroll = app.scroll[Pane::Values as usize].min(max_scroll);

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll as u16, 0))
        .block(
            Block::default()
                .title(" Slot values (Tab switch, ↑↓ scroll, q quit) ")
                .borders(Borders::ALL)
                .border_style(border_style(app, Pane::Values)),
        );
    frame.render_widget(paragraph, area);
}
