use std::{
    fs::OpenOptions,
    io,
    path::Path,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{error, info};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Position, Rect},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap,
    },
};

use draftpad::{
    config::{Cli, Settings},
    document::Point,
    editor::{KeyOutcome, NoteEditor},
    render::{CursorVisualPosition, RenderResult, render_state},
    store::FileStore,
    theme::Theme,
};

const STATUS_TIMEOUT: Duration = Duration::from_secs(4);
const LOG_FILE: &str = "draftpad.log";
const TOAST_TITLE: &str = "Saved!";
const TOAST_BODY: &str = "Your draft has been saved!";

fn main() -> Result<()> {
    run()
}

fn column_distance(a: u16, b: u16) -> u16 {
    if a >= b { a - b } else { b - a }
}

fn run() -> Result<()> {
    let settings = Settings::from_cli(Cli::parse()).context("invalid configuration")?;

    let store = FileStore::open(&settings.store_dir)
        .with_context(|| format!("failed to open store {}", settings.store_dir.display()))?;
    if let Err(err) = init_logging(store.root()) {
        eprintln!("warning: {err:#}");
    }
    info!("Using store at {}", store.root().display());

    let (editor, warning) = NoteEditor::open(store, settings.toast_timeout);
    let initial_status = warning.map(|err| format!("{err}. Starting with empty document."));
    let mut app = App::new(editor, initial_status);

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;
    terminal.clear().ok();

    let res = run_app(&mut terminal, &mut app).context("application error");

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    res
}

/// Logs go to a file next to the draft; stderr belongs to the terminal UI.
fn init_logging(dir: &Path) -> Result<()> {
    let path = dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .context("failed to initialise logging")?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    while !app.should_quit() {
        terminal
            .draw(|frame| app.draw(frame))
            .context("failed to draw frame")?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout).context("event poll failed")? {
            let evt = event::read().context("failed to read event")?;
            app.handle_event(evt);
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }
    }

    Ok(())
}

struct App {
    editor: NoteEditor<FileStore>,
    theme: Theme,
    scroll_top: usize,
    last_view_height: usize,
    should_quit: bool,
    status_message: Option<(String, Instant)>,
    visual_positions: Vec<CursorDisplay>,
    last_cursor_visual: Option<CursorVisualPosition>,
    preferred_column: Option<u16>,
}

impl App {
    fn new(editor: NoteEditor<FileStore>, initial_status: Option<String>) -> Self {
        Self {
            editor,
            theme: Theme::new(),
            scroll_top: 0,
            last_view_height: 1,
            should_quit: false,
            status_message: initial_status.map(|msg| (msg, Instant::now())),
            visual_positions: Vec::new(),
            last_cursor_visual: None,
            preferred_column: None,
        }
    }

    fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        if area.height == 0 || area.width == 0 {
            return;
        }

        let title_height = if area.height > 2 { 1 } else { 0 };
        let status_height = if area.height > 1 { 2 } else { 1 };
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(title_height),
                Constraint::Min(1),
                Constraint::Length(status_height),
            ])
            .split(area);

        let title_area = vertical[0];
        let editor_area = vertical[1];
        let status_area = vertical[2];

        let title = Paragraph::new(Line::from(Span::styled(
            "Draftpad",
            self.theme.title_style(),
        )));
        frame.render_widget(title, title_area);

        let horizontal = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(editor_area);
        let text_area = horizontal[0];
        let scrollbar_area = horizontal[1];

        let render = render_state(
            self.editor.state(),
            text_area.width.max(1) as usize,
            &self.theme,
        );

        self.visual_positions = render
            .cursor_map
            .iter()
            .cloned()
            .map(|(point, position)| CursorDisplay { point, position })
            .collect();
        let cursor_visual = render.cursor;
        self.last_cursor_visual = cursor_visual;
        if self.preferred_column.is_none() {
            self.preferred_column = cursor_visual.map(|p| p.column);
        }

        let viewport_height = text_area.height as usize;
        self.last_view_height = viewport_height.max(1);
        self.adjust_scroll(&render, viewport_height);

        let paragraph = Paragraph::new(Text::from(render.lines.clone()))
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::NONE))
            .scroll((self.scroll_top as u16, 0));
        frame.render_widget(paragraph, text_area);

        let mut scrollbar_state = ScrollbarState::new(render.total_lines).position(self.scroll_top);
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight);
        frame.render_stateful_widget(scrollbar, scrollbar_area, &mut scrollbar_state);

        if let Some(cursor) = cursor_visual {
            if cursor.line >= self.scroll_top
                && cursor.line < self.scroll_top + viewport_height
                && text_area.width > 0
            {
                let cursor_y = text_area.y + (cursor.line - self.scroll_top) as u16;
                let cursor_x = text_area.x + cursor.column.min(text_area.width - 1);
                frame.set_cursor_position(Position::new(cursor_x, cursor_y));
            }
        }

        let status_widget = Paragraph::new(self.status_line())
            .style(self.theme.status_bar_style())
            .block(Block::default().borders(Borders::TOP));
        frame.render_widget(status_widget, status_area);

        if self.editor.notification().is_visible() {
            self.render_toast(frame, editor_area);
        }
    }

    /// Top-right popup announcing a successful save.
    fn render_toast(&self, frame: &mut Frame, area: Rect) {
        let width = (TOAST_BODY.chars().count() as u16 + 4).min(area.width);
        let height = 3.min(area.height);
        if width < 3 || height < 3 {
            return;
        }

        let popup_area = Rect::new(
            area.x + area.width.saturating_sub(width + 1),
            area.y,
            width,
            height,
        );
        frame.render_widget(Clear, popup_area);

        let toast = Paragraph::new(Line::from(format!(" {TOAST_BODY}")))
            .style(self.theme.toast_style())
            .block(
                Block::default()
                    .title(TOAST_TITLE)
                    .borders(Borders::ALL)
                    .style(self.theme.toast_style())
                    .border_style(self.theme.toast_border_style()),
            );
        frame.render_widget(toast, popup_area);
    }

    fn status_line(&mut self) -> Line<'static> {
        self.prune_status_message();
        let cursor_details = self.cursor_status_text();
        if let Some((message, _)) = &self.status_message {
            return Line::from(format!("{cursor_details} | {message}"));
        }

        let mut spans = vec![Span::raw(cursor_details)];
        if self.editor.is_dirty() {
            spans.push(Span::styled(" *", self.theme.dirty_marker_style()));
        }
        spans.push(Span::raw(" | Ctrl-S save | Ctrl-Q quit"));
        Line::from(spans)
    }

    fn prune_status_message(&mut self) {
        if let Some((_, instant)) = &self.status_message {
            if instant.elapsed() > STATUS_TIMEOUT {
                self.status_message = None;
            }
        }
    }

    fn cursor_status_text(&self) -> String {
        let state = self.editor.state();
        let focus = &state.selection().focus;
        let line = state.block_index(&focus.key).unwrap_or(0) + 1;
        let column = focus.offset + 1;
        let label = state
            .focus_block()
            .map(|block| block.kind().label())
            .unwrap_or("Text");
        format!("[{line},{column}] {label}")
    }

    fn adjust_scroll(&mut self, render: &RenderResult, viewport_height: usize) {
        let viewport = viewport_height.max(1);
        let max_scroll = render
            .total_lines
            .saturating_sub(viewport)
            .min(render.total_lines);
        if self.scroll_top > max_scroll {
            self.scroll_top = max_scroll;
        }
        if let Some(cursor) = &render.cursor {
            if cursor.line < self.scroll_top {
                self.scroll_top = cursor.line;
            } else if cursor.line >= self.scroll_top + viewport_height {
                let target = cursor.line.saturating_add(1);
                self.scroll_top = target.saturating_sub(viewport);
            }
        }
        if self.scroll_top > max_scroll {
            self.scroll_top = max_scroll;
        }
    }

    fn move_cursor_vertical(&mut self, delta: i32, extend: bool) {
        if self.visual_positions.is_empty() {
            return;
        }

        let focus = &self.editor.state().selection().focus;
        let current_position = self
            .visual_positions
            .iter()
            .find(|entry| entry.point == *focus)
            .map(|entry| entry.position)
            .or(self.last_cursor_visual);

        let Some(current) = current_position else {
            return;
        };

        let desired_column = self.preferred_column.unwrap_or(current.column);

        let max_line = self
            .visual_positions
            .iter()
            .map(|entry| entry.position.line)
            .max()
            .unwrap_or(0);

        let target_line = (current.line as i32 + delta).clamp(0, max_line as i32) as usize;

        let destination = self
            .closest_point_on_line(target_line, desired_column)
            .or_else(|| self.search_nearest_line(target_line, delta, desired_column));

        if let Some(dest) = destination {
            self.editor.move_to(&dest.point, extend);
            self.preferred_column = Some(desired_column);
            self.last_cursor_visual = Some(dest.position);
        }
    }

    fn closest_point_on_line(&self, line: usize, column: u16) -> Option<CursorDisplay> {
        self.visual_positions
            .iter()
            .filter(|entry| entry.position.line == line)
            .min_by_key(|entry| column_distance(entry.position.column, column))
            .cloned()
    }

    fn search_nearest_line(
        &self,
        start_line: usize,
        delta: i32,
        column: u16,
    ) -> Option<CursorDisplay> {
        if delta == 0 {
            return None;
        }
        let max_line = self
            .visual_positions
            .iter()
            .map(|entry| entry.position.line)
            .max()
            .unwrap_or(0);

        let mut distance = 1usize;
        loop {
            if delta < 0 {
                if let Some(line) = start_line.checked_sub(distance) {
                    if let Some(found) = self.closest_point_on_line(line, column) {
                        return Some(found);
                    }
                } else {
                    break;
                }
            } else {
                let line = start_line + distance;
                if line > max_line {
                    break;
                }
                if let Some(found) = self.closest_point_on_line(line, column) {
                    return Some(found);
                }
            }

            if distance > max_line.saturating_add(1) {
                break;
            }
            distance += 1;
        }

        None
    }

    fn handle_event(&mut self, event: Event) {
        let Event::Key(key) = event else {
            return;
        };
        if key.kind != KeyEventKind::Press {
            return;
        }

        match self.editor.handle_key(&key) {
            Ok(KeyOutcome::Handled) => {
                self.preferred_column = None;
            }
            Ok(KeyOutcome::Vertical { delta, extend }) => {
                self.move_cursor_vertical(delta, extend);
            }
            Ok(KeyOutcome::Quit) => {
                self.should_quit = true;
            }
            Ok(KeyOutcome::NotHandled) => self.scroll(&key),
            Err(err) => {
                error!("Save failed: {err}");
                self.status_message = Some((format!("Save failed: {err}"), Instant::now()));
            }
        }
    }

    fn scroll(&mut self, key: &KeyEvent) {
        let page = self.last_view_height.max(1);
        match (key.code, key.modifiers) {
            (KeyCode::Up, m) if m.contains(KeyModifiers::CONTROL) => {
                self.scroll_top = self.scroll_top.saturating_sub(page);
            }
            (KeyCode::Down, m) if m.contains(KeyModifiers::CONTROL) => {
                self.scroll_top += page;
            }
            (KeyCode::PageUp, _) => {
                self.scroll_top = self.scroll_top.saturating_sub(page);
            }
            (KeyCode::PageDown, _) => {
                self.scroll_top += page;
            }
            _ => {}
        }
    }

    fn on_tick(&mut self) {
        self.editor.tick(Instant::now());
        self.prune_status_message();
    }
}

#[derive(Clone)]
struct CursorDisplay {
    point: Point,
    position: CursorVisualPosition,
}
