use anyhow::Result;
use chronicle::common::ChronicleConfig;
use chronicle::context::build_context;
use chronicle::prompt::{FixedConfirm, NoticeBoard};
use chronicle::timeline::render_insight;
use chronicle::{DeleteOutcome, LoadSource, SaveError, StateController};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use std::{fs::File, io, sync::Arc};
use tracing_subscriber::FmtSubscriber;
use unicode_width::UnicodeWidthStr;

// Each timeline entry takes a heading, a detail line and a spacer.
const LINES_PER_ENTRY: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Time,
    Description,
}

impl Field {
    fn next(self) -> Self {
        match self {
            Field::Name => Field::Time,
            Field::Time => Field::Description,
            Field::Description => Field::Name,
        }
    }

    fn previous(self) -> Self {
        match self {
            Field::Name => Field::Description,
            Field::Time => Field::Name,
            Field::Description => Field::Time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Timeline,
    Editor(Field),
    ConfirmDelete(String),
}

/// Work that has to await the controller, run after a redraw.
enum Action {
    Save,
    Delete(String),
    Analyze,
}

struct App {
    controller: StateController,
    notices: NoticeBoard,
    mode: Mode,
    selected: usize,
    status: Option<String>,
    busy: Option<&'static str>,
    quit: bool,
}

impl App {
    fn new(controller: StateController, notices: NoticeBoard) -> Self {
        Self {
            controller,
            notices,
            mode: Mode::Timeline,
            selected: 0,
            status: None,
            busy: None,
            quit: false,
        }
    }

    fn selected_id(&self) -> Option<String> {
        self.controller
            .activities()
            .get(self.selected)
            .map(|a| a.id.clone())
    }

    fn clamp_selection(&mut self) {
        let len = self.controller.activities().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit = true;
            return None;
        }

        match self.mode.clone() {
            Mode::Timeline => self.handle_timeline_key(key),
            Mode::Editor(field) => self.handle_editor_key(field, key),
            Mode::ConfirmDelete(id) => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.mode = Mode::Timeline;
                    Some(Action::Delete(id))
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.mode = Mode::Timeline;
                    None
                }
                _ => None,
            },
        }
    }

    fn handle_timeline_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char('q') => self.quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected += 1;
                self.clamp_selection();
            }
            KeyCode::Char('n') => {
                self.controller.open_create();
                self.mode = Mode::Editor(Field::Name);
            }
            KeyCode::Enter | KeyCode::Char('e') => {
                if let Some(id) = self.selected_id() {
                    if self.controller.open_edit(&id) {
                        self.mode = Mode::Editor(Field::Name);
                    }
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_id() {
                    self.mode = Mode::ConfirmDelete(id);
                }
            }
            KeyCode::Char('s') if !self.controller.activities().is_empty() => {
                return Some(Action::Analyze);
            }
            KeyCode::Char('x') => self.controller.dismiss_insight(),
            _ => {}
        }
        None
    }

    fn handle_editor_key(&mut self, field: Field, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc => {
                self.controller.cancel_edit();
                self.mode = Mode::Timeline;
            }
            KeyCode::Enter => return Some(Action::Save),
            KeyCode::Tab | KeyCode::Down => self.mode = Mode::Editor(field.next()),
            KeyCode::BackTab | KeyCode::Up => self.mode = Mode::Editor(field.previous()),
            KeyCode::Backspace => {
                field_value(self.controller.form_mut(), field).pop();
            }
            KeyCode::Char(c) => field_value(self.controller.form_mut(), field).push(c),
            _ => {}
        }
        None
    }

    async fn perform(&mut self, action: Action) {
        self.status = None;
        match action {
            Action::Save => match self.controller.submit_editor().await {
                Ok(saved) => {
                    self.mode = Mode::Timeline;
                    if let Some(index) = self.controller.activities().iter().position(|a| a.id == saved.id) {
                        self.selected = index;
                    }
                }
                Err(SaveError::Invalid(e)) => self.status = Some(e.to_string()),
                // The notice board already carries the message.
                Err(SaveError::Sync) => {}
            },
            Action::Delete(id) => {
                if self.controller.delete_confirmed(&id).await == DeleteOutcome::Deleted {
                    self.clamp_selection();
                }
            }
            Action::Analyze => {
                self.controller.request_analysis().await;
            }
        }

        if let Some(notice) = self.notices.drain().pop() {
            self.status = Some(notice);
        }
    }
}

fn field_value(form: &mut chronicle::RecordEditor, field: Field) -> &mut String {
    match field {
        Field::Name => &mut form.name,
        Field::Time => &mut form.time,
        Field::Description => &mut form.description,
    }
}

fn ui(f: &mut Frame, app: &App) {
    let has_insight = app.controller.insight().is_some();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                                      // Header
            Constraint::Min(0),                                         // Timeline
            Constraint::Length(if has_insight { 10 } else { 0 }),       // Synthesis
            Constraint::Length(1),                                      // Status / help
        ])
        .split(f.size());

    render_header(f, app, chunks[0]);
    render_timeline(f, app, chunks[1]);
    if let Some(insight) = app.controller.insight() {
        let text: Vec<Line> = render_insight(insight).into_iter().map(Line::from).collect();
        let panel = Paragraph::new(text)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Daily Synthesis (x to discard)"));
        f.render_widget(panel, chunks[2]);
    }
    render_status(f, app, chunks[3]);

    match &app.mode {
        Mode::Editor(field) => render_editor(f, app, *field),
        Mode::ConfirmDelete(_) => {
            let area = centered_rect(40, 5, f.size());
            f.render_widget(Clear, area);
            f.render_widget(
                Paragraph::new("Delete this record? (y/n)")
                    .alignment(Alignment::Center)
                    .block(Block::default().borders(Borders::ALL).title("Confirm")),
                area,
            );
        }
        Mode::Timeline => {}
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(
        "Chronicle",
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if app.controller.load_source() == Some(LoadSource::Mirror) {
        spans.push(Span::styled("  (local mirror)", Style::default().fg(Color::DarkGray)));
    }
    if let Some(busy) = app.busy {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(busy, Style::default().fg(Color::Blue)));
    }
    let header = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title("Minimal architecture for your days"));
    f.render_widget(header, area);
}

fn render_timeline(f: &mut Frame, app: &App, area: Rect) {
    let activities = app.controller.activities();
    let block = Block::default().borders(Borders::ALL).title("Timeline");

    if activities.is_empty() {
        let empty = Paragraph::new("The timeline is silent. Press n to begin journaling.")
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let mut lines = Vec::with_capacity(activities.len() * LINES_PER_ENTRY);
    for (index, activity) in activities.iter().enumerate() {
        let mut style = Style::default();
        if index == app.selected {
            style = style.add_modifier(Modifier::REVERSED);
        }
        // Alternate sides of the rail like a vertical timeline.
        let alignment = if index % 2 == 0 { Alignment::Left } else { Alignment::Right };
        lines.push(
            Line::from(vec![
                Span::styled(activity.time.clone(), style.add_modifier(Modifier::BOLD)),
                Span::styled(format!("  {}", activity.name), style),
            ])
            .alignment(alignment),
        );
        lines.push(
            Line::from(Span::styled(
                activity.description.clone().unwrap_or_default(),
                Style::default().fg(Color::DarkGray),
            ))
            .alignment(alignment),
        );
        lines.push(Line::from("|").alignment(Alignment::Center));
    }

    let visible = area.height.saturating_sub(2) as usize;
    let timeline = Paragraph::new(lines)
        .block(block)
        .scroll((scroll_offset(app.selected, visible) as u16, 0));
    f.render_widget(timeline, area);
}

fn render_status(f: &mut Frame, app: &App, area: Rect) {
    let line = match &app.status {
        Some(status) => Line::from(Span::styled(status.clone(), Style::default().fg(Color::Red))),
        None => Line::from(Span::styled(
            "n new  e edit  d delete  s synthesize  q quit",
            Style::default().fg(Color::DarkGray),
        )),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn render_editor(f: &mut Frame, app: &App, focus: Field) {
    let area = centered_rect(50, 11, f.size());
    f.render_widget(Clear, area);

    let title = if app.controller.selected().is_some() {
        "Refine Event"
    } else {
        "New Chronicle"
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(inner);

    let form = app.controller.form();
    let fields = [
        (Field::Name, "Activity Name", form.name.as_str()),
        (Field::Time, "Time (HH:MM)", form.time.as_str()),
        (Field::Description, "Brief Description", form.description.as_str()),
    ];

    for ((field, label, value), row) in fields.into_iter().zip(rows.iter()) {
        let border = if field == focus {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        f.render_widget(
            Paragraph::new(value).block(Block::default().borders(Borders::ALL).border_style(border).title(label)),
            *row,
        );
        if field == focus {
            f.set_cursor(row.x + value.width() as u16 + 1, row.y + 1);
        }
    }
}

/// First line to show so the selected entry stays on screen.
fn scroll_offset(selected: usize, visible: usize) -> usize {
    let bottom = (selected + 1) * LINES_PER_ENTRY;
    bottom.saturating_sub(visible)
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn init_logging() -> Result<()> {
    // Logging to the terminal would tear the UI, so only log when asked to.
    if let Ok(path) = std::env::var("CHRONICLE_LOG") {
        let file = File::create(path)?;
        let subscriber = FmtSubscriber::builder()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(Arc::new(file))
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }
    Ok(())
}

async fn run_app() -> Result<()> {
    let config = ChronicleConfig::from_env()?;
    let notices = NoticeBoard::new();
    // Deletion is confirmed by the modal before the controller is asked.
    let ctx = build_context(&config, Box::new(FixedConfirm(true)), Box::new(notices.clone())).await?;
    let mut app = App::new(StateController::new(ctx), notices);

    // Terminal initialization
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let outcome = event_loop(&mut terminal, &mut app).await;
    settle(outcome, restore_terminal(&mut terminal))
}

/// A failure inside the loop takes precedence over one while restoring.
fn settle(outcome: Result<()>, restored: Result<()>) -> Result<()> {
    outcome.and(restored)
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    app.busy = Some("Establishing connection");
    terminal.draw(|f| ui(f, app))?;
    app.controller.load_initial().await;
    app.busy = None;

    while !app.quit {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(action) = app.handle_key(key) {
                    app.busy = Some(match action {
                        Action::Analyze => "Analyzing flow...",
                        Action::Save | Action::Delete(_) => "Syncing",
                    });
                    terminal.draw(|f| ui(f, app))?;
                    app.perform(action).await;
                    app.busy = None;
                }
            }
        }
    }
    Ok(())
}

/// Leaves raw mode and the alternate screen, whether or not the loop failed.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_logging()?;

    run_app().await
}
