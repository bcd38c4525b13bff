//! Interactive terminal chat: sidebar, thread and composer

use anyhow::Result;
use crossterm::event::{self, Event as CEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ocean_chat_core::config::UiConfig;
use ocean_chat_core::exchange::{PendingSend, Resolution};
use ocean_chat_core::{ChatBackend, Message, Role, SessionStore};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use std::io;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

const WELCOME_BADGE: &str = "Welcome";
const WELCOME_TITLE: &str = "How can I help today?";
const WELCOME_HINT: &str = "Ask about your data, projects, or general knowledge. I blend context with retrieval to craft helpful, concise answers.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Sidebar,
    Composer,
}

struct TuiApp {
    store: SessionStore,
    input: String,
    focus: Focus,
    /// Row 0 is the "+ New chat" entry, conversations follow
    sidebar_row: usize,
    /// Lines scrolled up from the bottom of the thread
    scroll_back: u16,
    should_quit: bool,
    assistant_name: String,
    subtitle: String,
}

impl TuiApp {
    fn new(store: SessionStore, ui: &UiConfig) -> Self {
        let mut app = Self {
            store,
            input: String::new(),
            focus: Focus::Composer,
            sidebar_row: 0,
            scroll_back: 0,
            should_quit: false,
            assistant_name: ui.assistant_name.clone(),
            subtitle: ui.subtitle.clone(),
        };
        app.sync_sidebar_row();
        app
    }

    fn sync_sidebar_row(&mut self) {
        let active = self.store.active_id();
        self.sidebar_row = self
            .store
            .conversations()
            .iter()
            .position(|c| Some(c.id.as_str()) == active)
            .map(|i| i + 1)
            .unwrap_or(0);
    }

    fn new_chat(&mut self) {
        self.store.create_conversation();
        self.sync_sidebar_row();
        self.scroll_back = 0;
        self.focus = Focus::Composer;
    }

    fn move_selection(&mut self, down: bool) {
        let rows = self.store.conversations().len() + 1;
        self.sidebar_row = if down {
            (self.sidebar_row + 1).min(rows - 1)
        } else {
            self.sidebar_row.saturating_sub(1)
        };
        if self.sidebar_row > 0 {
            let id = self.store.conversations()[self.sidebar_row - 1].id.clone();
            self.store.select(&id);
            self.scroll_back = 0;
        }
    }

    /// Send the composer contents; slash commands are handled here too
    fn submit(&mut self) -> Option<PendingSend> {
        let content = self.input.trim().to_string();
        match content.as_str() {
            "" => None,
            "/quit" => {
                self.input.clear();
                self.should_quit = true;
                None
            }
            "/new" => {
                self.input.clear();
                self.new_chat();
                None
            }
            _ => {
                // Text stays in the composer while a send is in flight
                let pending = self.store.begin_send(&content)?;
                self.input.clear();
                self.scroll_back = 0;
                Some(pending)
            }
        }
    }

    fn apply_resolution(&mut self, pending: &PendingSend, resolution: &Resolution) {
        self.store.apply(pending, resolution);
        if self.store.active_id() == Some(pending.conversation_id()) {
            self.scroll_back = 0;
        }
    }

    /// Returns a send to dispatch when the key submitted the composer
    fn handle_key(&mut self, key: KeyEvent) -> Option<PendingSend> {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('n') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.new_chat();
            }
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Sidebar => Focus::Composer,
                    Focus::Composer => Focus::Sidebar,
                };
            }
            KeyCode::PageUp => self.scroll_back = self.scroll_back.saturating_add(5),
            KeyCode::PageDown => self.scroll_back = self.scroll_back.saturating_sub(5),
            _ => match self.focus {
                Focus::Sidebar => self.handle_sidebar_key(key),
                Focus::Composer => return self.handle_composer_key(key),
            },
        }
        None
    }

    fn handle_sidebar_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.move_selection(false),
            KeyCode::Down => self.move_selection(true),
            KeyCode::Enter if self.sidebar_row == 0 => self.new_chat(),
            KeyCode::Enter => self.focus = Focus::Composer,
            _ => {}
        }
    }

    fn handle_composer_key(&mut self, key: KeyEvent) -> Option<PendingSend> {
        match key.code {
            KeyCode::Enter
                if key
                    .modifiers
                    .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) =>
            {
                self.input.push('\n');
            }
            KeyCode::Enter => return self.submit(),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(ch) => self.input.push(ch),
            _ => {}
        }
        None
    }

    fn thread_lines(&self) -> Vec<Line<'static>> {
        let messages = self
            .store
            .active()
            .map(|c| c.messages.as_slice())
            .unwrap_or_default();

        if messages.is_empty() {
            return vec![
                Line::from(Span::styled(
                    WELCOME_BADGE,
                    Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    WELCOME_TITLE,
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(WELCOME_HINT, Style::default().fg(Color::Gray))),
            ];
        }

        let mut lines = Vec::new();
        for message in messages {
            lines.extend(message_lines(message));
            lines.push(Line::default());
        }
        if self.store.is_loading() {
            lines.push(Line::from(Span::styled(
                "AI is typing…",
                Style::default().fg(Color::DarkGray),
            )));
        }
        lines
    }
}

fn message_lines(message: &Message) -> Vec<Line<'static>> {
    let (label, color) = match message.role {
        Role::User => ("you", Color::Cyan),
        Role::Assistant => ("AI", Color::Green),
    };
    let mut header = vec![Span::styled(
        format!("[{}]", label),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )];
    if let Some(ts) = message.timestamp {
        header.push(Span::styled(
            format!(" {}", ts.with_timezone(&chrono::Local).format("%H:%M")),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let mut lines = vec![Line::from(header)];
    lines.extend(
        message
            .content
            .split('\n')
            .map(|text| Line::from(text.to_string())),
    );
    lines
}

fn draw(frame: &mut Frame, app: &TuiApp) {
    let error_height = if app.store.error().is_some() { 3 } else { 0 };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(error_height),
            Constraint::Length(5),
        ])
        .split(frame.area());

    let status = if app.store.is_loading() { "sending" } else { "idle" };
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                app.assistant_name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("  {}  ", app.subtitle)),
            Span::styled(format!("[{}]", status), Style::default().fg(Color::DarkGray)),
        ]))
        .block(Block::default().borders(Borders::ALL).title("ocean-chat")),
        rows[0],
    );

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(rows[1]);

    draw_sidebar(frame, app, body[0]);
    draw_thread(frame, app, body[1]);

    if let Some(error) = app.store.error() {
        frame.render_widget(
            Paragraph::new(format!("⚠ {}", error))
                .style(Style::default().fg(Color::Red))
                .block(Block::default().borders(Borders::ALL).title("error"))
                .wrap(Wrap { trim: false }),
            rows[2],
        );
    }

    let composer_title = if app.store.is_loading() {
        "Sending…"
    } else {
        "Type your message… (Enter send, Shift+Enter newline)"
    };
    let composer_style = if app.focus == Focus::Composer {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    frame.render_widget(
        Paragraph::new(app.input.clone())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(composer_style)
                    .title(composer_title),
            )
            .wrap(Wrap { trim: false }),
        rows[3],
    );
    if app.focus == Focus::Composer {
        let last_line = app.input.rsplit('\n').next().unwrap_or_default();
        let line_count = app.input.matches('\n').count() as u16;
        frame.set_cursor_position((
            rows[3].x + 1 + last_line.chars().count() as u16,
            rows[3].y + 1 + line_count,
        ));
    }
}

fn draw_sidebar(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let mut items = vec![ListItem::new(Line::from(Span::styled(
        "+ New chat",
        Style::default().fg(Color::Blue),
    )))];
    for summary in app.store.summaries() {
        let active = app.store.active_id() == Some(summary.id.as_str());
        let title_style = if active {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        items.push(ListItem::new(vec![
            Line::from(Span::styled(summary.title, title_style)),
            Line::from(Span::styled(summary.preview, Style::default().fg(Color::DarkGray))),
        ]));
    }

    let border_style = if app.focus == Focus::Sidebar {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title("chats"),
        )
        .highlight_style(Style::default().bg(Color::DarkGray));
    let mut state = ListState::default().with_selected(Some(app.sidebar_row));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_thread(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let thread = Paragraph::new(app.thread_lines()).wrap(Wrap { trim: false });
    // Scroll works in wrapped rows, so count those rather than logical lines
    let rows = thread.line_count(area.width.saturating_sub(2));
    let total = u16::try_from(rows).unwrap_or(u16::MAX);
    let visible = area.height.saturating_sub(2);
    let scroll = total
        .saturating_sub(visible)
        .saturating_sub(app.scroll_back);

    let title = app
        .store
        .active()
        .map(|c| c.title.clone())
        .unwrap_or_else(|| "thread".to_string());
    frame.render_widget(
        thread
            .block(Block::default().borders(Borders::ALL).title(title))
            .scroll((scroll, 0)),
        area,
    );
}

/// Run the interactive chat until the user quits
pub async fn run(backend: Arc<dyn ChatBackend>, ui: &UiConfig) -> Result<()> {
    let store = SessionStore::initialize(backend.as_ref()).await;

    let (request_tx, mut request_rx) = mpsc::unbounded_channel::<PendingSend>();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<(PendingSend, Resolution)>();

    let worker_backend = Arc::clone(&backend);
    tokio::spawn(async move {
        while let Some(pending) = request_rx.recv().await {
            let outcome = worker_backend.send_message(pending.text()).await;
            let resolution = pending.resolve(outcome);
            if event_tx.send((pending, resolution)).is_err() {
                break;
            }
        }
    });

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = TuiApp::new(store, ui);
    info!("TUI started");
    let result = event_loop(&mut terminal, &mut app, &request_tx, &mut event_rx);

    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    info!("TUI stopped");
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut TuiApp,
    request_tx: &mpsc::UnboundedSender<PendingSend>,
    event_rx: &mut mpsc::UnboundedReceiver<(PendingSend, Resolution)>,
) -> Result<()> {
    loop {
        while let Ok((pending, resolution)) = event_rx.try_recv() {
            debug!("Send to {} resolved", pending.conversation_id());
            app.apply_resolution(&pending, &resolution);
        }

        terminal.draw(|frame| draw(frame, app))?;

        if event::poll(std::time::Duration::from_millis(60))? {
            if let CEvent::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(pending) = app.handle_key(key) {
                        if let Err(e) = request_tx.send(pending) {
                            let pending = e.0;
                            app.apply_resolution(
                                &pending,
                                &Resolution::Failed("send worker stopped".to_string()),
                            );
                        }
                    }
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocean_chat_core::Conversation;
    use ratatui::backend::TestBackend;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut TuiApp, text: &str) {
        for ch in text.chars() {
            app.handle_key(key(KeyCode::Char(ch)));
        }
    }

    fn app() -> TuiApp {
        TuiApp::new(SessionStore::local_fallback(), &UiConfig::default())
    }

    #[test]
    fn test_enter_sends_trimmed_text() {
        let mut app = app();
        type_text(&mut app, "  Hello  ");
        let pending = app.handle_key(key(KeyCode::Enter)).unwrap();

        assert_eq!(pending.text(), "Hello");
        assert!(app.input.is_empty());
        assert_eq!(app.store.active().unwrap().messages.len(), 1);
        assert!(app.store.is_loading());
    }

    #[test]
    fn test_blank_input_is_not_sent() {
        let mut app = app();
        type_text(&mut app, "   ");
        assert!(app.handle_key(key(KeyCode::Enter)).is_none());
        assert_eq!(app.input, "   ");
        assert!(app.store.active().unwrap().messages.is_empty());
    }

    #[test]
    fn test_no_second_send_while_loading() {
        let mut app = app();
        type_text(&mut app, "one");
        let _pending = app.handle_key(key(KeyCode::Enter)).unwrap();

        type_text(&mut app, "two");
        assert!(app.handle_key(key(KeyCode::Enter)).is_none());
        assert_eq!(app.input, "two");
    }

    #[test]
    fn test_shift_enter_inserts_newline() {
        let mut app = app();
        type_text(&mut app, "line one");
        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT));
        type_text(&mut app, "line two");

        assert_eq!(app.input, "line one\nline two");
        let pending = app.handle_key(key(KeyCode::Enter)).unwrap();
        assert_eq!(pending.text(), "line one\nline two");
    }

    #[test]
    fn test_resolution_clears_loading_and_shows_reply() {
        let mut app = app();
        type_text(&mut app, "Hello");
        let pending = app.handle_key(key(KeyCode::Enter)).unwrap();
        let resolution = Resolution::Reply(Message::assistant("Hi there!"));
        app.apply_resolution(&pending, &resolution);

        assert!(!app.store.is_loading());
        let lines = app.thread_lines();
        let text: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        assert!(text.iter().any(|l| l == "Hi there!"));
        assert!(text.iter().any(|l| l == "Hello"));
    }

    #[test]
    fn test_empty_thread_shows_welcome() {
        let app = app();
        let text: Vec<String> = app.thread_lines().iter().map(|l| l.to_string()).collect();
        assert!(text.contains(&"How can I help today?".to_string()));
    }

    #[test]
    fn test_ctrl_n_and_slash_new_create_chats() {
        let mut app = app();
        app.handle_key(KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL));
        assert_eq!(app.store.conversations().len(), 2);
        assert_eq!(app.sidebar_row, 1);

        type_text(&mut app, "/new");
        assert!(app.handle_key(key(KeyCode::Enter)).is_none());
        assert_eq!(app.store.conversations().len(), 3);
    }

    #[test]
    fn test_sidebar_navigation_selects_conversations() {
        let store = SessionStore::from_history(vec![Conversation::new("c1"), Conversation::new("c2")]);
        let mut app = TuiApp::new(store, &UiConfig::default());
        assert_eq!(app.sidebar_row, 1);

        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.store.active_id(), Some("c2"));

        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.store.active_id(), Some("c2"));

        app.handle_key(key(KeyCode::Up));
        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.sidebar_row, 0);
        assert_eq!(app.store.active_id(), Some("c1"));

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.store.conversations().len(), 3);
        assert_eq!(app.focus, Focus::Composer);
    }

    fn render(app: &TuiApp) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn long_reply() -> String {
        let mut reply = "word ".repeat(120);
        reply.push_str("ENDMARK");
        reply
    }

    #[test]
    fn test_wrapped_reply_tail_is_visible() {
        let mut app = app();
        type_text(&mut app, "Hello");
        let pending = app.handle_key(key(KeyCode::Enter)).unwrap();
        app.apply_resolution(&pending, &Resolution::Reply(Message::assistant(long_reply())));

        let screen = render(&app);
        assert!(screen.contains("ENDMARK"));
    }

    #[test]
    fn test_page_up_reaches_top_of_wrapped_thread() {
        let mut app = app();
        type_text(&mut app, "Hello");
        let pending = app.handle_key(key(KeyCode::Enter)).unwrap();
        app.apply_resolution(&pending, &Resolution::Reply(Message::assistant(long_reply())));
        assert!(!render(&app).contains("[you]"));

        for _ in 0..10 {
            app.handle_key(key(KeyCode::PageUp));
        }
        assert!(render(&app).contains("[you]"));
    }

    #[test]
    fn test_slash_commands_work_while_sending() {
        let mut app = app();
        type_text(&mut app, "Hello");
        let _pending = app.handle_key(key(KeyCode::Enter)).unwrap();
        assert!(app.store.is_loading());

        type_text(&mut app, "/new");
        assert!(app.handle_key(key(KeyCode::Enter)).is_none());
        assert_eq!(app.store.conversations().len(), 2);
        assert!(app.input.is_empty());

        type_text(&mut app, "/quit");
        app.handle_key(key(KeyCode::Enter));
        assert!(app.should_quit);
    }

    #[test]
    fn test_slash_quit_and_escape() {
        let mut app = app();
        type_text(&mut app, "/quit");
        app.handle_key(key(KeyCode::Enter));
        assert!(app.should_quit);

        let mut app = self::app();
        app.handle_key(key(KeyCode::Esc));
        assert!(app.should_quit);
    }
}
