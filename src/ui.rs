use anyhow::Result;
use console_bank::{parse_amount, Account, AccountDirectory, BankResult, Party, Receipt};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use rust_decimal::Decimal;
use std::io;

const INVALID_AMOUNT: &str = "Invalid amount.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    OpenAccount,
    Deposit,
    Withdraw,
    Transfer,
}

impl FormKind {
    pub fn title(&self) -> &str {
        match self {
            FormKind::OpenAccount => " Create Account ",
            FormKind::Deposit => " Deposit Money ",
            FormKind::Withdraw => " Withdraw Money ",
            FormKind::Transfer => " Transfer Money ",
        }
    }

    pub fn labels(&self) -> &'static [&'static str] {
        match self {
            FormKind::OpenAccount => &["Holder name", "Account number", "Initial deposit"],
            FormKind::Deposit => &["Account number", "Deposit amount"],
            FormKind::Withdraw => &["Account number", "Withdrawal amount"],
            FormKind::Transfer => &[
                "Your account number",
                "Recipient account number",
                "Transfer amount",
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Form {
    pub kind: FormKind,
    pub fields: Vec<String>,
    pub focus: usize,
}

impl Form {
    /// Empty form; `prefill` seeds the first account-number field
    pub fn new(kind: FormKind, prefill: Option<&str>) -> Self {
        let mut form = Form {
            kind,
            fields: vec![String::new(); kind.labels().len()],
            focus: 0,
        };

        if kind != FormKind::OpenAccount {
            if let Some(number) = prefill {
                form.fields[0] = number.to_string();
                form.focus = 1;
            }
        }

        form
    }

    pub fn is_last_field(&self) -> bool {
        self.focus + 1 >= self.fields.len()
    }

    pub fn next_field(&mut self) {
        if !self.is_last_field() {
            self.focus += 1;
        }
    }

    pub fn previous_field(&mut self) {
        self.focus = self.focus.saturating_sub(1);
    }

    pub fn push(&mut self, c: char) {
        self.fields[self.focus].push(c);
    }

    pub fn backspace(&mut self) {
        self.fields[self.focus].pop();
    }

    fn field(&self, index: usize) -> &str {
        self.fields[index].trim()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub text: String,
    pub is_error: bool,
}

pub struct App {
    directory: AccountDirectory,
    pub state: TableState,
    pub show_detail: bool,
    pub form: Option<Form>,
    pub status: Option<Status>,
}

impl App {
    pub fn new(directory: AccountDirectory) -> Self {
        let mut state = TableState::default();
        if !directory.is_empty() {
            state.select(Some(0));
        }

        Self {
            directory,
            state,
            show_detail: false,
            form: None,
            status: None,
        }
    }

    pub fn directory(&self) -> &AccountDirectory {
        &self.directory
    }

    pub fn into_directory(self) -> AccountDirectory {
        self.directory
    }

    pub fn selected_account(&self) -> Option<&Account> {
        self.state.selected().and_then(|i| self.directory.get(i))
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn next(&mut self) {
        let len = self.directory.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.directory.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn open_form(&mut self, kind: FormKind) {
        let prefill = self
            .selected_account()
            .map(|a| a.account_number().to_string());
        self.form = Some(Form::new(kind, prefill.as_deref()));
    }

    /// Returns true when the app should quit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.form.is_some() {
            self.handle_form_key(key);
            return false;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('n') => self.open_form(FormKind::OpenAccount),
            KeyCode::Char('d') => self.open_form(FormKind::Deposit),
            KeyCode::Char('w') => self.open_form(FormKind::Withdraw),
            KeyCode::Char('t') => self.open_form(FormKind::Transfer),
            KeyCode::Enter => self.toggle_detail(),
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::Home if !self.directory.is_empty() => self.state.select(Some(0)),
            KeyCode::End if !self.directory.is_empty() => {
                self.state.select(Some(self.directory.len() - 1))
            }
            _ => {}
        }
        false
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let Some(form) = self.form.as_mut() else {
            return;
        };

        match key.code {
            KeyCode::Esc => self.form = None,
            KeyCode::Enter if form.is_last_field() => self.submit_form(),
            KeyCode::Enter | KeyCode::Tab => form.next_field(),
            KeyCode::BackTab => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(c) => form.push(c),
            _ => {}
        }
    }

    /// Run the open form against the directory and report the outcome.
    /// The form closes either way, like the text menu does.
    pub fn submit_form(&mut self) {
        let Some(form) = self.form.take() else {
            return;
        };

        self.status = Some(match self.apply(&form) {
            Ok(text) => Status {
                text,
                is_error: false,
            },
            Err(text) => Status {
                text,
                is_error: true,
            },
        });
    }

    fn apply(&mut self, form: &Form) -> Result<String, String> {
        match form.kind {
            FormKind::OpenAccount => {
                let initial = amount_field(form, 2)?;
                self.directory
                    .create(form.field(0), form.field(1), initial)
                    .map_err(|e| e.to_string())?;
                self.state.select(Some(self.directory.len() - 1));
                Ok("Account created successfully.".to_string())
            }
            FormKind::Deposit => {
                self.lookup(form.field(0), Party::Holder)?;
                let amount = amount_field(form, 1)?;
                describe(self.directory.deposit(form.field(0), amount))
            }
            FormKind::Withdraw => {
                self.lookup(form.field(0), Party::Holder)?;
                let amount = amount_field(form, 1)?;
                describe(self.directory.withdraw(form.field(0), amount))
            }
            FormKind::Transfer => {
                self.lookup(form.field(0), Party::Source)?;
                self.lookup(form.field(1), Party::Recipient)?;
                let amount = amount_field(form, 2)?;
                describe(self.directory.transfer(form.field(0), form.field(1), amount))
            }
        }
    }

    fn lookup(&self, number: &str, party: Party) -> Result<(), String> {
        self.directory
            .require(number, party)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

fn amount_field(form: &Form, index: usize) -> Result<Decimal, String> {
    parse_amount(form.field(index)).ok_or_else(|| INVALID_AMOUNT.to_string())
}

fn describe(outcome: BankResult<Receipt>) -> Result<String, String> {
    outcome.map(|r| r.summary()).map_err(|e| e.to_string())
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Accounts + side panel
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    if app.form.is_some() || app.show_detail {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);

        render_table(f, content_chunks[0], app);
        match &app.form {
            Some(form) => render_form(f, content_chunks[1], form),
            None => render_detail_panel(f, content_chunks[1], app),
        }
    } else {
        render_table(f, chunks[1], app);
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let spans = vec![
        Span::styled(
            "Banking System",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("Accounts: {}", app.directory().len()),
            Style::default().fg(Color::White),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("Total balance: {}", app.directory().total_balance()),
            Style::default().fg(Color::Green),
        ),
    ];

    let header = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn balance_color(balance: Decimal) -> Color {
    if balance < Decimal::ZERO {
        Color::Red
    } else {
        Color::Green
    }
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["Holder", "Account #", "Balance"].iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.directory.accounts().iter().map(|account| {
        Row::new(vec![
            Cell::from(truncate(account.holder_name(), 30)),
            Cell::from(truncate(account.account_number(), 20)),
            Cell::from(account.balance().to_string())
                .style(Style::default().fg(balance_color(account.balance()))),
        ])
        .height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(32),
            Constraint::Length(22),
            Constraint::Length(18),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Accounts "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Account Details ");

    let Some(account) = app.selected_account() else {
        f.render_widget(Paragraph::new("No account selected").block(block), area);
        return;
    };

    let label = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);

    let content = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Account holder: ", label),
            Span::raw(account.holder_name()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Account number: ", label),
            Span::raw(account.account_number()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Balance: ", label),
            Span::styled(
                account.balance().to_string(),
                Style::default().fg(balance_color(account.balance())),
            ),
        ]),
        Line::from(""),
        Line::from("  ─────────────────────────────────────"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Opened: ", label),
            Span::raw(account.opened_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Id: ", label),
            Span::styled(account.id.as_str(), Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(""),
        Line::from(vec![Span::styled(
            "  Press Enter to close",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )]),
    ];

    f.render_widget(Paragraph::new(content).block(block), area);
}

fn render_form(f: &mut Frame, area: Rect, form: &Form) {
    let mut content = vec![Line::from("")];

    for (i, (label, value)) in form.kind.labels().iter().zip(&form.fields).enumerate() {
        let focused = i == form.focus;
        let marker = if focused { "→ " } else { "  " };
        let value_style = if focused {
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };

        content.push(Line::from(vec![
            Span::styled(marker, Style::default().fg(Color::Green)),
            Span::styled(format!("{}: ", label), Style::default().fg(Color::Cyan)),
            Span::styled(value.clone(), value_style),
            Span::raw(if focused { "_" } else { "" }),
        ]));
        content.push(Line::from(""));
    }

    content.push(Line::from(vec![Span::styled(
        "  Tab next field | Enter submit on last field | Esc cancel",
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    )]));

    let panel = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(form.kind.title()),
    );

    f.render_widget(panel, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = Vec::new();

    if let Some(status) = &app.status {
        let color = if status.is_error { Color::Red } else { Color::Green };
        status_spans.push(Span::styled(
            format!(" {} ", status.text),
            Style::default().fg(color),
        ));
        status_spans.push(Span::raw("|"));
    }

    for (key, action, color) in [
        ("n", " New", Color::Yellow),
        ("d", " Deposit", Color::Yellow),
        ("w", " Withdraw", Color::Yellow),
        ("t", " Transfer", Color::Yellow),
        ("Enter", " Details", Color::Yellow),
        ("↑/↓", " Nav", Color::Yellow),
        ("q", " Quit", Color::Red),
    ] {
        status_spans.push(Span::raw(" "));
        status_spans.push(Span::styled(key, Style::default().fg(color)));
        status_spans.push(Span::raw(action));
    }

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn amount(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn app_with_two() -> App {
        let mut directory = AccountDirectory::new();
        directory.create("Alice", "A", amount("100")).unwrap();
        directory.create("Bob", "B", Decimal::ZERO).unwrap();
        App::new(directory)
    }

    #[test]
    fn test_open_account_form() {
        let mut app = App::new(AccountDirectory::new());
        assert!(app.state.selected().is_none());

        press(&mut app, KeyCode::Char('n'));
        type_text(&mut app, "Ada");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "ACC-1");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "250");
        press(&mut app, KeyCode::Enter);

        assert!(app.form.is_none());
        assert_eq!(
            app.status,
            Some(Status {
                text: "Account created successfully.".to_string(),
                is_error: false,
            })
        );
        assert_eq!(app.directory().len(), 1);
        assert_eq!(app.selected_account().unwrap().balance(), amount("250"));
    }

    #[test]
    fn test_deposit_prefills_selected_account() {
        let mut app = app_with_two();
        press(&mut app, KeyCode::Down);

        press(&mut app, KeyCode::Char('d'));
        let form = app.form.as_ref().unwrap();
        assert_eq!(form.fields[0], "B");
        assert_eq!(form.focus, 1);

        type_text(&mut app, "30");
        press(&mut app, KeyCode::Enter);

        assert_eq!(
            app.status.as_ref().unwrap().text,
            "Deposited 30. New balance: 30"
        );
        assert_eq!(app.directory().find_by_number("B").unwrap().balance(), amount("30"));
    }

    #[test]
    fn test_withdraw_insufficient_funds() {
        let mut app = app_with_two();

        press(&mut app, KeyCode::Char('w'));
        type_text(&mut app, "1000");
        press(&mut app, KeyCode::Enter);

        let status = app.status.clone().unwrap();
        assert!(status.is_error);
        assert_eq!(status.text, "Invalid withdrawal amount or insufficient funds.");
        assert_eq!(app.directory().find_by_number("A").unwrap().balance(), amount("100"));
    }

    #[test]
    fn test_transfer_form() {
        let mut app = app_with_two();

        press(&mut app, KeyCode::Char('t'));
        type_text(&mut app, "B");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "50");
        press(&mut app, KeyCode::Enter);

        assert_eq!(
            app.status.as_ref().unwrap().text,
            "Transferred 50 to account B"
        );
        assert_eq!(app.directory().find_by_number("A").unwrap().balance(), amount("50"));
        assert_eq!(app.directory().find_by_number("B").unwrap().balance(), amount("50"));
    }

    #[test]
    fn test_unknown_recipient_reported_before_amount() {
        let mut app = app_with_two();

        press(&mut app, KeyCode::Char('t'));
        type_text(&mut app, "Z");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "not a number");
        press(&mut app, KeyCode::Enter);

        assert_eq!(
            app.status.as_ref().unwrap().text,
            "Recipient account not found."
        );
    }

    #[test]
    fn test_malformed_amount() {
        let mut app = app_with_two();

        press(&mut app, KeyCode::Char('d'));
        type_text(&mut app, "1O");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.status.as_ref().unwrap().text, INVALID_AMOUNT);
        assert!(app.status.as_ref().unwrap().is_error);
    }

    #[test]
    fn test_escape_cancels_form_without_quitting() {
        let mut app = app_with_two();

        press(&mut app, KeyCode::Char('d'));
        type_text(&mut app, "5");
        assert!(!press(&mut app, KeyCode::Esc));

        assert!(app.form.is_none());
        assert!(app.status.is_none());
        assert_eq!(app.directory().find_by_number("A").unwrap().balance(), amount("100"));

        assert!(press(&mut app, KeyCode::Esc));
    }

    #[test]
    fn test_q_is_text_inside_form() {
        let mut app = app_with_two();

        press(&mut app, KeyCode::Char('n'));
        assert!(!press(&mut app, KeyCode::Char('q')));
        assert_eq!(app.form.as_ref().unwrap().fields[0], "q");

        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.form.as_ref().unwrap().fields[0], "");
    }

    #[test]
    fn test_navigation_wraps() {
        let mut app = app_with_two();
        assert_eq!(app.state.selected(), Some(0));

        press(&mut app, KeyCode::Up);
        assert_eq!(app.state.selected(), Some(1));

        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.state.selected(), Some(0));

        press(&mut app, KeyCode::End);
        assert_eq!(app.selected_account().unwrap().account_number(), "B");
    }

    #[test]
    fn test_toggle_detail() {
        let mut app = app_with_two();
        press(&mut app, KeyCode::Enter);
        assert!(app.show_detail);
        press(&mut app, KeyCode::Enter);
        assert!(!app.show_detail);
    }

    #[test]
    fn test_header_total_with_full_accounts() {
        let mut directory = AccountDirectory::new();
        directory.create("Big", "A", Decimal::MAX).unwrap();
        directory.create("Bigger", "B", Decimal::MAX).unwrap();
        let mut app = App::new(directory);

        assert_eq!(app.directory().total_balance(), Decimal::MAX);

        press(&mut app, KeyCode::Char('t'));
        type_text(&mut app, "B");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "1");
        press(&mut app, KeyCode::Enter);

        assert!(app.status.as_ref().unwrap().is_error);
        assert_eq!(app.directory().find_by_number("A").unwrap().balance(), Decimal::MAX);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long holder name", 10), "a very ...");
        assert_eq!(truncate("ñandú ñandú", 8), "ñandú...");
    }
}
