//! Ratatui TUI frontend for the table view.
//!
//! Pure UI module: terminal lifecycle, rendering, and input → intent mapping.
//! All table state lives in [`coach_core::table_state`] and all networking in
//! [`coach_client`]. This module has no networking dependencies.

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};
use std::io::{self, Stdout};

use coach_core::error::ApiError;
use coach_core::protocol::{ActionKind, AdviceResponse, GameState, Player};
use coach_core::table_state::{LogCategory, TableEvent, TableState, ViewState};

use crate::cards::{CardSize, card_row};

// ---------------------------------------------------------------------------
// UserIntent: result of processing user input
// ---------------------------------------------------------------------------

/// The result of processing a user input event.
#[derive(Debug, PartialEq)]
pub enum UserIntent {
    /// No action needed (e.g. the event was purely cosmetic).
    None,
    /// The user wants to quit / close the application.
    Quit,
    /// Send a player action. `amount` is the typed bet, if any.
    Submit {
        kind: ActionKind,
        amount: Option<u32>,
    },
    NewHand,
    Refresh,
    /// Retry the initial load after it failed.
    RetryLoad,
    Advice,
    BuyIn,
    DismissNotice,
    /// Local feedback message. The event loop should route this through
    /// `TableController::add_message`.
    Feedback(String, LogCategory),
}

// ---------------------------------------------------------------------------
// Button model
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ControlButton {
    Action(ActionKind),
    NewHand,
}

/// The action row followed by the separate new-hand button.
const CONTROLS: [ControlButton; 4] = [
    ControlButton::Action(ActionKind::Fold),
    ControlButton::Action(ActionKind::CheckCall),
    ControlButton::Action(ActionKind::BetRaise),
    ControlButton::NewHand,
];

const NEW_HAND_INDEX: usize = 3;

// ---------------------------------------------------------------------------
// TUI-only state
// ---------------------------------------------------------------------------

/// UI-layer state that lives alongside (but separate from) the table state.
#[derive(Debug)]
struct TuiState {
    /// Bet amount input buffer
    bet_input: String,
    /// Bet input cursor position
    bet_cursor: usize,
    /// Amount sent when the input is empty
    default_bet: u32,
    /// Currently selected control button index
    selected_button: usize,
    /// Show help popup
    show_help: bool,
}

impl TuiState {
    fn new(default_bet: u32) -> Self {
        Self {
            bet_input: String::new(),
            bet_cursor: 0,
            default_bet,
            selected_button: 0,
            show_help: false,
        }
    }

    fn enter_char(&mut self, new_char: char) {
        let index = self.byte_index();
        self.bet_input.insert(index, new_char);
        self.bet_cursor = (self.bet_cursor + 1).min(self.bet_input.chars().count());
    }

    fn byte_index(&self) -> usize {
        self.bet_input
            .char_indices()
            .map(|(i, _)| i)
            .nth(self.bet_cursor)
            .unwrap_or(self.bet_input.len())
    }

    fn delete_char(&mut self) {
        if self.bet_cursor == 0 {
            return;
        }
        let current_index = self.bet_cursor;
        let before = self.bet_input.chars().take(current_index - 1);
        let after = self.bet_input.chars().skip(current_index);
        self.bet_input = before.chain(after).collect();
        self.bet_cursor -= 1;
    }

    /// The typed amount, or `None` to use the configured default.
    fn parse_bet_amount(&self) -> Option<u32> {
        let input = self.bet_input.trim();
        if input.is_empty() {
            None
        } else {
            input.parse::<u32>().ok()
        }
    }

    fn bet_label(&self) -> String {
        if self.bet_input.is_empty() {
            self.default_bet.to_string()
        } else {
            self.bet_input.clone()
        }
    }

    fn select_left(&mut self) {
        self.selected_button = (self.selected_button + CONTROLS.len() - 1) % CONTROLS.len();
    }

    fn select_right(&mut self) {
        self.selected_button = (self.selected_button + 1) % CONTROLS.len();
    }

    /// Point the selection at New Hand once a hand is over, and back at the
    /// action row when a new one starts.
    fn follow_table(&mut self, ts: &TableState) {
        let Some(game) = ts.game() else {
            return;
        };
        if game.is_hand_finished() {
            self.selected_button = NEW_HAND_INDEX;
        } else if self.selected_button == NEW_HAND_INDEX {
            self.selected_button = 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Input handling
// ---------------------------------------------------------------------------

fn handle_control_activation(tui: &TuiState, ts: &TableState, button: ControlButton) -> UserIntent {
    if !ts.view.is_loaded() {
        return UserIntent::None;
    }
    match button {
        ControlButton::Action(ActionKind::BetRaise) => {
            if !tui.bet_input.trim().is_empty() && tui.parse_bet_amount().is_none() {
                return UserIntent::Feedback(
                    format!("'{}' is not a valid amount", tui.bet_input),
                    LogCategory::Error,
                );
            }
            UserIntent::Submit {
                kind: ActionKind::BetRaise,
                amount: tui.parse_bet_amount(),
            }
        }
        ControlButton::Action(kind) => UserIntent::Submit { kind, amount: None },
        ControlButton::NewHand => UserIntent::NewHand,
    }
}

fn handle_key(tui: &mut TuiState, key: KeyEvent, ts: &TableState) -> UserIntent {
    if tui.show_help {
        return match key.code {
            KeyCode::Esc | KeyCode::F(1) => {
                tui.show_help = false;
                UserIntent::None
            }
            _ => UserIntent::None,
        };
    }

    match key.code {
        KeyCode::Esc => UserIntent::Quit,
        KeyCode::F(1) => {
            tui.show_help = true;
            UserIntent::None
        }
        KeyCode::Enter => handle_control_activation(tui, ts, CONTROLS[tui.selected_button]),
        KeyCode::Left => {
            tui.select_left();
            UserIntent::None
        }
        KeyCode::Right => {
            tui.select_right();
            UserIntent::None
        }
        KeyCode::Backspace => {
            tui.delete_char();
            UserIntent::None
        }
        KeyCode::Char(c) if c.is_ascii_digit() => {
            tui.enter_char(c);
            UserIntent::None
        }
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'f' => handle_control_activation(tui, ts, ControlButton::Action(ActionKind::Fold)),
            'c' => handle_control_activation(tui, ts, ControlButton::Action(ActionKind::CheckCall)),
            'b' => handle_control_activation(tui, ts, ControlButton::Action(ActionKind::BetRaise)),
            'n' => handle_control_activation(tui, ts, ControlButton::NewHand),
            'a' if ts.view.is_loaded() => UserIntent::Advice,
            'i' if ts.view.is_loaded() => UserIntent::BuyIn,
            'r' => match ts.view {
                ViewState::Loaded(_) => UserIntent::Refresh,
                ViewState::LoadFailed(_) => UserIntent::RetryLoad,
                ViewState::Unloaded => UserIntent::None,
            },
            'x' => UserIntent::DismissNotice,
            'q' => UserIntent::Quit,
            _ => UserIntent::None,
        },
        _ => UserIntent::None,
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Owns the ratatui terminal and all UI-layer state.
///
/// The client orchestrator ([`crate::client`]) drives this struct:
/// call [`Tui::render`] each frame, [`Tui::poll_and_handle_input`] to
/// process keyboard events, and [`Tui::on_table_changed`] when a new
/// snapshot was applied.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    state: TuiState,
}

impl Tui {
    /// Set up the terminal (raw mode, alternate screen) and return a ready `Tui`.
    pub fn setup(default_bet: u32) -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self {
            terminal,
            state: TuiState::new(default_bet),
        })
    }

    /// Restore the terminal to its original state.
    pub fn teardown(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    /// Draw the current frame.
    pub fn render(&mut self, ts: &TableState) -> io::Result<()> {
        self.terminal.draw(|f| ui(f, ts, &self.state))?;
        Ok(())
    }

    /// Poll for a keyboard event and, if one is available, translate it into
    /// a [`UserIntent`]. This never blocks and returns [`UserIntent::None`]
    /// immediately when no event is pending.
    pub fn poll_and_handle_input(&mut self, ts: &TableState) -> io::Result<UserIntent> {
        if !event::poll(std::time::Duration::from_millis(0))? {
            return Ok(UserIntent::None);
        }
        let Event::Key(key) = event::read()? else {
            return Ok(UserIntent::None);
        };
        if key.kind != KeyEventKind::Press {
            return Ok(UserIntent::None);
        }
        Ok(handle_key(&mut self.state, key, ts))
    }

    /// Notify the UI that a new table snapshot was applied.
    pub fn on_table_changed(&mut self, ts: &TableState) {
        self.state.follow_table(ts);
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn ui(frame: &mut Frame, ts: &TableState, tui: &TuiState) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),   // Main content
            Constraint::Length(3), // Controls
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    match &ts.view {
        ViewState::Unloaded => render_loading(frame, main_layout[0]),
        ViewState::LoadFailed(error) => render_load_failed(frame, error, main_layout[0]),
        ViewState::Loaded(game) => render_table_view(frame, ts, game, main_layout[0]),
    }

    render_controls_bar(frame, ts, tui, main_layout[1]);
    render_status_bar(frame, ts, main_layout[2]);

    if tui.show_help {
        render_help_popup(frame);
    }
}

fn placeholder_block(title: &'static str, color: Color) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title)
        .title_style(Style::default().fg(color).bold())
}

fn render_loading(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Loading table...",
            Style::default().fg(Color::Yellow).bold(),
        )),
        Line::from(Span::styled(
            "Waiting for the game server",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let placeholder = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(placeholder_block(" Table ", Color::Magenta));
    frame.render_widget(placeholder, area);
}

fn render_load_failed(frame: &mut Frame, error: &ApiError, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Could not load the table",
            Style::default().fg(Color::Red).bold(),
        )),
        Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(vec![
            Span::raw("Press "),
            Span::styled("R", Style::default().fg(Color::Cyan).bold()),
            Span::raw(" to retry"),
        ]),
    ];
    let placeholder = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(placeholder_block(" Table ", Color::Red));
    frame.render_widget(placeholder, area);
}

fn render_table_view(frame: &mut Frame, ts: &TableState, game: &GameState, area: Rect) {
    // Main content area split horizontally
    let content_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(30), // Players + Info
            Constraint::Min(50),    // Table, advice, log
        ])
        .split(area);

    let left_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(60), // Players list
            Constraint::Percentage(40), // Info
        ])
        .split(content_layout[0]);

    render_players_panel(frame, game, left_layout[0]);
    render_info_panel(frame, game, left_layout[1]);

    let right_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(10), // Table
            Constraint::Length(7),  // Advice
            Constraint::Min(4),     // Log
        ])
        .split(content_layout[1]);

    render_board(frame, ts, game, right_layout[0]);
    render_advice(frame, ts, right_layout[1]);
    render_log(frame, ts, right_layout[2]);
}

fn seat_marker(player: &Player) -> Span<'static> {
    if player.is_button {
        Span::styled("(D) ", Style::default().fg(Color::Yellow))
    } else if player.is_sb {
        Span::styled("SB  ", Style::default().fg(Color::Gray))
    } else if player.is_bb {
        Span::styled("BB  ", Style::default().fg(Color::Gray))
    } else {
        Span::raw("    ")
    }
}

fn render_players_panel(frame: &mut Frame, game: &GameState, area: Rect) {
    let items: Vec<ListItem> = game
        .players
        .iter()
        .map(|player| {
            let out = player.has_folded || !player.in_hand;
            let name_style = if player.is_human {
                Style::default().fg(Color::Cyan).bold()
            } else if out {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::White)
            };

            let mut spans = vec![
                seat_marker(player),
                Span::styled(player.display_name(), name_style),
                Span::styled(
                    format!(" ${}", player.stack),
                    Style::default().fg(Color::Green),
                ),
            ];
            if player.has_folded {
                spans.push(Span::styled(" fold", Style::default().fg(Color::DarkGray)));
            } else if player.contribution_this_round > 0 {
                spans.push(Span::styled(
                    format!(" +{}", player.contribution_this_round),
                    Style::default().fg(Color::Yellow),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let players_list = List::new(items).block(placeholder_block(" Players ", Color::Blue));
    frame.render_widget(players_list, area);
}

fn render_info_panel(frame: &mut Frame, game: &GameState, area: Rect) {
    let mut lines = vec![];

    if let Some(hero) = game.hero() {
        lines.push(Line::from(vec![
            Span::styled(" Stack: ", Style::default().fg(Color::Gray)),
            Span::styled(format!("${}", hero.stack), Style::default().fg(Color::Green)),
        ]));
        if !hero.position.is_empty() {
            lines.push(Line::from(vec![
                Span::styled(" Position: ", Style::default().fg(Color::Gray)),
                Span::styled(hero.position.clone(), Style::default().fg(Color::White)),
            ]));
        }
        let to_call = game.to_call();
        if to_call > 0 && !game.is_hand_finished() {
            lines.push(Line::from(vec![
                Span::styled(" To call: ", Style::default().fg(Color::Gray)),
                Span::styled(format!("${}", to_call), Style::default().fg(Color::Red)),
            ]));
        }
    }

    if let Some(winner) = &game.last_winner {
        lines.push(Line::from(vec![
            Span::styled(" Winner: ", Style::default().fg(Color::Gray)),
            Span::styled(winner.clone(), Style::default().fg(Color::Green).bold()),
        ]));
    }
    if let Some(total) = game.total_chips {
        lines.push(Line::from(vec![
            Span::styled(" Chips in play: ", Style::default().fg(Color::Gray)),
            Span::styled(format!("{}", total), Style::default().fg(Color::White)),
        ]));
    }

    let info = Paragraph::new(lines).block(placeholder_block(" Info ", Color::Yellow));
    frame.render_widget(info, area);
}

fn render_board(frame: &mut Frame, ts: &TableState, game: &GameState, area: Rect) {
    let mut lines = vec![];

    // Round and pot
    let mut header = vec![
        Span::styled(
            format!(" {} ", game.betting_round),
            Style::default().fg(Color::Black).bg(Color::Yellow).bold(),
        ),
        Span::raw("  "),
        Span::styled("Pot: ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!("${}", game.pot),
            Style::default().fg(Color::Green).bold(),
        ),
    ];
    if game.current_bet > 0 {
        header.push(Span::raw("  "));
        header.push(Span::styled("Bet: ", Style::default().fg(Color::Gray)));
        header.push(Span::styled(
            format!("${}", game.current_bet),
            Style::default().fg(Color::White),
        ));
    }
    lines.push(Line::from(header));
    lines.push(Line::from(""));

    // Community cards
    lines.push(Line::from(card_row(
        &game.community_cards,
        Some(CardSize::Large),
        5,
    )));
    lines.push(Line::from(""));

    // Hero hole cards
    lines.push(Line::from(Span::styled(
        "Your Cards:",
        Style::default().fg(Color::Gray),
    )));
    match game.hero() {
        Some(hero) => {
            let mut spans = card_row(&hero.hole_cards, Some(CardSize::Large), 2);
            if hero.has_folded {
                spans.push(Span::styled(
                    "  (folded)",
                    Style::default().fg(Color::DarkGray),
                ));
            }
            lines.push(Line::from(spans));
        }
        None => lines.push(Line::from(Span::styled(
            "No seat at this table",
            Style::default().fg(Color::DarkGray),
        ))),
    }

    if let Some(notice) = &ts.notice {
        lines.push(Line::from(Span::styled(
            format!("⚠ {}", notice),
            Style::default().fg(Color::Red),
        )));
    }

    let board = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(placeholder_block(" Table ", Color::Magenta));
    frame.render_widget(board, area);
}

fn render_advice(frame: &mut Frame, ts: &TableState, area: Rect) {
    let lines = match &ts.advice {
        None => vec![Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::DarkGray)),
            Span::styled("A", Style::default().fg(Color::Cyan).bold()),
            Span::styled(" for coaching advice", Style::default().fg(Color::DarkGray)),
        ])],
        Some(AdviceResponse::Unavailable { message }) => vec![Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Gray),
        ))],
        Some(AdviceResponse::Advice(advice)) => {
            let mut lines = vec![
                Line::from(vec![
                    Span::styled(
                        advice.recommendation.to_uppercase(),
                        Style::default().fg(Color::Green).bold(),
                    ),
                    Span::styled(
                        format!("  ({} confidence)", advice.confidence),
                        Style::default().fg(Color::Gray),
                    ),
                ]),
                Line::from(advice.reasoning.clone()),
            ];

            let mut stats = vec![];
            if let Some(odds) = advice.pot_odds {
                stats.push(format!("Pot odds {:.0}%", odds * 100.0));
            }
            if let Some(equity) = advice.equity_estimate {
                stats.push(format!("Equity ~{:.0}%", equity * 100.0));
            }
            if let Some(outs) = advice.outs {
                stats.push(format!("{} outs", outs));
            }
            if let Some(strength) = &advice.hand_strength {
                stats.push(strength.clone());
            }
            if !stats.is_empty() {
                lines.push(Line::from(Span::styled(
                    stats.join(" · "),
                    Style::default().fg(Color::White),
                )));
            }
            if let Some(alt) = &advice.alternative {
                lines.push(Line::from(Span::styled(
                    format!("Alt: {}", alt),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            lines
        }
    };

    let panel = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(placeholder_block(" Coach ", Color::Green));
    frame.render_widget(panel, area);
}

/// Format a structured [`TableEvent`] into a human-readable string for the log.
fn format_event(event: &TableEvent) -> String {
    match event {
        TableEvent::GameCreated { game_id } => format!("🎰 New game {}", game_id),
        TableEvent::Attached { game_id } => format!("🔗 Attached to game {}", game_id),
        TableEvent::Server { text } => format!("📣 {}", text),
        TableEvent::HandWon { winner } => format!("🏆 {} wins the hand", winner),
        TableEvent::ActionSent { kind, amount } => match amount {
            Some(amt) => format!("🎬 You: {} ${}", kind, amt),
            None => format!("🎬 You: {}", kind),
        },
        TableEvent::NewHandRequested => "🃏 New hand requested".to_string(),
        TableEvent::Advice {
            recommendation,
            reasoning,
        } => format!("🧠 Coach says {}: {}", recommendation, reasoning),
        TableEvent::AdviceUnavailable { message } => format!("🧠 {}", message),
        TableEvent::ChipsAdded { amount, new_stack } => {
            format!("💰 Bought in ${}, stack now ${}", amount, new_stack)
        }
        TableEvent::RequestFailed { request, error } => format!("❌ {} failed: {}", request, error),
        TableEvent::Text { text, .. } => text.clone(),
    }
}

fn render_log(frame: &mut Frame, ts: &TableState, area: Rect) {
    let messages: Vec<ListItem> = ts
        .events
        .iter()
        .rev()
        .take(area.height.saturating_sub(2) as usize)
        .rev()
        .map(|ev| {
            let style = match ev.category() {
                LogCategory::System => Style::default().fg(Color::Yellow),
                LogCategory::Action => Style::default().fg(Color::White),
                LogCategory::Winner => Style::default().fg(Color::Green).bold(),
                LogCategory::Coach => Style::default().fg(Color::Cyan),
                LogCategory::Error => Style::default().fg(Color::Red),
                LogCategory::Info => Style::default().fg(Color::Gray),
            };
            ListItem::new(Span::styled(format_event(ev), style))
        })
        .collect();

    let log = List::new(messages).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Log ")
            .title_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(log, area);
}

fn button_label(tui: &TuiState, button: ControlButton) -> String {
    match button {
        ControlButton::Action(ActionKind::BetRaise) => {
            format!("{} [{}]", ActionKind::BetRaise.label(), tui.bet_label())
        }
        ControlButton::Action(kind) => kind.label().to_string(),
        ControlButton::NewHand => "New Hand".to_string(),
    }
}

fn render_controls_bar(frame: &mut Frame, ts: &TableState, tui: &TuiState, area: Rect) {
    let enabled = ts.view.is_loaded();
    let mut spans = Vec::with_capacity(CONTROLS.len() * 2 + 1);

    for (index, button) in CONTROLS.iter().enumerate() {
        if index == NEW_HAND_INDEX {
            spans.push(Span::styled("   │   ", Style::default().fg(Color::DarkGray)));
        } else if index > 0 {
            spans.push(Span::raw(" "));
        }

        let mut style = if enabled {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        if enabled && tui.selected_button == index {
            style = style.bg(Color::Blue).fg(Color::Black).bold();
        }
        spans.push(Span::styled(format!(" {} ", button_label(tui, *button)), style));
    }

    let row = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(placeholder_block(" Controls ", Color::Blue));
    frame.render_widget(row, area);
}

fn render_status_bar(frame: &mut Frame, ts: &TableState, area: Rect) {
    let (status_text, status_color) = if ts.is_busy() {
        (format!("⟳ {} pending", ts.pending()), Color::Yellow)
    } else {
        match ts.view {
            ViewState::Loaded(_) => ("● Ready".to_string(), Color::Green),
            ViewState::Unloaded => ("● Idle".to_string(), Color::Gray),
            ViewState::LoadFailed(_) => ("● Offline".to_string(), Color::Red),
        }
    };

    let mut status_spans = vec![
        Span::styled(status_text, Style::default().fg(status_color)),
        Span::raw(" | "),
        Span::styled("F1", Style::default().fg(Color::Cyan).bold()),
        Span::raw(": Help | "),
        Span::styled("ESC", Style::default().fg(Color::Cyan).bold()),
        Span::raw(": Quit"),
    ];
    if let Some(game_id) = &ts.game_id {
        status_spans.push(Span::raw(" | Game: "));
        status_spans.push(Span::styled(
            game_id.to_string(),
            Style::default().fg(Color::Cyan),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(status_spans)), area);
}

fn render_help_popup(frame: &mut Frame) {
    let area = centered_rect(60, 80, frame.area());

    frame.render_widget(Clear, area);

    let help_text = Text::from(vec![
        Line::from(vec![Span::styled(
            "CONTROLS",
            Style::default().fg(Color::Yellow).bold(),
        )]),
        Line::from(""),
        Line::from(vec![Span::styled(
            "  TABLE",
            Style::default().fg(Color::Cyan).bold(),
        )]),
        Line::from("  Left/Right    Move between buttons"),
        Line::from("  Enter         Activate selected button"),
        Line::from("  F / C / B     Fold, Check/Call, Bet/Raise"),
        Line::from("  N             New hand"),
        Line::from("  0-9           Type bet amount"),
        Line::from("  Backspace     Edit bet amount"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "  COACH",
            Style::default().fg(Color::Cyan).bold(),
        )]),
        Line::from("  A             Ask for advice"),
        Line::from("  I             Buy in more chips"),
        Line::from("  R             Refresh (or retry loading)"),
        Line::from("  X             Dismiss error message"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "  SYSTEM",
            Style::default().fg(Color::Cyan).bold(),
        )]),
        Line::from("  F1            Toggle this help"),
        Line::from("  ESC / Q       Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press ESC or F1 to close",
            Style::default().fg(Color::DarkGray),
        )]),
    ]);

    let help = Paragraph::new(help_text).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Help ")
            .title_style(Style::default().fg(Color::Cyan).bold())
            .style(Style::default().bg(Color::Black)),
    );

    frame.render_widget(help, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use coach_core::protocol::{BettingRound, Card, CoachAdvice, GameId};
    use coach_core::table_state::{Completion, Reply, RequestKind};
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;

    fn screen(ts: &TableState, tui: &TuiState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 36)).unwrap();
        terminal.draw(|f| ui(f, ts, tui)).unwrap();
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn game(players: Vec<Player>) -> GameState {
        GameState {
            community_cards: vec![Card::new("Ah"), Card::new("Kd"), Card::new("7c")],
            pot: 150,
            players,
            betting_round: BettingRound::Flop,
            current_bet: 20,
            button_seat: None,
            sb_seat: None,
            bb_seat: None,
            hero: None,
            last_event: Some("On PREFLOP, you chose CHECK/CALL.".to_string()),
            last_winner: None,
            total_chips: Some(8000),
        }
    }

    fn hero() -> Player {
        Player {
            name: "HUMAN".to_string(),
            is_human: true,
            stack: 980,
            hole_cards: vec![Card::new("Qs"), Card::new("Qh")],
            ..Player::default()
        }
    }

    fn bot(name: &str) -> Player {
        Player {
            name: name.to_string(),
            stack: 1000,
            ..Player::default()
        }
    }

    fn loaded(state: GameState) -> TableState {
        let mut ts = TableState::new();
        let seq = ts.begin_load().unwrap();
        ts.apply_completion(Completion {
            seq,
            request: RequestKind::Load,
            outcome: Ok(Reply::Game {
                game_id: GameId::new("g-7"),
                state,
                created: true,
            }),
        });
        ts
    }

    fn press(tui: &mut TuiState, ts: &TableState, code: KeyCode) -> UserIntent {
        handle_key(tui, KeyEvent::new(code, KeyModifiers::NONE), ts)
    }

    #[test]
    fn unloaded_shows_only_placeholder() {
        let ts = TableState::new();
        let out = screen(&ts, &TuiState::new(100));
        assert!(out.contains("Loading table..."));
        assert!(!out.contains("Pot:"));
        assert!(!out.contains("Your Cards"));
    }

    #[test]
    fn failed_load_offers_retry() {
        let mut ts = TableState::new();
        let seq = ts.begin_load().unwrap();
        ts.apply_completion(Completion {
            seq,
            request: RequestKind::Load,
            outcome: Err(ApiError::Network("connection refused".to_string())),
        });
        let out = screen(&ts, &TuiState::new(100));
        assert!(out.contains("Could not load the table"));
        assert!(out.contains("connection refused"));
        assert!(out.contains("to retry"));
        assert!(!out.contains("Pot:"));
    }

    #[test]
    fn loaded_table_shows_pot_board_and_hero() {
        let ts = loaded(game(vec![bot("LAG Lucy"), hero()]));
        let out = screen(&ts, &TuiState::new(100));
        assert!(out.contains("Pot: $150"));
        assert!(out.contains("[ A ♥ ] [ K ♦ ] [ 7 ♣ ] [ ? ] [ ? ]"));
        assert!(out.contains("[ Q ♠ ] [ Q ♥ ]"));
        assert!(out.contains("LAG Lucy"));
        assert!(out.contains(" Fold "));
        assert!(out.contains(" Check/Call "));
        assert!(out.contains(" Bet/Raise [100] "));
        assert!(out.contains(" New Hand "));
        assert!(out.contains("Game: g-7"));
    }

    #[test]
    fn missing_hero_does_not_panic() {
        let ts = loaded(game(vec![bot("Nit Neil")]));
        let out = screen(&ts, &TuiState::new(100));
        assert!(out.contains("No seat at this table"));

        let ts = loaded(game(Vec::new()));
        let out = screen(&ts, &TuiState::new(100));
        assert!(out.contains("No seat at this table"));
    }

    #[test]
    fn advice_panel() {
        let mut ts = loaded(game(vec![hero()]));
        ts.advice = Some(AdviceResponse::Advice(CoachAdvice {
            recommendation: "raise".to_string(),
            reasoning: "Overpair on a dry board".to_string(),
            pot_odds: Some(0.25),
            equity_estimate: Some(0.72),
            hand_strength: None,
            outs: None,
            confidence: "high".to_string(),
            alternative: None,
        }));
        let out = screen(&ts, &TuiState::new(100));
        assert!(out.contains("RAISE"));
        assert!(out.contains("Overpair on a dry board"));
        assert!(out.contains("Pot odds 25%"));
        assert!(out.contains("Equity ~72%"));
    }

    #[test]
    fn notice_is_shown_inline() {
        let mut ts = loaded(game(vec![hero()]));
        ts.notice = Some("Fold failed: network error: reset".to_string());
        let out = screen(&ts, &TuiState::new(100));
        assert!(out.contains("Fold failed: network error: reset"));
        assert!(out.contains("Pot: $150"));
    }

    #[test]
    fn enter_fires_selected_action() {
        let ts = loaded(game(vec![hero()]));
        let mut tui = TuiState::new(100);
        assert_eq!(
            press(&mut tui, &ts, KeyCode::Enter),
            UserIntent::Submit {
                kind: ActionKind::Fold,
                amount: None
            }
        );
        press(&mut tui, &ts, KeyCode::Right);
        press(&mut tui, &ts, KeyCode::Right);
        press(&mut tui, &ts, KeyCode::Right);
        assert_eq!(press(&mut tui, &ts, KeyCode::Enter), UserIntent::NewHand);
        press(&mut tui, &ts, KeyCode::Right);
        assert_eq!(tui.selected_button, 0);
    }

    #[test]
    fn typed_amount_goes_with_bet() {
        let ts = loaded(game(vec![hero()]));
        let mut tui = TuiState::new(100);
        assert_eq!(
            press(&mut tui, &ts, KeyCode::Char('b')),
            UserIntent::Submit {
                kind: ActionKind::BetRaise,
                amount: None
            }
        );
        for c in ['2', '5', '0', '9'] {
            press(&mut tui, &ts, KeyCode::Char(c));
        }
        press(&mut tui, &ts, KeyCode::Backspace);
        assert_eq!(
            press(&mut tui, &ts, KeyCode::Char('b')),
            UserIntent::Submit {
                kind: ActionKind::BetRaise,
                amount: Some(250)
            }
        );
        assert!(screen(&ts, &tui).contains("Bet/Raise [250]"));
    }

    #[test]
    fn controls_are_inert_until_loaded() {
        let ts = TableState::new();
        let mut tui = TuiState::new(100);
        assert_eq!(press(&mut tui, &ts, KeyCode::Enter), UserIntent::None);
        assert_eq!(press(&mut tui, &ts, KeyCode::Char('f')), UserIntent::None);
        assert_eq!(press(&mut tui, &ts, KeyCode::Char('a')), UserIntent::None);
        assert_eq!(press(&mut tui, &ts, KeyCode::Char('r')), UserIntent::None);
        assert_eq!(press(&mut tui, &ts, KeyCode::Esc), UserIntent::Quit);
    }

    #[test]
    fn retry_only_after_failure() {
        let mut ts = TableState::new();
        let seq = ts.begin_load().unwrap();
        ts.apply_completion(Completion {
            seq,
            request: RequestKind::Load,
            outcome: Err(ApiError::NoGame),
        });
        let mut tui = TuiState::new(100);
        assert_eq!(press(&mut tui, &ts, KeyCode::Char('r')), UserIntent::RetryLoad);

        let ts = loaded(game(vec![hero()]));
        assert_eq!(press(&mut tui, &ts, KeyCode::Char('r')), UserIntent::Refresh);
    }

    #[test]
    fn help_swallows_keys() {
        let ts = loaded(game(vec![hero()]));
        let mut tui = TuiState::new(100);
        press(&mut tui, &ts, KeyCode::F(1));
        assert!(tui.show_help);
        assert_eq!(press(&mut tui, &ts, KeyCode::Char('f')), UserIntent::None);
        assert_eq!(press(&mut tui, &ts, KeyCode::Esc), UserIntent::None);
        assert!(!tui.show_help);
    }

    #[test]
    fn selection_follows_hand_end() {
        let mut finished = game(vec![hero()]);
        finished.betting_round = BettingRound::Finished;
        let ts = loaded(finished);
        let mut tui = TuiState::new(100);
        tui.follow_table(&ts);
        assert_eq!(tui.selected_button, NEW_HAND_INDEX);

        let ts = loaded(game(vec![hero()]));
        tui.follow_table(&ts);
        assert_eq!(tui.selected_button, 1);
    }
}
