//! Table view state.
//!
//! [`TableState`] is the single container the frontend renders from. Requests
//! are tagged with a [`RequestSeq`] when issued and their [`Completion`]s are
//! applied here, so only the answer to the latest request is ever shown.

use std::collections::VecDeque;
use std::fmt;

use crate::error::ApiError;
use crate::protocol::{ActionKind, AdviceResponse, GameId, GameState};

/// Maximum number of entries kept in the event log.
pub const MAX_EVENTS: usize = 100;

/// Monotonic tag given to every request when it is issued.
pub type RequestSeq = u64;

/// What the table view is currently able to show.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    /// No state has arrived yet. Only the loading placeholder is drawn.
    Unloaded,
    /// A snapshot from the server.
    Loaded(GameState),
    /// The initial load failed; the view can retry.
    LoadFailed(ApiError),
}

impl ViewState {
    pub fn game(&self) -> Option<&GameState> {
        match self {
            ViewState::Loaded(state) => Some(state),
            ViewState::Unloaded | ViewState::LoadFailed(_) => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, ViewState::Loaded(_))
    }
}

/// The request a completion answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Load,
    Refresh,
    Action(ActionKind),
    NewHand,
    Advice,
    AddChips,
}

impl RequestKind {
    /// Requests whose answer replaces the table snapshot.
    pub fn carries_state(self) -> bool {
        !matches!(self, RequestKind::Advice)
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestKind::Load => f.write_str("load"),
            RequestKind::Refresh => f.write_str("refresh"),
            RequestKind::Action(kind) => write!(f, "{}", kind),
            RequestKind::NewHand => f.write_str("new hand"),
            RequestKind::Advice => f.write_str("advice"),
            RequestKind::AddChips => f.write_str("add chips"),
        }
    }
}

/// Successful answer to a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Answer to a load: the game we are now attached to.
    Game {
        game_id: GameId,
        state: GameState,
        created: bool,
    },
    /// A fresh snapshot (refresh, action, new hand).
    State(GameState),
    Advice(AdviceResponse),
    /// Chips were added; `state` is the snapshot fetched right after.
    ChipsAdded {
        amount: u32,
        new_stack: u32,
        state: GameState,
    },
}

/// A finished request, as delivered back to the view.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub seq: RequestSeq,
    pub request: RequestKind,
    pub outcome: Result<Reply, ApiError>,
}

/// Semantic category for log entries. The UI layer decides how to style each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogCategory {
    System,
    Action,
    Winner,
    Coach,
    Error,
    Info,
}

/// A structured entry in the table's event log.
#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    /// The server created a new game for us.
    GameCreated { game_id: GameId },
    /// We attached to a game that already existed.
    Attached { game_id: GameId },
    /// `last_event` text reported by the server.
    Server { text: String },
    /// A hand finished with a winner.
    HandWon { winner: String },
    /// We sent an action.
    ActionSent { kind: ActionKind, amount: Option<u32> },
    /// We asked for a new hand.
    NewHandRequested,
    /// Advice from the coach.
    Advice {
        recommendation: String,
        reasoning: String,
    },
    /// The coach had nothing to say.
    AdviceUnavailable { message: String },
    /// Chips were bought in.
    ChipsAdded { amount: u32, new_stack: u32 },
    /// A request failed; prior state was kept.
    RequestFailed {
        request: RequestKind,
        error: ApiError,
    },
    /// Generic text message (used by the UI layer for local feedback).
    Text { text: String, category: LogCategory },
}

impl TableEvent {
    /// Semantic category for styling purposes.
    pub fn category(&self) -> LogCategory {
        match self {
            Self::GameCreated { .. } | Self::Attached { .. } | Self::NewHandRequested => {
                LogCategory::System
            }
            Self::Server { .. } | Self::ChipsAdded { .. } => LogCategory::Info,
            Self::ActionSent { .. } => LogCategory::Action,
            Self::HandWon { .. } => LogCategory::Winner,
            Self::Advice { .. } | Self::AdviceUnavailable { .. } => LogCategory::Coach,
            Self::RequestFailed { .. } => LogCategory::Error,
            Self::Text { category, .. } => *category,
        }
    }
}

/// Describes what changed after applying a completion or local event.
///
/// The render loop inspects these flags to decide what to redraw. All flags
/// default to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateChanged {
    /// The table snapshot (or the load placeholder) changed.
    pub table: bool,
    /// The advice panel changed.
    pub advice: bool,
    /// The inline notice changed.
    pub notice: bool,
    /// New log entries were added.
    pub events: bool,
    /// The number of in-flight requests changed.
    pub pending: bool,
    /// The completion was older than the applied state and was dropped.
    pub discarded: bool,
}

impl StateChanged {
    /// Returns `true` if anything visible changed.
    pub fn any(self) -> bool {
        self.table || self.advice || self.notice || self.events || self.pending
    }
}

/// Everything the table view renders from.
///
/// Completions may arrive in any order. Each request is tagged with a
/// sequence number when it is issued and a state-bearing answer is only
/// applied if it is newer than the one currently shown, so the table always
/// reflects the most recently *sent* request that has answered.
#[derive(Debug, Clone)]
pub struct TableState {
    pub view: ViewState,
    /// Game the view is attached to, once known.
    pub game_id: Option<GameId>,
    pub events: VecDeque<TableEvent>,
    pub advice: Option<AdviceResponse>,
    /// Transient inline message for the last failure.
    pub notice: Option<String>,
    last_issued: RequestSeq,
    last_applied: RequestSeq,
    advice_seq: RequestSeq,
    pending: usize,
    loading: bool,
}

impl Default for TableState {
    fn default() -> Self {
        Self::new()
    }
}

impl TableState {
    pub fn new() -> Self {
        Self {
            view: ViewState::Unloaded,
            game_id: None,
            events: VecDeque::new(),
            advice: None,
            notice: None,
            last_issued: 0,
            last_applied: 0,
            advice_seq: 0,
            pending: 0,
            loading: false,
        }
    }

    /// Start out attached to an existing game; the load fetches it instead
    /// of creating one.
    pub fn attached_to(game_id: GameId) -> Self {
        Self {
            game_id: Some(game_id),
            ..Self::new()
        }
    }

    pub fn game(&self) -> Option<&GameState> {
        self.view.game()
    }

    /// Number of requests issued but not yet answered.
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn is_busy(&self) -> bool {
        self.pending > 0
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Append a log entry, keeping only the last [`MAX_EVENTS`].
    pub fn add_event(&mut self, event: TableEvent) {
        self.events.push_back(event);
        if self.events.len() > MAX_EVENTS {
            self.events.pop_front();
        }
    }

    /// Convenience: append a [`TableEvent::Text`] for ad-hoc messages.
    pub fn add_message(&mut self, text: String, category: LogCategory) {
        self.add_event(TableEvent::Text { text, category });
    }

    pub fn dismiss_notice(&mut self) -> StateChanged {
        let had_notice = self.notice.take().is_some();
        StateChanged {
            notice: had_notice,
            ..StateChanged::default()
        }
    }

    /// Tag a new request.
    pub fn issue(&mut self, request: RequestKind) -> RequestSeq {
        self.last_issued += 1;
        self.pending += 1;
        if request == RequestKind::NewHand {
            self.add_event(TableEvent::NewHandRequested);
        }
        self.last_issued
    }

    /// Tag an action request, recording the amount that goes out with it.
    pub fn issue_action(&mut self, kind: ActionKind, amount: Option<u32>) -> RequestSeq {
        self.add_event(TableEvent::ActionSent { kind, amount });
        self.issue(RequestKind::Action(kind))
    }

    /// Reserve a sequence number for the load.
    ///
    /// Returns `None` while a load is in flight or once a snapshot has been
    /// shown, so the load runs once per view (plus explicit retries after a
    /// failure).
    pub fn begin_load(&mut self) -> Option<RequestSeq> {
        if self.loading || self.view.is_loaded() {
            return None;
        }
        self.loading = true;
        Some(self.issue(RequestKind::Load))
    }

    /// Record a request that failed before it was sent (e.g. no game yet).
    pub fn fail_locally(&mut self, request: RequestKind, error: ApiError) -> StateChanged {
        self.notice = Some(format!("{} failed: {}", request, error));
        self.add_event(TableEvent::RequestFailed { request, error });
        StateChanged {
            notice: true,
            events: true,
            ..StateChanged::default()
        }
    }

    /// Apply a finished request.
    pub fn apply_completion(&mut self, completion: Completion) -> StateChanged {
        let Completion {
            seq,
            request,
            outcome,
        } = completion;

        let mut changed = StateChanged {
            pending: true,
            ..StateChanged::default()
        };
        self.pending = self.pending.saturating_sub(1);
        if request == RequestKind::Load {
            self.loading = false;
        }

        let stale = if request.carries_state() {
            seq <= self.last_applied
        } else {
            seq <= self.last_applied || seq <= self.advice_seq
        };
        if stale {
            changed.discarded = true;
            return changed;
        }

        match outcome {
            Ok(reply) => self.apply_reply(seq, request, reply, &mut changed),
            Err(error) => self.apply_failure(request, error, &mut changed),
        }
        changed
    }

    // -- private -----------------------------------------------------------

    fn apply_reply(
        &mut self,
        seq: RequestSeq,
        request: RequestKind,
        reply: Reply,
        changed: &mut StateChanged,
    ) {
        match reply {
            Reply::Game {
                game_id,
                state,
                created,
            } => {
                let event = if created {
                    TableEvent::GameCreated {
                        game_id: game_id.clone(),
                    }
                } else {
                    TableEvent::Attached {
                        game_id: game_id.clone(),
                    }
                };
                self.add_event(event);
                self.game_id = Some(game_id);
                self.replace_state(seq, request, state, changed);
            }
            Reply::State(state) => self.replace_state(seq, request, state, changed),
            Reply::ChipsAdded {
                amount,
                new_stack,
                state,
            } => {
                self.add_event(TableEvent::ChipsAdded { amount, new_stack });
                self.replace_state(seq, request, state, changed);
            }
            Reply::Advice(advice) => {
                self.advice_seq = seq;
                let event = match &advice {
                    AdviceResponse::Advice(a) => TableEvent::Advice {
                        recommendation: a.recommendation.clone(),
                        reasoning: a.reasoning.clone(),
                    },
                    AdviceResponse::Unavailable { message } => TableEvent::AdviceUnavailable {
                        message: message.clone(),
                    },
                };
                self.add_event(event);
                self.advice = Some(advice);
                changed.advice = true;
                changed.events = true;
            }
        }
    }

    fn replace_state(
        &mut self,
        seq: RequestSeq,
        request: RequestKind,
        state: GameState,
        changed: &mut StateChanged,
    ) {
        let previous = self.view.game();
        let event_changed = previous.and_then(|p| p.last_event.as_ref()) != state.last_event.as_ref();
        let newly_finished = state.is_hand_finished()
            && !previous.is_some_and(|p| p.is_hand_finished());
        let report_event = event_changed
            || matches!(request, RequestKind::Action(_) | RequestKind::NewHand);

        if report_event && let Some(text) = &state.last_event {
            self.add_event(TableEvent::Server { text: text.clone() });
        }
        if newly_finished && let Some(winner) = &state.last_winner {
            self.add_event(TableEvent::HandWon {
                winner: winner.clone(),
            });
        }

        self.last_applied = seq;
        self.view = ViewState::Loaded(state);
        if self.advice.take().is_some() {
            changed.advice = true;
        }
        if self.notice.take().is_some() {
            changed.notice = true;
        }
        changed.table = true;
        changed.events = true;
    }

    fn apply_failure(&mut self, request: RequestKind, error: ApiError, changed: &mut StateChanged) {
        if request == RequestKind::Load && !self.view.is_loaded() {
            self.view = ViewState::LoadFailed(error.clone());
            changed.table = true;
        }
        self.notice = Some(format!("{} failed: {}", request, error));
        self.add_event(TableEvent::RequestFailed { request, error });
        changed.notice = true;
        changed.events = true;
    }
}
