//! Framework-agnostic table controller.
//!
//! Owns a [`GameApi`] and a [`TableState`], providing shared dispatch logic:
//!
//! - Issuing requests as background tasks, each tagged with a sequence
//!   number.
//! - Applying completions to the table state, dropping answers that are
//!   older than what is already shown.
//!
//! Frontends only need to:
//! 1. Call [`TableController::start`] once when the view becomes active.
//! 2. Call [`TableController::try_recv`] or [`TableController::recv`]
//!    to apply finished requests.
//! 3. Call [`TableController::submit`], [`TableController::new_hand`], etc.
//!    in response to player input.

use std::future::Future;
use std::sync::Arc;

use coach_core::error::ApiError;
use coach_core::protocol::{ActionKind, ActionRequest, GameId};
use coach_core::table_state::{
    Completion, LogCategory, Reply, RequestKind, RequestSeq, StateChanged, TableState,
};
use tokio::sync::mpsc;

use crate::api::GameApi;
use crate::config::ClientConfig;
use crate::session;

/// Outcome of processing a single completion.
#[derive(Debug)]
pub enum PollResult {
    /// A completion was applied (or discarded as stale); the returned
    /// [`StateChanged`] flags describe what was modified.
    Updated(StateChanged),
    /// No completion was available.
    Empty,
}

/// Owns the API client and table state, providing request dispatch.
pub struct TableController<A: GameApi> {
    api: Arc<A>,
    config: ClientConfig,
    pub state: TableState,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions: mpsc::UnboundedReceiver<Completion>,
}

impl<A: GameApi> TableController<A> {
    /// Create a controller that will start a new game on load.
    pub fn new(api: A, config: ClientConfig) -> Self {
        Self::with_state(api, config, TableState::new())
    }

    /// Create a controller that will load an existing game, falling back to
    /// a new one if the server does not know it.
    pub fn attach(api: A, config: ClientConfig, game_id: GameId) -> Self {
        Self::with_state(api, config, TableState::attached_to(game_id))
    }

    fn with_state(api: A, config: ClientConfig, state: TableState) -> Self {
        let (completions_tx, completions) = mpsc::unbounded_channel();
        Self {
            api: Arc::new(api),
            config,
            state,
            completions_tx,
            completions,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Borrow the underlying [`TableState`] immutably.
    pub fn table_state(&self) -> &TableState {
        &self.state
    }

    /// Issue the initial load.
    ///
    /// Returns `false` (and does nothing) while a load is in flight or once
    /// the table has loaded, so calling it on every frame is harmless. After
    /// a failed load it issues a retry.
    pub fn start(&mut self) -> bool {
        let Some(seq) = self.state.begin_load() else {
            return false;
        };
        let game_id = self.state.game_id.clone();
        tracing::info!(seq, game_id = ?game_id, "loading table");
        self.spawn(seq, RequestKind::Load, move |api| async move {
            session::load_game(&*api, game_id).await
        });
        true
    }

    /// Send a player action. `amount` overrides the configured bet/raise
    /// amount and is ignored for the other actions.
    pub fn submit(&mut self, kind: ActionKind, amount: Option<u32>) -> Option<RequestSeq> {
        let request_kind = RequestKind::Action(kind);
        let game_id = self.loaded_game_id(request_kind)?;
        let request = ActionRequest::new(kind, amount.unwrap_or(self.config.bet_amount));
        let seq = self.state.issue_action(kind, request.amount);
        tracing::info!(seq, action = %kind, amount = ?request.amount, "submitting action");
        self.spawn(seq, request_kind, move |api| async move {
            api.send_action(&game_id, &request).await.map(Reply::State)
        });
        Some(seq)
    }

    /// Ask the server to deal a new hand.
    pub fn new_hand(&mut self) -> Option<RequestSeq> {
        let game_id = self.loaded_game_id(RequestKind::NewHand)?;
        let seq = self.state.issue(RequestKind::NewHand);
        tracing::info!(seq, "requesting new hand");
        self.spawn(seq, RequestKind::NewHand, move |api| async move {
            api.new_hand(&game_id).await.map(Reply::State)
        });
        Some(seq)
    }

    /// Re-fetch the current table.
    pub fn refresh(&mut self) -> Option<RequestSeq> {
        let game_id = self.loaded_game_id(RequestKind::Refresh)?;
        let seq = self.state.issue(RequestKind::Refresh);
        tracing::debug!(seq, "refreshing table");
        self.spawn(seq, RequestKind::Refresh, move |api| async move {
            api.fetch_state(&game_id).await.map(Reply::State)
        });
        Some(seq)
    }

    /// Ask the coach for advice on the current spot.
    pub fn request_advice(&mut self) -> Option<RequestSeq> {
        let game_id = self.loaded_game_id(RequestKind::Advice)?;
        let seq = self.state.issue(RequestKind::Advice);
        tracing::debug!(seq, "requesting advice");
        self.spawn(seq, RequestKind::Advice, move |api| async move {
            api.advice(&game_id).await.map(Reply::Advice)
        });
        Some(seq)
    }

    /// Buy in for the configured amount.
    pub fn add_chips(&mut self) -> Option<RequestSeq> {
        let game_id = self.loaded_game_id(RequestKind::AddChips)?;
        let amount = self.config.buy_in;
        let seq = self.state.issue(RequestKind::AddChips);
        tracing::info!(seq, amount, "adding chips");
        self.spawn(seq, RequestKind::AddChips, move |api| async move {
            session::add_chips_and_refresh(&*api, &game_id, amount).await
        });
        Some(seq)
    }

    /// Try to apply one finished request (non-blocking).
    pub fn try_recv(&mut self) -> PollResult {
        match self.completions.try_recv() {
            Ok(completion) => self.handle_completion(completion),
            Err(_) => PollResult::Empty,
        }
    }

    /// Await the next finished request.
    ///
    /// This is useful in `tokio::select!` loops. It only resolves while at
    /// least one request is in flight.
    pub async fn recv(&mut self) -> PollResult {
        match self.completions.recv().await {
            Some(completion) => self.handle_completion(completion),
            None => PollResult::Empty,
        }
    }

    /// Append a local feedback message to the event log.
    ///
    /// Frontends should call this instead of mutating `TableState`
    /// directly, keeping the controller as the single mutation gateway.
    pub fn add_message(&mut self, text: String, category: LogCategory) {
        self.state.add_message(text, category);
    }

    pub fn dismiss_notice(&mut self) -> StateChanged {
        self.state.dismiss_notice()
    }

    // -- private -----------------------------------------------------------

    fn loaded_game_id(&mut self, request: RequestKind) -> Option<GameId> {
        match &self.state.game_id {
            Some(game_id) if self.state.view.is_loaded() => Some(game_id.clone()),
            _ => {
                tracing::warn!(%request, "no game loaded, request not sent");
                self.state.fail_locally(request, ApiError::NoGame);
                None
            }
        }
    }

    fn spawn<F, Fut>(&self, seq: RequestSeq, request: RequestKind, call: F)
    where
        F: FnOnce(Arc<A>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<Reply, ApiError>> + Send + 'static,
    {
        let api = Arc::clone(&self.api);
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let outcome = call(api).await;
            if let Err(e) = &outcome {
                tracing::warn!(seq, %request, error = %e, "request failed");
            }
            // The receiver lives as long as the controller; a send error
            // only means the view was torn down.
            let _ = tx.send(Completion {
                seq,
                request,
                outcome,
            });
        });
    }

    fn handle_completion(&mut self, completion: Completion) -> PollResult {
        let seq = completion.seq;
        let request = completion.request;
        let changed = self.state.apply_completion(completion);
        if changed.discarded {
            tracing::debug!(seq, %request, "discarded stale response");
        }
        PollResult::Updated(changed)
    }
}
