//! Game server abstraction.
//!
//! Decouples the table controller from the way the server is reached. The
//! [`HttpGameApi`](crate::http::HttpGameApi) speaks the REST API; tests plug
//! in an in-memory implementation.

use std::future::Future;

use coach_core::error::ApiError;
use coach_core::protocol::{
    ActionRequest, AddChipsResponse, AdviceResponse, GameId, GameState, HealthStatus,
    NewGameResponse,
};

/// The operations the coaching server offers.
///
/// Every call returns an explicit [`Result`]; nothing here retries.
pub trait GameApi: Send + Sync + 'static {
    /// `GET /api/health`.
    fn health(&self) -> impl Future<Output = Result<HealthStatus, ApiError>> + Send;

    /// `POST /api/game/new`: create a game and deal its first hand.
    fn create_game(&self) -> impl Future<Output = Result<NewGameResponse, ApiError>> + Send;

    /// `GET /api/game/{id}/state`.
    fn fetch_state(
        &self,
        game_id: &GameId,
    ) -> impl Future<Output = Result<GameState, ApiError>> + Send;

    /// `POST /api/game/{id}/action`.
    fn send_action(
        &self,
        game_id: &GameId,
        request: &ActionRequest,
    ) -> impl Future<Output = Result<GameState, ApiError>> + Send;

    /// `POST /api/game/{id}/new-hand`.
    fn new_hand(&self, game_id: &GameId)
    -> impl Future<Output = Result<GameState, ApiError>> + Send;

    /// `GET /api/game/{id}/coach`.
    fn advice(
        &self,
        game_id: &GameId,
    ) -> impl Future<Output = Result<AdviceResponse, ApiError>> + Send;

    /// `POST /api/game/{id}/add-chips`.
    fn add_chips(
        &self,
        game_id: &GameId,
        amount: u32,
    ) -> impl Future<Output = Result<AddChipsResponse, ApiError>> + Send;
}
