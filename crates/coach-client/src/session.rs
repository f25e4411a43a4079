//! Game session helpers.
//!
//! Multi-step exchanges with the server that the controller runs as a
//! single request: attaching to (or creating) a game, and buying in.

use coach_core::error::ApiError;
use coach_core::protocol::{GameId, HealthStatus};
use coach_core::table_state::Reply;

use crate::api::GameApi;

/// Load the table for the view.
///
/// With a known `game_id` the current state is fetched. If the server no
/// longer knows that game (404) a new one is created instead, as is the
/// case when no id is given at all.
pub async fn load_game<A: GameApi>(api: &A, game_id: Option<GameId>) -> Result<Reply, ApiError> {
    if let Some(game_id) = game_id {
        match api.fetch_state(&game_id).await {
            Ok(state) => {
                tracing::info!(%game_id, "attached to existing game");
                return Ok(Reply::Game {
                    game_id,
                    state,
                    created: false,
                });
            }
            Err(e) if e.is_not_found() => {
                tracing::warn!(%game_id, "game not found on server, creating a new one");
            }
            Err(e) => return Err(e),
        }
    }

    let created = api.create_game().await?;
    Ok(Reply::Game {
        game_id: created.game_id,
        state: created.state,
        created: true,
    })
}

/// Buy in for `amount` chips, then fetch the table so the new stack shows.
pub async fn add_chips_and_refresh<A: GameApi>(
    api: &A,
    game_id: &GameId,
    amount: u32,
) -> Result<Reply, ApiError> {
    let added = api.add_chips(game_id, amount).await?;
    tracing::info!(%game_id, amount, new_stack = added.new_stack, "chips added");
    let state = api.fetch_state(game_id).await?;
    Ok(Reply::ChipsAdded {
        amount,
        new_stack: added.new_stack,
        state,
    })
}

/// Ask the server whether it is up.
pub async fn check_health<A: GameApi>(api: &A) -> Result<HealthStatus, ApiError> {
    let health = api.health().await?;
    tracing::info!(status = %health.status, active_games = health.active_games, "server health");
    Ok(health)
}
