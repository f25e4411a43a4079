//! Client orchestrator: connects the table controller and the TUI frontend.
//!
//! This module owns the event loop and drives:
//! - [`coach_client::controller::TableController`] for request dispatch
//! - [`crate::tui::Tui`] for rendering and input

use coach_client::api::GameApi;
use coach_client::config::ClientConfig;
use coach_client::controller::{PollResult, TableController};
use coach_client::http::HttpGameApi;
use coach_client::session;
use coach_core::protocol::GameId;

use crate::tui::{Tui, UserIntent};

/// Print the server's health report.
pub async fn print_health(config: &ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let api = HttpGameApi::new(config)?;
    let health = session::check_health(&api).await?;
    println!(
        "{}: {} ({} active games) at {}",
        config.base_url(),
        health.status,
        health.active_games,
        health.timestamp
    );
    Ok(())
}

/// Start the table view against the server in `config`.
///
/// With `game` set, the view attaches to that game; otherwise a new game is
/// created on load.
pub async fn start_client(
    config: ClientConfig,
    game: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let api = HttpGameApi::new(&config)?;
    let mut ctrl = match game {
        Some(id) => TableController::attach(api, config, GameId::new(id)),
        None => TableController::new(api, config),
    };

    let mut tui = Tui::setup(ctrl.config().bet_amount)?;
    ctrl.start();
    let result = run_event_loop(&mut tui, &mut ctrl).await;
    tui.teardown()?;

    if let Some(game_id) = &ctrl.state.game_id {
        println!("Game id: {} (use --game {} to come back)", game_id, game_id);
    }
    result
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

async fn run_event_loop<A: GameApi>(
    tui: &mut Tui,
    ctrl: &mut TableController<A>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        tui.render(&ctrl.state)?;

        let timeout = tokio::time::Duration::from_millis(50);

        tokio::select! {
            poll = ctrl.recv() => {
                if let PollResult::Updated(changed) = poll
                    && changed.table
                {
                    tui.on_table_changed(&ctrl.state);
                }
            }

            _ = tokio::time::sleep(timeout) => {
                let intent = tui.poll_and_handle_input(&ctrl.state)?;
                if !dispatch(ctrl, intent) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Route a [`UserIntent`] to the controller. Returns `false` to quit.
fn dispatch<A: GameApi>(ctrl: &mut TableController<A>, intent: UserIntent) -> bool {
    let sent = match intent {
        UserIntent::Quit => {
            tracing::info!(game_id = ?ctrl.state.game_id, "quit requested");
            return false;
        }
        UserIntent::Submit { kind, amount } => ctrl.submit(kind, amount).is_some(),
        UserIntent::NewHand => ctrl.new_hand().is_some(),
        UserIntent::Refresh => ctrl.refresh().is_some(),
        UserIntent::RetryLoad => ctrl.start(),
        UserIntent::Advice => ctrl.request_advice().is_some(),
        UserIntent::BuyIn => ctrl.add_chips().is_some(),
        UserIntent::DismissNotice => {
            ctrl.dismiss_notice();
            true
        }
        UserIntent::Feedback(text, category) => {
            tracing::debug!(%text, ?category, "local feedback");
            ctrl.add_message(text, category);
            true
        }
        UserIntent::None => true,
    };
    if !sent {
        tracing::debug!("input ignored, nothing sent");
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use coach_core::protocol::ActionKind;
    use coach_core::table_state::LogCategory;

    fn controller() -> TableController<HttpGameApi> {
        let config = ClientConfig::default();
        let api = HttpGameApi::new(&config).unwrap();
        TableController::new(api, config)
    }

    #[test]
    fn quit_stops_the_loop() {
        let mut ctrl = controller();
        assert!(!dispatch(&mut ctrl, UserIntent::Quit));
        assert!(dispatch(&mut ctrl, UserIntent::None));
    }

    #[test]
    fn refused_input_keeps_running() {
        let mut ctrl = controller();
        let intent = UserIntent::Submit {
            kind: ActionKind::Fold,
            amount: None,
        };
        assert!(dispatch(&mut ctrl, intent));
        assert!(ctrl.state.notice.is_some());
        assert_eq!(ctrl.state.pending(), 0);

        assert!(dispatch(&mut ctrl, UserIntent::DismissNotice));
        assert!(ctrl.state.notice.is_none());
    }

    #[test]
    fn feedback_goes_to_the_log() {
        let mut ctrl = controller();
        dispatch(
            &mut ctrl,
            UserIntent::Feedback("'x' is not a valid amount".to_string(), LogCategory::Error),
        );
        assert!(!ctrl.state.events.is_empty());
    }
}
