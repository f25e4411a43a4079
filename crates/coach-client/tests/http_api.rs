//! Drives the reqwest client against an in-process stub of the coaching
//! server's REST routes.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use coach_client::api::GameApi;
use coach_client::config::ClientConfig;
use coach_client::controller::{PollResult, TableController};
use coach_client::http::HttpGameApi;
use coach_client::session;
use coach_core::error::ApiError;
use coach_core::protocol::{ActionKind, AdviceResponse, Card, GameId};
use coach_core::table_state::ViewState;

const GAME_ID: &str = "3f2c-game";

#[derive(Clone, Default)]
struct Stub {
    bodies: Arc<Mutex<Vec<Value>>>,
}

fn table(pot: u32) -> Value {
    json!({
        "pot": pot,
        "community_cards": ["Ah", "Kd", "7c"],
        "betting_round": "flop",
        "current_bet": 20,
        "players": [
            { "id": 0, "name": "HUMAN", "seat": 3, "stack": 980, "is_human": true,
              "hole_cards": ["Qs", "Qh"], "contribution_this_round": 0 },
            { "id": 1, "name": "LAG Lucy", "seat": 5, "stack": 960, "is_human": false,
              "hole_cards": [] }
        ],
        "last_event": "New hand started.",
        "last_winner": null,
        "total_chips": 8000
    })
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Game not found" })),
    )
        .into_response()
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "active_games": 1, "timestamp": "2026-10-19T12:00:00" }))
}

async fn new_game() -> Json<Value> {
    Json(json!({ "game_id": GAME_ID, "state": table(15) }))
}

async fn state(Path(id): Path<String>) -> Response {
    match id.as_str() {
        GAME_ID => Json(table(15)).into_response(),
        "garbled" => "<html>oops</html>".into_response(),
        _ => not_found(),
    }
}

async fn action(
    State(stub): State<Stub>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if id != GAME_ID {
        return not_found();
    }
    stub.bodies.lock().unwrap().push(body);
    Json(json!({ "success": true, "state": table(95) })).into_response()
}

async fn new_hand(Path(id): Path<String>) -> Response {
    if id != GAME_ID {
        return not_found();
    }
    Json(json!({ "success": true, "state": table(15) })).into_response()
}

async fn coach(Path(_id): Path<String>) -> Json<Value> {
    Json(json!({
        "recommendation": "raise",
        "reasoning": "Overpair on a dry board",
        "pot_odds": 0.18,
        "equity_estimate": 0.72,
        "hand_strength": "strong",
        "outs": null,
        "confidence": "high",
        "alternative": "Suggested bet: 60-75% pot"
    }))
}

async fn add_chips(
    State(stub): State<Stub>,
    Path(_id): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    stub.bodies.lock().unwrap().push(body);
    Json(json!({ "success": true, "new_stack": 1980 }))
}

async fn spawn_server(stub: Stub) -> SocketAddr {
    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/game/new", post(new_game))
        .route("/api/game/{id}/state", get(state))
        .route("/api/game/{id}/action", post(action))
        .route("/api/game/{id}/new-hand", post(new_hand))
        .route("/api/game/{id}/coach", get(coach))
        .route("/api/game/{id}/add-chips", post(add_chips))
        .with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn config_for(addr: SocketAddr) -> ClientConfig {
    ClientConfig {
        server_url: format!("http://{}", addr),
        request_timeout: Some(Duration::from_secs(5)),
        ..ClientConfig::default()
    }
}

async fn applied<A: GameApi>(ctrl: &mut TableController<A>) {
    match ctrl.recv().await {
        PollResult::Updated(_) => {}
        PollResult::Empty => panic!("expected a completion"),
    }
}

#[tokio::test]
async fn health_check() {
    let addr = spawn_server(Stub::default()).await;
    let api = HttpGameApi::new(&config_for(addr)).unwrap();
    let health = session::check_health(&api).await.unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.active_games, 1);
}

#[tokio::test]
async fn load_renders_server_state() {
    let addr = spawn_server(Stub::default()).await;
    let api = HttpGameApi::new(&config_for(addr)).unwrap();
    let mut ctrl = TableController::new(api, config_for(addr));

    ctrl.start();
    applied(&mut ctrl).await;

    let game = ctrl.state.game().expect("table loaded");
    assert_eq!(game.pot, 15);
    assert_eq!(game.community_cards.len(), 3);
    assert_eq!(
        game.hero().unwrap().hole_cards,
        vec![Card::new("Qs"), Card::new("Qh")]
    );
    assert_eq!(ctrl.state.game_id, Some(GameId::new(GAME_ID)));
}

#[tokio::test]
async fn action_bodies_on_the_wire() {
    let stub = Stub::default();
    let addr = spawn_server(stub.clone()).await;
    let api = HttpGameApi::new(&config_for(addr)).unwrap();
    let mut ctrl = TableController::new(api, config_for(addr));
    ctrl.start();
    applied(&mut ctrl).await;

    ctrl.submit(ActionKind::Fold, None).unwrap();
    applied(&mut ctrl).await;
    ctrl.submit(ActionKind::BetRaise, None).unwrap();
    applied(&mut ctrl).await;

    let bodies = stub.bodies.lock().unwrap().clone();
    assert_eq!(
        bodies,
        vec![
            json!({ "action": "fold" }),
            json!({ "action": "bet_raise", "amount": 100 }),
        ]
    );
    assert_eq!(ctrl.state.game().unwrap().pot, 95);
}

#[tokio::test]
async fn unknown_game_is_server_rejected() {
    let addr = spawn_server(Stub::default()).await;
    let api = HttpGameApi::new(&config_for(addr)).unwrap();
    let err = api.fetch_state(&GameId::new("nope")).await.unwrap_err();
    assert_eq!(
        err,
        ApiError::ServerRejected {
            status: 404,
            reason: "Game not found".to_string()
        }
    );
}

#[tokio::test]
async fn garbled_body_is_malformed() {
    let addr = spawn_server(Stub::default()).await;
    let api = HttpGameApi::new(&config_for(addr)).unwrap();
    let err = api.fetch_state(&GameId::new("garbled")).await.unwrap_err();
    assert!(matches!(err, ApiError::MalformedResponse(_)));
}

#[tokio::test]
async fn unreachable_server_fails_load() {
    // Bind then drop to get a port nobody listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = HttpGameApi::new(&config_for(addr)).unwrap();
    let mut ctrl = TableController::new(api, config_for(addr));
    ctrl.start();
    applied(&mut ctrl).await;
    assert!(matches!(
        ctrl.state.view,
        ViewState::LoadFailed(ApiError::Network(_))
    ));
}

#[tokio::test]
async fn advice_and_buy_in() {
    let stub = Stub::default();
    let addr = spawn_server(stub.clone()).await;
    let api = HttpGameApi::new(&config_for(addr)).unwrap();
    let game_id = GameId::new(GAME_ID);

    match api.advice(&game_id).await.unwrap() {
        AdviceResponse::Advice(advice) => {
            assert_eq!(advice.recommendation, "raise");
            assert_eq!(advice.equity_estimate, Some(0.72));
        }
        other => panic!("expected advice, got {:?}", other),
    }

    let added = api.add_chips(&game_id, 1000).await.unwrap();
    assert_eq!(added.new_stack, 1980);
    assert_eq!(
        stub.bodies.lock().unwrap().clone(),
        vec![json!({ "amount": 1000 })]
    );
}

#[tokio::test]
async fn new_hand_round_trip() {
    let addr = spawn_server(Stub::default()).await;
    let api = HttpGameApi::new(&config_for(addr)).unwrap();
    let state = api.new_hand(&GameId::new(GAME_ID)).await.unwrap();
    assert_eq!(state.pot, 15);
    assert_eq!(state.last_event.as_deref(), Some("New hand started."));
}
