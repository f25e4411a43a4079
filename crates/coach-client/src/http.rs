//! REST implementation of [`GameApi`] over `reqwest`.

use coach_core::error::ApiError;
use coach_core::protocol::{
    ActionRequest, AddChipsRequest, AddChipsResponse, AdviceResponse, ErrorBody, GameId,
    GameState, HealthStatus, NewGameResponse, StateEnvelope,
};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::api::GameApi;
use crate::config::ClientConfig;

/// HTTP client for the coaching server's `/api` routes.
#[derive(Debug, Clone)]
pub struct HttpGameApi {
    client: Client,
    base_url: String,
}

impl HttpGameApi {
    /// Build a client for the server named in `config`.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn game_url(&self, game_id: &GameId, route: &str) -> String {
        self.url(&format!("/game/{}/{}", game_id, route))
    }
}

/// Turn a response into `T`, mapping non-2xx statuses to
/// [`ApiError::ServerRejected`] and undecodable bodies to
/// [`ApiError::MalformedResponse`].
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;

    if !status.is_success() {
        let reason = match serde_json::from_slice::<ErrorBody>(&body) {
            Ok(ErrorBody { error }) => error,
            Err(_) if !body.is_empty() => String::from_utf8_lossy(&body).trim().to_string(),
            Err(_) => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        };
        tracing::warn!(status = status.as_u16(), %reason, "server rejected request");
        return Err(ApiError::ServerRejected {
            status: status.as_u16(),
            reason,
        });
    }

    serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(error = %e, "undecodable response body");
        ApiError::MalformedResponse(e.to_string())
    })
}

fn network(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Network("request timed out".to_string())
    } else {
        ApiError::Network(e.to_string())
    }
}

impl GameApi for HttpGameApi {
    async fn health(&self) -> Result<HealthStatus, ApiError> {
        let url = self.url("/health");
        tracing::debug!(%url, "GET health");
        let response = self.client.get(&url).send().await.map_err(network)?;
        decode(response).await
    }

    async fn create_game(&self) -> Result<NewGameResponse, ApiError> {
        let url = self.url("/game/new");
        tracing::debug!(%url, "POST new game");
        let response = self.client.post(&url).send().await.map_err(network)?;
        let created: NewGameResponse = decode(response).await?;
        tracing::info!(game_id = %created.game_id, "game created");
        Ok(created)
    }

    async fn fetch_state(&self, game_id: &GameId) -> Result<GameState, ApiError> {
        let url = self.game_url(game_id, "state");
        tracing::debug!(%url, "GET state");
        let response = self.client.get(&url).send().await.map_err(network)?;
        decode(response).await
    }

    async fn send_action(
        &self,
        game_id: &GameId,
        request: &ActionRequest,
    ) -> Result<GameState, ApiError> {
        let url = self.game_url(game_id, "action");
        tracing::debug!(%url, action = %request.action, amount = ?request.amount, "POST action");
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(network)?;
        let envelope: StateEnvelope = decode(response).await?;
        Ok(envelope.state)
    }

    async fn new_hand(&self, game_id: &GameId) -> Result<GameState, ApiError> {
        let url = self.game_url(game_id, "new-hand");
        tracing::debug!(%url, "POST new hand");
        let response = self.client.post(&url).send().await.map_err(network)?;
        let envelope: StateEnvelope = decode(response).await?;
        Ok(envelope.state)
    }

    async fn advice(&self, game_id: &GameId) -> Result<AdviceResponse, ApiError> {
        let url = self.game_url(game_id, "coach");
        tracing::debug!(%url, "GET advice");
        let response = self.client.get(&url).send().await.map_err(network)?;
        decode(response).await
    }

    async fn add_chips(&self, game_id: &GameId, amount: u32) -> Result<AddChipsResponse, ApiError> {
        let url = self.game_url(game_id, "add-chips");
        tracing::debug!(%url, amount, "POST add chips");
        let response = self
            .client
            .post(&url)
            .json(&AddChipsRequest { amount })
            .send()
            .await
            .map_err(network)?;
        decode(response).await
    }
}
