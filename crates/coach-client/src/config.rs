use std::time::Duration;

/// Server the client talks to when none is given.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

/// Amount sent with a bet/raise when the player has not typed one.
pub const DEFAULT_BET_AMOUNT: u32 = 100;

/// Chips requested by a buy-in.
pub const DEFAULT_BUY_IN: u32 = 1_000;

/// Per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Runtime settings for the API client and controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the game server, without the `/api` suffix.
    pub server_url: String,
    pub bet_amount: u32,
    pub buy_in: u32,
    /// `None` disables the timeout.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            bet_amount: DEFAULT_BET_AMOUNT,
            buy_in: DEFAULT_BUY_IN,
            request_timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        }
    }
}

impl ClientConfig {
    /// Base URL with any trailing slash or `/api` suffix removed.
    pub fn base_url(&self) -> String {
        let trimmed = self.server_url.trim().trim_end_matches('/');
        trimmed.strip_suffix("/api").unwrap_or(trimmed).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_url(url: &str) -> ClientConfig {
        ClientConfig {
            server_url: url.to_string(),
            ..ClientConfig::default()
        }
    }

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.bet_amount, 100);
        assert_eq!(config.buy_in, 1000);
        assert_eq!(config.base_url(), "http://127.0.0.1:5000");
    }

    #[test]
    fn base_url_normalisation() {
        assert_eq!(with_url("http://host:5000/").base_url(), "http://host:5000");
        assert_eq!(with_url("http://host:5000/api").base_url(), "http://host:5000");
        assert_eq!(with_url("http://host:5000/api/").base_url(), "http://host:5000");
        assert_eq!(with_url(" https://coach.example ").base_url(), "https://coach.example");
    }
}
