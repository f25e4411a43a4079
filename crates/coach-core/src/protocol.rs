//! JSON shapes exchanged with the coaching game server.
//!
//! The server owns every rule of the game; the client only decodes what it
//! is sent and encodes the player's intent. Most fields are optional on the
//! wire so that a bare `{ community_cards, pot, players }` payload decodes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A card as the server sends it, e.g. `"As"` or `"Td"`.
///
/// The client never interprets the value beyond display: well-formed codes
/// get a rank/suit glyph, anything else is shown verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Card(pub String);

impl Card {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn rank_str(&self) -> Option<&'static str> {
        let mut chars = self.0.chars();
        let rank = chars.next()?;
        chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        match rank.to_ascii_uppercase() {
            '2' => Some("2"),
            '3' => Some("3"),
            '4' => Some("4"),
            '5' => Some("5"),
            '6' => Some("6"),
            '7' => Some("7"),
            '8' => Some("8"),
            '9' => Some("9"),
            'T' => Some("T"),
            'J' => Some("J"),
            'Q' => Some("Q"),
            'K' => Some("K"),
            'A' => Some("A"),
            _ => None,
        }
    }

    pub fn suit_str(&self) -> Option<&'static str> {
        let mut chars = self.0.chars();
        chars.next()?;
        let suit = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        match suit.to_ascii_lowercase() {
            's' => Some("♠"),
            'h' => Some("♥"),
            'd' => Some("♦"),
            'c' => Some("♣"),
            _ => None,
        }
    }

    /// Whether the suit should be displayed in red.
    pub fn is_red(&self) -> bool {
        matches!(self.suit_str(), Some("♥") | Some("♦"))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.rank_str(), self.suit_str()) {
            (Some(rank), Some(suit)) => write!(f, "{}{}", rank, suit),
            _ => f.write_str(&self.0),
        }
    }
}

/// Opaque identifier of a game held by the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub String);

impl GameId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Betting street reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BettingRound {
    #[default]
    Preflop,
    Flop,
    Turn,
    River,
    Finished,
    #[serde(other)]
    Unknown,
}

impl BettingRound {
    pub fn label(self) -> &'static str {
        match self {
            BettingRound::Preflop => "Preflop",
            BettingRound::Flop => "Flop",
            BettingRound::Turn => "Turn",
            BettingRound::River => "River",
            BettingRound::Finished => "Finished",
            BettingRound::Unknown => "?",
        }
    }
}

impl fmt::Display for BettingRound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One seat at the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Player {
    pub id: u32,
    pub name: String,
    pub seat: u32,
    pub stack: u32,
    pub is_human: bool,
    pub in_hand: bool,
    pub has_folded: bool,
    pub contribution_this_round: u32,
    pub total_contribution: u32,
    /// Only populated for the human seat, or for everyone at showdown.
    pub hole_cards: Vec<Card>,
    pub position: String,
    pub is_button: bool,
    pub is_sb: bool,
    pub is_bb: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            seat: 0,
            stack: 0,
            is_human: false,
            in_hand: true,
            has_folded: false,
            contribution_this_round: 0,
            total_contribution: 0,
            hole_cards: Vec::new(),
            position: String::new(),
            is_button: false,
            is_sb: false,
            is_bb: false,
        }
    }
}

impl Player {
    /// Name for display, falling back to `"Seat N"`.
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            format!("Seat {}", self.seat)
        } else {
            self.name.clone()
        }
    }
}

/// Summary of the human seat the server sends alongside the player list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroSummary {
    pub seat: u32,
    pub stack: u32,
    pub hole_cards: Vec<Card>,
    pub in_hand: bool,
    pub has_folded: bool,
    pub position: String,
}

/// A full snapshot of the table. Replaced wholesale on every response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub community_cards: Vec<Card>,
    pub pot: u32,
    pub players: Vec<Player>,
    #[serde(default)]
    pub betting_round: BettingRound,
    #[serde(default)]
    pub current_bet: u32,
    #[serde(default)]
    pub button_seat: Option<u32>,
    #[serde(default)]
    pub sb_seat: Option<u32>,
    #[serde(default)]
    pub bb_seat: Option<u32>,
    #[serde(default)]
    pub hero: Option<HeroSummary>,
    #[serde(default)]
    pub last_event: Option<String>,
    #[serde(default)]
    pub last_winner: Option<String>,
    #[serde(default)]
    pub total_chips: Option<u32>,
}

impl GameState {
    /// The human-controlled seat, if the server flagged one.
    pub fn hero(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_human)
    }

    /// Chips the hero needs to put in to match the current bet.
    pub fn to_call(&self) -> u32 {
        self.hero()
            .map(|h| self.current_bet.saturating_sub(h.contribution_this_round))
            .unwrap_or(0)
    }

    pub fn is_hand_finished(&self) -> bool {
        self.betting_round == BettingRound::Finished
    }
}

/// The three decisions the player can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Fold,
    CheckCall,
    BetRaise,
}

impl ActionKind {
    pub const ALL: [ActionKind; 3] = [ActionKind::Fold, ActionKind::CheckCall, ActionKind::BetRaise];

    /// Human-readable label for UI display.
    pub fn label(self) -> &'static str {
        match self {
            ActionKind::Fold => "Fold",
            ActionKind::CheckCall => "Check/Call",
            ActionKind::BetRaise => "Bet/Raise",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Body of `POST /api/game/{id}/action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub action: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<u32>,
}

impl ActionRequest {
    /// Build the request for `kind`. The amount is only carried by bet/raise.
    pub fn new(kind: ActionKind, bet_amount: u32) -> Self {
        let amount = match kind {
            ActionKind::BetRaise => Some(bet_amount),
            ActionKind::Fold | ActionKind::CheckCall => None,
        };
        Self {
            action: kind,
            amount,
        }
    }
}

/// Response of `POST /api/game/new`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGameResponse {
    pub game_id: GameId,
    pub state: GameState,
}

/// Response of the action and new-hand endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateEnvelope {
    #[serde(default)]
    pub success: bool,
    pub state: GameState,
}

/// Coaching advice for the hero's current spot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachAdvice {
    pub recommendation: String,
    pub reasoning: String,
    pub pot_odds: Option<f64>,
    pub equity_estimate: Option<f64>,
    pub hand_strength: Option<String>,
    pub outs: Option<u32>,
    #[serde(default)]
    pub confidence: String,
    pub alternative: Option<String>,
}

/// Response of `GET /api/game/{id}/coach`.
///
/// The server answers `{ "advice": null, "message": ... }` when the hero has
/// no decision to make (folded, or the hand is over). Any other body must be
/// a complete [`CoachAdvice`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "AdviceWire")]
pub enum AdviceResponse {
    Advice(CoachAdvice),
    Unavailable { message: String },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AdviceWire {
    Advice(CoachAdvice),
    /// `advice` must be present and `null`.
    Unavailable {
        advice: (),
        #[serde(default)]
        message: String,
    },
}

impl From<AdviceWire> for AdviceResponse {
    fn from(wire: AdviceWire) -> Self {
        match wire {
            AdviceWire::Advice(advice) => AdviceResponse::Advice(advice),
            AdviceWire::Unavailable { advice: (), message } => {
                AdviceResponse::Unavailable { message }
            }
        }
    }
}

/// Body of `POST /api/game/{id}/add-chips`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddChipsRequest {
    pub amount: u32,
}

/// Response of `POST /api/game/{id}/add-chips`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddChipsResponse {
    #[serde(default)]
    pub success: bool,
    pub new_stack: u32,
}

/// Response of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub active_games: usize,
    #[serde(default)]
    pub timestamp: String,
}

/// Body the server attaches to non-2xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
