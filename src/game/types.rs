use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::models::GameState;

/// Request payload for creating a new game
#[derive(Debug, Deserialize)]
pub struct CreateGameRequest {
    pub host_name: String,
}

/// Request payload for joining a game from a player's own device
#[derive(Debug, Deserialize)]
pub struct JoinGameRequest {
    pub player_name: String,
}

/// Request payload for the host adding a player without a device
#[derive(Debug, Deserialize)]
pub struct AddLocalPlayerRequest {
    pub acting_player: String,
    pub player_name: String,
}

/// Request payload for actions that only need to know who is acting
#[derive(Debug, Deserialize)]
pub struct ActingPlayerRequest {
    pub acting_player: String,
}

#[derive(Debug, Deserialize)]
pub struct RollRequest {
    pub acting_player: String,
    /// Total read off physical dice; 13 means doubles
    #[serde(default)]
    pub manual_value: Option<u8>,
    #[serde(default)]
    pub action_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct BankRequest {
    pub acting_player: String,
    pub bankers: Vec<String>,
    #[serde(default)]
    pub action_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct SettingRequest {
    pub acting_player: String,
    pub name: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct PlayerOrderRequest {
    pub acting_player: String,
    pub ordered_player_names: Vec<String>,
}

/// Game state as returned to clients, with players listed in turn order
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResponse {
    #[serde(flatten)]
    pub game: GameState,
    pub is_over: bool,
}

impl From<GameState> for GameResponse {
    fn from(mut game: GameState) -> Self {
        game.players = game.players_in_turn_order();
        let is_over = game.is_over();
        Self { game, is_over }
    }
}
