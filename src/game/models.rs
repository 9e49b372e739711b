use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, EnumIter, EnumString};
use uuid::Uuid;

use super::join_code::JoinCode;

/// Settings the game screen knows how to interpret.
///
/// Settings are stored by their human-readable name so that older clients,
/// which only know the raw string, keep working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr, EnumIter)]
pub enum SettingName {
    #[strum(serialize = "Host can roll or bank for other players with devices.")]
    HostControl,
}

impl SettingName {
    /// Value a new game starts with.
    pub fn default_enabled(self) -> bool {
        match self {
            SettingName::HostControl => true,
        }
    }
}

/// A single `{name, value}` pair. Booleans are stored as `"true"` / `"false"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    pub name: String,
    pub value: String,
}

impl Setting {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn flag(name: SettingName, enabled: bool) -> Self {
        Self::new(name.as_ref(), enabled.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    pub name: String,
    pub points: i64,
    /// Added by the host for someone without a device of their own
    pub host_created: bool,
}

impl PlayerRecord {
    pub fn new(name: impl Into<String>, host_created: bool) -> Self {
        Self {
            name: name.into(),
            points: 0,
            host_created,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub round_num: u32,
    pub current_points: i64,
    pub die_one: u8,
    pub die_two: u8,
    pub current_roll: u32,
    pub active_ordered_player_names: Vec<String>,
}

impl Round {
    /// A fresh round with an empty pot and the given roster active.
    pub fn fresh(round_num: u32, active_ordered_player_names: Vec<String>) -> Self {
        Self {
            round_num,
            current_points: 0,
            die_one: 0,
            die_two: 0,
            current_roll: 1,
            active_ordered_player_names,
        }
    }

    pub fn is_active(&self, player_name: &str) -> bool {
        self.active_ordered_player_names
            .iter()
            .any(|name| name == player_name)
    }
}

/// The shared game document together with its player records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub join_code: JoinCode,
    pub host: String,
    pub current_player: String,
    pub ordered_player_names: Vec<String>,
    pub end_round_num: u32,
    pub round: Option<Round>,
    pub settings: Vec<Setting>,
    pub finished: bool,
    pub players: Vec<PlayerRecord>,
    pub revision: u64,
    pub last_modified: DateTime<Utc>,
}

impl GameState {
    /// Creates a game that has not been started yet. The host is the only
    /// player, acts first, and may act for other players by default.
    pub fn new(join_code: JoinCode, host: impl Into<String>, end_round_num: u32) -> Self {
        let host = host.into();
        Self {
            join_code,
            current_player: host.clone(),
            ordered_player_names: vec![host.clone()],
            end_round_num,
            round: None,
            settings: SettingName::iter()
                .map(|name| Setting::flag(name, name.default_enabled()))
                .collect(),
            finished: false,
            players: vec![PlayerRecord::new(host.clone(), true)],
            host,
            revision: 0,
            last_modified: Utc::now(),
        }
    }

    pub fn is_started(&self) -> bool {
        self.round.is_some()
    }

    /// Every round has been played.
    pub fn is_over(&self) -> bool {
        self.round
            .as_ref()
            .is_some_and(|round| round.round_num > self.end_round_num)
    }

    pub fn is_host(&self, player_name: &str) -> bool {
        self.host == player_name
    }

    pub fn player(&self, name: &str) -> Option<&PlayerRecord> {
        self.players.iter().find(|p| p.name == name)
    }

    pub fn has_player(&self, name: &str) -> bool {
        self.ordered_player_names.iter().any(|n| n == name)
    }

    pub fn setting(&self, name: &str) -> Option<&str> {
        self.settings
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.value.as_str())
    }

    /// Reads a boolean setting; anything other than `"true"` is off.
    pub fn setting_enabled(&self, name: SettingName) -> bool {
        self.setting(name.as_ref()) == Some("true")
    }

    pub fn total_points(&self) -> i64 {
        self.players.iter().map(|p| p.points).sum()
    }

    /// Player records sorted the way they take turns. Records whose name is
    /// missing from the order sort last.
    pub fn players_in_turn_order(&self) -> Vec<PlayerRecord> {
        let mut players = self.players.clone();
        players.sort_by_key(|p| {
            self.ordered_player_names
                .iter()
                .position(|name| *name == p.name)
                .unwrap_or(usize::MAX)
        });
        players
    }
}

/// A field-level partial update to a game and its players.
///
/// Engine transitions produce one of these; the store applies it in a single
/// write and rejects it if `expected_revision` no longer matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameUpdate {
    pub expected_revision: Option<u64>,
    pub action_id: Option<Uuid>,
    pub round: Option<Round>,
    pub current_player: Option<String>,
    pub ordered_player_names: Option<Vec<String>>,
    pub settings: Option<Vec<Setting>>,
    pub finished: Option<bool>,
    /// `(player, points)` increments, applied independently
    pub point_awards: Vec<(String, i64)>,
    pub new_player: Option<PlayerRecord>,
}

impl GameUpdate {
    pub fn is_empty(&self) -> bool {
        self.round.is_none()
            && self.current_player.is_none()
            && self.ordered_player_names.is_none()
            && self.settings.is_none()
            && self.finished.is_none()
            && self.point_awards.is_empty()
            && self.new_player.is_none()
    }

    pub fn with_expected_revision(mut self, revision: u64) -> Self {
        self.expected_revision = Some(revision);
        self
    }

    pub fn with_action_id(mut self, action_id: Option<Uuid>) -> Self {
        self.action_id = action_id;
        self
    }

    /// Applies the update's fields to `game` in place. Revision bookkeeping is
    /// left to the caller.
    pub fn apply_to(&self, game: &mut GameState) {
        if let Some(round) = &self.round {
            game.round = Some(round.clone());
        }
        if let Some(current_player) = &self.current_player {
            game.current_player = current_player.clone();
        }
        if let Some(order) = &self.ordered_player_names {
            game.ordered_player_names = order.clone();
        }
        if let Some(settings) = &self.settings {
            game.settings = settings.clone();
        }
        if let Some(finished) = self.finished {
            game.finished = finished;
        }
        for (name, points) in &self.point_awards {
            if let Some(player) = game.players.iter_mut().find(|p| p.name == *name) {
                player.points = player.points.saturating_add(*points);
            }
        }
        if let Some(player) = &self.new_player {
            if !game.has_player(&player.name) {
                game.ordered_player_names.push(player.name.clone());
            }
            if game.player(&player.name).is_none() {
                game.players.push(player.clone());
            }
        }
    }

    /// Convenience for tests and callers that want the next state directly.
    pub fn applied(&self, game: &GameState) -> GameState {
        let mut next = game.clone();
        self.apply_to(&mut next);
        next
    }
}
