// Turn and round state machine for a game of Banko.
//
// Every action is a pure function of the current `GameState` and its inputs,
// producing a `GameUpdate` for the store to persist. Nothing here performs I/O.
use std::collections::HashSet;
use std::sync::Arc;

use super::dice::DiceRoller;
use super::models::{GameState, GameUpdate, PlayerRecord, Round, Setting, SettingName};
use super::scoring::{is_valid_manual_value, score_roll, RollInput, RollScore};
use super::turn::next_player;

/// An action was attempted in a state that does not allow it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("Only the host ({host}) can do that")]
    NotHost { host: String },
    #[error("The game has not started yet")]
    NotStarted,
    #[error("The game has already started")]
    AlreadyStarted,
    #[error("All rounds have been played")]
    GameOver,
    #[error("The game cannot finish until every round is played")]
    GameNotOver,
    #[error("The game is finished")]
    Finished,
    #[error("{actor} cannot act for {target}")]
    NotAuthorized { actor: String, target: String },
    #[error("{0} is not in this game")]
    UnknownPlayer(String),
    #[error("{0} has already banked this round")]
    PlayerNotActive(String),
    #[error("Pick at least one player to bank")]
    NoBankers,
    #[error("{value} cannot be entered on roll {roll}")]
    InvalidManualValue { value: u8, roll: u32 },
    #[error("New player order must contain every player exactly once")]
    InvalidPlayerOrder,
    #[error("Player name cannot be empty")]
    EmptyPlayerName,
    #[error("No players left to take a turn")]
    EmptyRoster,
    #[error("The score is too large to keep")]
    PotOverflow,
}

/// Result of a roll: the update to persist plus what was rolled and scored.
#[derive(Debug, Clone, PartialEq)]
pub struct RollOutcome {
    pub update: GameUpdate,
    pub input: RollInput,
    pub score: RollScore,
}

/// Whether `actor` may roll or bank on behalf of `target`.
///
/// Players always act for themselves. The host may act for anyone when host
/// control is switched on, and for host-created players regardless.
pub fn can_act(game: &GameState, actor: &str, target: &str) -> bool {
    if actor == target {
        return true;
    }
    if !game.is_host(actor) {
        return false;
    }
    game.setting_enabled(SettingName::HostControl)
        || game.player(target).is_some_and(|p| p.host_created)
}

fn require_host(game: &GameState, actor: &str) -> Result<(), GameError> {
    if game.is_host(actor) {
        Ok(())
    } else {
        Err(GameError::NotHost {
            host: game.host.clone(),
        })
    }
}

/// The round in progress, or why there is none to play.
fn playable_round(game: &GameState) -> Result<&Round, GameError> {
    if game.finished {
        return Err(GameError::Finished);
    }
    let round = game.round.as_ref().ok_or(GameError::NotStarted)?;
    if game.is_over() {
        return Err(GameError::GameOver);
    }
    Ok(round)
}

fn advance(order: &[String], current: &str) -> Result<String, GameError> {
    next_player(order, current)
        .map(str::to_string)
        .ok_or(GameError::EmptyRoster)
}

/// Round `round_num + 1` with the whole roster back in play.
fn rollover_round(game: &GameState, round_num: u32) -> Round {
    Round::fresh(round_num + 1, game.ordered_player_names.clone())
}

pub struct GameEngine {
    dice: Arc<dyn DiceRoller>,
}

impl GameEngine {
    pub fn new(dice: Arc<dyn DiceRoller>) -> Self {
        Self { dice }
    }

    /// Puts the whole roster into round one.
    pub fn start_game(&self, game: &GameState, actor: &str) -> Result<GameUpdate, GameError> {
        require_host(game, actor)?;
        if game.is_started() {
            return Err(GameError::AlreadyStarted);
        }

        Ok(GameUpdate {
            round: Some(Round::fresh(1, game.ordered_player_names.clone())),
            ..Default::default()
        })
    }

    /// Rolls for the current player, or records a hand-entered total.
    pub fn roll_dice(
        &self,
        game: &GameState,
        actor: &str,
        manual_value: Option<u8>,
    ) -> Result<RollOutcome, GameError> {
        let round = playable_round(game)?;
        if !can_act(game, actor, &game.current_player) {
            return Err(GameError::NotAuthorized {
                actor: actor.to_string(),
                target: game.current_player.clone(),
            });
        }

        let input = match manual_value {
            Some(value) if !is_valid_manual_value(round.current_roll, value) => {
                return Err(GameError::InvalidManualValue {
                    value,
                    roll: round.current_roll,
                });
            }
            Some(value) => RollInput::Manual(value),
            None => RollInput::Dice(self.dice.roll()),
        };
        let score = score_roll(round.current_roll, input, round.current_points);
        let (die_one, die_two) = input.recorded_faces();

        let (next_round, current_player) = if score.bust {
            let mut busted = rollover_round(game, round.round_num);
            busted.die_one = die_one;
            busted.die_two = die_two;
            let current = advance(&busted.active_ordered_player_names, &game.current_player)?;
            (busted, current)
        } else {
            let pot = round
                .current_points
                .checked_add(score.points_awarded)
                .ok_or(GameError::PotOverflow)?;
            let continued = Round {
                round_num: round.round_num,
                current_points: pot,
                die_one,
                die_two,
                current_roll: round.current_roll + 1,
                active_ordered_player_names: round.active_ordered_player_names.clone(),
            };
            let current = advance(&continued.active_ordered_player_names, &game.current_player)?;
            (continued, current)
        };

        Ok(RollOutcome {
            update: GameUpdate {
                round: Some(next_round),
                current_player: Some(current_player),
                ..Default::default()
            },
            input,
            score,
        })
    }

    /// Each banker claims the whole pot and sits out the rest of the round.
    pub fn bank(
        &self,
        game: &GameState,
        actor: &str,
        bankers: &[String],
    ) -> Result<GameUpdate, GameError> {
        let round = playable_round(game)?;

        let mut seen = HashSet::new();
        let bankers: Vec<&String> = bankers.iter().filter(|b| seen.insert(*b)).collect();
        if bankers.is_empty() {
            return Err(GameError::NoBankers);
        }
        for banker in &bankers {
            if game.player(banker).is_none() {
                return Err(GameError::UnknownPlayer(banker.to_string()));
            }
            if !round.is_active(banker) {
                return Err(GameError::PlayerNotActive(banker.to_string()));
            }
            if !can_act(game, actor, banker) {
                return Err(GameError::NotAuthorized {
                    actor: actor.to_string(),
                    target: banker.to_string(),
                });
            }
            let banked = game.player(banker).map_or(0, |p| p.points);
            if banked.checked_add(round.current_points).is_none() {
                return Err(GameError::PotOverflow);
            }
        }

        let point_awards = bankers
            .iter()
            .map(|b| (b.to_string(), round.current_points))
            .collect();
        let remaining: Vec<String> = round
            .active_ordered_player_names
            .iter()
            .filter(|name| !seen.contains(name))
            .cloned()
            .collect();

        let (next_round, current_player) = if remaining.is_empty() {
            let fresh = rollover_round(game, round.round_num);
            let current = advance(&fresh.active_ordered_player_names, &game.current_player)?;
            (fresh, current)
        } else {
            let current = if seen.contains(&game.current_player) {
                advance(&remaining, &game.current_player)?
            } else {
                game.current_player.clone()
            };
            let continued = Round {
                active_ordered_player_names: remaining,
                ..round.clone()
            };
            (continued, current)
        };

        Ok(GameUpdate {
            round: Some(next_round),
            current_player: Some(current_player),
            point_awards,
            ..Default::default()
        })
    }

    /// Checks that the host may end the game now.
    pub fn check_finish(&self, game: &GameState, actor: &str) -> Result<(), GameError> {
        require_host(game, actor)?;
        if !game.is_over() {
            return Err(GameError::GameNotOver);
        }
        Ok(())
    }

    /// Flags the game finished so observers can leave.
    pub fn finish_game(&self, game: &GameState, actor: &str) -> Result<GameUpdate, GameError> {
        self.check_finish(game, actor)?;
        Ok(GameUpdate {
            finished: Some(true),
            ..Default::default()
        })
    }

    /// Replaces the setting with the same name, or appends it.
    pub fn update_setting(
        &self,
        game: &GameState,
        actor: &str,
        setting: Setting,
    ) -> Result<GameUpdate, GameError> {
        require_host(game, actor)?;

        let mut settings = game.settings.clone();
        match settings.iter_mut().find(|s| s.name == setting.name) {
            Some(existing) => *existing = setting,
            None => settings.push(setting),
        }

        Ok(GameUpdate {
            settings: Some(settings),
            ..Default::default()
        })
    }

    /// Replaces the turn order with any permutation of the current one.
    ///
    /// Mid-round, the players still active are re-sorted into the new order.
    pub fn update_player_order(
        &self,
        game: &GameState,
        order: Vec<String>,
    ) -> Result<GameUpdate, GameError> {
        let mut proposed = order.clone();
        let mut existing = game.ordered_player_names.clone();
        proposed.sort();
        existing.sort();
        if proposed != existing {
            return Err(GameError::InvalidPlayerOrder);
        }

        let round = game.round.as_ref().map(|round| Round {
            active_ordered_player_names: order
                .iter()
                .filter(|name| round.is_active(name))
                .cloned()
                .collect(),
            ..round.clone()
        });

        Ok(GameUpdate {
            round,
            ordered_player_names: Some(order),
            ..Default::default()
        })
    }

    /// Adds a player to the end of the turn order. Rejoining is a no-op.
    ///
    /// A player added mid-round is not put into the active roster; they play
    /// from the next round on.
    pub fn add_player(
        &self,
        game: &GameState,
        name: &str,
        host_created: bool,
    ) -> Result<GameUpdate, GameError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GameError::EmptyPlayerName);
        }
        if game.has_player(name) {
            return Ok(GameUpdate::default());
        }

        Ok(GameUpdate {
            new_player: Some(PlayerRecord::new(name, host_created)),
            ..Default::default()
        })
    }

    /// The host adds someone playing without their own device.
    pub fn add_local_player(
        &self,
        game: &GameState,
        actor: &str,
        name: &str,
    ) -> Result<GameUpdate, GameError> {
        require_host(game, actor)?;
        self.add_player(game, name, true)
    }
}
