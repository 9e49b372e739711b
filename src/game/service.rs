use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::{
    dice::DiceRoller,
    engine::{GameEngine, GameError},
    join_code::{JoinCode, JoinCodeGenerator},
    models::{GameState, GameUpdate, PlayerRecord, Setting},
    repository::{GameStore, StoreError},
    subscription::GameSubscription,
};
use crate::{
    config::AppConfig,
    shared::{AppError, AppState},
};

/// Tunables for game creation and store access
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    pub end_round_num: u32,
    pub join_code_attempts: usize,
    pub store_retries: u32,
    pub retry_backoff: Duration,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for ServiceOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            end_round_num: config.end_round_num,
            join_code_attempts: config.join_code_attempts,
            store_retries: config.store_retries,
            retry_backoff: Duration::from_millis(50),
        }
    }
}

/// Service for running games: loads state from the store, applies engine
/// transitions, and writes the result back.
pub struct GameService {
    store: Arc<dyn GameStore>,
    engine: GameEngine,
    join_codes: Arc<dyn JoinCodeGenerator>,
    options: ServiceOptions,
}

impl GameService {
    pub fn new(
        store: Arc<dyn GameStore>,
        dice: Arc<dyn DiceRoller>,
        join_codes: Arc<dyn JoinCodeGenerator>,
        options: ServiceOptions,
    ) -> Self {
        Self {
            store,
            engine: GameEngine::new(dice),
            join_codes,
            options,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            Arc::clone(&state.game_store),
            Arc::clone(&state.dice),
            Arc::clone(&state.join_codes),
            state.options.clone(),
        )
    }

    /// Runs a store call, retrying transient failures with exponential backoff
    async fn with_retry<T, F, Fut>(&self, operation: &'static str, mut call: F) -> Result<T, StoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let mut attempt = 1;
        let mut backoff = self.options.retry_backoff;
        loop {
            match call().await {
                Err(err) if err.is_retryable() && attempt < self.options.store_retries => {
                    warn!(operation, attempt, error = %err, "Store call failed, retrying");
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn load(&self, join_code: &JoinCode) -> Result<GameState, AppError> {
        Ok(self.with_retry("load", || self.store.load(join_code)).await?)
    }

    /// Loads the game, runs one engine transition on it and saves the result
    /// guarded by the revision it was computed from.
    async fn apply<F>(
        &self,
        join_code: &JoinCode,
        action_id: Option<Uuid>,
        transition: F,
    ) -> Result<GameState, AppError>
    where
        F: FnOnce(&GameState) -> Result<GameUpdate, GameError>,
    {
        let game = self.load(join_code).await?;
        if let Some(action_id) = action_id {
            let applied = self
                .with_retry("was_applied", || self.store.was_applied(join_code, action_id))
                .await?;
            if applied {
                info!(join_code = %join_code, %action_id, "Action already applied");
                return Ok(game);
            }
        }

        let update = match transition(&game) {
            Ok(update) => update,
            Err(err) => {
                warn!(join_code = %join_code, error = %err, "Action rejected");
                return Err(err.into());
            }
        };
        if update.is_empty() {
            debug!(join_code = %join_code, "Nothing to save");
            return Ok(game);
        }

        let update = update
            .with_expected_revision(game.revision)
            .with_action_id(action_id);
        let saved = self
            .with_retry("save", || self.store.save(join_code, update.clone()))
            .await?;
        Ok(saved)
    }

    /// Creates a game hosted by `host_name` under a fresh join code
    #[instrument(skip(self))]
    pub async fn create_game(&self, host_name: &str) -> Result<GameState, AppError> {
        let host_name = host_name.trim();
        if host_name.is_empty() {
            return Err(GameError::EmptyPlayerName.into());
        }

        for attempt in 1..=self.options.join_code_attempts {
            let join_code = self.join_codes.generate();
            if self
                .with_retry("exists", || self.store.exists(&join_code))
                .await?
            {
                debug!(join_code = %join_code, attempt, "Join code taken");
                continue;
            }

            let game = GameState::new(join_code.clone(), host_name, self.options.end_round_num);
            let host = PlayerRecord::new(host_name, true);
            match self.store.create_game(&join_code, &game, &host).await {
                Ok(()) => {
                    info!(join_code = %join_code, host = %host_name, "Game created");
                    return self.load(&join_code).await;
                }
                Err(StoreError::AlreadyExists(_)) => {
                    debug!(join_code = %join_code, attempt, "Join code claimed concurrently");
                }
                Err(err) => return Err(err.into()),
            }
        }

        warn!(
            attempts = self.options.join_code_attempts,
            "Could not find a free join code"
        );
        Err(AppError::CodeSpaceExhausted(self.options.join_code_attempts))
    }

    #[instrument(skip(self, join_code), fields(join_code = %join_code))]
    pub async fn get_game(&self, join_code: &JoinCode) -> Result<GameState, AppError> {
        self.load(join_code).await
    }

    /// Live snapshots of a game until it is deleted or the subscription dropped
    #[instrument(skip(self, join_code), fields(join_code = %join_code))]
    pub async fn watch_game(&self, join_code: &JoinCode) -> Result<GameSubscription, AppError> {
        let subscription = self
            .with_retry("subscribe", || self.store.subscribe(join_code))
            .await?;
        Ok(subscription)
    }

    /// Runs an add-player transition and appends the record without a
    /// revision guard, so joining never conflicts with play in progress.
    async fn enroll<F>(&self, join_code: &JoinCode, transition: F) -> Result<GameState, AppError>
    where
        F: FnOnce(&GameState) -> Result<GameUpdate, GameError>,
    {
        let game = self.load(join_code).await?;
        let update = transition(&game).inspect_err(|err| {
            warn!(join_code = %join_code, error = %err, "Player rejected");
        })?;

        match update.new_player {
            Some(player) => Ok(self
                .with_retry("add_player", || self.store.add_player(join_code, &player))
                .await?),
            None => {
                debug!(join_code = %join_code, "Player already in game");
                Ok(game)
            }
        }
    }

    /// A player joins with their own device
    #[instrument(skip(self, join_code), fields(join_code = %join_code))]
    pub async fn join_game(
        &self,
        join_code: &JoinCode,
        player_name: &str,
    ) -> Result<GameState, AppError> {
        let game = self
            .enroll(join_code, |game| {
                self.engine.add_player(game, player_name, false)
            })
            .await?;
        info!(player = %player_name, players = game.players.len(), "Player joined game");
        Ok(game)
    }

    /// The host adds a player who shares the host's device
    #[instrument(skip(self, join_code), fields(join_code = %join_code))]
    pub async fn add_local_player(
        &self,
        join_code: &JoinCode,
        acting_player: &str,
        player_name: &str,
    ) -> Result<GameState, AppError> {
        let game = self
            .enroll(join_code, |game| {
                self.engine.add_local_player(game, acting_player, player_name)
            })
            .await?;
        info!(player = %player_name, "Local player added");
        Ok(game)
    }

    #[instrument(skip(self, join_code), fields(join_code = %join_code))]
    pub async fn start_game(
        &self,
        join_code: &JoinCode,
        acting_player: &str,
    ) -> Result<GameState, AppError> {
        let game = self
            .apply(join_code, None, |game| {
                self.engine.start_game(game, acting_player)
            })
            .await?;
        info!(players = game.ordered_player_names.len(), "Game started");
        Ok(game)
    }

    /// Rolls for the current player, or records a value entered by hand
    #[instrument(skip(self, join_code), fields(join_code = %join_code))]
    pub async fn roll_dice(
        &self,
        join_code: &JoinCode,
        acting_player: &str,
        manual_value: Option<u8>,
        action_id: Option<Uuid>,
    ) -> Result<GameState, AppError> {
        let game = self
            .apply(join_code, action_id, |game| {
                let outcome = self.engine.roll_dice(game, acting_player, manual_value)?;
                info!(
                    player = %game.current_player,
                    input = ?outcome.input,
                    points = outcome.score.points_awarded,
                    bust = outcome.score.bust,
                    "Dice rolled"
                );
                Ok(outcome.update)
            })
            .await?;
        Ok(game)
    }

    #[instrument(skip(self, join_code), fields(join_code = %join_code))]
    pub async fn bank(
        &self,
        join_code: &JoinCode,
        acting_player: &str,
        bankers: &[String],
        action_id: Option<Uuid>,
    ) -> Result<GameState, AppError> {
        let game = self
            .apply(join_code, action_id, |game| {
                self.engine.bank(game, acting_player, bankers)
            })
            .await?;
        info!(
            bankers = ?bankers,
            round_num = game.round.as_ref().map(|r| r.round_num),
            "Points banked"
        );
        Ok(game)
    }

    /// Marks the game finished once every round is played
    #[instrument(skip(self, join_code), fields(join_code = %join_code))]
    pub async fn finish_game(
        &self,
        join_code: &JoinCode,
        acting_player: &str,
    ) -> Result<GameState, AppError> {
        let game = self
            .apply(join_code, None, |game| {
                self.engine.finish_game(game, acting_player)
            })
            .await?;
        info!("Game finished");
        Ok(game)
    }

    /// Deletes the game and every player record. Irreversible.
    #[instrument(skip(self, join_code), fields(join_code = %join_code))]
    pub async fn delete_game(&self, join_code: &JoinCode, acting_player: &str) -> Result<(), AppError> {
        let game = self.load(join_code).await?;
        if let Err(err) = self.engine.check_finish(&game, acting_player) {
            warn!(error = %err, "Delete rejected");
            return Err(err.into());
        }

        self.with_retry("delete", || self.store.delete_game(join_code))
            .await?;
        info!("Game deleted");
        Ok(())
    }

    #[instrument(skip(self, join_code), fields(join_code = %join_code))]
    pub async fn update_setting(
        &self,
        join_code: &JoinCode,
        acting_player: &str,
        setting: Setting,
    ) -> Result<GameState, AppError> {
        let name = setting.name.clone();
        let game = self
            .apply(join_code, None, |game| {
                self.engine.update_setting(game, acting_player, setting)
            })
            .await?;
        info!(setting = %name, "Setting updated");
        Ok(game)
    }

    #[instrument(skip(self, join_code), fields(join_code = %join_code))]
    pub async fn update_player_order(
        &self,
        join_code: &JoinCode,
        acting_player: &str,
        ordered_player_names: Vec<String>,
    ) -> Result<GameState, AppError> {
        let game = self
            .apply(join_code, None, |game| {
                self.engine.update_player_order(game, ordered_player_names)
            })
            .await?;
        info!(order = ?game.ordered_player_names, "Player order updated");
        Ok(game)
    }
}
