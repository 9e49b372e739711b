use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::join_code::JoinCode;
use super::models::{GameState, GameUpdate, PlayerRecord};
use super::subscription::{DocumentSnapshot, GameSubscription, PlayersSnapshot};

/// How many applied action ids each game remembers for deduplication
const RECENT_ACTIONS: usize = 64;
/// Per-game snapshot buffer for subscribers
const SNAPSHOT_CAPACITY: usize = 64;

/// Errors reported by a game store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Game {0} not found")]
    NotFound(String),

    #[error("Game {0} already exists")]
    AlreadyExists(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Game changed while saving (expected revision {expected}, found {actual})")]
    Conflict { expected: u64, actual: u64 },
}

impl StoreError {
    /// Transient failures worth retrying
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// Persistence and change notification for games and their players
#[async_trait]
pub trait GameStore: Send + Sync {
    async fn load(&self, join_code: &JoinCode) -> Result<GameState, StoreError>;

    async fn exists(&self, join_code: &JoinCode) -> Result<bool, StoreError>;

    /// Whether an update carrying `action_id` has already been applied
    async fn was_applied(&self, join_code: &JoinCode, action_id: Uuid)
        -> Result<bool, StoreError>;

    /// Live snapshots of the game, starting with its current state
    async fn subscribe(&self, join_code: &JoinCode) -> Result<GameSubscription, StoreError>;

    /// Applies a partial update as one write and returns the new state.
    ///
    /// Rejects the write with `Conflict` if `expected_revision` is set and
    /// stale. An update whose `action_id` was already applied is skipped and
    /// the current state returned.
    async fn save(&self, join_code: &JoinCode, update: GameUpdate)
        -> Result<GameState, StoreError>;

    async fn create_game(
        &self,
        join_code: &JoinCode,
        initial: &GameState,
        initial_player: &PlayerRecord,
    ) -> Result<(), StoreError>;

    /// Removes the game and all of its player records
    async fn delete_game(&self, join_code: &JoinCode) -> Result<(), StoreError>;

    async fn add_player(
        &self,
        join_code: &JoinCode,
        player: &PlayerRecord,
    ) -> Result<GameState, StoreError>;
}

struct StoredGame {
    state: GameState,
    recent_actions: VecDeque<Uuid>,
    document_tx: broadcast::Sender<DocumentSnapshot>,
    players_tx: broadcast::Sender<PlayersSnapshot>,
}

impl StoredGame {
    fn new(state: GameState) -> Self {
        let (document_tx, _) = broadcast::channel(SNAPSHOT_CAPACITY);
        let (players_tx, _) = broadcast::channel(SNAPSHOT_CAPACITY);
        Self {
            state,
            recent_actions: VecDeque::with_capacity(RECENT_ACTIONS),
            document_tx,
            players_tx,
        }
    }

    fn remember(&mut self, action_id: Uuid) {
        if self.recent_actions.len() == RECENT_ACTIONS {
            self.recent_actions.pop_front();
        }
        self.recent_actions.push_back(action_id);
    }

    fn publish(&self) {
        let revision = self.state.revision;
        let mut document = self.state.clone();
        let players = std::mem::take(&mut document.players);

        let receivers = self
            .document_tx
            .send(DocumentSnapshot {
                revision,
                game: Arc::new(document),
            })
            .unwrap_or(0);
        // Every write notifies both feeds so subscribers can pair them up
        let _ = self.players_tx.send(PlayersSnapshot {
            revision,
            players: Arc::new(players),
        });

        debug!(
            join_code = %self.state.join_code,
            revision,
            receivers,
            "Game snapshot published"
        );
    }

    fn subscribe(&self) -> GameSubscription {
        GameSubscription::new(
            self.state.clone(),
            self.document_tx.subscribe(),
            self.players_tx.subscribe(),
        )
    }
}

/// In-memory implementation of GameStore for development and testing
pub struct InMemoryGameStore {
    games: RwLock<HashMap<JoinCode, StoredGame>>,
}

impl Default for InMemoryGameStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryGameStore {
    pub fn new() -> Self {
        Self {
            games: RwLock::new(HashMap::new()),
        }
    }
}

fn not_found(join_code: &JoinCode) -> StoreError {
    StoreError::NotFound(join_code.to_string())
}

#[async_trait]
impl GameStore for InMemoryGameStore {
    #[instrument(skip_all, fields(join_code = %join_code))]
    async fn load(&self, join_code: &JoinCode) -> Result<GameState, StoreError> {
        let games = self.games.read().await;
        let game = games
            .get(join_code)
            .map(|stored| stored.state.clone())
            .ok_or_else(|| not_found(join_code))?;

        debug!(revision = game.revision, "Game loaded from memory");
        Ok(game)
    }

    async fn exists(&self, join_code: &JoinCode) -> Result<bool, StoreError> {
        Ok(self.games.read().await.contains_key(join_code))
    }

    async fn was_applied(
        &self,
        join_code: &JoinCode,
        action_id: Uuid,
    ) -> Result<bool, StoreError> {
        let games = self.games.read().await;
        let stored = games.get(join_code).ok_or_else(|| not_found(join_code))?;
        Ok(stored.recent_actions.contains(&action_id))
    }

    #[instrument(skip_all, fields(join_code = %join_code))]
    async fn subscribe(&self, join_code: &JoinCode) -> Result<GameSubscription, StoreError> {
        let games = self.games.read().await;
        let stored = games.get(join_code).ok_or_else(|| not_found(join_code))?;

        debug!("New game subscription");
        Ok(stored.subscribe())
    }

    #[instrument(skip_all, fields(join_code = %join_code))]
    async fn save(
        &self,
        join_code: &JoinCode,
        update: GameUpdate,
    ) -> Result<GameState, StoreError> {
        let mut games = self.games.write().await;
        let stored = games.get_mut(join_code).ok_or_else(|| not_found(join_code))?;

        if let Some(action_id) = update.action_id {
            if stored.recent_actions.contains(&action_id) {
                info!(%action_id, "Duplicate action ignored");
                return Ok(stored.state.clone());
            }
        }

        if let Some(expected) = update.expected_revision {
            let actual = stored.state.revision;
            if expected != actual {
                warn!(expected, actual, "Rejecting stale write");
                return Err(StoreError::Conflict { expected, actual });
            }
        }

        update.apply_to(&mut stored.state);
        stored.state.revision += 1;
        stored.state.last_modified = Utc::now();
        if let Some(action_id) = update.action_id {
            stored.remember(action_id);
        }
        stored.publish();

        debug!(revision = stored.state.revision, "Game saved in memory");
        Ok(stored.state.clone())
    }

    #[instrument(skip_all, fields(join_code = %join_code))]
    async fn create_game(
        &self,
        join_code: &JoinCode,
        initial: &GameState,
        initial_player: &PlayerRecord,
    ) -> Result<(), StoreError> {
        let mut games = self.games.write().await;
        if games.contains_key(join_code) {
            warn!("Game already exists in memory");
            return Err(StoreError::AlreadyExists(join_code.to_string()));
        }

        let mut state = initial.clone();
        state.join_code = join_code.clone();
        state.players = vec![initial_player.clone()];
        if !state.has_player(&initial_player.name) {
            state.ordered_player_names.push(initial_player.name.clone());
        }
        state.last_modified = Utc::now();
        games.insert(join_code.clone(), StoredGame::new(state));

        debug!("Game created in memory");
        Ok(())
    }

    #[instrument(skip_all, fields(join_code = %join_code))]
    async fn delete_game(&self, join_code: &JoinCode) -> Result<(), StoreError> {
        let mut games = self.games.write().await;
        // Dropping the stored game closes both feeds for any subscribers
        games.remove(join_code).ok_or_else(|| not_found(join_code))?;

        info!("Game and player records deleted");
        Ok(())
    }

    #[instrument(skip_all, fields(join_code = %join_code, player = %player.name))]
    async fn add_player(
        &self,
        join_code: &JoinCode,
        player: &PlayerRecord,
    ) -> Result<GameState, StoreError> {
        let update = GameUpdate {
            new_player: Some(player.clone()),
            ..Default::default()
        };
        self.save(join_code, update).await
    }
}
