use futures::stream::{self, Stream};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use super::join_code::JoinCode;
use super::models::{GameState, PlayerRecord};

/// The game document as of `revision`, without its player records.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    pub revision: u64,
    pub game: Arc<GameState>,
}

/// The player records as of `revision`.
#[derive(Debug, Clone)]
pub struct PlayersSnapshot {
    pub revision: u64,
    pub players: Arc<Vec<PlayerRecord>>,
}

enum Feed {
    Document(Result<DocumentSnapshot, RecvError>),
    Players(Result<PlayersSnapshot, RecvError>),
}

/// Live view of one game.
///
/// Listens to the game document and its players separately and only yields
/// a `GameState` once both feeds have reached the same revision, so a
/// snapshot never mixes a new round with stale scores. Dropping or closing
/// the subscription releases both listeners.
pub struct GameSubscription {
    join_code: JoinCode,
    initial: Option<GameState>,
    document: Option<DocumentSnapshot>,
    players: Option<PlayersSnapshot>,
    last_emitted: Option<u64>,
    document_rx: broadcast::Receiver<DocumentSnapshot>,
    players_rx: broadcast::Receiver<PlayersSnapshot>,
    document_open: bool,
    players_open: bool,
    closed: bool,
}

impl GameSubscription {
    pub fn new(
        initial: GameState,
        document_rx: broadcast::Receiver<DocumentSnapshot>,
        players_rx: broadcast::Receiver<PlayersSnapshot>,
    ) -> Self {
        Self {
            join_code: initial.join_code.clone(),
            last_emitted: None,
            initial: Some(initial),
            document: None,
            players: None,
            document_rx,
            players_rx,
            document_open: true,
            players_open: true,
            closed: false,
        }
    }

    pub fn join_code(&self) -> &JoinCode {
        &self.join_code
    }

    /// Waits for the next consistent snapshot. Returns `None` once the game
    /// has been deleted or the subscription closed.
    pub async fn next(&mut self) -> Option<GameState> {
        if let Some(initial) = self.initial.take() {
            self.last_emitted = Some(initial.revision);
            return Some(initial);
        }

        while !self.closed {
            let feed = tokio::select! {
                doc = self.document_rx.recv(), if self.document_open => Feed::Document(doc),
                players = self.players_rx.recv(), if self.players_open => Feed::Players(players),
                else => break,
            };

            match feed {
                Feed::Document(Ok(snapshot)) => self.document = Some(snapshot),
                Feed::Players(Ok(snapshot)) => self.players = Some(snapshot),
                Feed::Document(Err(RecvError::Lagged(skipped)))
                | Feed::Players(Err(RecvError::Lagged(skipped))) => {
                    warn!(join_code = %self.join_code, skipped, "Subscription lagged, skipping stale snapshots");
                    continue;
                }
                // Buffered snapshots on the other feed are still drained
                Feed::Document(Err(RecvError::Closed)) => {
                    self.document_open = false;
                    continue;
                }
                Feed::Players(Err(RecvError::Closed)) => {
                    self.players_open = false;
                    continue;
                }
            }

            if let Some(state) = self.combine() {
                return Some(state);
            }
        }

        if !self.closed {
            debug!(join_code = %self.join_code, "Game removed, ending subscription");
            self.closed = true;
        }
        None
    }

    fn combine(&mut self) -> Option<GameState> {
        let document = self.document.as_ref()?;
        let players = self.players.as_ref()?;
        if document.revision != players.revision {
            return None;
        }
        if self.last_emitted.is_some_and(|last| last >= document.revision) {
            return None;
        }

        let mut state = (*document.game).clone();
        state.players = (*players.players).clone();
        self.last_emitted = Some(document.revision);
        Some(state)
    }

    /// Stops listening. Both feeds are released together.
    pub fn close(mut self) {
        self.closed = true;
        debug!(join_code = %self.join_code, "Subscription closed");
    }

    /// Adapts the subscription into a `Stream` of snapshots.
    pub fn into_stream(self) -> impl Stream<Item = GameState> + Send {
        stream::unfold(self, |mut subscription| async move {
            subscription
                .next()
                .await
                .map(|state| (state, subscription))
        })
    }
}
