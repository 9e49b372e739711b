// Public API
pub use dice::{DiceRoll, DiceRoller, RandomDiceRoller, ScriptedDiceRoller, SeededDiceRoller};
pub use engine::{can_act, GameEngine, GameError, RollOutcome};
pub use handlers::router;
pub use join_code::{InvalidJoinCode, JoinCode, JoinCodeGenerator, RandomJoinCodeGenerator};
pub use models::{GameState, GameUpdate, PlayerRecord, Round, Setting, SettingName};
pub use repository::{GameStore, InMemoryGameStore, StoreError};
pub use scoring::{is_valid_manual_value, score_roll, RollInput, RollScore};
pub use service::{GameService, ServiceOptions};
pub use subscription::GameSubscription;
pub use turn::next_player;
pub use types::GameResponse;

// Internal modules
mod dice;
mod engine;
mod handlers;
mod join_code;
mod models;
mod repository;
mod scoring;
mod service;
mod subscription;
mod turn;
pub mod types;
