// Library crate for the Banko game server
// This file exposes the public API for integration tests

pub mod config;
pub mod game;
pub mod shared;

// Re-export commonly used types for easier access in tests
pub use config::AppConfig;
pub use game::{GameService, GameState, GameStore, InMemoryGameStore, JoinCode};
pub use shared::{AppError, AppState};
