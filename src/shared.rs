use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::game::{
    DiceRoller, GameError, GameStore, JoinCodeGenerator, ServiceOptions, StoreError,
};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub game_store: Arc<dyn GameStore>,
    pub dice: Arc<dyn DiceRoller>,
    pub join_codes: Arc<dyn JoinCodeGenerator>,
    pub options: ServiceOptions,
}

impl AppState {
    pub fn new(
        game_store: Arc<dyn GameStore>,
        dice: Arc<dyn DiceRoller>,
        join_codes: Arc<dyn JoinCodeGenerator>,
        options: ServiceOptions,
    ) -> Self {
        Self {
            game_store,
            dice,
            join_codes,
            options,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    PreconditionViolation(#[from] GameError),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("No free join code found after {0} attempts")]
    CodeSpaceExhausted(usize),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn config(msg: impl Into<String>) -> Self {
        AppError::Config(msg.into())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(code) => AppError::NotFound(format!("Game {code} does not exist")),
            StoreError::AlreadyExists(code) => AppError::AlreadyExists(code),
            StoreError::Unavailable(msg) => AppError::StoreUnavailable(msg),
            conflict @ StoreError::Conflict { .. } => AppError::Conflict(conflict.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::PreconditionViolation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadyExists(_) | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::CodeSpaceExhausted(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}
