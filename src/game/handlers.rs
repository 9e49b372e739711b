use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    join_code::JoinCode,
    models::Setting,
    service::GameService,
    types::{
        ActingPlayerRequest, AddLocalPlayerRequest, BankRequest, CreateGameRequest,
        GameResponse, JoinGameRequest, PlayerOrderRequest, RollRequest, SettingRequest,
    },
};
use crate::shared::{AppError, AppState};

/// Routes for the game API
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/games", post(create_game))
        .route("/games/:code", get(get_game).delete(delete_game))
        .route("/games/:code/players", post(join_game))
        .route("/games/:code/local-players", post(add_local_player))
        .route("/games/:code/start", post(start_game))
        .route("/games/:code/roll", post(roll_dice))
        .route("/games/:code/bank", post(bank))
        .route("/games/:code/finish", post(finish_game))
        .route("/games/:code/settings", put(update_setting))
        .route("/games/:code/order", put(update_player_order))
}

fn parse_code(code: &str) -> Result<JoinCode, AppError> {
    code.parse::<JoinCode>()
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

/// HTTP handler for creating a new game
///
/// POST /games
/// Returns the new game with its generated join code
#[instrument(name = "create_game", skip(state))]
pub async fn create_game(
    State(state): State<AppState>,
    Json(request): Json<CreateGameRequest>,
) -> Result<Json<GameResponse>, AppError> {
    let service = GameService::from_state(&state);
    let game = service.create_game(&request.host_name).await?;

    info!(join_code = %game.join_code, host = %game.host, "Game created successfully");
    Ok(Json(game.into()))
}

/// GET /games/:code
#[instrument(name = "get_game", skip(state))]
pub async fn get_game(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<GameResponse>, AppError> {
    let join_code = parse_code(&code)?;
    let game = GameService::from_state(&state).get_game(&join_code).await?;
    Ok(Json(game.into()))
}

/// POST /games/:code/players
#[instrument(name = "join_game", skip(state))]
pub async fn join_game(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(request): Json<JoinGameRequest>,
) -> Result<Json<GameResponse>, AppError> {
    let join_code = parse_code(&code)?;
    let game = GameService::from_state(&state)
        .join_game(&join_code, &request.player_name)
        .await?;
    Ok(Json(game.into()))
}

/// POST /games/:code/local-players
#[instrument(name = "add_local_player", skip(state))]
pub async fn add_local_player(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(request): Json<AddLocalPlayerRequest>,
) -> Result<Json<GameResponse>, AppError> {
    let join_code = parse_code(&code)?;
    let game = GameService::from_state(&state)
        .add_local_player(&join_code, &request.acting_player, &request.player_name)
        .await?;
    Ok(Json(game.into()))
}

/// POST /games/:code/start
#[instrument(name = "start_game", skip(state))]
pub async fn start_game(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(request): Json<ActingPlayerRequest>,
) -> Result<Json<GameResponse>, AppError> {
    let join_code = parse_code(&code)?;
    let game = GameService::from_state(&state)
        .start_game(&join_code, &request.acting_player)
        .await?;
    Ok(Json(game.into()))
}

/// POST /games/:code/roll
#[instrument(name = "roll_dice", skip(state))]
pub async fn roll_dice(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(request): Json<RollRequest>,
) -> Result<Json<GameResponse>, AppError> {
    let join_code = parse_code(&code)?;
    let game = GameService::from_state(&state)
        .roll_dice(
            &join_code,
            &request.acting_player,
            request.manual_value,
            request.action_id,
        )
        .await?;
    Ok(Json(game.into()))
}

/// POST /games/:code/bank
#[instrument(name = "bank", skip(state))]
pub async fn bank(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(request): Json<BankRequest>,
) -> Result<Json<GameResponse>, AppError> {
    let join_code = parse_code(&code)?;
    let game = GameService::from_state(&state)
        .bank(
            &join_code,
            &request.acting_player,
            &request.bankers,
            request.action_id,
        )
        .await?;
    Ok(Json(game.into()))
}

/// POST /games/:code/finish
#[instrument(name = "finish_game", skip(state))]
pub async fn finish_game(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(request): Json<ActingPlayerRequest>,
) -> Result<Json<GameResponse>, AppError> {
    let join_code = parse_code(&code)?;
    let game = GameService::from_state(&state)
        .finish_game(&join_code, &request.acting_player)
        .await?;
    Ok(Json(game.into()))
}

/// DELETE /games/:code
///
/// Removes the game and all player records; only after the final round.
#[instrument(name = "delete_game", skip(state))]
pub async fn delete_game(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(request): Json<ActingPlayerRequest>,
) -> Result<StatusCode, AppError> {
    let join_code = parse_code(&code)?;
    GameService::from_state(&state)
        .delete_game(&join_code, &request.acting_player)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /games/:code/settings
#[instrument(name = "update_setting", skip(state))]
pub async fn update_setting(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(request): Json<SettingRequest>,
) -> Result<Json<GameResponse>, AppError> {
    let join_code = parse_code(&code)?;
    let game = GameService::from_state(&state)
        .update_setting(
            &join_code,
            &request.acting_player,
            Setting::new(request.name, request.value),
        )
        .await?;
    Ok(Json(game.into()))
}

/// PUT /games/:code/order
#[instrument(name = "update_player_order", skip(state))]
pub async fn update_player_order(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(request): Json<PlayerOrderRequest>,
) -> Result<Json<GameResponse>, AppError> {
    let join_code = parse_code(&code)?;
    let game = GameService::from_state(&state)
        .update_player_order(
            &join_code,
            &request.acting_player,
            request.ordered_player_names,
        )
        .await?;
    Ok(Json(game.into()))
}
