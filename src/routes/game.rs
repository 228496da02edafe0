use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};

use crate::{
    dto::game::{GamePage, GameRequest, GameResponse, ListGamesQuery},
    error::AppError,
    services::game_service,
    state::SharedState,
};

/// Catalog CRUD routes.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games", get(list_games).post(create_game))
        .route(
            "/games/{id}",
            get(get_game).put(update_game).delete(delete_game),
        )
}

/// List games with optional filtering, sorting and pagination.
pub async fn list_games(
    State(state): State<SharedState>,
    query: Result<Query<ListGamesQuery>, QueryRejection>,
) -> Result<Json<GamePage>, AppError> {
    let Query(query) = query.map_err(|err| AppError::BadRequest(err.body_text()))?;
    Ok(Json(game_service::list_games(&state, query).await?))
}

/// Retrieve a single game by identifier.
pub async fn get_game(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<GameResponse>, AppError> {
    Ok(Json(game_service::get_game(&state, id).await?))
}

/// Create a game and point the client at its location.
pub async fn create_game(
    State(state): State<SharedState>,
    payload: Result<Json<GameRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = payload.map_err(|err| AppError::BadRequest(err.body_text()))?;
    let game = game_service::create_game(&state, payload).await?;
    let location = format!("/games/{}", game.id);

    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(game)).into_response())
}

/// Replace the mutable fields of an existing game.
pub async fn update_game(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    payload: Result<Json<GameRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(payload) = payload.map_err(|err| AppError::BadRequest(err.body_text()))?;
    game_service::update_game(&state, id, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a game permanently.
pub async fn delete_game(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    game_service::delete_game(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
