//! Catalog operations behind the `/games` routes. Each function validates its
//! input, issues the storage calls and maps absent records onto
//! [`ServiceError::NotFound`].

use futures::future::try_join;
use tracing::{debug, info};

use crate::{
    dao::models::GameInput,
    dto::game::{GamePage, GameRequest, GameResponse, ListGamesQuery},
    error::ServiceError,
    state::SharedState,
};

fn not_found(id: &str) -> ServiceError {
    ServiceError::NotFound(format!("game with id {id} not found"))
}

/// Return one page of games plus the pagination metadata for the whole match set.
pub async fn list_games(
    state: &SharedState,
    query: ListGamesQuery,
) -> Result<GamePage, ServiceError> {
    let filter = query
        .filter()
        .map_err(|param| ServiceError::InvalidInput(format!("`{param}` must be a number")))?;
    let sort = query.sort();
    let pagination = query.pagination();
    debug!(?filter, ?sort, ?pagination, "listing games");

    let store = state.game_store();
    let (items, total) = try_join(
        store.list(filter.clone(), sort, pagination),
        store.count(filter),
    )
    .await?;

    Ok(GamePage::new(items, pagination, total))
}

pub async fn get_game(state: &SharedState, id: String) -> Result<GameResponse, ServiceError> {
    let store = state.game_store();
    match store.find(id.clone()).await? {
        Some(game) => Ok(game.into()),
        None => Err(not_found(&id)),
    }
}

/// Validate and persist a new game.
pub async fn create_game(
    state: &SharedState,
    payload: GameRequest,
) -> Result<GameResponse, ServiceError> {
    let input = GameInput::try_from(payload)?;
    let game = state.game_store().create(input).await?;
    info!(id = %game.id, name = %game.name, "game created");
    Ok(game.into())
}

/// Validate the payload, then replace the game's mutable fields.
pub async fn update_game(
    state: &SharedState,
    id: String,
    payload: GameRequest,
) -> Result<(), ServiceError> {
    let input = GameInput::try_from(payload)?;
    match state.game_store().update(id.clone(), input).await? {
        Some(game) => {
            info!(id = %game.id, "game updated");
            Ok(())
        }
        None => Err(not_found(&id)),
    }
}

pub async fn delete_game(state: &SharedState, id: String) -> Result<(), ServiceError> {
    if state.game_store().delete(id.clone()).await? {
        info!(id = %id, "game deleted");
        Ok(())
    } else {
        Err(not_found(&id))
    }
}
