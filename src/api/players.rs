use super::SharedState;
use crate::error::AppResult;
use crate::models::{Course, NewPlayer, Player, PlayerId, PlayerProfile};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

pub async fn list_courses(State(state): State<SharedState>) -> AppResult<Json<Vec<Course>>> {
    Ok(Json(state.players.list_courses().await?))
}

pub async fn list_players(State(state): State<SharedState>) -> AppResult<Json<Vec<Player>>> {
    Ok(Json(state.players.list_players().await?))
}

pub async fn get_player(
    State(state): State<SharedState>,
    Path(id): Path<PlayerId>,
) -> AppResult<Json<PlayerProfile>> {
    Ok(Json(state.players.get_player(id).await?))
}

pub async fn create_player(
    State(state): State<SharedState>,
    Json(request): Json<NewPlayer>,
) -> AppResult<(StatusCode, Json<Player>)> {
    let player = state.players.create_player(request).await?;
    Ok((StatusCode::CREATED, Json(player)))
}
