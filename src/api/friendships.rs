use super::SharedState;
use crate::auth::Viewer;
use crate::error::AppResult;
use crate::models::{Friend, Friendship, PlayerId};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct FriendshipRequest {
    pub followee_id: PlayerId,
}

pub async fn player_friends(
    State(state): State<SharedState>,
    Path(id): Path<PlayerId>,
) -> AppResult<Json<Vec<Friend>>> {
    Ok(Json(state.friendships.friends(id).await?))
}

pub async fn create_friendship(
    State(state): State<SharedState>,
    viewer: Viewer,
    Json(request): Json<FriendshipRequest>,
) -> AppResult<(StatusCode, Json<Friendship>)> {
    let friendship = state
        .friendships
        .create_friendship(viewer.player_id, request.followee_id)
        .await?;
    Ok((StatusCode::CREATED, Json(friendship)))
}

pub async fn delete_friendship(
    State(state): State<SharedState>,
    viewer: Viewer,
    Json(request): Json<FriendshipRequest>,
) -> AppResult<StatusCode> {
    state
        .friendships
        .remove(viewer.player_id, request.followee_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
