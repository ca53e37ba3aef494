use super::SharedState;
use crate::auth::Viewer;
use crate::error::AppResult;
use crate::models::{Post, PostId, Reaction, Reply};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Page {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct BodyRequest {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct ReactionRequest {
    pub emoji: String,
}

pub async fn list_posts(
    State(state): State<SharedState>,
    Query(page): Query<Page>,
) -> AppResult<Json<Vec<Post>>> {
    Ok(Json(state.feed.list_posts(page.limit, page.offset).await?))
}

pub async fn create_post(
    State(state): State<SharedState>,
    viewer: Viewer,
    Json(request): Json<BodyRequest>,
) -> AppResult<(StatusCode, Json<Post>)> {
    let post = state.feed.create_post(viewer.player_id, &request.body).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn delete_post(
    State(state): State<SharedState>,
    viewer: Viewer,
    Path(id): Path<PostId>,
) -> AppResult<StatusCode> {
    state.feed.delete_post(id, viewer.player_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_reaction(
    State(state): State<SharedState>,
    viewer: Viewer,
    Path(id): Path<PostId>,
    Json(request): Json<ReactionRequest>,
) -> AppResult<Json<Vec<Reaction>>> {
    let reactions = state
        .feed
        .toggle_reaction(id, viewer.player_id, &request.emoji)
        .await?;
    Ok(Json(reactions))
}

pub async fn create_reply(
    State(state): State<SharedState>,
    viewer: Viewer,
    Path(id): Path<PostId>,
    Json(request): Json<BodyRequest>,
) -> AppResult<(StatusCode, Json<Reply>)> {
    let reply = state
        .feed
        .create_reply(id, viewer.player_id, &request.body)
        .await?;
    Ok((StatusCode::CREATED, Json(reply)))
}

pub async fn delete_reply(
    State(state): State<SharedState>,
    viewer: Viewer,
    Path((post_id, reply_id)): Path<(PostId, i64)>,
) -> AppResult<StatusCode> {
    state
        .feed
        .delete_reply(post_id, reply_id, viewer.player_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
