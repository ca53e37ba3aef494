use super::SharedState;
use crate::auth::Viewer;
use crate::classifier::Classification;
use crate::error::AppResult;
use crate::invitation::InviteStatus;
use crate::models::{Event, EventId, NewEvent, PlayerId};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct EventFilter {
    pub private: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct InviteUpdate {
    pub event_id: EventId,
    pub invite_status: InviteStatus,
}

#[derive(Debug, Deserialize)]
pub struct RemoveParticipant {
    pub player_id: PlayerId,
}

pub async fn list_events(
    State(state): State<SharedState>,
    Query(filter): Query<EventFilter>,
) -> AppResult<Json<Vec<Event>>> {
    let events = match filter.private {
        Some(false) => state.events.public_events().await?,
        _ => state.events.all_events().await?,
    };
    Ok(Json(events))
}

pub async fn get_event(
    State(state): State<SharedState>,
    Path(id): Path<EventId>,
) -> AppResult<Json<Event>> {
    Ok(Json(state.events.get_event(id).await?))
}

pub async fn player_events(
    State(state): State<SharedState>,
    Path(id): Path<PlayerId>,
) -> AppResult<Json<Vec<Event>>> {
    Ok(Json(state.events.fetch_events(id).await?))
}

pub async fn dashboard(
    State(state): State<SharedState>,
    viewer: Viewer,
) -> AppResult<Json<Classification>> {
    Ok(Json(state.events.dashboard(viewer.player_id).await?))
}

pub async fn create_event(
    State(state): State<SharedState>,
    viewer: Viewer,
    Json(request): Json<NewEvent>,
) -> AppResult<(StatusCode, Json<Event>)> {
    let event = state.events.create_event(viewer.player_id, request).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn cancel_event(
    State(state): State<SharedState>,
    viewer: Viewer,
    Path(id): Path<EventId>,
) -> AppResult<Json<Vec<Event>>> {
    Ok(Json(state.invites.cancel_event(id, viewer.player_id).await?))
}

pub async fn join_event(
    State(state): State<SharedState>,
    viewer: Viewer,
    Path(id): Path<EventId>,
) -> AppResult<Json<Vec<Event>>> {
    Ok(Json(state.invites.join_event(viewer.player_id, id).await?))
}

pub async fn remove_participant(
    State(state): State<SharedState>,
    viewer: Viewer,
    Path(id): Path<EventId>,
    Json(request): Json<RemoveParticipant>,
) -> AppResult<Json<Event>> {
    let event = state
        .invites
        .remove_participant(id, viewer.player_id, request.player_id)
        .await?;
    Ok(Json(event))
}

pub async fn update_invite(
    State(state): State<SharedState>,
    viewer: Viewer,
    Json(request): Json<InviteUpdate>,
) -> AppResult<Json<Vec<Event>>> {
    let events = state
        .invites
        .apply_invite(viewer.player_id, request.event_id, request.invite_status)
        .await?;
    Ok(Json(events))
}
