use super::SharedState;
use crate::error::{AppError, AppResult};
use crate::models::PlayerId;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub player_id: PlayerId,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub player_id: PlayerId,
    pub token: String,
    pub expires_in: i64,
}

/// Issue a session token without credentials. Answers 404 outside
/// development, where tokens come from the external identity provider.
pub async fn create_session(
    State(state): State<SharedState>,
    Json(request): Json<SessionRequest>,
) -> AppResult<(StatusCode, Json<SessionResponse>)> {
    if !state.config.is_development() {
        return Err(AppError::NotFound("Session issuing is disabled".to_string()));
    }

    let player = state.players.get_player(request.player_id).await?;
    let token = state.sessions.issue(player.player.id);
    info!("Issued development session for player {}", player.player.id);

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            player_id: player.player.id,
            token,
            expires_in: state.config.session.ttl_secs,
        }),
    ))
}
