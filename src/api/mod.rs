//! JSON HTTP API served under `/api/v1`.

mod events;
mod extract;
mod friendships;
mod players;
mod posts;
mod sessions;

use crate::AppState;
use axum::extract::State;
use axum::http::{header, Method};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub type SharedState = Arc<AppState>;

/// Build the application router
pub fn router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_origin(tower_http::cors::Any)
        .max_age(Duration::from_secs(60 * 60));

    let api = Router::new()
        .route("/courses", get(players::list_courses))
        .route("/players", get(players::list_players).post(players::create_player))
        .route("/players/:id", get(players::get_player))
        .route("/players/:id/events", get(events::player_events))
        .route("/players/:id/friends", get(friendships::player_friends))
        .route("/dashboard", get(events::dashboard))
        .route("/events", get(events::list_events).post(events::create_event))
        .route("/events/:id", get(events::get_event).delete(events::cancel_event))
        .route("/events/:id/join", post(events::join_event))
        .route("/events/:id/remove", post(events::remove_participant))
        .route("/player-event", patch(events::update_invite))
        .route(
            "/friendships",
            post(friendships::create_friendship).delete(friendships::delete_friendship),
        )
        .route("/posts", get(posts::list_posts).post(posts::create_post))
        .route("/posts/:id", axum::routing::delete(posts::delete_post))
        .route("/posts/:id/reactions", post(posts::toggle_reaction))
        .route("/posts/:id/replies", post(posts::create_reply))
        .route(
            "/posts/:id/replies/:reply_id",
            axum::routing::delete(posts::delete_reply),
        )
        .route("/sessions", post(sessions::create_session));

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health(State(state): State<SharedState>) -> Json<Value> {
    let storage = match &state.database {
        Some(database) => match database.ping().await {
            Ok(()) => "connected",
            Err(e) => {
                warn!("Health check database ping failed: {}", e);
                "unavailable"
            }
        },
        None => "memory",
    };

    Json(json!({
        "status": "ok",
        "environment": state.config.environment,
        "storage": storage,
    }))
}

/// Resolves on Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
