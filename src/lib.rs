//! ForeFinder Backend Library
//!
//! Tee-time scheduling: events at golf courses, invitations, friendships and
//! the viewer-relative classification of events into committed, available,
//! joinable and hidden. This module exposes the components for the binary
//! and for tests.

pub mod api;
pub mod auth;
pub mod classifier;
pub mod config;
pub mod database;
pub mod error;
pub mod invitation;
pub mod models;
pub mod repositories;
pub mod services;
pub mod store;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};

use auth::SessionKeys;
use database::Database;
use services::{EventService, FeedService, FriendshipService, InviteService, PlayerService};
use std::sync::Arc;
use store::{EventStore, PlayerStore, PostStore, Store};

/// Application state containing configuration and all services
pub struct AppState {
    pub config: AppConfig,
    pub sessions: SessionKeys,
    /// Present when running against PostgreSQL
    pub database: Option<Database>,
    pub events: Arc<EventService>,
    pub invites: Arc<InviteService>,
    pub friendships: Arc<FriendshipService>,
    pub players: Arc<PlayerService>,
    pub feed: Arc<FeedService>,
}

impl AppState {
    /// Create a new AppState wiring every service to `store`
    pub fn new<S: Store + 'static>(config: AppConfig, store: Arc<S>, database: Option<Database>) -> Self {
        let event_store: Arc<dyn EventStore> = store.clone();
        let player_store: Arc<dyn PlayerStore> = store.clone();
        let post_store: Arc<dyn PostStore> = store;

        let friendships = Arc::new(FriendshipService::new(player_store.clone()));

        Self {
            sessions: SessionKeys::from_config(&config.session),
            config,
            database,
            events: Arc::new(EventService::new(
                event_store.clone(),
                player_store.clone(),
                friendships.clone(),
            )),
            invites: Arc::new(InviteService::new(event_store.clone())),
            players: Arc::new(PlayerService::new(
                player_store.clone(),
                event_store,
                friendships.clone(),
            )),
            feed: Arc::new(FeedService::new(post_store, player_store)),
            friendships,
        }
    }
}
