#![allow(dead_code)]

use forefinder_backend::config::{AppConfig, SessionConfig};
use forefinder_backend::models::*;
use forefinder_backend::store::{MemoryStore, PgStore, PlayerStore};
use forefinder_backend::AppState;
use sqlx::PgPool;
use std::sync::Arc;

pub const TEST_SECRET: &str = "test-session-secret";

/// Development config with a fixed session secret
pub fn test_config() -> AppConfig {
    AppConfig {
        session: SessionConfig {
            secret: TEST_SECRET.to_string(),
            ttl_secs: 3600,
        },
        ..AppConfig::default()
    }
}

/// Application wired to an in-memory store
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let store = Arc::new(MemoryStore::with_default_courses());
        let state = Arc::new(AppState::new(config, store.clone(), None));
        Self { store, state }
    }

    /// Bearer header value for `player_id`
    pub fn bearer(&self, player_id: PlayerId) -> String {
        format!("Bearer {}", self.state.sessions.issue(player_id))
    }
}

/// Test database wrapper for the PostgreSQL store
pub struct TestDatabase {
    pub pool: PgPool,
    pub store: Arc<PgStore>,
}

impl TestDatabase {
    /// Create TestDatabase from an existing pool (useful with sqlx::test)
    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            store: Arc::new(PgStore::new(pool.clone())),
            pool,
        }
    }
}

/// Four players: Eric, Julie, Mark and Pat
pub struct TestFixtures {
    pub eric: Player,
    pub julie: Player,
    pub mark: Player,
    pub pat: Player,
}

impl TestFixtures {
    /// Create test fixtures with sample data
    pub async fn create(store: &dyn PlayerStore) -> Self {
        Self {
            eric: create_test_player(store, "Eric").await,
            julie: create_test_player(store, "Julie").await,
            mark: create_test_player(store, "Mark").await,
            pat: create_test_player(store, "Pat").await,
        }
    }
}

/// Helper function to create a test player
pub async fn create_test_player(store: &dyn PlayerStore, name: &str) -> Player {
    let username = name.to_lowercase();
    store
        .create_player(&NewPlayer {
            name: name.to_string(),
            phone: "303-555-0100".to_string(),
            email: format!("{}@example.com", username),
            username,
        })
        .await
        .expect("Failed to create test player")
}

/// Event creation request for course 1 with the given capacity
pub fn event_request(open_spots: i32, private: bool, invitees: Vec<PlayerId>) -> NewEvent {
    NewEvent {
        course_id: 1,
        date: "2026-08-01".to_string(),
        tee_time: "07:30".to_string(),
        open_spots,
        number_of_holes: "18".to_string(),
        private,
        invitees,
    }
}

pub fn ids(events: &[Event]) -> Vec<EventId> {
    events.iter().map(|e| e.id).collect()
}
