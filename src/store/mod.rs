//! Persistence ports.
//!
//! Services talk to storage only through these traits. [`PgStore`] backs
//! them with PostgreSQL; [`MemoryStore`] keeps everything in process for
//! development without a database and for tests.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::error::AppResult;
use crate::invitation::{ActionOutcome, InviteAction};
use crate::models::{
    Course, CourseId, Event, EventDraft, EventId, Friendship, NewPlayer, Player, PlayerId, Post,
    PostId, Reaction, Reply,
};
use async_trait::async_trait;

/// Events, their invitation lists, and the course catalogue
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Find an event by id
    async fn find_event(&self, id: EventId) -> AppResult<Option<Event>>;

    /// All events, oldest first
    async fn list_events(&self) -> AppResult<Vec<Event>>;

    /// Events that are not private
    async fn list_public_events(&self) -> AppResult<Vec<Event>>;

    /// Events the player hosts or has any invite status on
    async fn events_for_player(&self, player_id: PlayerId) -> AppResult<Vec<Event>>;

    /// Insert an event with the host accepted and every invitee pending
    async fn create_event(&self, draft: &EventDraft) -> AppResult<Event>;

    /// Apply one invite action atomically.
    ///
    /// The event is locked, [`crate::invitation::apply_action`] runs against
    /// the current state, and the result is persisted before the lock is
    /// released. `Deleted` outcomes remove the event.
    async fn apply_action(
        &self,
        event_id: EventId,
        actor: PlayerId,
        action: InviteAction,
    ) -> AppResult<ActionOutcome>;

    async fn list_courses(&self) -> AppResult<Vec<Course>>;

    async fn find_course(&self, id: CourseId) -> AppResult<Option<Course>>;
}

/// Players and the friendship graph
#[async_trait]
pub trait PlayerStore: Send + Sync {
    async fn list_players(&self) -> AppResult<Vec<Player>>;

    async fn find_player(&self, id: PlayerId) -> AppResult<Option<Player>>;

    /// Insert a player; duplicate email or username is a validation error
    async fn create_player(&self, player: &NewPlayer) -> AppResult<Player>;

    /// Ids the player follows, as stored (may include deleted players)
    async fn followee_ids(&self, player_id: PlayerId) -> AppResult<Vec<PlayerId>>;

    /// Return the existing edge or create it
    async fn find_or_create_friendship(
        &self,
        follower_id: PlayerId,
        followee_id: PlayerId,
    ) -> AppResult<Friendship>;

    /// Delete the edges between two players in both directions, returning
    /// how many were removed
    async fn delete_friendship(&self, a: PlayerId, b: PlayerId) -> AppResult<u64>;
}

/// Community feed
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn create_post(&self, player_id: PlayerId, body: &str) -> AppResult<Post>;

    /// Posts newest first with their reactions and replies
    async fn list_posts(&self, limit: i64, offset: i64) -> AppResult<Vec<Post>>;

    async fn find_post(&self, id: PostId) -> AppResult<Option<Post>>;

    /// Delete a post if `player_id` wrote it
    async fn delete_post(&self, id: PostId, player_id: PlayerId) -> AppResult<bool>;

    /// Add the reaction, or remove it if the player already reacted with
    /// that emoji. Returns the post's reactions afterwards.
    async fn toggle_reaction(
        &self,
        post_id: PostId,
        player_id: PlayerId,
        emoji: &str,
    ) -> AppResult<Vec<Reaction>>;

    async fn create_reply(&self, post_id: PostId, player_id: PlayerId, body: &str)
        -> AppResult<Reply>;

    /// Delete a reply on `post_id` if `player_id` wrote it
    async fn delete_reply(&self, post_id: PostId, reply_id: i64, player_id: PlayerId)
        -> AppResult<bool>;
}

/// Everything the application needs from storage
pub trait Store: EventStore + PlayerStore + PostStore {}

impl<T: EventStore + PlayerStore + PostStore> Store for T {}
