use super::{EventStore, PlayerStore, PostStore};
use crate::error::{AppResult, RepositoryError};
use crate::invitation::{ActionOutcome, InviteAction};
use crate::models::{
    Course, CourseId, Event, EventDraft, EventId, Friendship, NewPlayer, Player, PlayerId, Post,
    PostId, Reaction, Reply,
};
use crate::repositories::{
    CourseRepository, EventRepository, FriendshipRepository, PlayerRepository, PostRepository,
};
use async_trait::async_trait;
use sqlx::PgPool;

/// PostgreSQL-backed store delegating to the repositories
pub struct PgStore {
    courses: CourseRepository,
    events: EventRepository,
    friendships: FriendshipRepository,
    players: PlayerRepository,
    posts: PostRepository,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            courses: CourseRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            friendships: FriendshipRepository::new(pool.clone()),
            players: PlayerRepository::new(pool.clone()),
            posts: PostRepository::new(pool),
        }
    }
}

#[async_trait]
impl EventStore for PgStore {
    async fn find_event(&self, id: EventId) -> AppResult<Option<Event>> {
        Ok(self.events.find_by_id(id).await?)
    }

    async fn list_events(&self) -> AppResult<Vec<Event>> {
        Ok(self.events.find_all().await?)
    }

    async fn list_public_events(&self) -> AppResult<Vec<Event>> {
        Ok(self.events.find_public().await?)
    }

    async fn events_for_player(&self, player_id: PlayerId) -> AppResult<Vec<Event>> {
        Ok(self.events.find_by_player(player_id).await?)
    }

    async fn create_event(&self, draft: &EventDraft) -> AppResult<Event> {
        Ok(self.events.create(draft).await?)
    }

    async fn apply_action(
        &self,
        event_id: EventId,
        actor: PlayerId,
        action: InviteAction,
    ) -> AppResult<ActionOutcome> {
        self.events.apply_action(event_id, actor, action).await
    }

    async fn list_courses(&self) -> AppResult<Vec<Course>> {
        Ok(self.courses.find_all().await?)
    }

    async fn find_course(&self, id: CourseId) -> AppResult<Option<Course>> {
        Ok(self.courses.find_by_id(id).await?)
    }
}

#[async_trait]
impl PlayerStore for PgStore {
    async fn list_players(&self) -> AppResult<Vec<Player>> {
        Ok(self.players.find_all().await?)
    }

    async fn find_player(&self, id: PlayerId) -> AppResult<Option<Player>> {
        Ok(self.players.find_by_id(id).await?)
    }

    async fn create_player(&self, player: &NewPlayer) -> AppResult<Player> {
        Ok(self
            .players
            .create(player)
            .await
            .map_err(RepositoryError::from)?)
    }

    async fn followee_ids(&self, player_id: PlayerId) -> AppResult<Vec<PlayerId>> {
        Ok(self.friendships.followee_ids(player_id).await?)
    }

    async fn find_or_create_friendship(
        &self,
        follower_id: PlayerId,
        followee_id: PlayerId,
    ) -> AppResult<Friendship> {
        Ok(self
            .friendships
            .find_or_create(follower_id, followee_id)
            .await
            .map_err(RepositoryError::from)?)
    }

    async fn delete_friendship(&self, a: PlayerId, b: PlayerId) -> AppResult<u64> {
        Ok(self.friendships.delete_between(a, b).await?)
    }
}

#[async_trait]
impl PostStore for PgStore {
    async fn create_post(&self, player_id: PlayerId, body: &str) -> AppResult<Post> {
        Ok(self.posts.create(player_id, body).await?)
    }

    async fn list_posts(&self, limit: i64, offset: i64) -> AppResult<Vec<Post>> {
        Ok(self.posts.find_page(limit, offset).await?)
    }

    async fn find_post(&self, id: PostId) -> AppResult<Option<Post>> {
        Ok(self.posts.find_by_id(id).await?)
    }

    async fn delete_post(&self, id: PostId, player_id: PlayerId) -> AppResult<bool> {
        Ok(self.posts.delete(id, player_id).await?)
    }

    async fn toggle_reaction(
        &self,
        post_id: PostId,
        player_id: PlayerId,
        emoji: &str,
    ) -> AppResult<Vec<Reaction>> {
        Ok(self.posts.toggle_reaction(post_id, player_id, emoji).await?)
    }

    async fn create_reply(
        &self,
        post_id: PostId,
        player_id: PlayerId,
        body: &str,
    ) -> AppResult<Reply> {
        Ok(self.posts.create_reply(post_id, player_id, body).await?)
    }

    async fn delete_reply(
        &self,
        post_id: PostId,
        reply_id: i64,
        player_id: PlayerId,
    ) -> AppResult<bool> {
        Ok(self.posts.delete_reply(post_id, reply_id, player_id).await?)
    }
}
