use crate::error::{AppError, AppResult};
use crate::models::{PlayerId, Post, PostId, Reaction, Reply};
use crate::store::{PlayerStore, PostStore};
use std::sync::Arc;
use tracing::info;

/// Default page size for the community feed
pub const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;

/// Service for the community feed
pub struct FeedService {
    posts: Arc<dyn PostStore>,
    players: Arc<dyn PlayerStore>,
}

fn required<'a>(value: &'a str, field: &str) -> AppResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{} can't be blank", field)));
    }
    Ok(value)
}

impl FeedService {
    pub fn new(posts: Arc<dyn PostStore>, players: Arc<dyn PlayerStore>) -> Self {
        Self { posts, players }
    }

    async fn ensure_player(&self, id: PlayerId) -> AppResult<()> {
        match self.players.find_player(id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(format!("Player {} not found", id))),
        }
    }

    async fn ensure_post(&self, id: PostId) -> AppResult<()> {
        match self.posts.find_post(id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(format!("Post {} not found", id))),
        }
    }

    pub async fn create_post(&self, author_id: PlayerId, body: &str) -> AppResult<Post> {
        let body = required(body, "Body")?;
        self.ensure_player(author_id).await?;

        let post = self.posts.create_post(author_id, body).await?;
        info!("Player {} posted {}", author_id, post.id);
        Ok(post)
    }

    /// Newest posts first; `limit` defaults to 50
    pub async fn list_posts(&self, limit: Option<i64>, offset: Option<i64>) -> AppResult<Vec<Post>> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = offset.unwrap_or(0).max(0);
        self.posts.list_posts(limit, offset).await
    }

    pub async fn delete_post(&self, post_id: PostId, author_id: PlayerId) -> AppResult<()> {
        if !self.posts.delete_post(post_id, author_id).await? {
            return Err(AppError::NotFound(format!(
                "Post {} not found for player {}",
                post_id, author_id
            )));
        }
        info!("Player {} deleted post {}", author_id, post_id);
        Ok(())
    }

    pub async fn toggle_reaction(
        &self,
        post_id: PostId,
        player_id: PlayerId,
        emoji: &str,
    ) -> AppResult<Vec<Reaction>> {
        let emoji = required(emoji, "Emoji")?;
        self.ensure_post(post_id).await?;
        self.ensure_player(player_id).await?;
        self.posts.toggle_reaction(post_id, player_id, emoji).await
    }

    pub async fn create_reply(
        &self,
        post_id: PostId,
        player_id: PlayerId,
        body: &str,
    ) -> AppResult<Reply> {
        let body = required(body, "Body")?;
        self.ensure_post(post_id).await?;
        self.ensure_player(player_id).await?;
        self.posts.create_reply(post_id, player_id, body).await
    }

    pub async fn delete_reply(
        &self,
        post_id: PostId,
        reply_id: i64,
        author_id: PlayerId,
    ) -> AppResult<()> {
        if !self.posts.delete_reply(post_id, reply_id, author_id).await? {
            return Err(AppError::NotFound(format!(
                "Reply {} not found for player {}",
                reply_id, author_id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewPlayer;
    use crate::store::MemoryStore;

    async fn setup() -> (FeedService, PlayerId, PlayerId) {
        let store = Arc::new(MemoryStore::new());
        let mut ids = Vec::new();
        for name in ["eric", "julie"] {
            let player = store
                .create_player(&NewPlayer {
                    name: name.into(),
                    phone: "555-0100".into(),
                    email: format!("{}@example.com", name),
                    username: name.into(),
                })
                .await
                .unwrap();
            ids.push(player.id);
        }
        (FeedService::new(store.clone(), store), ids[0], ids[1])
    }

    #[tokio::test]
    async fn test_posts_listed_newest_first_with_paging() {
        let (feed, eric, _) = setup().await;
        for body in ["first", "second", "third"] {
            feed.create_post(eric, body).await.unwrap();
        }

        let posts = feed.list_posts(None, None).await.unwrap();
        let bodies: Vec<&str> = posts.iter().map(|p| p.body.as_str()).collect();
        assert_eq!(bodies, vec!["third", "second", "first"]);

        let page = feed.list_posts(Some(1), Some(1)).await.unwrap();
        assert_eq!(page[0].body, "second");
    }

    #[tokio::test]
    async fn test_blank_body_is_rejected() {
        let (feed, eric, _) = setup().await;
        let err = feed.create_post(eric, "   ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_only_author_deletes_post() {
        let (feed, eric, julie) = setup().await;
        let post = feed.create_post(eric, "Tee off at 7?").await.unwrap();

        assert!(feed.delete_post(post.id, julie).await.unwrap_err().is_not_found());
        feed.delete_post(post.id, eric).await.unwrap();
        assert!(feed.list_posts(None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_replies_and_reactions_show_on_post() {
        let (feed, eric, julie) = setup().await;
        let post = feed.create_post(eric, "Tee off at 7?").await.unwrap();

        let reply = feed.create_reply(post.id, julie, "I'm in").await.unwrap();
        assert_eq!(reply.player_name, "julie");
        feed.toggle_reaction(post.id, julie, "👍").await.unwrap();

        let posts = feed.list_posts(None, None).await.unwrap();
        assert_eq!(posts[0].replies.len(), 1);
        assert_eq!(posts[0].reactions.len(), 1);

        feed.delete_reply(post.id, reply.id, julie).await.unwrap();
        assert!(feed.delete_reply(post.id, reply.id, julie).await.is_err());
        assert!(feed.create_reply(999, julie, "hello").await.unwrap_err().is_not_found());
    }
}
