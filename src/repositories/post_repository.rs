use crate::error::RepositoryError;
use crate::models::{PlayerId, Post, PostId, PostRecord, Reaction, Reply};
use sqlx::{PgPool, Result as SqlxResult};

/// Repository for the community feed: posts, reactions and replies
pub struct PostRepository {
    pool: PgPool,
}

impl PostRepository {
    /// Create a new PostRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn assemble(&self, records: Vec<PostRecord>) -> SqlxResult<Vec<Post>> {
        let ids: Vec<PostId> = records.iter().map(|r| r.id).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let reactions = sqlx::query_as::<_, Reaction>(
            r#"
            SELECT r.id, r.post_id, r.player_id, p.name AS player_name, r.emoji
            FROM reactions r
            JOIN players p ON p.id = r.player_id
            WHERE r.post_id = ANY($1)
            ORDER BY r.id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let replies = sqlx::query_as::<_, Reply>(
            r#"
            SELECT r.id, r.post_id, r.player_id, p.name AS player_name, r.body, r.created_at
            FROM replies r
            JOIN players p ON p.id = r.player_id
            WHERE r.post_id = ANY($1)
            ORDER BY r.created_at, r.id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(records
            .into_iter()
            .map(|record| Post::from_parts(record, reactions.clone(), replies.clone()))
            .collect())
    }

    /// Insert a post
    pub async fn create(&self, player_id: PlayerId, body: &str) -> Result<Post, RepositoryError> {
        let record = sqlx::query_as::<_, PostRecord>(
            r#"
            WITH inserted AS (
                INSERT INTO posts (player_id, body)
                VALUES ($1, $2)
                RETURNING id, player_id, body, created_at
            )
            SELECT i.id, i.player_id, p.name AS player_name, i.body, i.created_at
            FROM inserted i
            JOIN players p ON p.id = i.player_id
            "#,
        )
        .bind(player_id)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;

        Ok(Post::from_parts(record, Vec::new(), Vec::new()))
    }

    /// Page through posts, newest first
    pub async fn find_page(&self, limit: i64, offset: i64) -> SqlxResult<Vec<Post>> {
        let records = sqlx::query_as::<_, PostRecord>(
            r#"
            SELECT po.id, po.player_id, p.name AS player_name, po.body, po.created_at
            FROM posts po
            JOIN players p ON p.id = po.player_id
            ORDER BY po.created_at DESC, po.id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        self.assemble(records).await
    }

    /// Find a post by id
    pub async fn find_by_id(&self, id: PostId) -> SqlxResult<Option<Post>> {
        let record = sqlx::query_as::<_, PostRecord>(
            r#"
            SELECT po.id, po.player_id, p.name AS player_name, po.body, po.created_at
            FROM posts po
            JOIN players p ON p.id = po.player_id
            WHERE po.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match record {
            Some(record) => Ok(self.assemble(vec![record]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Delete a post written by `player_id`
    pub async fn delete(&self, id: PostId, player_id: PlayerId) -> SqlxResult<bool> {
        let rows_affected = sqlx::query("DELETE FROM posts WHERE id = $1 AND player_id = $2")
            .bind(id)
            .bind(player_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    /// Remove the reaction if present, insert it otherwise
    pub async fn toggle_reaction(
        &self,
        post_id: PostId,
        player_id: PlayerId,
        emoji: &str,
    ) -> Result<Vec<Reaction>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query(
            r#"
            DELETE FROM reactions
            WHERE post_id = $1 AND player_id = $2 AND emoji = $3
            "#,
        )
        .bind(post_id)
        .bind(player_id)
        .bind(emoji)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if removed == 0 {
            sqlx::query(
                r#"
                INSERT INTO reactions (post_id, player_id, emoji)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(post_id)
            .bind(player_id)
            .bind(emoji)
            .execute(&mut *tx)
            .await?;
        }

        let reactions = sqlx::query_as::<_, Reaction>(
            r#"
            SELECT r.id, r.post_id, r.player_id, p.name AS player_name, r.emoji
            FROM reactions r
            JOIN players p ON p.id = r.player_id
            WHERE r.post_id = $1
            ORDER BY r.id
            "#,
        )
        .bind(post_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(reactions)
    }

    /// Insert a reply
    pub async fn create_reply(
        &self,
        post_id: PostId,
        player_id: PlayerId,
        body: &str,
    ) -> Result<Reply, RepositoryError> {
        let reply = sqlx::query_as::<_, Reply>(
            r#"
            WITH inserted AS (
                INSERT INTO replies (post_id, player_id, body)
                VALUES ($1, $2, $3)
                RETURNING id, post_id, player_id, body, created_at
            )
            SELECT i.id, i.post_id, i.player_id, p.name AS player_name, i.body, i.created_at
            FROM inserted i
            JOIN players p ON p.id = i.player_id
            "#,
        )
        .bind(post_id)
        .bind(player_id)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;

        Ok(reply)
    }

    /// Delete a reply written by `player_id`
    pub async fn delete_reply(
        &self,
        post_id: PostId,
        reply_id: i64,
        player_id: PlayerId,
    ) -> SqlxResult<bool> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM replies
            WHERE id = $1 AND post_id = $2 AND player_id = $3
            "#,
        )
        .bind(reply_id)
        .bind(post_id)
        .bind(player_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows_affected > 0)
    }
}
