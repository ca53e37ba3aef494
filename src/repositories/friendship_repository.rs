use crate::models::{Friendship, PlayerId};
use sqlx::{PgPool, Result as SqlxResult};

/// Repository for directed friendship edges
pub struct FriendshipRepository {
    pool: PgPool,
}

impl FriendshipRepository {
    /// Create a new FriendshipRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find or create the edge `follower -> followee` (upsert pattern)
    pub async fn find_or_create(
        &self,
        follower_id: PlayerId,
        followee_id: PlayerId,
    ) -> SqlxResult<Friendship> {
        // The no-op update makes RETURNING yield the existing row on conflict
        sqlx::query_as::<_, Friendship>(
            r#"
            INSERT INTO friendships (follower_id, followee_id)
            VALUES ($1, $2)
            ON CONFLICT (follower_id, followee_id) DO UPDATE
            SET follower_id = EXCLUDED.follower_id
            RETURNING id, follower_id, followee_id, created_at
            "#,
        )
        .bind(follower_id)
        .bind(followee_id)
        .fetch_one(&self.pool)
        .await
    }

    /// Ids the player follows
    pub async fn followee_ids(&self, follower_id: PlayerId) -> SqlxResult<Vec<PlayerId>> {
        sqlx::query_scalar::<_, PlayerId>(
            r#"
            SELECT followee_id
            FROM friendships
            WHERE follower_id = $1
            ORDER BY followee_id
            "#,
        )
        .bind(follower_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Delete the edges between two players in both directions
    pub async fn delete_between(&self, a: PlayerId, b: PlayerId) -> SqlxResult<u64> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM friendships
            WHERE (follower_id = $1 AND followee_id = $2)
               OR (follower_id = $2 AND followee_id = $1)
            "#,
        )
        .bind(a)
        .bind(b)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows_affected)
    }
}
