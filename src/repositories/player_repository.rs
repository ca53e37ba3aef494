use crate::models::{NewPlayer, Player, PlayerId};
use sqlx::{PgPool, Result as SqlxResult};

/// Repository for player data access
pub struct PlayerRepository {
    pool: PgPool,
}

impl PlayerRepository {
    /// Create a new PlayerRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new player
    pub async fn create(&self, player: &NewPlayer) -> SqlxResult<Player> {
        sqlx::query_as::<_, Player>(
            r#"
            INSERT INTO players (name, phone, email, username)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, phone, email, username, created_at
            "#,
        )
        .bind(&player.name)
        .bind(&player.phone)
        .bind(&player.email)
        .bind(&player.username)
        .fetch_one(&self.pool)
        .await
    }

    /// Find a player by id
    pub async fn find_by_id(&self, id: PlayerId) -> SqlxResult<Option<Player>> {
        sqlx::query_as::<_, Player>(
            r#"
            SELECT id, name, phone, email, username, created_at
            FROM players
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// List every player
    pub async fn find_all(&self) -> SqlxResult<Vec<Player>> {
        sqlx::query_as::<_, Player>(
            r#"
            SELECT id, name, phone, email, username, created_at
            FROM players
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }
}
