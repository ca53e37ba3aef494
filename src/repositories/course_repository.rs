use crate::models::{Course, CourseId};
use sqlx::{PgPool, Result as SqlxResult};

/// Repository for the read-only course catalogue
pub struct CourseRepository {
    pool: PgPool,
}

impl CourseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_all(&self) -> SqlxResult<Vec<Course>> {
        sqlx::query_as::<_, Course>(
            r#"
            SELECT id, name, street, city, state, zip_code, phone, cost
            FROM courses
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn find_by_id(&self, id: CourseId) -> SqlxResult<Option<Course>> {
        sqlx::query_as::<_, Course>(
            r#"
            SELECT id, name, street, city, state, zip_code, phone, cost
            FROM courses
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }
}
