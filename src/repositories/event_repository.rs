use crate::error::{AppError, AppResult, RepositoryError};
use crate::invitation::{self, ActionOutcome, InviteAction, InviteStatus};
use crate::models::{CourseId, Event, EventDraft, EventId, PlayerId};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::{FromRow, PgConnection, PgPool};

const EVENT_SELECT: &str = r#"
    SELECT
        e.id,
        e.course_id,
        c.name AS course_name,
        e.date,
        e.tee_time,
        e.open_spots,
        e.number_of_holes,
        e.private,
        e.host_id,
        p.name AS host_name,
        e.created_at
    FROM events e
    JOIN courses c ON c.id = e.course_id
    JOIN players p ON p.id = e.host_id
"#;

/// Event row joined with course and host names
#[derive(Debug, FromRow)]
struct EventRow {
    id: EventId,
    course_id: CourseId,
    course_name: String,
    date: NaiveDate,
    tee_time: NaiveTime,
    open_spots: i32,
    number_of_holes: String,
    private: bool,
    host_id: PlayerId,
    host_name: String,
    created_at: NaiveDateTime,
}

#[derive(Debug, FromRow)]
struct ParticipantRow {
    event_id: EventId,
    player_id: PlayerId,
    invite_status: i32,
}

impl EventRow {
    fn into_event(self, participants: &[ParticipantRow]) -> Result<Event, RepositoryError> {
        let mut event = Event::new(self.id, self.host_id, self.private, self.open_spots);
        event.course_id = self.course_id;
        event.course_name = self.course_name;
        event.date = self.date;
        event.tee_time = self.tee_time;
        event.number_of_holes = self.number_of_holes;
        event.host_name = self.host_name;
        event.created_at = self.created_at;

        for row in participants.iter().filter(|r| r.event_id == self.id) {
            let status = InviteStatus::from_code(row.invite_status).ok_or_else(|| {
                RepositoryError::ConstraintViolation(format!(
                    "Unknown invite status {} for player {} on event {}",
                    row.invite_status, row.player_id, row.event_id
                ))
            })?;
            event.set_status(row.player_id, status);
        }

        Ok(event)
    }
}

/// Repository for events and their `player_events` invitation rows
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    /// Create a new EventRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn participants(
        conn: &mut PgConnection,
        event_ids: &[EventId],
    ) -> Result<Vec<ParticipantRow>, RepositoryError> {
        if event_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, ParticipantRow>(
            r#"
            SELECT event_id, player_id, invite_status
            FROM player_events
            WHERE event_id = ANY($1)
            ORDER BY player_id
            "#,
        )
        .bind(event_ids)
        .fetch_all(conn)
        .await?;

        Ok(rows)
    }

    async fn hydrate(&self, rows: Vec<EventRow>) -> Result<Vec<Event>, RepositoryError> {
        let ids: Vec<EventId> = rows.iter().map(|r| r.id).collect();
        let mut conn = self.pool.acquire().await?;
        let participants = Self::participants(&mut *conn, &ids).await?;

        rows.into_iter()
            .map(|row| row.into_event(&participants))
            .collect()
    }

    /// Find an event by id
    pub async fn find_by_id(&self, id: EventId) -> Result<Option<Event>, RepositoryError> {
        let sql = format!("{} WHERE e.id = $1", EVENT_SELECT);
        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Find all events
    pub async fn find_all(&self) -> Result<Vec<Event>, RepositoryError> {
        let sql = format!("{} ORDER BY e.id", EVENT_SELECT);
        let rows = sqlx::query_as::<_, EventRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        self.hydrate(rows).await
    }

    /// Find all events that are open to the community
    pub async fn find_public(&self) -> Result<Vec<Event>, RepositoryError> {
        let sql = format!("{} WHERE NOT e.private ORDER BY e.id", EVENT_SELECT);
        let rows = sqlx::query_as::<_, EventRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        self.hydrate(rows).await
    }

    /// Find events the player hosts or has an invitation row on
    pub async fn find_by_player(&self, player_id: PlayerId) -> Result<Vec<Event>, RepositoryError> {
        let sql = format!(
            r#"{}
            WHERE e.host_id = $1
               OR EXISTS (
                   SELECT 1 FROM player_events pe
                   WHERE pe.event_id = e.id AND pe.player_id = $1
               )
            ORDER BY e.id"#,
            EVENT_SELECT
        );
        let rows = sqlx::query_as::<_, EventRow>(&sql)
            .bind(player_id)
            .fetch_all(&self.pool)
            .await?;
        self.hydrate(rows).await
    }

    /// Insert an event, the host as accepted and every invitee as pending
    pub async fn create(&self, draft: &EventDraft) -> Result<Event, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let id: EventId = sqlx::query_scalar(
            r#"
            INSERT INTO events (course_id, date, tee_time, open_spots, number_of_holes, private, host_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(draft.course_id)
        .bind(draft.date)
        .bind(draft.tee_time)
        .bind(draft.open_spots)
        .bind(&draft.number_of_holes)
        .bind(draft.private)
        .bind(draft.host_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO player_events (player_id, event_id, invite_status)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(draft.host_id)
        .bind(id)
        .bind(InviteStatus::Accepted.code())
        .execute(&mut *tx)
        .await?;

        let invitees: Vec<PlayerId> = draft.invitees.iter().copied().collect();
        if !invitees.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO player_events (player_id, event_id, invite_status)
                SELECT invitee, $2, $3 FROM UNNEST($1::BIGINT[]) AS invitee
                "#,
            )
            .bind(&invitees)
            .bind(id)
            .bind(InviteStatus::Pending.code())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("Event {} not found", id)))
    }

    /// Apply an invite action under a row lock on the event.
    ///
    /// The transaction is rolled back (by dropping it) when the transition
    /// is rejected, so nothing is written.
    pub async fn apply_action(
        &self,
        event_id: EventId,
        actor: PlayerId,
        action: InviteAction,
    ) -> AppResult<ActionOutcome> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let actor_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM players WHERE id = $1)")
                .bind(actor)
                .fetch_one(&mut *tx)
                .await
                .map_err(RepositoryError::from)?;
        if !actor_exists {
            return Err(AppError::NotFound(format!("Player {} not found", actor)));
        }

        let sql = format!("{} WHERE e.id = $1 FOR UPDATE OF e", EVENT_SELECT);
        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(event_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(RepositoryError::from)?
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", event_id)))?;

        let participants = Self::participants(&mut *tx, &[event_id]).await?;
        let mut event = row.into_event(&participants)?;

        let outcome = invitation::apply_action(&mut event, actor, action)?;
        match outcome {
            ActionOutcome::Changed { player_id, to, .. } => {
                sqlx::query(
                    r#"
                    INSERT INTO player_events (player_id, event_id, invite_status)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (player_id, event_id) DO UPDATE
                    SET invite_status = EXCLUDED.invite_status, updated_at = NOW()
                    "#,
                )
                .bind(player_id)
                .bind(event_id)
                .bind(to.code())
                .execute(&mut *tx)
                .await
                .map_err(RepositoryError::from)?;
            }
            ActionOutcome::Deleted => {
                sqlx::query("DELETE FROM events WHERE id = $1")
                    .bind(event_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(RepositoryError::from)?;
            }
            ActionOutcome::Unchanged => {}
        }

        tx.commit().await.map_err(RepositoryError::from)?;
        Ok(outcome)
    }
}
