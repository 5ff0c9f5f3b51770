use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use mentorhub_common::{AppError, SessionStatus};
use mentorhub_database::Session;

use crate::models::{SessionDetailRow, SessionResponse};

const SESSION_DETAIL_COLUMNS: &str = r#"
    s.session_id, s.mentor_id, s.mentee_id, s.scheduled_at, s.duration_minutes,
    s.topic, s.description, s.status, s.meeting_link, s.price, s.created_at, s.updated_at,
    m.user_id AS mentor_user_id, m.expertise AS mentor_expertise,
    m.hourly_rate AS mentor_hourly_rate, m.rating AS mentor_rating,
    m.review_count AS mentor_review_count
"#;

/// Persistence for the booking record. All status mutation goes through the
/// lifecycle controller; this layer only reads and writes rows.
pub struct SessionStore {
    db_pool: PgPool,
}

impl SessionStore {
    pub fn new(db_pool: &PgPool) -> Self {
        Self {
            db_pool: db_pool.clone(),
        }
    }

    pub async fn get(&self, session_id: Uuid) -> Result<Session, AppError> {
        sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE session_id = $1")
            .bind(session_id)
            .fetch_optional(&self.db_pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Session not found".to_string()))
    }

    /// Session with its mentor reference expanded, as handed back to clients.
    pub async fn get_detail(&self, session_id: Uuid) -> Result<SessionResponse, AppError> {
        let query = format!(
            "SELECT {SESSION_DETAIL_COLUMNS} FROM sessions s \
             JOIN mentors m ON m.mentor_id = s.mentor_id \
             WHERE s.session_id = $1"
        );

        let row = sqlx::query_as::<_, SessionDetailRow>(&query)
            .bind(session_id)
            .fetch_optional(&self.db_pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Session not found".to_string()))?;

        row.try_into()
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        &self,
        session_id: Uuid,
        mentor_id: Uuid,
        mentee_id: Uuid,
        scheduled_at: DateTime<Utc>,
        duration_minutes: i32,
        topic: &str,
        description: Option<&str>,
        price: Decimal,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (
                session_id, mentor_id, mentee_id, scheduled_at, duration_minutes,
                topic, description, status, price
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(session_id)
        .bind(mentor_id)
        .bind(mentee_id)
        .bind(scheduled_at)
        .bind(duration_minutes)
        .bind(topic)
        .bind(description)
        .bind(SessionStatus::Pending.to_string())
        .bind(price)
        .execute(&self.db_pool)
        .await
        .map_err(AppError::Database)?;

        Ok(())
    }

    /// Apply a status change. The meeting link is only ever written here on
    /// confirmation and is preserved through later transitions.
    pub async fn set_status(
        &self,
        session_id: Uuid,
        status: SessionStatus,
        meeting_link: Option<&str>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE sessions
            SET status = $1,
                meeting_link = COALESCE($2, meeting_link),
                updated_at = NOW()
            WHERE session_id = $3
            "#,
        )
        .bind(status.to_string())
        .bind(meeting_link)
        .bind(session_id)
        .execute(&self.db_pool)
        .await
        .map_err(AppError::Database)?;

        Ok(())
    }

    pub async fn list_for_mentee(&self, mentee_id: Uuid) -> Result<Vec<SessionResponse>, AppError> {
        let query = format!(
            "SELECT {SESSION_DETAIL_COLUMNS} FROM sessions s \
             JOIN mentors m ON m.mentor_id = s.mentor_id \
             WHERE s.mentee_id = $1"
        );
        self.list_sorted(&query, mentee_id).await
    }

    pub async fn list_for_mentor(&self, mentor_id: Uuid) -> Result<Vec<SessionResponse>, AppError> {
        let query = format!(
            "SELECT {SESSION_DETAIL_COLUMNS} FROM sessions s \
             JOIN mentors m ON m.mentor_id = s.mentor_id \
             WHERE s.mentor_id = $1"
        );
        self.list_sorted(&query, mentor_id).await
    }

    async fn list_sorted(&self, query: &str, owner_id: Uuid) -> Result<Vec<SessionResponse>, AppError> {
        let rows = sqlx::query_as::<_, SessionDetailRow>(query)
            .bind(owner_id)
            .fetch_all(&self.db_pool)
            .await
            .map_err(AppError::Database)?;

        let mut sessions = rows
            .into_iter()
            .map(SessionResponse::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let now = Utc::now();
        sessions.sort_by(|a, b| {
            compare_for_listing((a.status, a.scheduled_at), (b.status, b.scheduled_at), now)
        });

        Ok(sessions)
    }
}

/// Listing order: status priority first (pending < confirmed < completed <
/// cancelled); within a status, upcoming sessions nearest-first and past
/// sessions most-recent-first.
pub fn compare_for_listing(
    a: (SessionStatus, DateTime<Utc>),
    b: (SessionStatus, DateTime<Utc>),
    now: DateTime<Utc>,
) -> Ordering {
    let by_status = a.0.priority().cmp(&b.0.priority());
    if by_status != Ordering::Equal {
        return by_status;
    }

    if a.1 > now && b.1 > now {
        a.1.cmp(&b.1)
    } else {
        b.1.cmp(&a.1)
    }
}
