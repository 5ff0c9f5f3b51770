use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use mentorhub_common::{AppError, WeeklySlots};
use mentorhub_database::Availability;

use crate::models::UpdateAvailabilityRequest;

/// Per-mentor weekly availability template. Rows are created lazily with an
/// empty template on first read; writes are gated to the owning mentor by
/// the handlers.
pub struct AvailabilityService {
    db_pool: PgPool,
}

impl AvailabilityService {
    pub fn new(db_pool: &PgPool) -> Self {
        Self {
            db_pool: db_pool.clone(),
        }
    }

    pub async fn get_or_create(&self, mentor_id: Uuid) -> Result<Availability, AppError> {
        let existing = sqlx::query_as::<_, Availability>(
            "SELECT * FROM availabilities WHERE mentor_id = $1",
        )
        .bind(mentor_id)
        .fetch_optional(&self.db_pool)
        .await
        .map_err(AppError::Database)?;

        if let Some(row) = existing {
            return Ok(row);
        }

        // The no-op conflict update makes the lazy create race-safe: if a
        // concurrent request inserted first, RETURNING hands back its row.
        sqlx::query_as::<_, Availability>(
            r#"
            INSERT INTO availabilities (availability_id, mentor_id, weekly_slots)
            VALUES ($1, $2, $3)
            ON CONFLICT (mentor_id) DO UPDATE SET updated_at = availabilities.updated_at
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(mentor_id)
        .bind(Json(WeeklySlots::default()))
        .fetch_one(&self.db_pool)
        .await
        .map_err(AppError::Database)
    }

    /// Full or partial overwrite: an omitted field keeps its current value.
    pub async fn update(
        &self,
        mentor_id: Uuid,
        request: UpdateAvailabilityRequest,
    ) -> Result<Availability, AppError> {
        let current = self.get_or_create(mentor_id).await?;

        let time_zone = request.time_zone.unwrap_or(current.time_zone);
        let weekly_slots = request
            .weekly_slots
            .map(Json)
            .unwrap_or(current.weekly_slots);

        sqlx::query_as::<_, Availability>(
            r#"
            UPDATE availabilities
            SET time_zone = $1, weekly_slots = $2, updated_at = NOW()
            WHERE mentor_id = $3
            RETURNING *
            "#,
        )
        .bind(time_zone)
        .bind(weekly_slots)
        .bind(mentor_id)
        .fetch_one(&self.db_pool)
        .await
        .map_err(AppError::Database)
    }
}
