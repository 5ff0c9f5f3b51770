use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use mentorhub_common::AppError;
use mentorhub_database::Mentor;

use crate::models::MentorProfileRequest;

/// Mentor profile persistence and directory reads. Rating fields are only
/// written through `update_rating`, driven by the feedback aggregation.
pub struct MentorStore {
    db_pool: PgPool,
}

impl MentorStore {
    pub fn new(db_pool: &PgPool) -> Self {
        Self {
            db_pool: db_pool.clone(),
        }
    }

    pub async fn get(&self, mentor_id: Uuid) -> Result<Mentor, AppError> {
        sqlx::query_as::<_, Mentor>("SELECT * FROM mentors WHERE mentor_id = $1")
            .bind(mentor_id)
            .fetch_optional(&self.db_pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Mentor not found".to_string()))
    }

    /// Resolve the requester's mentor profile from their identity, or fail
    /// with `Authorization` — callers use this as the ownership gate.
    pub async fn require_profile(&self, user_id: Uuid) -> Result<Mentor, AppError> {
        self.find_by_user(user_id).await?.ok_or_else(|| {
            AppError::Authorization("You do not have a mentor profile".to_string())
        })
    }

    pub async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Mentor>, AppError> {
        sqlx::query_as::<_, Mentor>("SELECT * FROM mentors WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.db_pool)
            .await
            .map_err(AppError::Database)
    }

    pub async fn list(&self) -> Result<Vec<Mentor>, AppError> {
        sqlx::query_as::<_, Mentor>("SELECT * FROM mentors ORDER BY rating DESC, created_at")
            .fetch_all(&self.db_pool)
            .await
            .map_err(AppError::Database)
    }

    /// Directory search: available mentors only, optional expertise
    /// substring and hourly-rate bounds, best-rated first.
    pub async fn search(
        &self,
        expertise: Option<&str>,
        min_rate: Option<Decimal>,
        max_rate: Option<Decimal>,
    ) -> Result<Vec<Mentor>, AppError> {
        sqlx::query_as::<_, Mentor>(
            r#"
            SELECT * FROM mentors
            WHERE is_available = TRUE
              AND ($1::TEXT IS NULL OR EXISTS (
                    SELECT 1 FROM unnest(expertise) AS tag
                    WHERE tag ILIKE '%' || $1 || '%'
              ))
              AND ($2::NUMERIC IS NULL OR hourly_rate >= $2)
              AND ($3::NUMERIC IS NULL OR hourly_rate <= $3)
            ORDER BY rating DESC
            "#,
        )
        .bind(expertise)
        .bind(min_rate)
        .bind(max_rate)
        .fetch_all(&self.db_pool)
        .await
        .map_err(AppError::Database)
    }

    pub async fn create_profile(
        &self,
        user_id: Uuid,
        request: MentorProfileRequest,
    ) -> Result<Mentor, AppError> {
        if request.hourly_rate < Decimal::ZERO {
            return Err(AppError::Validation(
                "Hourly rate must not be negative".to_string(),
            ));
        }

        if self.find_by_user(user_id).await?.is_some() {
            return Err(AppError::Conflict(
                "A mentor profile already exists for this user".to_string(),
            ));
        }

        sqlx::query_as::<_, Mentor>(
            r#"
            INSERT INTO mentors (mentor_id, user_id, expertise, bio, experience, hourly_rate)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&request.expertise)
        .bind(&request.bio)
        .bind(&request.experience)
        .bind(request.hourly_rate)
        .fetch_one(&self.db_pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => AppError::Conflict(
                "A mentor profile already exists for this user".to_string(),
            ),
            other => AppError::Database(other),
        })
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        request: MentorProfileRequest,
    ) -> Result<Mentor, AppError> {
        if request.hourly_rate < Decimal::ZERO {
            return Err(AppError::Validation(
                "Hourly rate must not be negative".to_string(),
            ));
        }

        sqlx::query_as::<_, Mentor>(
            r#"
            UPDATE mentors
            SET expertise = $1, bio = $2, experience = $3, hourly_rate = $4, updated_at = NOW()
            WHERE user_id = $5
            RETURNING *
            "#,
        )
        .bind(&request.expertise)
        .bind(&request.bio)
        .bind(&request.experience)
        .bind(request.hourly_rate)
        .bind(user_id)
        .fetch_optional(&self.db_pool)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::NotFound("Mentor profile not found".to_string()))
    }

    pub async fn update_rating(
        &self,
        mentor_id: Uuid,
        rating: Decimal,
        review_count: i64,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE mentors SET rating = $1, review_count = $2, updated_at = NOW() \
             WHERE mentor_id = $3",
        )
        .bind(rating)
        .bind(review_count as i32)
        .bind(mentor_id)
        .execute(&self.db_pool)
        .await
        .map_err(AppError::Database)?;

        Ok(())
    }
}
