use rust_decimal::{Decimal, RoundingStrategy};
use sqlx::PgPool;
use uuid::Uuid;

use mentorhub_common::{AppError, NotificationKind, SessionStatus};

use crate::mentors::MentorStore;
use crate::models::{CreateFeedbackRequest, FeedbackDetailRow, FeedbackResponse};
use crate::notifications::{session_events, NotificationEvent};
use crate::sessions::SessionStore;

const FEEDBACK_DETAIL_COLUMNS: &str = r#"
    f.feedback_id, f.session_id, f.mentee_id, f.mentor_id, f.rating, f.comment,
    f.created_at, s.topic AS session_topic, s.scheduled_at AS session_date
"#;

/// Mean of all ratings rounded to one decimal place, with the midpoint
/// rounded away from zero (4.25 -> 4.3), plus the review count. `None`
/// with no feedback, so a mentor's rating is never divided by zero.
pub fn aggregate_rating(ratings: &[i32]) -> Option<(Decimal, i64)> {
    if ratings.is_empty() {
        return None;
    }

    let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
    let mean = Decimal::from(sum) / Decimal::from(ratings.len() as i64);
    let rounded = mean.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);

    Some((rounded, ratings.len() as i64))
}

/// Feedback creation and reads, plus the rating aggregation triggered after
/// every successful write.
pub struct FeedbackService {
    db_pool: PgPool,
}

impl FeedbackService {
    pub fn new(db_pool: &PgPool) -> Self {
        Self {
            db_pool: db_pool.clone(),
        }
    }

    pub async fn create(
        &self,
        mentee_id: Uuid,
        request: CreateFeedbackRequest,
    ) -> Result<(FeedbackResponse, Vec<NotificationEvent>), AppError> {
        let session = SessionStore::new(&self.db_pool).get(request.session_id).await?;

        let status = session.status.parse::<SessionStatus>().map_err(|_| {
            AppError::Internal(format!(
                "session {} has an unrecognized status '{}'",
                session.session_id, session.status
            ))
        })?;
        if status != SessionStatus::Completed {
            return Err(AppError::Validation(
                "Only completed sessions can be rated".to_string(),
            ));
        }

        if session.mentee_id != mentee_id {
            return Err(AppError::Authorization(
                "Only the session's mentee can leave feedback".to_string(),
            ));
        }

        // Early check for a clean 409; the unique index on session_id is
        // what actually closes the race.
        let existing: Option<Uuid> =
            sqlx::query_scalar("SELECT feedback_id FROM feedback WHERE session_id = $1")
                .bind(request.session_id)
                .fetch_optional(&self.db_pool)
                .await
                .map_err(AppError::Database)?;
        if existing.is_some() {
            return Err(AppError::Conflict(
                "Feedback has already been submitted for this session".to_string(),
            ));
        }

        let mentor = MentorStore::new(&self.db_pool).get(session.mentor_id).await?;

        let feedback_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO feedback (feedback_id, session_id, mentee_id, mentor_id, rating, comment)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(feedback_id)
        .bind(request.session_id)
        .bind(mentee_id)
        .bind(session.mentor_id)
        .bind(request.rating)
        .bind(&request.comment)
        .execute(&self.db_pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => AppError::Conflict(
                "Feedback has already been submitted for this session".to_string(),
            ),
            other => AppError::Database(other),
        })?;

        // Side effect of the successful write; a failure here must not take
        // the already-persisted feedback down with it.
        if let Err(err) = self.recompute_mentor_rating(session.mentor_id).await {
            tracing::error!(
                error = %err,
                mentor_id = %session.mentor_id,
                "failed to recompute mentor rating"
            );
        }

        let feedback = self.get_for_session(request.session_id).await?;
        let events = session_events(
            NotificationKind::FeedbackReceived,
            session.session_id,
            &session.topic,
            session.scheduled_at,
            mentee_id,
            mentor.user_id,
        );

        Ok((feedback, events))
    }

    /// Full recomputation from every stored rating for the mentor. A
    /// rescan per feedback is fine at the expected volume and keeps the
    /// rounding contract in exactly one place.
    pub async fn recompute_mentor_rating(&self, mentor_id: Uuid) -> Result<(), AppError> {
        let ratings: Vec<i32> =
            sqlx::query_scalar("SELECT rating FROM feedback WHERE mentor_id = $1")
                .bind(mentor_id)
                .fetch_all(&self.db_pool)
                .await
                .map_err(AppError::Database)?;

        if let Some((rating, review_count)) = aggregate_rating(&ratings) {
            MentorStore::new(&self.db_pool)
                .update_rating(mentor_id, rating, review_count)
                .await?;
        }

        Ok(())
    }

    pub async fn list_for_mentor(&self, mentor_id: Uuid) -> Result<Vec<FeedbackResponse>, AppError> {
        let query = format!(
            "SELECT {FEEDBACK_DETAIL_COLUMNS} FROM feedback f \
             JOIN sessions s ON s.session_id = f.session_id \
             WHERE f.mentor_id = $1 ORDER BY f.created_at DESC"
        );
        self.list(&query, mentor_id).await
    }

    pub async fn list_for_mentee(&self, mentee_id: Uuid) -> Result<Vec<FeedbackResponse>, AppError> {
        let query = format!(
            "SELECT {FEEDBACK_DETAIL_COLUMNS} FROM feedback f \
             JOIN sessions s ON s.session_id = f.session_id \
             WHERE f.mentee_id = $1 ORDER BY f.created_at DESC"
        );
        self.list(&query, mentee_id).await
    }

    pub async fn get_for_session(&self, session_id: Uuid) -> Result<FeedbackResponse, AppError> {
        let query = format!(
            "SELECT {FEEDBACK_DETAIL_COLUMNS} FROM feedback f \
             JOIN sessions s ON s.session_id = f.session_id \
             WHERE f.session_id = $1"
        );

        let row = sqlx::query_as::<_, FeedbackDetailRow>(&query)
            .bind(session_id)
            .fetch_optional(&self.db_pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Feedback not found".to_string()))?;

        Ok(row.into())
    }

    async fn list(&self, query: &str, owner_id: Uuid) -> Result<Vec<FeedbackResponse>, AppError> {
        let rows = sqlx::query_as::<_, FeedbackDetailRow>(query)
            .bind(owner_id)
            .fetch_all(&self.db_pool)
            .await
            .map_err(AppError::Database)?;

        Ok(rows.into_iter().map(FeedbackResponse::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    #[test]
    fn no_feedback_means_no_update() {
        assert_eq!(aggregate_rating(&[]), None);
    }

    #[test]
    fn single_rating_is_its_own_mean() {
        assert_eq!(aggregate_rating(&[5]), Some((dec("5"), 1)));
    }

    #[test]
    fn mean_rounds_to_one_decimal_place() {
        // 13 / 3 = 4.333... -> 4.3
        assert_eq!(aggregate_rating(&[5, 4, 4]), Some((dec("4.3"), 3)));
        // 14 / 3 = 4.666... -> 4.7
        assert_eq!(aggregate_rating(&[5, 5, 4]), Some((dec("4.7"), 3)));
    }

    #[test]
    fn midpoints_round_away_from_zero() {
        // 17 / 4 = 4.25 -> 4.3, not banker's 4.2.
        assert_eq!(aggregate_rating(&[4, 4, 4, 5]), Some((dec("4.3"), 4)));
        assert_eq!(aggregate_rating(&[5, 4]), Some((dec("4.5"), 2)));
    }

    #[test]
    fn review_count_tracks_all_feedback() {
        let ratings = [1, 2, 3, 4, 5];
        let (mean, count) = aggregate_rating(&ratings).unwrap();
        assert_eq!(count, 5);
        assert_eq!(mean, dec("3"));
    }
}
