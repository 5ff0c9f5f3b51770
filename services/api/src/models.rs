use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use mentorhub_common::{AppError, SessionStatus, WeeklySlots};
use mentorhub_database::Availability;

// Requests

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSessionRequest {
    pub mentor_id: Uuid,
    pub date: DateTime<Utc>,
    #[validate(range(min = 30, max = 240, message = "duration must be between 30 and 240 minutes"))]
    pub duration: i32,
    #[validate(length(min = 1, max = 200, message = "topic is required"))]
    pub topic: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSessionStatusRequest {
    pub status: SessionStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAvailabilityRequest {
    pub time_zone: Option<String>,
    pub weekly_slots: Option<WeeklySlots>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFeedbackRequest {
    pub session_id: Uuid,
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: i32,
    #[validate(length(min = 1, max = 500, message = "comment is required"))]
    pub comment: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MentorProfileRequest {
    pub expertise: Vec<String>,
    #[validate(length(min = 1, max = 500, message = "bio is required"))]
    pub bio: String,
    #[validate(length(min = 1, message = "experience is required"))]
    pub experience: String,
    pub hourly_rate: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MentorSearchQuery {
    pub expertise: Option<String>,
    pub min_rate: Option<Decimal>,
    pub max_rate: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlotsQuery {
    pub date: NaiveDate,
}

// Responses

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentorSummary {
    pub mentor_id: Uuid,
    pub user_id: Uuid,
    pub expertise: Vec<String>,
    pub hourly_rate: Decimal,
    pub rating: Decimal,
    pub review_count: i32,
}

/// A session with its mentor reference expanded, as returned by every
/// session-producing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub mentor_id: Uuid,
    pub mentee_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub topic: String,
    pub description: Option<String>,
    pub status: SessionStatus,
    pub meeting_link: Option<String>,
    pub price: Decimal,
    pub mentor: MentorSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Flattened sessions-join-mentors row backing [`SessionResponse`].
#[derive(Debug, Clone, FromRow)]
pub struct SessionDetailRow {
    pub session_id: Uuid,
    pub mentor_id: Uuid,
    pub mentee_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub topic: String,
    pub description: Option<String>,
    pub status: String,
    pub meeting_link: Option<String>,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub mentor_user_id: Uuid,
    pub mentor_expertise: Vec<String>,
    pub mentor_hourly_rate: Decimal,
    pub mentor_rating: Decimal,
    pub mentor_review_count: i32,
}

impl TryFrom<SessionDetailRow> for SessionResponse {
    type Error = AppError;

    fn try_from(row: SessionDetailRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<SessionStatus>().map_err(|_| {
            AppError::Internal(format!(
                "session {} has an unrecognized status '{}'",
                row.session_id, row.status
            ))
        })?;

        Ok(Self {
            session_id: row.session_id,
            mentor_id: row.mentor_id,
            mentee_id: row.mentee_id,
            scheduled_at: row.scheduled_at,
            duration_minutes: row.duration_minutes,
            topic: row.topic,
            description: row.description,
            status,
            meeting_link: row.meeting_link,
            price: row.price,
            mentor: MentorSummary {
                mentor_id: row.mentor_id,
                user_id: row.mentor_user_id,
                expertise: row.mentor_expertise,
                hourly_rate: row.mentor_hourly_rate,
                rating: row.mentor_rating,
                review_count: row.mentor_review_count,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub availability_id: Uuid,
    pub mentor_id: Uuid,
    pub time_zone: String,
    pub weekly_slots: WeeklySlots,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Availability> for AvailabilityResponse {
    fn from(row: Availability) -> Self {
        Self {
            availability_id: row.availability_id,
            mentor_id: row.mentor_id,
            time_zone: row.time_zone,
            weekly_slots: row.weekly_slots.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Feedback with the session reference expanded to its topic and date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackResponse {
    pub feedback_id: Uuid,
    pub session_id: Uuid,
    pub mentee_id: Uuid,
    pub mentor_id: Uuid,
    pub rating: i32,
    pub comment: String,
    pub session_topic: String,
    pub session_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct FeedbackDetailRow {
    pub feedback_id: Uuid,
    pub session_id: Uuid,
    pub mentee_id: Uuid,
    pub mentor_id: Uuid,
    pub rating: i32,
    pub comment: String,
    pub session_topic: String,
    pub session_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<FeedbackDetailRow> for FeedbackResponse {
    fn from(row: FeedbackDetailRow) -> Self {
        Self {
            feedback_id: row.feedback_id,
            session_id: row.session_id,
            mentee_id: row.mentee_id,
            mentor_id: row.mentor_id,
            rating: row.rating,
            comment: row.comment,
            session_topic: row.session_topic,
            session_date: row.session_date,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_request_validates_duration_bounds() {
        let mut request = CreateSessionRequest {
            mentor_id: Uuid::new_v4(),
            date: Utc::now(),
            duration: 60,
            topic: "Ownership and borrowing".to_string(),
            description: None,
        };
        assert!(request.validate().is_ok());

        request.duration = 20;
        assert!(request.validate().is_err());

        request.duration = 300;
        assert!(request.validate().is_err());

        request.duration = 30;
        assert!(request.validate().is_ok());
        request.duration = 240;
        assert!(request.validate().is_ok());
    }

    #[test]
    fn session_request_requires_topic() {
        let request = CreateSessionRequest {
            mentor_id: Uuid::new_v4(),
            date: Utc::now(),
            duration: 60,
            topic: String::new(),
            description: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn feedback_request_validates_rating_range() {
        let mut request = CreateFeedbackRequest {
            session_id: Uuid::new_v4(),
            rating: 5,
            comment: "Great session".to_string(),
        };
        assert!(request.validate().is_ok());

        request.rating = 0;
        assert!(request.validate().is_err());
        request.rating = 6;
        assert!(request.validate().is_err());
    }

    #[test]
    fn corrupt_status_row_does_not_silently_default() {
        let row = SessionDetailRow {
            session_id: Uuid::new_v4(),
            mentor_id: Uuid::new_v4(),
            mentee_id: Uuid::new_v4(),
            scheduled_at: Utc::now(),
            duration_minutes: 60,
            topic: "t".into(),
            description: None,
            status: "rescheduled".into(),
            meeting_link: None,
            price: Decimal::ZERO,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            mentor_user_id: Uuid::new_v4(),
            mentor_expertise: vec![],
            mentor_hourly_rate: Decimal::ZERO,
            mentor_rating: Decimal::ZERO,
            mentor_review_count: 0,
        };
        assert!(SessionResponse::try_from(row).is_err());
    }
}
