use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use mentorhub_common::WeeklySlots;

/// A mentor's public profile. `user_id` points at the external identity
/// provider; `rating` and `review_count` are maintained by the feedback
/// aggregation and must not be written by profile updates.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Mentor {
    pub mentor_id: Uuid,
    pub user_id: Uuid,
    pub expertise: Vec<String>,
    pub bio: String,
    pub experience: String,
    pub hourly_rate: Decimal,
    pub rating: Decimal,
    pub review_count: i32,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Weekly recurring availability, one row per mentor (unique constraint),
/// created lazily with an empty template on first read.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Availability {
    pub availability_id: Uuid,
    pub mentor_id: Uuid,
    pub time_zone: String,
    pub weekly_slots: Json<WeeklySlots>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A booked mentoring session. `status` holds the lifecycle state as text;
/// `price` is frozen at booking time and never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
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
}

/// One-time rating + comment on a completed session. The unique index on
/// `session_id` is the authority for the at-most-one invariant.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Feedback {
    pub feedback_id: Uuid,
    pub session_id: Uuid,
    pub mentee_id: Uuid,
    pub mentor_id: Uuid,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub notification_id: Uuid,
    pub recipient_id: Uuid,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub session_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
