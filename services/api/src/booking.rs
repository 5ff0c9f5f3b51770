use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use mentorhub_common::{AppError, NotificationKind};

use crate::mentors::MentorStore;
use crate::models::{CreateSessionRequest, SessionResponse};
use crate::notifications::{session_events, NotificationEvent};
use crate::sessions::SessionStore;

/// Price of a session at booking time. Computed once from the mentor's
/// current hourly rate and frozen on the row; later rate changes do not
/// touch existing sessions.
pub fn session_price(hourly_rate: Decimal, duration_minutes: i32) -> Decimal {
    hourly_rate * Decimal::from(duration_minutes) / Decimal::from(60)
}

/// Bookings may start at any instant that is not already behind us.
/// Deliberately no check against the mentor's declared availability:
/// booking outside declared windows is allowed, and enforcing them is an
/// open product decision rather than a rule of this service.
pub fn validate_booking_date(date: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), AppError> {
    if date < now {
        return Err(AppError::Validation(
            "Sessions cannot be booked in the past".to_string(),
        ));
    }
    Ok(())
}

/// Validates a booking request and creates the pending session, returning
/// the persisted session with expanded references plus the notification
/// events the caller dispatches after the write.
pub struct BookingService {
    db_pool: PgPool,
}

impl BookingService {
    pub fn new(db_pool: &PgPool) -> Self {
        Self {
            db_pool: db_pool.clone(),
        }
    }

    pub async fn create_session(
        &self,
        mentee_id: Uuid,
        request: CreateSessionRequest,
    ) -> Result<(SessionResponse, Vec<NotificationEvent>), AppError> {
        validate_booking_date(request.date, Utc::now())?;

        let mentor = MentorStore::new(&self.db_pool).get(request.mentor_id).await?;
        let price = session_price(mentor.hourly_rate, request.duration);

        let store = SessionStore::new(&self.db_pool);
        let session_id = Uuid::new_v4();
        store
            .insert(
                session_id,
                mentor.mentor_id,
                mentee_id,
                request.date,
                request.duration,
                &request.topic,
                request.description.as_deref(),
                price,
            )
            .await?;

        let session = store.get_detail(session_id).await?;
        let events = session_events(
            NotificationKind::SessionCreated,
            session_id,
            &session.topic,
            session.scheduled_at,
            mentee_id,
            mentor.user_id,
        );

        Ok((session, events))
    }
}
