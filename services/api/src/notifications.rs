use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use mentorhub_common::{AppError, NotificationKind};
use mentorhub_database::Notification;

/// A notification decided by the core but not yet written to the sink.
///
/// Booking, lifecycle and feedback operations return these alongside their
/// primary result; the dispatcher drains them after the primary write has
/// succeeded, so a sink failure can never undo a booking or a transition.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationEvent {
    pub recipient_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub session_id: Option<Uuid>,
}

/// Decide who gets told what for a session lifecycle change.
///
/// Completion notifies the mentee only; the mentor asymmetry is a product
/// decision, not an oversight. Feedback goes to the mentor only. Everything
/// else goes to both parties.
pub fn session_events(
    kind: NotificationKind,
    session_id: Uuid,
    topic: &str,
    scheduled_at: DateTime<Utc>,
    mentee_id: Uuid,
    mentor_user_id: Uuid,
) -> Vec<NotificationEvent> {
    let (title, message) = match kind {
        NotificationKind::SessionCreated => (
            "New session booked".to_string(),
            format!(
                "A new session on \"{}\" has been booked for {}",
                topic,
                scheduled_at.format("%Y-%m-%d %H:%M")
            ),
        ),
        NotificationKind::SessionConfirmed => (
            "Session confirmed".to_string(),
            format!("Your session on \"{}\" has been confirmed", topic),
        ),
        NotificationKind::SessionCancelled => (
            "Session cancelled".to_string(),
            format!("The session on \"{}\" has been cancelled", topic),
        ),
        NotificationKind::SessionCompleted => (
            "Session completed".to_string(),
            format!("The session on \"{}\" has been marked as completed", topic),
        ),
        NotificationKind::FeedbackReceived => (
            "New feedback received".to_string(),
            format!("You have received feedback on the session \"{}\"", topic),
        ),
    };

    let recipients: Vec<Uuid> = match kind {
        NotificationKind::SessionCompleted => vec![mentee_id],
        NotificationKind::FeedbackReceived => vec![mentor_user_id],
        _ => vec![mentee_id, mentor_user_id],
    };

    recipients
        .into_iter()
        .map(|recipient_id| NotificationEvent {
            recipient_id,
            kind,
            title: title.clone(),
            message: message.clone(),
            session_id: Some(session_id),
        })
        .collect()
}

/// The notification sink: persists decided events and serves the read side.
pub struct NotificationService {
    db_pool: PgPool,
}

impl NotificationService {
    pub fn new(db_pool: &PgPool) -> Self {
        Self {
            db_pool: db_pool.clone(),
        }
    }

    /// Drain events into the store. Best-effort: a failed write is logged
    /// and skipped, never surfaced to the caller.
    pub async fn dispatch(&self, events: Vec<NotificationEvent>) {
        for event in events {
            if let Err(err) = self.insert(&event).await {
                tracing::error!(
                    error = %err,
                    kind = %event.kind,
                    recipient = %event.recipient_id,
                    "failed to record notification"
                );
            }
        }
    }

    async fn insert(&self, event: &NotificationEvent) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO notifications (
                notification_id, recipient_id, kind, title, message, session_id
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(event.recipient_id)
        .bind(event.kind.to_string())
        .bind(&event.title)
        .bind(&event.message)
        .bind(event.session_id)
        .execute(&self.db_pool)
        .await
        .map_err(AppError::Database)?;

        Ok(())
    }

    pub async fn list_for_recipient(&self, user_id: Uuid) -> Result<Vec<Notification>, AppError> {
        sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE recipient_id = $1 \
             ORDER BY created_at DESC LIMIT 50",
        )
        .bind(user_id)
        .fetch_all(&self.db_pool)
        .await
        .map_err(AppError::Database)
    }

    pub async fn unread_count(&self, user_id: Uuid) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .fetch_one(&self.db_pool)
        .await
        .map_err(AppError::Database)
    }

    pub async fn mark_read(
        &self,
        user_id: Uuid,
        notification_id: Uuid,
    ) -> Result<Notification, AppError> {
        sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET is_read = TRUE \
             WHERE notification_id = $1 AND recipient_id = $2 \
             RETURNING *",
        )
        .bind(notification_id)
        .bind(user_id)
        .fetch_optional(&self.db_pool)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE notifications SET is_read = TRUE \
             WHERE recipient_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .execute(&self.db_pool)
        .await
        .map_err(AppError::Database)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fan_out(kind: NotificationKind) -> (Vec<Uuid>, Vec<NotificationEvent>) {
        let mentee = Uuid::new_v4();
        let mentor_user = Uuid::new_v4();
        let events = session_events(
            kind,
            Uuid::new_v4(),
            "Async Rust",
            Utc::now(),
            mentee,
            mentor_user,
        );
        (vec![mentee, mentor_user], events)
    }

    #[test]
    fn creation_confirmation_and_cancellation_notify_both_parties() {
        for kind in [
            NotificationKind::SessionCreated,
            NotificationKind::SessionConfirmed,
            NotificationKind::SessionCancelled,
        ] {
            let (parties, events) = fan_out(kind);
            let recipients: Vec<Uuid> = events.iter().map(|e| e.recipient_id).collect();
            assert_eq!(recipients, parties, "kind {kind} should notify both");
        }
    }

    #[test]
    fn completion_notifies_the_mentee_only() {
        let (parties, events) = fan_out(NotificationKind::SessionCompleted);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].recipient_id, parties[0]);
    }

    #[test]
    fn feedback_notifies_the_mentor_only() {
        let (parties, events) = fan_out(NotificationKind::FeedbackReceived);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].recipient_id, parties[1]);
    }

    #[test]
    fn events_carry_the_session_reference_and_topic() {
        let session_id = Uuid::new_v4();
        let events = session_events(
            NotificationKind::SessionConfirmed,
            session_id,
            "Lifetimes",
            Utc::now(),
            Uuid::new_v4(),
            Uuid::new_v4(),
        );
        for event in events {
            assert_eq!(event.session_id, Some(session_id));
            assert!(event.message.contains("Lifetimes"));
        }
    }
}
