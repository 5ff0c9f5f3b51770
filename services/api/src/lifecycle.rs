use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use mentorhub_common::{AppError, NotificationKind, SessionStatus};

use crate::mentors::MentorStore;
use crate::models::SessionResponse;
use crate::notifications::{session_events, NotificationEvent};
use crate::sessions::SessionStore;

/// Reject edges that are not in the lifecycle graph. Covers completing a
/// pending session and any transition out of a terminal state.
pub fn validate_transition(
    current: SessionStatus,
    requested: SessionStatus,
) -> Result<(), AppError> {
    if !current.can_transition_to(requested) {
        return Err(AppError::Validation(format!(
            "A {} session cannot be changed to {}",
            current, requested
        )));
    }
    Ok(())
}

/// A session may only be marked completed once its scheduled time has
/// passed (or is exactly now).
pub fn validate_completion_time(
    scheduled_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if scheduled_at > now {
        return Err(AppError::Validation(
            "Sessions cannot be completed before they have taken place".to_string(),
        ));
    }
    Ok(())
}

/// The cancel action is open to both parties for anything not yet
/// completed; a completed session stays completed.
pub fn validate_cancellable(current: SessionStatus) -> Result<(), AppError> {
    if current == SessionStatus::Completed {
        return Err(AppError::Validation(
            "Completed sessions cannot be cancelled".to_string(),
        ));
    }
    Ok(())
}

/// Notification emitted for a transition into the given state, if any.
pub fn transition_notification(status: SessionStatus) -> Option<NotificationKind> {
    match status {
        SessionStatus::Confirmed => Some(NotificationKind::SessionConfirmed),
        SessionStatus::Cancelled => Some(NotificationKind::SessionCancelled),
        SessionStatus::Completed => Some(NotificationKind::SessionCompleted),
        SessionStatus::Pending => None,
    }
}

pub fn meeting_link(session_id: Uuid) -> String {
    format!("https://meet.jit.si/mentorhub-{}", session_id)
}

/// Drives all status changes after booking: role and ownership gates,
/// the transition graph, the temporal completion guard, and the decided
/// notification events.
pub struct LifecycleService {
    db_pool: PgPool,
}

impl LifecycleService {
    pub fn new(db_pool: &PgPool) -> Self {
        Self {
            db_pool: db_pool.clone(),
        }
    }

    /// Mentor-only status update (confirm, complete, or cancel through the
    /// status endpoint). The requester must own the session's mentor
    /// profile.
    pub async fn update_status(
        &self,
        requester_user_id: Uuid,
        session_id: Uuid,
        requested: SessionStatus,
    ) -> Result<(SessionResponse, Vec<NotificationEvent>), AppError> {
        let store = SessionStore::new(&self.db_pool);
        let session = store.get(session_id).await?;

        let profile = MentorStore::new(&self.db_pool)
            .require_profile(requester_user_id)
            .await?;
        if profile.mentor_id != session.mentor_id {
            return Err(AppError::Authorization(
                "You do not have permission to modify this session".to_string(),
            ));
        }

        let current = parse_status(&session.status, session_id)?;
        validate_transition(current, requested)?;
        if requested == SessionStatus::Completed {
            validate_completion_time(session.scheduled_at, Utc::now())?;
        }

        let link = (requested == SessionStatus::Confirmed).then(|| meeting_link(session_id));
        store.set_status(session_id, requested, link.as_deref()).await?;

        let detail = store.get_detail(session_id).await?;
        let events = match transition_notification(requested) {
            Some(kind) => session_events(
                kind,
                session_id,
                &detail.topic,
                detail.scheduled_at,
                detail.mentee_id,
                detail.mentor.user_id,
            ),
            None => Vec::new(),
        };

        Ok((detail, events))
    }

    /// Cancellation, open to the owning mentor and the session's mentee.
    pub async fn cancel(
        &self,
        requester_user_id: Uuid,
        session_id: Uuid,
    ) -> Result<(SessionResponse, Vec<NotificationEvent>), AppError> {
        let store = SessionStore::new(&self.db_pool);
        let session = store.get(session_id).await?;

        let current = parse_status(&session.status, session_id)?;
        validate_cancellable(current)?;

        let is_session_mentee = session.mentee_id == requester_user_id;
        let is_owning_mentor = MentorStore::new(&self.db_pool)
            .find_by_user(requester_user_id)
            .await?
            .map(|profile| profile.mentor_id == session.mentor_id)
            .unwrap_or(false);

        if !is_session_mentee && !is_owning_mentor {
            return Err(AppError::Authorization(
                "You do not have permission to cancel this session".to_string(),
            ));
        }

        store
            .set_status(session_id, SessionStatus::Cancelled, None)
            .await?;

        let detail = store.get_detail(session_id).await?;
        let events = session_events(
            NotificationKind::SessionCancelled,
            session_id,
            &detail.topic,
            detail.scheduled_at,
            detail.mentee_id,
            detail.mentor.user_id,
        );

        Ok((detail, events))
    }
}

fn parse_status(raw: &str, session_id: Uuid) -> Result<SessionStatus, AppError> {
    raw.parse::<SessionStatus>().map_err(|_| {
        AppError::Internal(format!(
            "session {} has an unrecognized status '{}'",
            session_id, raw
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn confirming_and_cancelling_a_pending_session_is_legal() {
        assert!(validate_transition(SessionStatus::Pending, SessionStatus::Confirmed).is_ok());
        assert!(validate_transition(SessionStatus::Pending, SessionStatus::Cancelled).is_ok());
    }

    #[test]
    fn completing_a_pending_session_is_rejected() {
        let err =
            validate_transition(SessionStatus::Pending, SessionStatus::Completed).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn terminal_states_have_no_outgoing_transitions() {
        for terminal in [SessionStatus::Completed, SessionStatus::Cancelled] {
            for next in [
                SessionStatus::Pending,
                SessionStatus::Confirmed,
                SessionStatus::Completed,
                SessionStatus::Cancelled,
            ] {
                assert!(
                    validate_transition(terminal, next).is_err(),
                    "{terminal} -> {next} must be rejected"
                );
            }
        }
    }

    #[test]
    fn completion_before_the_scheduled_time_is_rejected() {
        let now = Utc::now();
        let err = validate_completion_time(now + Duration::days(1), now).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn completion_succeeds_once_the_scheduled_time_has_passed() {
        let now = Utc::now();
        assert!(validate_completion_time(now - Duration::hours(1), now).is_ok());
        assert!(validate_completion_time(now, now).is_ok());
    }

    #[test]
    fn pending_and_confirmed_sessions_can_be_cancelled() {
        // The mentee may cancel a confirmed session through the cancel
        // action; only completion closes the door.
        assert!(validate_cancellable(SessionStatus::Pending).is_ok());
        assert!(validate_cancellable(SessionStatus::Confirmed).is_ok());
        assert!(validate_cancellable(SessionStatus::Cancelled).is_ok());
    }

    #[test]
    fn completed_sessions_cannot_be_cancelled() {
        let err = validate_cancellable(SessionStatus::Completed).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn transitions_map_to_their_notification_kinds() {
        assert_eq!(
            transition_notification(SessionStatus::Confirmed),
            Some(NotificationKind::SessionConfirmed)
        );
        assert_eq!(
            transition_notification(SessionStatus::Cancelled),
            Some(NotificationKind::SessionCancelled)
        );
        assert_eq!(
            transition_notification(SessionStatus::Completed),
            Some(NotificationKind::SessionCompleted)
        );
        assert_eq!(transition_notification(SessionStatus::Pending), None);
    }

    #[test]
    fn meeting_link_embeds_the_session_id() {
        let session_id = Uuid::new_v4();
        let link = meeting_link(session_id);
        assert!(link.starts_with("https://meet.jit.si/mentorhub-"));
        assert!(link.contains(&session_id.to_string()));
    }
}
