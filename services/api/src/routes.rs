use axum::{
    middleware::from_fn_with_state,
    routing::{get, patch, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

pub fn create_routes(state: AppState) -> Router {
    // Public surface: health and the mentor directory.
    let public = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/mentors", get(handlers::list_mentors))
        .route("/mentors/search", get(handlers::search_mentors))
        .route("/mentors/:mentor_id", get(handlers::get_mentor));

    // Everything else requires an authenticated principal.
    let protected = Router::new()
        // Mentor profile management
        .route("/mentors/profile", post(handlers::create_mentor_profile))
        .route("/mentors/profile", put(handlers::update_mentor_profile))
        // Availability
        .route(
            "/availability/my-availability",
            get(handlers::get_my_availability).put(handlers::update_my_availability),
        )
        .route(
            "/availability/mentor/:mentor_id",
            get(handlers::get_mentor_availability),
        )
        .route(
            "/availability/mentor/:mentor_id/slots",
            get(handlers::get_mentor_slots),
        )
        // Sessions
        .route("/sessions", post(handlers::create_session))
        .route("/sessions/my-sessions", get(handlers::get_my_sessions))
        .route("/sessions/mentor-sessions", get(handlers::get_mentor_sessions))
        .route("/sessions/:session_id/status", patch(handlers::update_session_status))
        .route("/sessions/:session_id/cancel", patch(handlers::cancel_session))
        // Feedback
        .route("/feedback", post(handlers::create_feedback))
        .route("/feedback/my-feedback", get(handlers::get_my_feedback))
        .route("/feedback/mentor/:mentor_id", get(handlers::get_mentor_feedback))
        .route("/feedback/session/:session_id", get(handlers::get_session_feedback))
        // Notifications
        .route("/notifications", get(handlers::get_notifications))
        .route("/notifications/unread-count", get(handlers::get_unread_count))
        .route(
            "/notifications/:notification_id/read",
            patch(handlers::mark_notification_read),
        )
        .route("/notifications/read-all", patch(handlers::mark_all_notifications_read))
        .layer(from_fn_with_state(state.clone(), auth_middleware));

    public.merge(protected).with_state(state)
}
