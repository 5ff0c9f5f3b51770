use axum::{
    extract::{Path, Query, State},
    response::Json,
    Extension,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use mentorhub_auth::{require_role, Claims};
use mentorhub_common::{ApiResponse, AppError, UserRole};
use mentorhub_database::{Mentor, Notification};

use crate::availability::AvailabilityService;
use crate::booking::BookingService;
use crate::feedback::FeedbackService;
use crate::lifecycle::LifecycleService;
use crate::mentors::MentorStore;
use crate::models::*;
use crate::notifications::NotificationService;
use crate::sessions::SessionStore;
use crate::slots::{resolve_slots, ResolvedSlot};
use crate::AppState;

// Health check
pub async fn health_check() -> Json<ApiResponse<String>> {
    Json(ApiResponse::success("MentorHub API is healthy".to_string()))
}

// Availability

pub async fn get_my_availability(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<AvailabilityResponse>>, AppError> {
    require_role(&claims, UserRole::Mentor)?;
    let mentor = own_mentor_profile(&state, &claims).await?;

    let availability = AvailabilityService::new(&state.db_pool)
        .get_or_create(mentor.mentor_id)
        .await?;

    Ok(Json(ApiResponse::success(availability.into())))
}

pub async fn update_my_availability(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<UpdateAvailabilityRequest>,
) -> Result<Json<ApiResponse<AvailabilityResponse>>, AppError> {
    require_role(&claims, UserRole::Mentor)?;
    let mentor = own_mentor_profile(&state, &claims).await?;

    let availability = AvailabilityService::new(&state.db_pool)
        .update(mentor.mentor_id, request)
        .await?;

    Ok(Json(ApiResponse::success(availability.into())))
}

pub async fn get_mentor_availability(
    State(state): State<AppState>,
    Path(mentor_id): Path<Uuid>,
) -> Result<Json<ApiResponse<AvailabilityResponse>>, AppError> {
    // Any authenticated caller may read; mentees need this to find windows.
    MentorStore::new(&state.db_pool).get(mentor_id).await?;

    let availability = AvailabilityService::new(&state.db_pool)
        .get_or_create(mentor_id)
        .await?;

    Ok(Json(ApiResponse::success(availability.into())))
}

pub async fn get_mentor_slots(
    State(state): State<AppState>,
    Path(mentor_id): Path<Uuid>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<ApiResponse<Vec<ResolvedSlot>>>, AppError> {
    MentorStore::new(&state.db_pool).get(mentor_id).await?;

    let availability = AvailabilityService::new(&state.db_pool)
        .get_or_create(mentor_id)
        .await?;
    let slots = resolve_slots(&availability.weekly_slots.0, query.date, Utc::now());

    Ok(Json(ApiResponse::success(slots)))
}

// Sessions

pub async fn create_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<Json<ApiResponse<SessionResponse>>, AppError> {
    require_role(&claims, UserRole::Mentee)?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let (session, events) = BookingService::new(&state.db_pool)
        .create_session(claims.user_id()?, request)
        .await?;

    NotificationService::new(&state.db_pool).dispatch(events).await;
    tracing::info!(session_id = %session.session_id, "session booked");

    Ok(Json(ApiResponse::success(session)))
}

pub async fn get_my_sessions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<SessionResponse>>>, AppError> {
    require_role(&claims, UserRole::Mentee)?;

    let sessions = SessionStore::new(&state.db_pool)
        .list_for_mentee(claims.user_id()?)
        .await?;

    Ok(Json(ApiResponse::success(sessions)))
}

pub async fn get_mentor_sessions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<SessionResponse>>>, AppError> {
    require_role(&claims, UserRole::Mentor)?;
    let mentor = own_mentor_profile(&state, &claims).await?;

    let sessions = SessionStore::new(&state.db_pool)
        .list_for_mentor(mentor.mentor_id)
        .await?;

    Ok(Json(ApiResponse::success(sessions)))
}

pub async fn update_session_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<UpdateSessionStatusRequest>,
) -> Result<Json<ApiResponse<SessionResponse>>, AppError> {
    require_role(&claims, UserRole::Mentor)?;

    let (session, events) = LifecycleService::new(&state.db_pool)
        .update_status(claims.user_id()?, session_id, request.status)
        .await?;

    NotificationService::new(&state.db_pool).dispatch(events).await;
    tracing::info!(session_id = %session.session_id, status = %session.status, "session status updated");

    Ok(Json(ApiResponse::success(session)))
}

pub async fn cancel_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ApiResponse<SessionResponse>>, AppError> {
    let (session, events) = LifecycleService::new(&state.db_pool)
        .cancel(claims.user_id()?, session_id)
        .await?;

    NotificationService::new(&state.db_pool).dispatch(events).await;
    tracing::info!(session_id = %session.session_id, "session cancelled");

    Ok(Json(ApiResponse::success(session)))
}

// Feedback

pub async fn create_feedback(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreateFeedbackRequest>,
) -> Result<Json<ApiResponse<FeedbackResponse>>, AppError> {
    require_role(&claims, UserRole::Mentee)?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let (feedback, events) = FeedbackService::new(&state.db_pool)
        .create(claims.user_id()?, request)
        .await?;

    NotificationService::new(&state.db_pool).dispatch(events).await;

    Ok(Json(ApiResponse::success(feedback)))
}

pub async fn get_mentor_feedback(
    State(state): State<AppState>,
    Path(mentor_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<FeedbackResponse>>>, AppError> {
    let feedback = FeedbackService::new(&state.db_pool)
        .list_for_mentor(mentor_id)
        .await?;

    Ok(Json(ApiResponse::success(feedback)))
}

pub async fn get_my_feedback(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<FeedbackResponse>>>, AppError> {
    let feedback = FeedbackService::new(&state.db_pool)
        .list_for_mentee(claims.user_id()?)
        .await?;

    Ok(Json(ApiResponse::success(feedback)))
}

pub async fn get_session_feedback(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ApiResponse<FeedbackResponse>>, AppError> {
    let feedback = FeedbackService::new(&state.db_pool)
        .get_for_session(session_id)
        .await?;

    Ok(Json(ApiResponse::success(feedback)))
}

// Mentor directory

pub async fn list_mentors(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Mentor>>>, AppError> {
    let mentors = MentorStore::new(&state.db_pool).list().await?;
    Ok(Json(ApiResponse::success(mentors)))
}

pub async fn search_mentors(
    State(state): State<AppState>,
    Query(query): Query<MentorSearchQuery>,
) -> Result<Json<ApiResponse<Vec<Mentor>>>, AppError> {
    let mentors = MentorStore::new(&state.db_pool)
        .search(query.expertise.as_deref(), query.min_rate, query.max_rate)
        .await?;

    Ok(Json(ApiResponse::success(mentors)))
}

pub async fn get_mentor(
    State(state): State<AppState>,
    Path(mentor_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Mentor>>, AppError> {
    let mentor = MentorStore::new(&state.db_pool).get(mentor_id).await?;
    Ok(Json(ApiResponse::success(mentor)))
}

pub async fn create_mentor_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<MentorProfileRequest>,
) -> Result<Json<ApiResponse<Mentor>>, AppError> {
    require_role(&claims, UserRole::Mentor)?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let mentor = MentorStore::new(&state.db_pool)
        .create_profile(claims.user_id()?, request)
        .await?;

    Ok(Json(ApiResponse::success(mentor)))
}

pub async fn update_mentor_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<MentorProfileRequest>,
) -> Result<Json<ApiResponse<Mentor>>, AppError> {
    require_role(&claims, UserRole::Mentor)?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let mentor = MentorStore::new(&state.db_pool)
        .update_profile(claims.user_id()?, request)
        .await?;

    Ok(Json(ApiResponse::success(mentor)))
}

// Notifications

pub async fn get_notifications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<Notification>>>, AppError> {
    let notifications = NotificationService::new(&state.db_pool)
        .list_for_recipient(claims.user_id()?)
        .await?;

    Ok(Json(ApiResponse::success(notifications)))
}

pub async fn get_unread_count(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<UnreadCountResponse>>, AppError> {
    let count = NotificationService::new(&state.db_pool)
        .unread_count(claims.user_id()?)
        .await?;

    Ok(Json(ApiResponse::success(UnreadCountResponse { count })))
}

pub async fn mark_notification_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Notification>>, AppError> {
    let notification = NotificationService::new(&state.db_pool)
        .mark_read(claims.user_id()?, notification_id)
        .await?;

    Ok(Json(ApiResponse::success(notification)))
}

pub async fn mark_all_notifications_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<String>>, AppError> {
    NotificationService::new(&state.db_pool)
        .mark_all_read(claims.user_id()?)
        .await?;

    Ok(Json(ApiResponse::success(
        "All notifications marked as read".to_string(),
    )))
}

/// The requester's own mentor profile for mentor-scoped resources.
/// Missing profile reads as a missing resource on these paths, unlike the
/// lifecycle ownership gate which treats it as a permission failure.
async fn own_mentor_profile(state: &AppState, claims: &Claims) -> Result<Mentor, AppError> {
    MentorStore::new(&state.db_pool)
        .find_by_user(claims.user_id()?)
        .await?
        .ok_or_else(|| AppError::NotFound("Mentor profile not found".to_string()))
}
