use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use mentorhub_common::AppError;

use crate::AppState;

// Authentication middleware: resolves the bearer token into the principal
// and stores it in request extensions for handlers to pick up.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| {
            AppError::Authentication("Missing or invalid authorization header".to_string())
        })?;

    let claims = state.jwt_service.validate_token(token)?;
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}
