pub mod availability;
pub mod booking;
pub mod config;
pub mod feedback;
pub mod handlers;
pub mod lifecycle;
pub mod mentors;
pub mod middleware;
pub mod models;
pub mod notifications;
pub mod routes;
pub mod sessions;
pub mod slots;

use sqlx::PgPool;

use mentorhub_auth::JwtService;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_service: JwtService,
    pub config: AppConfig,
}
