use axum::http::{Method, StatusCode};
use axum::response::Json;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mentorhub_api::{config::AppConfig, routes, AppState};
use mentorhub_common::ApiResponse;
use mentorhub_database::{create_pool, run_migrations};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mentorhub_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env().map_err(|e| anyhow::anyhow!(e.to_string()))?;

    // Create database connection pool and bring the schema up to date
    let db_pool = create_pool(&config.database).await?;
    run_migrations(&db_pool).await?;

    // Create JWT service
    let jwt_service = mentorhub_auth::JwtService::new(&config.jwt.secret);

    // Build application state
    let app_state = AppState {
        db_pool,
        jwt_service,
        config: config.clone(),
    };

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(Any)
        .allow_origin(Any);

    let app = routes::create_routes(app_state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .fallback(handler_404);

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.server.host, config.server.port))
            .await?;

    tracing::info!(
        "MentorHub API listening on {}:{}",
        config.server.host,
        config.server.port
    );

    axum::serve(listener, app).await?;

    Ok(())
}

async fn handler_404() -> (StatusCode, Json<ApiResponse<()>>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::error("Endpoint not found".to_string())),
    )
}
