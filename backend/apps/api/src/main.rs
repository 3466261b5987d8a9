//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod config;
mod testing;

use auth::domain::repository::DeviceSessionRepository;
use auth::{LoggingEmailSender, PgAuthRepository, PgAuthState, auth_router};
use axum::{
    Router, http,
    http::{Method, header},
};
use blogging::{BloggingAppState, PgBloggingRepository, blogging_router};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ApiConfig;
use crate::testing::testing_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,auth=info,blogging=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env()?;

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Startup cleanup: remove expired device sessions
    // Errors here should not prevent server startup
    let auth_repo = PgAuthRepository::new(pool.clone());
    match auth_repo.delete_expired_sessions().await {
        Ok(sessions) => {
            tracing::info!(sessions_deleted = sessions, "Device session cleanup completed");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Device session cleanup failed, continuing anyway");
        }
    }

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = config
        .frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let auth_state = PgAuthState::new(auth_repo, LoggingEmailSender, config.auth.clone());
    let blogging_state =
        BloggingAppState::new(PgBloggingRepository::new(pool.clone()), auth_state.access_guard());

    let mut app = Router::new()
        .merge(auth_router(auth_state))
        .merge(blogging_router(blogging_state));

    if config.include_testing_module {
        tracing::warn!("Testing module enabled: DELETE /testing/all-data wipes the database");
        app = app.merge(testing_router(pool.clone()));
    }

    let app = app.layer(TraceLayer::new_for_http()).layer(cors);

    // Start server
    tracing::info!("Listening on {}", config.bind_addr);

    let listener = TcpListener::bind(config.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
