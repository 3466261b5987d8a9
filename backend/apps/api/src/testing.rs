//! Testing module
//!
//! `DELETE /testing/all-data` wipes every table. Mounted only when
//! `INCLUDE_TESTING_MODULE` is enabled.

use axum::{Router, extract::State, http::StatusCode, routing::delete};
use kernel::error::app_error::AppResult;
use sqlx::PgPool;

pub fn testing_router(pool: PgPool) -> Router {
    Router::new()
        .route("/testing/all-data", delete(delete_all_data))
        .with_state(pool)
}

async fn delete_all_data(State(pool): State<PgPool>) -> AppResult<StatusCode> {
    sqlx::query(
        r#"
        TRUNCATE TABLE
            comment_likes,
            post_likes,
            comments,
            posts,
            blogs,
            device_sessions,
            users
        CASCADE
        "#,
    )
    .execute(&pool)
    .await?;

    tracing::warn!("All data deleted through the testing endpoint");
    Ok(StatusCode::NO_CONTENT)
}
