//! Auth Routers
//!
//! `/auth`, `/security` and `/sa/users`. Each router is generic over the
//! store so tests can drive it with in-memory repositories.

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use crate::application::email::LoggingEmailSender;
use crate::infra::postgres::PgAuthRepository;
use crate::presentation::handlers::{self, AuthAppState, AuthStore, Mailer};
use crate::presentation::middleware::{
    rate_limit, require_basic_admin, require_bearer, require_refresh_session,
};

/// Production state: PostgreSQL store, log-only email delivery
pub type PgAuthState = AuthAppState<PgAuthRepository, LoggingEmailSender>;

/// Create the Auth router (`/auth`, `/security`, `/sa/users`) with PostgreSQL repository
pub fn auth_router(state: PgAuthState) -> Router {
    auth_router_generic(state)
}

/// Create a generic Auth router for any repository implementation
pub fn auth_router_generic<R, M>(state: AuthAppState<R, M>) -> Router
where
    R: AuthStore,
    M: Mailer,
{
    Router::new()
        .nest("/auth", auth_routes(&state))
        .nest("/security", security_routes(&state))
        .nest("/sa/users", users_routes(&state))
        .with_state(state)
}

fn auth_routes<R, M>(state: &AuthAppState<R, M>) -> Router<AuthAppState<R, M>>
where
    R: AuthStore,
    M: Mailer,
{
    let limited = Router::new()
        .route("/login", post(handlers::login::<R, M>))
        .route("/registration", post(handlers::registration::<R, M>))
        .route(
            "/registration-confirmation",
            post(handlers::registration_confirmation::<R, M>),
        )
        .route(
            "/registration-email-resending",
            post(handlers::registration_email_resending::<R, M>),
        )
        .route("/password-recovery", post(handlers::password_recovery::<R, M>))
        .route("/new-password", post(handlers::new_password::<R, M>))
        .route_layer(middleware::from_fn_with_state(
            state.limiter.clone(),
            rate_limit,
        ));

    let refresh = Router::new()
        .route("/refresh-token", post(handlers::refresh_token::<R, M>))
        .route("/logout", post(handlers::logout::<R, M>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_refresh_session::<R, M>,
        ));

    let bearer = Router::new()
        .route("/me", get(handlers::me::<R, M>))
        .route_layer(middleware::from_fn_with_state(
            state.access_guard(),
            require_bearer,
        ));

    limited.merge(refresh).merge(bearer)
}

fn security_routes<R, M>(state: &AuthAppState<R, M>) -> Router<AuthAppState<R, M>>
where
    R: AuthStore,
    M: Mailer,
{
    Router::new()
        .route(
            "/devices",
            get(handlers::list_devices::<R, M>).delete(handlers::terminate_other_devices::<R, M>),
        )
        .route("/devices/{device_id}", delete(handlers::terminate_device::<R, M>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_refresh_session::<R, M>,
        ))
}

fn users_routes<R, M>(state: &AuthAppState<R, M>) -> Router<AuthAppState<R, M>>
where
    R: AuthStore,
    M: Mailer,
{
    Router::new()
        .route(
            "/",
            get(handlers::list_users::<R, M>).post(handlers::create_user::<R, M>),
        )
        .route("/{id}", delete(handlers::delete_user::<R, M>))
        .route_layer(middleware::from_fn_with_state(
            state.access_guard(),
            require_basic_admin,
        ))
}
