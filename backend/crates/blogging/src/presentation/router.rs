//! Blogging Routers
//!
//! Public reads identify an optional bearer for `myStatus`; comments and
//! likes require a bearer; `/sa/blogs` and post writes require admin Basic.
//! The same path may be served by several guard groups, one per method.

use auth::{identify_bearer, require_basic_admin, require_bearer};
use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::infra::postgres::PgBloggingRepository;
use crate::presentation::handlers::{self, BloggingAppState, BloggingStore};

pub type PgBloggingState = BloggingAppState<PgBloggingRepository>;

/// Create the blogging router with PostgreSQL repository
pub fn blogging_router(state: PgBloggingState) -> Router {
    blogging_router_generic(state)
}

/// Create a generic blogging router for any repository implementation
pub fn blogging_router_generic<R>(state: BloggingAppState<R>) -> Router
where
    R: BloggingStore,
{
    public_routes(&state)
        .merge(member_routes(&state))
        .merge(admin_routes(&state))
        .with_state(state)
}

fn public_routes<R>(state: &BloggingAppState<R>) -> Router<BloggingAppState<R>>
where
    R: BloggingStore,
{
    Router::new()
        .route("/blogs", get(handlers::list_blogs::<R>))
        .route("/blogs/{id}", get(handlers::get_blog::<R>))
        .route("/blogs/{id}/posts", get(handlers::list_blog_posts::<R>))
        .route("/posts", get(handlers::list_posts::<R>))
        .route("/posts/{id}", get(handlers::get_post::<R>))
        .route("/posts/{id}/comments", get(handlers::list_post_comments::<R>))
        .route("/comments/{id}", get(handlers::get_comment::<R>))
        .route_layer(middleware::from_fn_with_state(
            state.guard.clone(),
            identify_bearer,
        ))
}

fn member_routes<R>(state: &BloggingAppState<R>) -> Router<BloggingAppState<R>>
where
    R: BloggingStore,
{
    Router::new()
        .route("/posts/{id}/comments", post(handlers::create_comment::<R>))
        .route("/posts/{id}/like-status", put(handlers::set_post_like_status::<R>))
        .route(
            "/comments/{id}",
            put(handlers::update_comment::<R>).delete(handlers::delete_comment::<R>),
        )
        .route(
            "/comments/{id}/like-status",
            put(handlers::set_comment_like_status::<R>),
        )
        .route_layer(middleware::from_fn_with_state(
            state.guard.clone(),
            require_bearer,
        ))
}

fn admin_routes<R>(state: &BloggingAppState<R>) -> Router<BloggingAppState<R>>
where
    R: BloggingStore,
{
    Router::new()
        .route(
            "/sa/blogs",
            get(handlers::list_blogs::<R>).post(handlers::create_blog::<R>),
        )
        .route(
            "/sa/blogs/{id}",
            put(handlers::update_blog::<R>).delete(handlers::delete_blog::<R>),
        )
        .route(
            "/sa/blogs/{id}/posts",
            get(handlers::list_blog_posts::<R>).post(handlers::create_blog_post::<R>),
        )
        .route(
            "/sa/blogs/{id}/posts/{post_id}",
            put(handlers::update_blog_post::<R>).delete(handlers::delete_blog_post::<R>),
        )
        .route("/posts", post(handlers::create_post::<R>))
        .route(
            "/posts/{id}",
            put(handlers::update_post::<R>).delete(handlers::delete_post::<R>),
        )
        // post listings read the viewer even here; Basic yields an anonymous one
        .route_layer(middleware::from_fn_with_state(
            state.guard.clone(),
            identify_bearer,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.guard.clone(),
            require_basic_admin,
        ))
}
