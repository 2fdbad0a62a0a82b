//! HTTP route handlers.
//!
//! - `auth`: registration and login
//! - `authors`: author management and author-scoped book operations
//! - `books`: book management
//! - `health`: liveness, readiness, metrics and version

pub mod auth;
pub mod authors;
pub mod books;
pub mod health;

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::middleware::require_user;
use crate::state::AppState;

/// Prefix of every business endpoint.
pub const API_PREFIX: &str = "/inventorysvc";

/// Builds the complete application router.
pub fn router(state: AppState) -> Router {
    let managements = Router::new()
        .route("/book", post(books::add_book))
        .route("/book/{id}", get(books::get_book).put(books::update_book).delete(books::delete_book))
        .route("/author", post(authors::create_author))
        .route("/author-book", post(authors::create_author_and_book))
        .route("/author/{id}", post(authors::add_author_book))
        .route("/author/{id}/list", get(authors::list_author_books))
        .route("/author/{id}/books/{book_id}", delete(authors::delete_author_book))
        .route_layer(from_fn_with_state(state.clone(), require_user));

    let api = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .nest("/managements", managements);

    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .route("/metrics", get(health::metrics))
        .route("/version", get(health::version))
        .nest(API_PREFIX, api)
        .with_state(state)
        // Request bodies are small JSON documents
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(TraceLayer::new_for_http())
}
