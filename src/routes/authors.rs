use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use crate::error::AppResult;
use crate::state::AppState;
use crate::types::{AddAuthorBookRequest, CreateAuthorAndBookRequest, CreateAuthorRequest, CurrentUser};

pub async fn create_author(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateAuthorRequest>,
) -> AppResult<impl IntoResponse> {
    let ctx = state.request_context();
    tracing::debug!(request_id = %ctx.request_id(), user_id = user.id, "create author");
    let author = state.services.authors.create_author(&ctx, req).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

// Author and first book in one transaction
pub async fn create_author_and_book(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateAuthorAndBookRequest>,
) -> AppResult<impl IntoResponse> {
    let ctx = state.request_context();
    tracing::debug!(request_id = %ctx.request_id(), user_id = user.id, "create author and book");
    let created = state.services.authors.create_author_and_book(&ctx, req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn add_author_book(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(author_id): Path<i64>,
    Json(mut req): Json<AddAuthorBookRequest>,
) -> AppResult<impl IntoResponse> {
    req.author_id = author_id;
    let ctx = state.request_context();
    tracing::debug!(request_id = %ctx.request_id(), user_id = user.id, author_id, "add author book");
    let book = state.services.authors.add_author_book(&ctx, req).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

pub async fn list_author_books(
    State(state): State<AppState>,
    Path(author_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let ctx = state.request_context();
    let books = state.services.authors.get_list_book_by_author(&ctx, author_id).await?;
    Ok(Json(books))
}

pub async fn delete_author_book(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((author_id, book_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    let ctx = state.request_context();
    tracing::debug!(request_id = %ctx.request_id(), user_id = user.id, author_id, book_id, "delete author book");
    state.services.authors.delete_book_by_author(&ctx, author_id, book_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
