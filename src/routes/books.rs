use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use crate::error::AppResult;
use crate::state::AppState;
use crate::types::{CreateBookRequest, CurrentUser, UpdateBookRequest};

pub async fn add_book(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateBookRequest>,
) -> AppResult<impl IntoResponse> {
    let ctx = state.request_context();
    tracing::debug!(request_id = %ctx.request_id(), user_id = user.id, "add book");
    let book = state.services.books.add_book(&ctx, req).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

pub async fn get_book(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<impl IntoResponse> {
    let ctx = state.request_context();
    let detail = state.services.books.get_detail_book(&ctx, id).await?;
    Ok(Json(detail))
}

pub async fn update_book(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(mut req): Json<UpdateBookRequest>,
) -> AppResult<impl IntoResponse> {
    req.id = id;
    let ctx = state.request_context();
    tracing::debug!(request_id = %ctx.request_id(), user_id = user.id, book_id = id, "update book");
    let book = state.services.books.update_book(&ctx, req).await?;
    Ok(Json(book))
}

pub async fn delete_book(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    let ctx = state.request_context();
    tracing::debug!(request_id = %ctx.request_id(), user_id = user.id, book_id = id, "delete book");
    state.services.books.delete_book(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
