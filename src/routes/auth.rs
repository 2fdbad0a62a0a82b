use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::error::AppResult;
use crate::state::AppState;
use crate::types::{LoginRequest, RegisterRequest};

pub async fn register(State(state): State<AppState>, Json(req): Json<RegisterRequest>) -> AppResult<impl IntoResponse> {
    let ctx = state.request_context();
    let user = state.services.auth.register(&ctx, req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> AppResult<impl IntoResponse> {
    let ctx = state.request_context();
    let session = state.services.auth.login(&ctx, req).await?;
    Ok(Json(session))
}
