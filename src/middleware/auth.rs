use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Requires `Authorization: Bearer <token>` naming an existing user.
///
/// On success the resolved [`CurrentUser`](crate::types::CurrentUser) is put
/// into the request extensions before the handler runs.
pub async fn require_user(State(state): State<AppState>, mut req: Request, next: Next) -> AppResult<Response> {
    let token = bearer_token(&req)?.to_string();
    let ctx = state.request_context();
    let user = state.services.auth.authenticate(&ctx, &token).await.map_err(|e| {
        tracing::debug!(request_id = %ctx.request_id(), "authentication failed: {}", e);
        e
    })?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

fn bearer_token(req: &Request) -> AppResult<&str> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("missing authorization header".to_string()))?;
    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(AppError::Unauthorized("authorization header must be a bearer token".to_string())),
    }
}
