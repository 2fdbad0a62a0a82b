#[cfg(test)]
mod tests {
    use crate::auth::TokenError;
    use crate::error::{AppError, AppResult, OptionExt};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use http_body_util::BodyExt;
    use std::io;

    #[test]
    fn test_app_error_display() {
        let error = AppError::BadRequest("Invalid input".to_string());
        assert_eq!(format!("{}", error), "Bad request: Invalid input");

        let error = AppError::NotFound("book not found".to_string());
        assert_eq!(format!("{}", error), "Not found: book not found");

        let error = AppError::TransactionAborted(Box::new(AppError::Conflict("dup".to_string())));
        assert_eq!(format!("{}", error), "Transaction aborted: Conflict: dup");
    }

    #[test]
    fn test_app_error_into_response() {
        let cases = [
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (AppError::ValidationError { field: "f".into(), message: "m".into() }, StatusCode::BAD_REQUEST),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT),
            (AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (AppError::StoreUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (AppError::Database("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::Cancelled("x".into()), StatusCode::REQUEST_TIMEOUT),
            (AppError::Internal(anyhow::anyhow!("x")), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::TransactionAborted(Box::new(AppError::NotFound("x".into()))), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            let label = error.to_string();
            assert_eq!(error.into_response().status(), status, "{}", label);
        }
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let error = AppError::ValidationError { field: "price".into(), message: "price is required".into() };
        let response = error.into_response();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["status"], 400);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["details"]["field"], "price");
        assert!(body["timestamp"].is_string());
    }

    #[test]
    fn test_context_keeps_class() {
        let err = AppError::NotFound("author not found".into()).context("book creation failed");
        match err {
            AppError::NotFound(msg) => assert_eq!(msg, "book creation failed: author not found"),
            other => panic!("expected NotFound, got {:?}", other),
        }

        let err = AppError::Internal(anyhow::anyhow!("boom")).context("author creation failed");
        assert!(matches!(err, AppError::Internal(_)));
        assert!(format!("{}", err).contains("author creation failed"));
    }

    #[test]
    fn test_abort_cause() {
        let err = AppError::TransactionAborted(Box::new(AppError::Cancelled("deadline exceeded".into())));
        assert!(err.abort_cause().is_some_and(AppError::is_cancelled));
        assert!(AppError::NotFound("x".into()).abort_cause().is_none());
    }

    #[test]
    fn test_from_sqlx_error() {
        assert!(AppError::from(sqlx::Error::RowNotFound).is_not_found());
        assert!(matches!(AppError::from(sqlx::Error::PoolTimedOut), AppError::StoreUnavailable(_)));
        assert!(matches!(AppError::from(sqlx::Error::PoolClosed), AppError::StoreUnavailable(_)));
        assert!(matches!(AppError::from(sqlx::Error::Protocol("bad".into())), AppError::Database(_)));
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let app_error: AppError = io_error.into();
        match app_error {
            AppError::Internal(e) => assert!(e.to_string().contains("File not found")),
            other => panic!("Expected Internal variant, got {:?}", other),
        }
    }

    #[test]
    fn test_from_token_error() {
        match AppError::from(TokenError::Malformed("bad".into())) {
            AppError::Unauthorized(msg) => assert_eq!(msg, "malformed token: bad"),
            other => panic!("Expected Unauthorized, got {:?}", other),
        }
    }

    #[test]
    fn test_option_ext() {
        let some_value: Option<i32> = Some(42);
        let result: AppResult<i32> = some_value.ok_or_not_found("test entity");
        assert_eq!(result.unwrap(), 42);

        let none_value: Option<i32> = None;
        match none_value.ok_or_not_found("test entity") {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, "test entity not found"),
            other => panic!("Expected NotFound error, got {:?}", other),
        }
    }
}
