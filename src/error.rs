use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error taxonomy for the user endpoints. Every variant renders as
/// `{"success": false, "message": ...}` so clients always get one
/// structured body, never a bare string or a stack trace.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("User already registered.")]
    Conflict,

    #[error("Invalid credentials.")]
    Auth,

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("Failed to upload profile image.")]
    Upload(#[source] anyhow::Error),

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Conflict | ApiError::Auth => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Upload(_) | ApiError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        // The unique index on users.email/users.user_name is the authoritative
        // duplicate check; the pre-insert read is only a fast path.
        if err
            .as_database_error()
            .is_some_and(|db| db.is_unique_violation())
        {
            return ApiError::Conflict;
        }
        ApiError::Unexpected(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Upload(source) => {
                tracing::error!(error = %source, "media upload failed");
                self.to_string()
            }
            ApiError::Unexpected(source) => {
                tracing::error!(error = %source, "unhandled error");
                "Internal Server Error.".to_string()
            }
            _ => self.to_string(),
        };
        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(res: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn validation_renders_400_with_message() {
        let res = ApiError::Validation("Please fill full form.").into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = body_json(res).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Please fill full form.");
    }

    #[tokio::test]
    async fn conflict_and_auth_are_400() {
        assert_eq!(ApiError::Conflict.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Auth.status(), StatusCode::BAD_REQUEST);
        let body = body_json(ApiError::Conflict.into_response()).await;
        assert_eq!(body["message"], "User already registered.");
    }

    #[tokio::test]
    async fn unexpected_does_not_leak_details() {
        let res = ApiError::Unexpected(anyhow::anyhow!("connection refused to 10.0.0.3"))
            .into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(res).await;
        assert_eq!(body["message"], "Internal Server Error.");
    }

    #[tokio::test]
    async fn upload_is_500_with_fixed_message() {
        let res = ApiError::Upload(anyhow::anyhow!("bucket missing")).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(res).await;
        assert_eq!(body["message"], "Failed to upload profile image.");
    }

    #[test]
    fn row_not_found_is_not_a_conflict() {
        let err = ApiError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, ApiError::Unexpected(_)));
    }

    #[derive(Debug)]
    struct DuplicateKey;

    impl std::fmt::Display for DuplicateKey {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("duplicate key value violates unique constraint \"users_email_key\"")
        }
    }

    impl std::error::Error for DuplicateKey {}

    impl sqlx::error::DatabaseError for DuplicateKey {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint \"users_email_key\""
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            sqlx::error::ErrorKind::UniqueViolation
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }
    }

    #[tokio::test]
    async fn unique_violation_maps_to_conflict() {
        let err = ApiError::from(sqlx::Error::Database(Box::new(DuplicateKey)));
        assert!(matches!(err, ApiError::Conflict));
        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = body_json(res).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "User already registered.");
    }
}
