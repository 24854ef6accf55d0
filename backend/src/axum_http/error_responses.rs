use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::usecases::{
    avatars::AvatarError, checkout::CheckoutError, collaborations::CollaborationError,
    coupons::CouponError, gift_cards::GiftCardError, products::ProductError,
    profiles::ProfileError, publish_product::PublishError, reels::ReelError,
};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn with_status(status: StatusCode, message: impl Into<String>) -> Self {
        AppError::Status {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Status { status, message } => (status, message),
            AppError::Internal(err) => {
                // Logged here, never echoed to the client.
                error!(error = ?err, "http: internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: status.as_u16(),
            message,
        });

        (status, body).into_response()
    }
}

macro_rules! impl_from_usecase_error {
    ($($error:ident),+ $(,)?) => {
        $(
            impl From<$error> for AppError {
                fn from(err: $error) -> Self {
                    match err {
                        $error::Internal(inner) => AppError::Internal(inner),
                        other => AppError::with_status(other.status_code(), other.to_string()),
                    }
                }
            }
        )+
    };
}

impl_from_usecase_error!(
    AvatarError,
    CheckoutError,
    CollaborationError,
    CouponError,
    GiftCardError,
    ProductError,
    ProfileError,
    PublishError,
    ReelError,
);

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(response: Response) -> ErrorResponseBody {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[derive(serde::Deserialize)]
    struct ErrorResponseBody {
        code: u16,
        message: String,
    }

    #[tokio::test]
    async fn internal_errors_are_redacted() {
        let err = AppError::from(anyhow::anyhow!("duplicate key value violates unique constraint"));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_of(response).await;
        assert_eq!(body.code, 500);
        assert_eq!(body.message, "Internal server error");
    }

    #[tokio::test]
    async fn usecase_errors_keep_status_and_message() {
        let err = AppError::from(GiftCardError::AlreadySpunThisMonth);

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = body_of(response).await;
        assert_eq!(body.code, 409);
        assert_eq!(body.message, "already spun this month");
    }
}
