use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::auth::AuthError;
use crate::domain::errors::DomainError;

/// Uniform `{code, message}` envelope used for every non-payload response.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub code: u16,
    pub message: String,
}

impl MessageResponse {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code: status.as_u16(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("error binding json data")]
    InvalidBody,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::WrongCart
            | DomainError::NotPositiveQuantity
            | DomainError::OrderEmpty
            | DomainError::ForeignOrder
            | DomainError::InvalidInput(_) => AppError::BadRequest(e.to_string()),
            DomainError::OrderItemNotFound | DomainError::OrderNotFound => {
                AppError::NotFound(e.to_string())
            }
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::MissingToken | AuthError::InvalidToken(_) => {
                AppError::Unauthorized(AuthError::MissingToken.to_string())
            }
            AuthError::Forbidden => AppError::Forbidden(e.to_string()),
            AuthError::InvalidUserId => AppError::BadRequest(e.to_string()),
            AuthError::Signing(msg) => AppError::Internal(msg),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidBody | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = match self {
            AppError::Internal(detail) => {
                log::error!("request failed: {}", detail);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(status).json(MessageResponse::new(status, message))
    }
}
