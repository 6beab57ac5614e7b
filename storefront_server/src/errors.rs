use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use log::error;
use storefront_engine::{AccountApiError, StorefrontError};
use thiserror::Error;

use crate::data_objects::JsonResponse;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("{message}")]
    ValidationError { message: String, details: Vec<String> },
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidState(String),
    #[error("{0}")]
    InsufficientBalance(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Unauthorized. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("Forbidden. {0}")]
    InsufficientPermissions(String),
}

impl ServerError {
    pub fn validation<S: Into<String>>(message: S, details: Vec<String>) -> Self {
        Self::ValidationError { message: message.into(), details }
    }

    /// The message shown to the client. Internal failures are logged, but never described to the caller.
    fn public_message(&self) -> String {
        if self.status_code().is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }

    fn details(&self) -> Option<Vec<String>> {
        match self {
            Self::ValidationError { details, .. } if !details.is_empty() => Some(details.clone()),
            _ => None,
        }
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError { .. } => StatusCode::BAD_REQUEST,
            Self::InvalidState(_) => StatusCode::BAD_REQUEST,
            Self::InsufficientBalance(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("💻️ {self}");
        }
        let body = JsonResponse::error(status, self.public_message(), self.details());
        HttpResponse::build(status).insert_header(ContentType::json()).body(body.to_json())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No access token was provided.")]
    MissingToken,
    #[error("The access token has expired.")]
    ExpiredToken,
    #[error("The access token is invalid. {0}")]
    InvalidToken(String),
    #[error("Could not sign the access token. {0}")]
    TokenSigning(String),
}

impl From<StorefrontError> for ServerError {
    fn from(e: StorefrontError) -> Self {
        match e {
            StorefrontError::ValidationError(msg) => Self::validation("Invalid request", vec![msg]),
            StorefrontError::SelfTransfer => Self::validation(e.to_string(), vec![]),
            StorefrontError::ProductNotFound(_)
            | StorefrontError::OrderNotFound(_)
            | StorefrontError::BatchNotFound(_)
            | StorefrontError::AccountNotFound(_) => Self::NotFound(e.to_string()),
            StorefrontError::OrderAlreadyCancelled(_) | StorefrontError::OrderAlreadyCompleted(_) => {
                Self::InvalidState(e.to_string())
            },
            StorefrontError::InsufficientBalance { .. } => Self::InsufficientBalance(e.to_string()),
            StorefrontError::TransactionError(msg) => Self::BackendError(format!("Transaction failed. {msg}")),
            StorefrontError::AccountError(e) => Self::from(e),
        }
    }
}

impl From<AccountApiError> for ServerError {
    fn from(e: AccountApiError) -> Self {
        Self::BackendError(e.to_string())
    }
}
