use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use bhojan_ledger_engine::traits::{LedgerError, LedgerQueryError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("The request conflicts with the ledger state. {0}")]
    StateConflict(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::StateConflict(_) => StatusCode::CONFLICT,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<LedgerError> for ServerError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::OrderNotFound(_) | LedgerError::PayoutNotFound(_) => Self::NoRecordFound(e.to_string()),
            LedgerError::AlreadyPaidOut(_, _) |
            LedgerError::RefundNotAllowed(_, _) |
            LedgerError::InvalidTransition(_) => Self::StateConflict(e.to_string()),
            LedgerError::QueryError(e) => Self::from(e),
            LedgerError::DatabaseError(_) | LedgerError::IntegrityViolation(_) => Self::BackendError(e.to_string()),
        }
    }
}

impl From<LedgerQueryError> for ServerError {
    fn from(e: LedgerQueryError) -> Self {
        match e {
            LedgerQueryError::QueryError(_) => Self::InvalidRequestBody(e.to_string()),
            LedgerQueryError::DatabaseError(_) => Self::BackendError(e.to_string()),
        }
    }
}
