use crate::codec::CodeError;
use ntex::http::StatusCode;
use ntex::web::{HttpResponse, WebResponseError};
use thiserror::Error;

/// Rejection taxonomy for the result-submission flow. Every kind is surfaced
/// to the caller with its tag so the client can show the right guidance;
/// only `StorageUnavailable` is safe to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingField,
    MalformedToken,
    CorruptPayload,
    SignatureMismatch,
    MalformedPayload,
    InvalidNumericField,
    TeamCodeMismatch,
    TeamNotFound,
    DuplicateResult,
    StorageUnavailable,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::MissingField => "MissingField",
            ErrorKind::MalformedToken => "MalformedToken",
            ErrorKind::CorruptPayload => "CorruptPayload",
            ErrorKind::SignatureMismatch => "SignatureMismatch",
            ErrorKind::MalformedPayload => "MalformedPayload",
            ErrorKind::InvalidNumericField => "InvalidNumericField",
            ErrorKind::TeamCodeMismatch => "TeamCodeMismatch",
            ErrorKind::TeamNotFound => "TeamNotFound",
            ErrorKind::DuplicateResult => "DuplicateResult",
            ErrorKind::StorageUnavailable => "StorageUnavailable",
        }
    }

    fn status(self) -> StatusCode {
        match self {
            ErrorKind::TeamNotFound => StatusCode::NOT_FOUND,
            ErrorKind::DuplicateResult => StatusCode::CONFLICT,
            ErrorKind::StorageUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{1}")]
    Reject(ErrorKind, String),
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WebResponseError for AppError {
    fn error_response(&self, _: &ntex::web::HttpRequest) -> HttpResponse {
        match self {
            AppError::Reject(kind, message) => {
                HttpResponse::build(kind.status()).json(&serde_json::json!({
                    "accepted": false,
                    "errorKind": kind.as_str(),
                    "message": message,
                }))
            }
            AppError::Db(_) => HttpResponse::build(StatusCode::INTERNAL_SERVER_ERROR)
                .json(&serde_json::json!({ "error": "Database error" })),
            AppError::NotFound(msg) => HttpResponse::build(StatusCode::NOT_FOUND)
                .json(&serde_json::json!({ "error": msg })),
            AppError::BadRequest(msg) => HttpResponse::build(StatusCode::BAD_REQUEST)
                .json(&serde_json::json!({ "error": msg })),
            AppError::Internal(_) => HttpResponse::build(StatusCode::INTERNAL_SERVER_ERROR)
                .json(&serde_json::json!({ "error": "Internal error" })),
        }
    }
}

// Codec failures become 400-class rejections with guidance the submitter can
// act on; the causes need different corrective steps, so no generic message.
impl From<CodeError> for AppError {
    fn from(e: CodeError) -> Self {
        let (kind, message) = match e {
            CodeError::MalformedToken => (
                ErrorKind::MalformedToken,
                "The result code should look like code.signature; check for missing characters".into(),
            ),
            CodeError::CorruptPayload => (
                ErrorKind::CorruptPayload,
                "The result code could not be read; re-enter it exactly as it was issued".into(),
            ),
            CodeError::SignatureMismatch => (
                ErrorKind::SignatureMismatch,
                "The result code failed verification; check your code for typos".into(),
            ),
            CodeError::MalformedPayload => (
                ErrorKind::MalformedPayload,
                "The result code is incomplete; ask the operator to issue it again".into(),
            ),
            CodeError::InvalidNumericField(field) => (
                ErrorKind::InvalidNumericField,
                format!("The result code carries a non-numeric {field}; ask the operator to issue it again"),
            ),
        };
        AppError::Reject(kind, message)
    }
}
