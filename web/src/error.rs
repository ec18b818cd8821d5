use std::collections::BTreeMap;
use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use storage::error::{CastError, ConfigError, StorageError, VoteError};
use validator::ValidationErrors;

/// Web layer errors
#[derive(Debug)]
pub enum WebError {
    Storage(StorageError),
    Config(ConfigError),
    Ballot(Vec<VoteError>),
    Validation(ValidationErrors),
    BadRequest(String),
    Unauthorized,
    NotFound,
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "Storage error: {}", e),
            Self::Config(e) => write!(f, "Configuration error: {}", e),
            Self::Ballot(errors) => write!(f, "Ballot rejected with {} violation(s)", errors.len()),
            Self::Validation(e) => write!(f, "Validation error: {}", e),
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::Unauthorized => write!(f, "Unauthorized"),
            Self::NotFound => write!(f, "Resource not found"),
        }
    }
}

/// Groups ballot violations by their stable field key, the wire shape the
/// voting UI renders: `{ field: [messages] }`.
fn ballot_error_map(errors: &[VoteError]) -> serde_json::Value {
    let mut fields: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for error in errors {
        fields.entry(error.field()).or_default().push(error.to_string());
    }
    json!(fields)
}

fn validation_error_map(errors: &ValidationErrors) -> serde_json::Value {
    let mut fields: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (field, field_errors) in errors.field_errors() {
        let messages = field_errors
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            })
            .collect();
        fields.insert(field.to_string(), messages);
    }
    json!(fields)
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status_code = match &self {
            Self::Storage(StorageError::NotFound) => StatusCode::NOT_FOUND,
            Self::Storage(StorageError::ConstraintViolation(_)) => StatusCode::CONFLICT,
            Self::Storage(StorageError::PersistenceConflict(_)) => StatusCode::CONFLICT,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Config(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Ballot(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
        };

        let body = match &self {
            Self::Storage(StorageError::NotFound) => {
                json!({
                    "error": "Resource not found"
                })
            }
            Self::Storage(StorageError::ConstraintViolation(msg))
            | Self::Storage(StorageError::PersistenceConflict(msg)) => {
                json!({
                    "error": msg
                })
            }
            Self::Storage(e) => {
                tracing::error!("Storage error: {:?}", e);
                json!({
                    "error": "An internal error occurred"
                })
            }
            Self::Config(e) => {
                json!({
                    "success": false,
                    "errors": { "configuration": [e.to_string()] }
                })
            }
            Self::Ballot(errors) => {
                json!({
                    "success": false,
                    "errors": ballot_error_map(errors)
                })
            }
            Self::Validation(errors) => {
                json!({
                    "success": false,
                    "errors": validation_error_map(errors)
                })
            }
            Self::BadRequest(msg) => {
                json!({
                    "error": msg
                })
            }
            Self::Unauthorized => {
                json!({
                    "error": "Unauthorized"
                })
            }
            Self::NotFound => {
                json!({
                    "error": "Resource not found"
                })
            }
        };

        (status_code, Json(body)).into_response()
    }
}

impl From<StorageError> for WebError {
    fn from(error: StorageError) -> Self {
        Self::Storage(error)
    }
}

impl From<ConfigError> for WebError {
    fn from(error: ConfigError) -> Self {
        match error {
            ConfigError::Storage(e) => Self::Storage(e),
            other => Self::Config(other),
        }
    }
}

impl From<CastError> for WebError {
    fn from(error: CastError) -> Self {
        match error {
            CastError::Invalid(errors) => Self::Ballot(errors),
            CastError::Config(e) => e.into(),
            CastError::Storage(e) => Self::Storage(e),
        }
    }
}

impl From<ValidationErrors> for WebError {
    fn from(error: ValidationErrors) -> Self {
        Self::Validation(error)
    }
}

pub type WebResult<T> = Result<T, WebError>;
