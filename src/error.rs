//! Typed errors and HTTP mapping.

use crate::model::Field;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

/// Storage failures, classified at the store boundary so callers never have to
/// guess a response code from the error text.
#[derive(Error, Debug)]
pub enum StoreError {
    /// NOT NULL, length, or uniqueness rule rejected the row.
    #[error("constraint violated{}: {detail}", column_suffix(.column))]
    Constraint { column: Option<Field>, detail: String },
    /// A value could not be converted to the column's type.
    #[error("type mismatch{}: {detail}", column_suffix(.column))]
    Coercion { column: Option<Field>, detail: String },
    /// The database could not be reached.
    #[error("storage unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),
    #[error("storage: {0}")]
    Other(#[source] sqlx::Error),
}

fn column_suffix(column: &Option<Field>) -> String {
    column.map(|c| format!(" on {}", c)).unwrap_or_default()
}

impl StoreError {
    /// Sort a driver error into the store taxonomy by SQLSTATE.
    pub fn classify(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) => {
                let column = db
                    .try_downcast_ref::<sqlx::postgres::PgDatabaseError>()
                    .and_then(|pg| pg.column())
                    .and_then(Field::from_column);
                let detail = db.message().to_string();
                let code = db.code().map(|c| c.into_owned());
                match code.as_deref() {
                    Some("22P02") | Some("22003") | Some("42804") => StoreError::Coercion { column, detail },
                    Some(code) if code.starts_with("23") || code == "22001" => {
                        StoreError::Constraint { column, detail }
                    }
                    _ => StoreError::Other(sqlx::Error::Database(db)),
                }
            }
            e @ (sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::WorkerCrashed) => StoreError::Unavailable(e),
            e => StoreError::Other(e),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::classify(err)
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Persistence(String),
    #[error("{0}")]
    MalformedIdentity(String),
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    PayloadTooLarge(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Config(_) | AppError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) | AppError::MalformedIdentity(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::Persistence(_) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Generic mapping for reads; write paths build their own messages.
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(_) => AppError::Unavailable("Storage is unavailable.".into()),
            _ => AppError::Persistence("An error occurred.".into()),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub message: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        ErrorBody {
            error: ErrorDetail {
                message: message.into(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}
