//! Defines the app level error type and its conversion into JSON error responses.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::database_id::{CategoryId, TransactionId};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A request payload was missing a required field, or a field had a value
    /// outside of its allowed set (e.g., a category type other than income or
    /// expense).
    ///
    /// The string describes the offending field and is safe to show to the
    /// client.
    #[error("{0}")]
    Validation(String),

    /// An identifier from the URL path or query string could not be parsed.
    #[error("\"{0}\" is not a valid identifier")]
    MalformedId(String),

    /// A date in the summary query string could not be parsed.
    #[error("could not parse the date \"{0}\"")]
    InvalidDate(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error occurs when a query returns no rows. Store
    /// functions replace it with [Error::MissingCategory] or
    /// [Error::MissingTransaction] where the entity is known.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The category ID does not refer to a category in the database.
    #[error("category {0} is not in the database")]
    MissingCategory(CategoryId),

    /// The transaction ID does not refer to a transaction in the database.
    #[error("transaction {0} is not in the database")]
    MissingTransaction(TransactionId),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Error::Validation(details) => (
                StatusCode::BAD_REQUEST,
                json!({ "message": "Invalid request", "error": details }),
            ),
            Error::MissingCategory(_) => (
                StatusCode::NOT_FOUND,
                json!({ "message": "Category not found" }),
            ),
            Error::MissingTransaction(_) => (
                StatusCode::NOT_FOUND,
                json!({ "message": "Transaction not found" }),
            ),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                json!({ "message": "The requested resource could not be found" }),
            ),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
