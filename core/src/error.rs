//! Error types for the todo domain and the API client.
//!
//! # Design
//! `ListError` is what the aggregate reports; the server maps it onto HTTP
//! statuses. `ApiError` is what the client reports after parsing a response,
//! with `NotFound` and `Validation` split out because callers act on them.

use thiserror::Error;

/// Failures of a `TodoList` operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListError {
    #[error("todo with id {0} not found")]
    NotFound(i64),

    #[error("todo text must not be empty")]
    EmptyText,
}

/// Errors returned by `TodoClient` build and parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404: the requested todo does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server rejected the request payload (400 or 422).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The server returned any other unexpected status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    #[error("deserialization failed: {0}")]
    Deserialization(String),

    #[error("serialization failed: {0}")]
    Serialization(String),
}
