//! Domain core for the ordered todo list service.
//!
//! # Overview
//! Holds everything that does not need I/O: the `Todo` wire types, the
//! `TodoList` aggregate with its position bookkeeping, and a stateless API
//! client that builds `HttpRequest` values and parses `HttpResponse` values
//! (host-does-IO pattern).
//!
//! # Design
//! - `TodoList` is the only place positions are computed. Every mutation
//!   leaves positions contiguous and 0-based, and reports which rows changed
//!   so storage can write back only those.
//! - Reorder targets are clamped into the list bounds, never rejected.
//! - `TodoClient` is stateless; it holds only the base URL and prefix.

pub mod client;
pub mod error;
pub mod http;
pub mod list;
pub mod order;
pub mod types;

pub use client::TodoClient;
pub use error::{ApiError, ListError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use list::{validate_text, TodoList};
pub use types::{CreateTodo, MoveTodo, PositionChange, Todo};
