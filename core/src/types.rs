//! Domain DTOs for the todo API.
//!
//! # Design
//! These are the wire shapes shared by the server and the client. The server
//! keeps its own row type for storage and converts into `Todo` at the edge,
//! so nothing here knows about sqlx or axum.

use serde::{Deserialize, Serialize};

/// A single todo item as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: i64,
    pub text: String,
    pub completed: bool,
    /// 0-based rank within the owning list.
    pub position: i64,
}

impl Todo {
    pub fn is_active(&self) -> bool {
        !self.completed
    }
}

/// Request payload for creating a new todo.
///
/// `text` is optional at the serde level so a missing field and an empty one
/// surface as the same validation error instead of a deserializer message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTodo {
    #[serde(default)]
    pub text: Option<String>,
}

impl CreateTodo {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

/// Request payload for `PUT /todo/{id}` and `PUT /todo/{id}/reorder`.
///
/// On the plain item route an absent `new_position` means "toggle".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoveTodo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_position: Option<i64>,
}

impl MoveTodo {
    pub fn to(new_position: i64) -> Self {
        Self {
            new_position: Some(new_position),
        }
    }
}

/// A row whose stored position must be rewritten after a list mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionChange {
    pub id: i64,
    pub position: i64,
}
