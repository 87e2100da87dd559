//! The `TodoList` aggregate root.
//!
//! # Design
//! Storage loads a list's rows, hands them to `TodoList`, applies one
//! operation in memory, and writes back whatever the operation reports as
//! changed. All position bookkeeping lives here so the storage layer never
//! computes an index itself.

use crate::error::ListError;
use crate::order;
use crate::types::{PositionChange, Todo};

/// An ordered collection of todos owned by a single list row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoList {
    id: i64,
    todos: Vec<Todo>,
}

impl TodoList {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            todos: Vec::new(),
        }
    }

    /// Build a list from stored rows in any order. Rows are sorted by
    /// position, ties broken by id.
    pub fn from_todos(id: i64, mut todos: Vec<Todo>) -> Self {
        todos.sort_by_key(|todo| (todo.position, todo.id));
        Self { id, todos }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn into_todos(self) -> Vec<Todo> {
        self.todos
    }

    /// Position a newly created todo receives.
    pub fn next_position(&self) -> i64 {
        self.todos.len() as i64
    }

    /// Number of todos not yet completed.
    pub fn active_count(&self) -> usize {
        self.todos.iter().filter(|todo| todo.is_active()).count()
    }

    /// Append a stored todo. Its position is forced to the end of the list.
    pub fn push(&mut self, mut todo: Todo) -> &Todo {
        todo.position = self.next_position();
        self.todos.push(todo);
        &self.todos[self.todos.len() - 1]
    }

    /// Flip `completed` on a single todo.
    pub fn toggle(&mut self, id: i64) -> Result<&Todo, ListError> {
        let index = self.index_of(id)?;
        let todo = &mut self.todos[index];
        todo.completed = !todo.completed;
        Ok(&*todo)
    }

    /// Mark every todo completed and return the ids that were still active.
    pub fn complete_all(&mut self) -> Vec<i64> {
        self.todos
            .iter_mut()
            .filter(|todo| !todo.completed)
            .map(|todo| {
                todo.completed = true;
                todo.id
            })
            .collect()
    }

    /// Move a todo to `new_position`, clamped into the list bounds, and
    /// renumber the whole list.
    pub fn move_todo(
        &mut self,
        id: i64,
        new_position: i64,
    ) -> Result<Vec<PositionChange>, ListError> {
        let from = self.index_of(id)?;
        order::move_item(&mut self.todos, from, new_position);
        let changes = order::renumber(&mut self.todos);
        debug_assert!(order::is_contiguous(&self.todos));
        Ok(changes)
    }

    /// Remove a todo and close the gap it leaves behind.
    pub fn remove(&mut self, id: i64) -> Result<(Todo, Vec<PositionChange>), ListError> {
        let index = self.index_of(id)?;
        let removed = self.todos.remove(index);
        let changes = order::renumber(&mut self.todos);
        debug_assert!(order::is_contiguous(&self.todos));
        Ok((removed, changes))
    }

    fn index_of(&self, id: i64) -> Result<usize, ListError> {
        self.todos
            .iter()
            .position(|todo| todo.id == id)
            .ok_or(ListError::NotFound(id))
    }
}

/// Validate todo text. Whitespace-only text counts as empty.
pub fn validate_text(text: Option<&str>) -> Result<&str, ListError> {
    match text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(ListError::EmptyText),
    }
}
