//! Position arithmetic for ordered lists.
//!
//! Every function here keeps a sequence 0-based and contiguous. Out-of-range
//! targets are clamped, never rejected.

use crate::types::{PositionChange, Todo};

/// Clamp a requested index into `[0, len - 1]`.
///
/// Returns 0 for an empty sequence.
pub fn clamp_index(requested: i64, len: usize) -> usize {
    if len == 0 || requested <= 0 {
        return 0;
    }
    let last = len - 1;
    usize::try_from(requested).map_or(last, |index| index.min(last))
}

/// Move the element at `from` so it ends up at the clamped `to`.
///
/// Returns the index the element landed on. `from` must be in bounds.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: i64) -> usize {
    let target = clamp_index(to, items.len());
    let item = items.remove(from);
    items.insert(target, item);
    target
}

/// Reassign `position = index` and report the rows whose position changed.
pub fn renumber(todos: &mut [Todo]) -> Vec<PositionChange> {
    let mut changes = Vec::new();
    for (index, todo) in todos.iter_mut().enumerate() {
        let position = index as i64;
        if todo.position != position {
            todo.position = position;
            changes.push(PositionChange {
                id: todo.id,
                position,
            });
        }
    }
    changes
}

/// True when the positions are exactly `{0, .., n-1}` in order.
pub fn is_contiguous(todos: &[Todo]) -> bool {
    todos
        .iter()
        .enumerate()
        .all(|(index, todo)| todo.position == index as i64)
}
