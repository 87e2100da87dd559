//! SQLite persistence for the singleton todo list.
//!
//! # Design
//! Every operation runs in its own transaction: load the list's rows into a
//! `TodoList`, apply one operation, write back the rows it reports as
//! changed, commit. Dropping an uncommitted transaction rolls it back, so an
//! early `?` leaves the database untouched.
//!
//! Mutations also hold the write half of an in-process `RwLock`, which keeps
//! two concurrent reorders from interleaving their read and write phases.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use thiserror::Error;
use todo_core::{validate_text, ListError, PositionChange, Todo, TodoList};
use tokio::sync::RwLock;
use tracing::{debug, info};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS todo_lists (
        id INTEGER PRIMARY KEY AUTOINCREMENT
    )",
    "CREATE TABLE IF NOT EXISTS todos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        text TEXT NOT NULL CHECK (length(trim(text)) > 0),
        completed BOOLEAN NOT NULL DEFAULT 0,
        position INTEGER NOT NULL CHECK (position >= 0),
        todo_list_id INTEGER NOT NULL REFERENCES todo_lists (id) ON DELETE CASCADE
    )",
    "CREATE INDEX IF NOT EXISTS todos_list_position ON todos (todo_list_id, position)",
];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    List(#[from] ListError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, FromRow)]
struct TodoRow {
    id: i64,
    text: String,
    completed: bool,
    position: i64,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Todo {
            id: row.id,
            text: row.text,
            completed: row.completed,
            position: row.position,
        }
    }
}

/// Handle to the database and the id of the list it serves.
#[derive(Debug, Clone)]
pub struct TodoStore {
    pool: SqlitePool,
    list_id: i64,
    lock: Arc<RwLock<()>>,
}

impl TodoStore {
    /// Open the pool, create the schema if needed and make sure the list row
    /// exists.
    ///
    /// An in-memory database lives only as long as its connection, so the
    /// pool is pinned to a single connection that is never recycled.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");
        let mut pool_options = SqlitePoolOptions::new();
        if in_memory {
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>);
        } else {
            pool_options = pool_options.max_connections(max_connections.max(1));
        }
        let pool = pool_options.connect_with(options).await?;

        Self::bootstrap(&pool).await?;
        let list_id = Self::ensure_list(&pool).await?;
        info!(list_id, in_memory, "todo store ready");

        Ok(Self {
            pool,
            list_id,
            lock: Arc::new(RwLock::new(())),
        })
    }

    async fn bootstrap(pool: &SqlitePool) -> Result<(), sqlx::Error> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(pool).await?;
        }
        Ok(())
    }

    /// Return the id of the first list row, creating it on a fresh database.
    async fn ensure_list(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        let existing: Option<i64> =
            sqlx::query_scalar("SELECT id FROM todo_lists ORDER BY id LIMIT 1")
                .fetch_optional(pool)
                .await?;
        if let Some(id) = existing {
            return Ok(id);
        }
        let id = sqlx::query("INSERT INTO todo_lists DEFAULT VALUES")
            .execute(pool)
            .await?
            .last_insert_rowid();
        info!(list_id = id, "created todo list");
        Ok(id)
    }

    /// All todos ordered by position.
    pub async fn list(&self) -> StoreResult<Vec<Todo>> {
        let _guard = self.lock.read().await;
        let mut conn = self.pool.acquire().await?;
        let list = self.load(&mut conn).await?;
        Ok(list.into_todos())
    }

    /// Append a todo at the end of the list.
    pub async fn create(&self, text: Option<&str>) -> StoreResult<Todo> {
        let text = validate_text(text)?;
        let _guard = self.lock.write().await;
        let mut tx = self.pool.begin().await?;

        let mut list = self.load(&mut tx).await?;
        let position = list.next_position();
        let id = sqlx::query(
            "INSERT INTO todos (text, completed, position, todo_list_id) VALUES (?, 0, ?, ?)",
        )
        .bind(text)
        .bind(position)
        .bind(self.list_id)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        tx.commit().await?;
        info!(id, position, "todo created");
        Ok(list
            .push(Todo {
                id,
                text: text.to_string(),
                completed: false,
                position,
            })
            .clone())
    }

    /// Flip `completed` on one todo and return it.
    pub async fn toggle(&self, id: i64) -> StoreResult<Todo> {
        let _guard = self.lock.write().await;
        let mut tx = self.pool.begin().await?;

        let mut list = self.load(&mut tx).await?;
        let todo = list.toggle(id)?.clone();
        sqlx::query("UPDATE todos SET completed = ? WHERE id = ?")
            .bind(todo.completed)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!(id, completed = todo.completed, "todo toggled");
        Ok(todo)
    }

    /// Mark every todo completed and return the whole list.
    pub async fn complete_all(&self) -> StoreResult<Vec<Todo>> {
        let _guard = self.lock.write().await;
        let mut tx = self.pool.begin().await?;

        let mut list = self.load(&mut tx).await?;
        let completed = list.complete_all();
        if !completed.is_empty() {
            sqlx::query("UPDATE todos SET completed = 1 WHERE todo_list_id = ? AND completed = 0")
                .bind(self.list_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        info!(count = completed.len(), "todos marked completed");
        Ok(list.into_todos())
    }

    /// Move a todo to `new_position` (clamped) and return the reordered list.
    pub async fn reorder(&self, id: i64, new_position: i64) -> StoreResult<Vec<Todo>> {
        let _guard = self.lock.write().await;
        let mut tx = self.pool.begin().await?;

        let mut list = self.load(&mut tx).await?;
        let changes = list.move_todo(id, new_position)?;
        write_positions(&mut tx, &changes).await?;

        tx.commit().await?;
        info!(id, new_position, changed = changes.len(), "todo reordered");
        Ok(list.into_todos())
    }

    /// Delete a todo and close the gap in the positions behind it.
    pub async fn delete(&self, id: i64) -> StoreResult<()> {
        let _guard = self.lock.write().await;
        let mut tx = self.pool.begin().await?;

        let mut list = self.load(&mut tx).await?;
        let (removed, changes) = list.remove(id)?;
        sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(removed.id)
            .execute(&mut *tx)
            .await?;
        write_positions(&mut tx, &changes).await?;

        tx.commit().await?;
        info!(id, changed = changes.len(), "todo deleted");
        Ok(())
    }

    async fn load(&self, conn: &mut SqliteConnection) -> Result<TodoList, sqlx::Error> {
        let rows: Vec<TodoRow> = sqlx::query_as(
            "SELECT id, text, completed, position FROM todos
             WHERE todo_list_id = ? ORDER BY position, id",
        )
        .bind(self.list_id)
        .fetch_all(&mut *conn)
        .await?;
        let list = TodoList::from_todos(
            self.list_id,
            rows.into_iter().map(Todo::from).collect(),
        );
        debug!(
            list_id = list.id(),
            count = list.todos().len(),
            active = list.active_count(),
            "loaded todos"
        );
        Ok(list)
    }
}

async fn write_positions(
    conn: &mut SqliteConnection,
    changes: &[PositionChange],
) -> Result<(), sqlx::Error> {
    for change in changes {
        sqlx::query("UPDATE todos SET position = ? WHERE id = ?")
            .bind(change.position)
            .bind(change.id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> TodoStore {
        TodoStore::connect("sqlite::memory:", 5).await.unwrap()
    }

    async fn stored_order(store: &TodoStore) -> Vec<(i64, i64)> {
        let rows: Vec<(i64, i64)> =
            sqlx::query_as("SELECT id, position FROM todos ORDER BY position")
                .fetch_all(&store.pool)
                .await
                .unwrap();
        rows
    }

    #[tokio::test]
    async fn connect_creates_single_list() {
        let store = store().await;
        assert_eq!(store.list_id, 1);
        let again = TodoStore::ensure_list(&store.pool).await.unwrap();
        assert_eq!(again, 1);
    }

    #[tokio::test]
    async fn create_appends_at_count() {
        let store = store().await;
        for expected in 0..3 {
            let todo = store.create(Some("React")).await.unwrap();
            assert_eq!(todo.position, expected);
            assert!(!todo.completed);
        }
        assert_eq!(stored_order(&store).await, vec![(1, 0), (2, 1), (3, 2)]);
    }

    #[tokio::test]
    async fn create_rejects_empty_text_without_writing() {
        let store = store().await;
        let err = store.create(Some("  ")).await.unwrap_err();
        assert!(matches!(err, StoreError::List(ListError::EmptyText)));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reorder_persists_positions() {
        let store = store().await;
        for text in ["a", "b", "c"] {
            store.create(Some(text)).await.unwrap();
        }
        store.reorder(3, 0).await.unwrap();
        assert_eq!(stored_order(&store).await, vec![(3, 0), (1, 1), (2, 2)]);
    }

    #[tokio::test]
    async fn reorder_unknown_id_leaves_rows_alone() {
        let store = store().await;
        store.create(Some("a")).await.unwrap();
        let err = store.reorder(42, 0).await.unwrap_err();
        assert!(matches!(err, StoreError::List(ListError::NotFound(42))));
        assert_eq!(stored_order(&store).await, vec![(1, 0)]);
    }

    #[tokio::test]
    async fn delete_renumbers_remaining_rows() {
        let store = store().await;
        for text in ["a", "b", "c"] {
            store.create(Some(text)).await.unwrap();
        }
        store.delete(1).await.unwrap();
        assert_eq!(stored_order(&store).await, vec![(2, 0), (3, 1)]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_reorders_and_creates_keep_positions_contiguous() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("todos.db").display());
        let store = TodoStore::connect(&url, 8).await.unwrap();
        for i in 0..10 {
            store.create(Some(&format!("todo {i}"))).await.unwrap();
        }

        let mut handles = Vec::new();
        for i in 0..200i64 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                if i % 20 == 0 {
                    store.create(Some("late")).await.map(|_| ())
                } else {
                    store.reorder(i % 10 + 1, i % 15 - 3).await.map(|_| ())
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let todos = store.list().await.unwrap();
        let positions: Vec<i64> = todos.iter().map(|t| t.position).collect();
        assert_eq!(positions, (0..20).collect::<Vec<i64>>());

        let mut ids: Vec<i64> = todos.iter().map(|t| t.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=20).collect::<Vec<i64>>());
        assert_eq!(stored_order(&store).await.len(), 20);
    }

    #[tokio::test]
    async fn toggle_and_complete_all_persist() {
        let store = store().await;
        store.create(Some("a")).await.unwrap();
        store.create(Some("b")).await.unwrap();

        assert!(store.toggle(2).await.unwrap().completed);
        let todos = store.complete_all().await.unwrap();
        assert!(todos.iter().all(|t| t.completed));
        assert!(store.list().await.unwrap().iter().all(|t| t.completed));
    }
}
