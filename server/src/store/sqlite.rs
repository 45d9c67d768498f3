//! SQLite-backed store.
//!
//! `AUTOINCREMENT` keeps ids from being reused after deletes, matching the
//! in-memory store.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{
    FromRow, SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};

use super::{StoreResult, TodoStore};
use crate::model::{NewTodo, TodoChanges, TodoId, TodoItem};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS todo_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    completed BOOLEAN NOT NULL DEFAULT 0,
    sort_order INTEGER,
    url TEXT NOT NULL DEFAULT ''
)";

const COLUMNS: &str = "id, title, completed, sort_order, url";

#[derive(Debug, FromRow)]
struct TodoRow {
    id: i64,
    title: String,
    completed: bool,
    sort_order: Option<i64>,
    url: String,
}

impl From<TodoRow> for TodoItem {
    fn from(row: TodoRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            completed: row.completed,
            order: row.sort_order,
            url: row.url,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `url` and ensure the table exists.
    ///
    /// An in-memory URL gets a single connection that is never recycled,
    /// since every SQLite connection to `:memory:` sees its own database.
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = if url.contains(":memory:") || url.contains("mode=memory") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options.journal_mode(SqliteJournalMode::Wal))
                .await?
        };
        Self::new(pool).await
    }

    pub async fn new(pool: SqlitePool) -> StoreResult<Self> {
        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl TodoStore for SqliteStore {
    async fn list(&self) -> StoreResult<Vec<TodoItem>> {
        let rows = sqlx::query_as::<_, TodoRow>(&format!(
            "SELECT {COLUMNS} FROM todo_items ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(TodoItem::from).collect())
    }

    async fn get(&self, id: TodoId) -> StoreResult<Option<TodoItem>> {
        let row = sqlx::query_as::<_, TodoRow>(&format!(
            "SELECT {COLUMNS} FROM todo_items WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(TodoItem::from))
    }

    async fn insert(&self, todo: NewTodo) -> StoreResult<TodoItem> {
        let row = sqlx::query_as::<_, TodoRow>(&format!(
            "INSERT INTO todo_items (title, completed, sort_order, url) \
             VALUES (?, ?, ?, '') RETURNING {COLUMNS}"
        ))
        .bind(&todo.title)
        .bind(todo.completed)
        .bind(todo.order)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn set_url(&self, id: TodoId, url: &str) -> StoreResult<Option<TodoItem>> {
        let row = sqlx::query_as::<_, TodoRow>(&format!(
            "UPDATE todo_items SET url = ? WHERE id = ? RETURNING {COLUMNS}"
        ))
        .bind(url)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(TodoItem::from))
    }

    /// A single statement: concurrent updates wait on SQLite's write lock.
    async fn update(&self, id: TodoId, changes: TodoChanges) -> StoreResult<Option<TodoItem>> {
        let row = sqlx::query_as::<_, TodoRow>(&format!(
            "UPDATE todo_items SET \
                 title = COALESCE(?, title), \
                 completed = COALESCE(?, completed), \
                 sort_order = CASE WHEN ? THEN ? ELSE sort_order END \
             WHERE id = ? RETURNING {COLUMNS}"
        ))
        .bind(changes.title)
        .bind(changes.completed)
        .bind(changes.order.is_some())
        .bind(changes.order.flatten())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(TodoItem::from))
    }

    async fn delete(&self, id: TodoId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM todo_items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM todo_items")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::conformance;

    async fn store() -> SqliteStore {
        SqliteStore::connect("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn insert_assigns_distinct_ids() {
        conformance::insert_assigns_distinct_ids(&store().await).await;
    }

    #[tokio::test]
    async fn set_url_persists() {
        conformance::set_url_persists(&store().await).await;
    }

    #[tokio::test]
    async fn update_is_partial() {
        conformance::update_is_partial(&store().await).await;
    }

    #[tokio::test]
    async fn delete_twice() {
        conformance::delete_twice(&store().await).await;
    }

    #[tokio::test]
    async fn delete_all_empties_and_ids_move_on() {
        conformance::delete_all_empties_and_ids_move_on(&store().await).await;
    }

    #[tokio::test]
    async fn reopening_keeps_existing_table() {
        let store = store().await;
        store
            .insert(NewTodo {
                title: "Persisted".to_string(),
                completed: true,
                order: None,
            })
            .await
            .unwrap();

        let reopened = SqliteStore::new(store.pool.clone()).await.unwrap();
        let todos = reopened.list().await.unwrap();
        assert_eq!(todos.len(), 1);
        assert!(todos[0].completed);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_updates_on_a_file_database_all_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("todos.db").display());
        let store = Arc::new(SqliteStore::connect(&url).await.unwrap());
        let todo = store
            .insert(NewTodo {
                title: "Contended".to_string(),
                completed: false,
                order: None,
            })
            .await
            .unwrap();
        let id = todo.id;

        let tasks: Vec<_> = (0..200)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    let changes = TodoChanges {
                        order: Some(Some(i)),
                        ..Default::default()
                    };
                    store.update(id, changes).await
                })
            })
            .collect();

        for task in tasks {
            let updated = task.await.unwrap().unwrap().unwrap();
            assert_eq!(updated.title, "Contended");
        }
        let stored = store.get(id).await.unwrap().unwrap();
        assert!(matches!(stored.order, Some(0..=199)));
    }
}
