//! Persistence collaborator for todo items.
//!
//! # Design
//! Creating an item is two writes: `insert` assigns the id, then `set_url`
//! records the detail URL derived from it. Nothing guards the gap between
//! them, so a concurrent `list` or `get` can see the record with an empty
//! `url`. Each individual call is atomic with respect to the others.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{NewTodo, TodoChanges, TodoId, TodoItem};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait TodoStore: Send + Sync + 'static {
    /// All records, in store-defined order.
    async fn list(&self) -> StoreResult<Vec<TodoItem>>;

    /// Returns `None` if no record has this id.
    async fn get(&self, id: TodoId) -> StoreResult<Option<TodoItem>>;

    /// Insert a new record with an empty `url` and return it with its fresh id.
    async fn insert(&self, todo: NewTodo) -> StoreResult<TodoItem>;

    /// Overwrite the stored `url`. Returns `None` if the record is gone.
    async fn set_url(&self, id: TodoId, url: &str) -> StoreResult<Option<TodoItem>>;

    /// Apply a partial update. Returns `None` if no record has this id.
    async fn update(&self, id: TodoId, changes: TodoChanges) -> StoreResult<Option<TodoItem>>;

    /// Returns `true` if the record existed and was removed.
    async fn delete(&self, id: TodoId) -> StoreResult<bool>;

    /// Remove every record and return how many were removed.
    async fn delete_all(&self) -> StoreResult<u64>;
}
