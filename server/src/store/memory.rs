use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{StoreResult, TodoStore};
use crate::model::{NewTodo, TodoChanges, TodoId, TodoItem};

/// Process-local store. Lists come back in id order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    last_id: TodoId,
    items: BTreeMap<TodoId, TodoItem>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn list(&self) -> StoreResult<Vec<TodoItem>> {
        let inner = self.inner.read().await;
        Ok(inner.items.values().cloned().collect())
    }

    async fn get(&self, id: TodoId) -> StoreResult<Option<TodoItem>> {
        Ok(self.inner.read().await.items.get(&id).cloned())
    }

    async fn insert(&self, todo: NewTodo) -> StoreResult<TodoItem> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let item = TodoItem {
            id: inner.last_id,
            title: todo.title,
            completed: todo.completed,
            order: todo.order,
            url: String::new(),
        };
        inner.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn set_url(&self, id: TodoId, url: &str) -> StoreResult<Option<TodoItem>> {
        let mut inner = self.inner.write().await;
        Ok(inner.items.get_mut(&id).map(|item| {
            item.url = url.to_string();
            item.clone()
        }))
    }

    async fn update(&self, id: TodoId, changes: TodoChanges) -> StoreResult<Option<TodoItem>> {
        let mut inner = self.inner.write().await;
        Ok(inner.items.get_mut(&id).map(|item| {
            changes.apply_to(item);
            item.clone()
        }))
    }

    async fn delete(&self, id: TodoId) -> StoreResult<bool> {
        Ok(self.inner.write().await.items.remove(&id).is_some())
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        let mut inner = self.inner.write().await;
        let removed = inner.items.len() as u64;
        inner.items.clear();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::conformance;

    #[tokio::test]
    async fn insert_assigns_distinct_ids() {
        conformance::insert_assigns_distinct_ids(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn set_url_persists() {
        conformance::set_url_persists(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn update_is_partial() {
        conformance::update_is_partial(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn delete_twice() {
        conformance::delete_twice(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn delete_all_empties_and_ids_move_on() {
        conformance::delete_all_empties_and_ids_move_on(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn ids_start_at_one() {
        let store = MemoryStore::new();
        let todo = store
            .insert(NewTodo {
                title: "First".to_string(),
                completed: false,
                order: None,
            })
            .await
            .unwrap();
        assert_eq!(todo.id, 1);
    }
}
