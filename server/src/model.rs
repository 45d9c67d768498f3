//! The todo item record as the store sees it.
//!
//! `url` is a denormalized copy of the item's detail endpoint. It is empty
//! between the insert and the follow-up `set_url` write of a create.

/// Store-assigned identifier. Never reused by a store once handed out.
pub type TodoId = i64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TodoItem {
    pub id: TodoId,
    pub title: String,
    pub completed: bool,
    pub order: Option<i64>,
    pub url: String,
}

/// Fields supplied when inserting a new record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub completed: bool,
    pub order: Option<i64>,
}

/// A partial update. `None` leaves the field untouched; `order` uses a nested
/// option so a caller can clear it with an explicit `null`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoChanges {
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub order: Option<Option<i64>>,
}

impl TodoChanges {
    /// Apply the present fields to `item`.
    pub fn apply_to(self, item: &mut TodoItem) {
        if let Some(title) = self.title {
            item.title = title;
        }
        if let Some(completed) = self.completed {
            item.completed = completed;
        }
        if let Some(order) = self.order {
            item.order = order;
        }
    }
}
