//! Todo slot record.
//!
//! # Responsibility
//! - Define the record held by one slot of a `TodoList`.
//! - Provide the scrub helper used when a slot is tombstoned.
//!
//! # Invariants
//! - `content` never exceeds `MAX_CONTENT_LEN` bytes for a live record.
//! - A scrubbed slot carries the nil id, empty content and `completed=false`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Total number of slots (live + tombstoned) one list may ever hold.
pub const MAX_TODO_LIST_LENGTH: usize = 40;

/// Maximum todo content length, measured in UTF-8 bytes.
pub const MAX_CONTENT_LEN: usize = 200;

/// Caller-chosen identifier of one todo record.
pub type TodoId = Uuid;

/// Identity of the single authority allowed to mutate a list.
pub type OwnerId = Uuid;

/// One slot of a todo list.
///
/// Whether the slot is live is decided by the owning list's free list, not by
/// this record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub content: String,
    pub completed: bool,
}

impl Todo {
    /// Creates a live, not yet completed record.
    pub fn new(id: TodoId, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
            completed: false,
        }
    }

    /// Clears identity and payload so stale data is not left in a hole.
    pub fn scrub(&mut self) {
        self.id = Uuid::nil();
        self.content.clear();
        self.completed = false;
    }

    /// Returns whether this record has the scrubbed tombstone shape.
    ///
    /// Every tombstoned slot must have this shape; see `check_list_parts`.
    pub fn is_scrubbed(&self) -> bool {
        self.id.is_nil() && self.content.is_empty() && !self.completed
    }
}

#[cfg(test)]
mod tests {
    use super::Todo;
    use uuid::Uuid;

    #[test]
    fn new_todo_starts_incomplete() {
        let todo = Todo::new(Uuid::new_v4(), "write tests");
        assert!(!todo.completed);
        assert_eq!(todo.content, "write tests");
        assert!(!todo.is_scrubbed());
    }

    #[test]
    fn scrub_clears_identity_and_payload() {
        let mut todo = Todo::new(Uuid::new_v4(), "secret");
        todo.completed = true;

        todo.scrub();

        assert!(todo.is_scrubbed());
        assert!(todo.id.is_nil());
        assert!(todo.content.is_empty());
    }
}
