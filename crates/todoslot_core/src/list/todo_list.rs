//! Owner-scoped todo list with in-place tombstones and LIFO slot reuse.
//!
//! # Responsibility
//! - Hold the slot sequence, free list and live count for one owner.
//! - Validate every precondition before mutating, so failures leave no trace.
//!
//! # Invariants
//! - `todos.len() <= MAX_TODO_LIST_LENGTH`.
//! - `deleted_indexes` holds unique indices `< todos.len()`, most recent last.
//! - Ids are unique among live slots; tombstoned slots never match lookups.
//! - Tombstoned slots are scrubbed to the nil id with empty content.

use crate::list::invariants::{check_list_parts, InvariantViolation};
use crate::model::todo::{OwnerId, Todo, TodoId, MAX_CONTENT_LEN, MAX_TODO_LIST_LENGTH};
use log::debug;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

// Free-list entries are stored as u16.
const _: () = assert!(MAX_TODO_LIST_LENGTH <= u16::MAX as usize);

/// Operation failure reported by the todo list engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoListError {
    /// A list for this owner has already been created.
    AlreadyExists(OwnerId),
    /// Every slot is live and no tombstone is available for reuse.
    CapacityExceeded,
    /// Content is longer than `MAX_CONTENT_LEN` bytes.
    ContentTooLong { len: usize, max: usize },
    /// A live slot already uses this id.
    DuplicateId(TodoId),
    /// No live slot carries this id.
    NotFound(TodoId),
}

impl TodoListError {
    /// Stable tag for callers deciding whether to retry, report or propagate.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AlreadyExists(_) => "already_exists",
            Self::CapacityExceeded => "capacity_exceeded",
            Self::ContentTooLong { .. } => "content_too_long",
            Self::DuplicateId(_) => "duplicate_id",
            Self::NotFound(_) => "not_found",
        }
    }
}

impl Display for TodoListError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyExists(owner) => write!(f, "todo list already exists for owner {owner}"),
            Self::CapacityExceeded => {
                write!(f, "todo list is full ({MAX_TODO_LIST_LENGTH} slots)")
            }
            Self::ContentTooLong { len, max } => {
                write!(f, "content is {len} bytes, limit is {max}")
            }
            Self::DuplicateId(id) => write!(f, "todo id already in use: {id}"),
            Self::NotFound(id) => write!(f, "todo not found: {id}"),
        }
    }
}

impl Error for TodoListError {}

/// Position written by a successful `add`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotIndex {
    pub index: usize,
    /// `true` when a tombstoned slot was overwritten instead of appending.
    pub reused: bool,
}

/// Logical state of one physical slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Live,
    Tombstoned,
}

/// Raw persisted shape of a todo list, before invariant validation.
///
/// Storage adapters build this from their own representation and convert it
/// with `TodoList::try_from`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoListRecord {
    pub owner: OwnerId,
    pub count: u16,
    pub deleted_indexes: Vec<u16>,
    pub todos: Vec<Todo>,
}

/// One owner's bounded todo list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TodoListRecord")]
pub struct TodoList {
    owner: OwnerId,
    count: u16,
    deleted_indexes: Vec<u16>,
    todos: Vec<Todo>,
}

impl TryFrom<TodoListRecord> for TodoList {
    type Error = InvariantViolation;

    fn try_from(record: TodoListRecord) -> Result<Self, Self::Error> {
        check_list_parts(record.count, &record.todos, &record.deleted_indexes)?;
        Ok(Self {
            owner: record.owner,
            count: record.count,
            deleted_indexes: record.deleted_indexes,
            todos: record.todos,
        })
    }
}

impl From<TodoList> for TodoListRecord {
    fn from(list: TodoList) -> Self {
        Self {
            owner: list.owner,
            count: list.count,
            deleted_indexes: list.deleted_indexes,
            todos: list.todos,
        }
    }
}

impl TodoList {
    /// Creates an empty list owned by `owner`.
    pub fn new(owner: OwnerId) -> Self {
        Self {
            owner,
            count: 0,
            deleted_indexes: Vec::new(),
            todos: Vec::new(),
        }
    }

    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Number of live records.
    pub fn live_count(&self) -> usize {
        usize::from(self.count)
    }

    /// Number of physical slots, live and tombstoned.
    pub fn slot_count(&self) -> usize {
        self.todos.len()
    }

    /// Free list in push order; the last entry is reused first.
    pub fn deleted_indexes(&self) -> &[u16] {
        &self.deleted_indexes
    }

    /// Raw slot sequence, including tombstones.
    pub fn slots(&self) -> &[Todo] {
        &self.todos
    }

    /// How many more records can be added before `CapacityExceeded`.
    pub fn remaining_capacity(&self) -> usize {
        self.deleted_indexes.len() + (MAX_TODO_LIST_LENGTH - self.todos.len())
    }

    /// Returns the state of slot `index`, or `None` past the end.
    pub fn slot_state(&self, index: usize) -> Option<SlotState> {
        if index >= self.todos.len() {
            return None;
        }
        if self.is_free(index) {
            Some(SlotState::Tombstoned)
        } else {
            Some(SlotState::Live)
        }
    }

    /// Index of the live slot with `id`, first match in sequence order.
    pub fn find_live_index(&self, id: TodoId) -> Option<usize> {
        self.todos
            .iter()
            .enumerate()
            .find(|(index, todo)| todo.id == id && !self.is_free(*index))
            .map(|(index, _)| index)
    }

    /// Live record with `id`.
    pub fn get(&self, id: TodoId) -> Option<&Todo> {
        self.find_live_index(id).map(|index| &self.todos[index])
    }

    /// Live records with their slot index, in sequence order.
    pub fn live_todos(&self) -> impl Iterator<Item = (usize, &Todo)> + '_ {
        self.todos
            .iter()
            .enumerate()
            .filter(move |(index, _)| !self.is_free(*index))
    }

    /// Adds a live record, reusing the most recently freed slot first.
    ///
    /// # Errors
    /// - `ContentTooLong` when `content` exceeds `MAX_CONTENT_LEN` bytes.
    /// - `DuplicateId` when a live slot already uses `id`.
    /// - `CapacityExceeded` when no slot is free and the sequence is full.
    pub fn add(
        &mut self,
        id: TodoId,
        content: impl Into<String>,
    ) -> Result<SlotIndex, TodoListError> {
        let content = content.into();
        ensure_content_len(&content)?;
        if self.find_live_index(id).is_some() {
            return Err(TodoListError::DuplicateId(id));
        }

        let slot = if let Some(index) = self.deleted_indexes.pop() {
            let index = usize::from(index);
            self.todos[index] = Todo::new(id, content);
            SlotIndex {
                index,
                reused: true,
            }
        } else if self.todos.len() < MAX_TODO_LIST_LENGTH {
            self.todos.push(Todo::new(id, content));
            SlotIndex {
                index: self.todos.len() - 1,
                reused: false,
            }
        } else {
            return Err(TodoListError::CapacityExceeded);
        };

        self.count += 1;
        debug!(
            "event=todo_add module=list index={} reused={} live={}",
            slot.index, slot.reused, self.count
        );
        Ok(slot)
    }

    /// Marks the live record `id` completed. Idempotent.
    pub fn mark_done(&mut self, id: TodoId) -> Result<usize, TodoListError> {
        let index = self.live_index_or_not_found(id)?;
        self.todos[index].completed = true;
        Ok(index)
    }

    /// Replaces the content of the live record `id`, keeping `completed`.
    ///
    /// Lookup runs before the length check, so an unknown id reports
    /// `NotFound` regardless of content.
    pub fn update_content(
        &mut self,
        id: TodoId,
        content: impl Into<String>,
    ) -> Result<usize, TodoListError> {
        let index = self.live_index_or_not_found(id)?;
        let content = content.into();
        ensure_content_len(&content)?;
        self.todos[index].content = content;
        Ok(index)
    }

    /// Tombstones the live record `id` and pushes its slot onto the free list.
    ///
    /// The slot sequence keeps its length.
    pub fn delete(&mut self, id: TodoId) -> Result<usize, TodoListError> {
        let index = self.live_index_or_not_found(id)?;
        self.todos[index].scrub();
        self.deleted_indexes.push(index as u16);
        self.count -= 1;
        debug!(
            "event=todo_delete module=list index={} free={} live={}",
            index,
            self.deleted_indexes.len(),
            self.count
        );
        Ok(index)
    }

    /// Re-derives every structural invariant from current state.
    pub fn verify_invariants(&self) -> Result<(), InvariantViolation> {
        check_list_parts(self.count, &self.todos, &self.deleted_indexes)
    }

    fn is_free(&self, index: usize) -> bool {
        self.deleted_indexes
            .iter()
            .any(|&free| usize::from(free) == index)
    }

    fn live_index_or_not_found(&self, id: TodoId) -> Result<usize, TodoListError> {
        self.find_live_index(id).ok_or(TodoListError::NotFound(id))
    }
}

fn ensure_content_len(content: &str) -> Result<(), TodoListError> {
    if content.len() > MAX_CONTENT_LEN {
        return Err(TodoListError::ContentTooLong {
            len: content.len(),
            max: MAX_CONTENT_LEN,
        });
    }
    Ok(())
}
