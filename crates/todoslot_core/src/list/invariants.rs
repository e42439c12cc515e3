//! Structural invariant checks for todo list state.
//!
//! Checks are computed from raw parts only, so they hold independently of
//! the mutators that produced the state.

use crate::model::todo::{Todo, TodoId, MAX_CONTENT_LEN, MAX_TODO_LIST_LENGTH};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Broken structural invariant detected in todo list state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Slot sequence is longer than the fixed capacity.
    TooManySlots { len: usize, max: usize },
    /// Free list holds more entries than there are slots.
    FreeListOverflow { free: usize, slots: usize },
    /// Free-list entry points past the end of the slot sequence.
    FreeIndexOutOfRange { index: u16, len: usize },
    /// Same index appears twice in the free list.
    DuplicateFreeIndex(u16),
    /// Stored live count differs from `slots - free`.
    LiveCountMismatch { count: u16, expected: usize },
    /// Two live slots share one id.
    DuplicateLiveId(TodoId),
    /// A live slot holds content above the size limit.
    LiveContentTooLong { index: usize, len: usize },
    /// A tombstoned slot still carries an id, content or completion flag.
    StaleTombstone { index: usize },
}

impl Display for InvariantViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooManySlots { len, max } => {
                write!(f, "slot sequence length {len} exceeds capacity {max}")
            }
            Self::FreeListOverflow { free, slots } => {
                write!(f, "free list has {free} entries but only {slots} slots exist")
            }
            Self::FreeIndexOutOfRange { index, len } => {
                write!(f, "free-list index {index} out of range for {len} slots")
            }
            Self::DuplicateFreeIndex(index) => {
                write!(f, "free-list index {index} appears more than once")
            }
            Self::LiveCountMismatch { count, expected } => {
                write!(f, "live count {count} does not match derived value {expected}")
            }
            Self::DuplicateLiveId(id) => write!(f, "live id {id} appears more than once"),
            Self::LiveContentTooLong { index, len } => write!(
                f,
                "live slot {index} content is {len} bytes, limit is {MAX_CONTENT_LEN}"
            ),
            Self::StaleTombstone { index } => {
                write!(f, "tombstoned slot {index} still holds record data")
            }
        }
    }
}

impl Error for InvariantViolation {}

/// Checks every structural invariant over raw list parts.
///
/// Order of checks is fixed so the first reported violation is stable.
pub fn check_list_parts(
    count: u16,
    todos: &[Todo],
    deleted_indexes: &[u16],
) -> Result<(), InvariantViolation> {
    if todos.len() > MAX_TODO_LIST_LENGTH {
        return Err(InvariantViolation::TooManySlots {
            len: todos.len(),
            max: MAX_TODO_LIST_LENGTH,
        });
    }

    if deleted_indexes.len() > todos.len() {
        return Err(InvariantViolation::FreeListOverflow {
            free: deleted_indexes.len(),
            slots: todos.len(),
        });
    }

    let mut free = HashSet::with_capacity(deleted_indexes.len());
    for &index in deleted_indexes {
        if usize::from(index) >= todos.len() {
            return Err(InvariantViolation::FreeIndexOutOfRange {
                index,
                len: todos.len(),
            });
        }
        if !free.insert(index) {
            return Err(InvariantViolation::DuplicateFreeIndex(index));
        }
    }

    let expected = todos.len() - deleted_indexes.len();
    if usize::from(count) != expected {
        return Err(InvariantViolation::LiveCountMismatch { count, expected });
    }

    let mut live_ids = HashSet::with_capacity(expected);
    for (index, todo) in todos.iter().enumerate() {
        if free.contains(&(index as u16)) {
            if !todo.is_scrubbed() {
                return Err(InvariantViolation::StaleTombstone { index });
            }
            continue;
        }
        if todo.content.len() > MAX_CONTENT_LEN {
            return Err(InvariantViolation::LiveContentTooLong {
                index,
                len: todo.content.len(),
            });
        }
        if !live_ids.insert(todo.id) {
            return Err(InvariantViolation::DuplicateLiveId(todo.id));
        }
    }

    Ok(())
}
