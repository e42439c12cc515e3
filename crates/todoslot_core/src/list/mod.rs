//! Fixed-capacity todo list engine.
//!
//! # Responsibility
//! - Own the slot sequence and the LIFO free list of one owner's todos.
//! - Apply add/mark-done/update/delete as all-or-nothing transformations.
//! - Re-derive structural invariants for verification and for loaded state.
//!
//! # Invariants
//! - `count == todos.len() - deleted_indexes.len()` after every operation.
//! - The slot sequence never shrinks; deletion only tombstones.
//! - Free-list membership is the single source of truth for liveness.

pub mod invariants;
pub mod todo_list;
