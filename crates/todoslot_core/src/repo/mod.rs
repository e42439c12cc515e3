//! Repository layer: owner-addressed persistence of todo lists.
//!
//! # Responsibility
//! - Define the store-lookup contract that hands one owner's list to callers.
//! - Isolate SQLite details from service orchestration.
//!
//! # Invariants
//! - Each owner has at most one list.
//! - Loaded lists always satisfy list invariants.

pub mod memory_repo;
pub mod todo_list_repo;
