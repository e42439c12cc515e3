//! Domain model for owner-scoped todo slots.
//!
//! # Responsibility
//! - Define the record stored in one slot of a todo list.
//! - Define identity aliases and the wire-contract size limits.
//!
//! # Invariants
//! - Every live record is identified by a caller-chosen `TodoId`.
//! - Deletion is represented by tombstoned slots, never by removal.

pub mod todo;
