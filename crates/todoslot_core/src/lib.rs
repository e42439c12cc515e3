//! Core domain logic for TodoSlot.
//! This crate is the single source of truth for todo list invariants.

pub mod db;
pub mod list;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use list::invariants::InvariantViolation;
pub use list::todo_list::{SlotIndex, SlotState, TodoList, TodoListError, TodoListRecord};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::todo::{OwnerId, Todo, TodoId, MAX_CONTENT_LEN, MAX_TODO_LIST_LENGTH};
pub use repo::memory_repo::InMemoryTodoListRepository;
pub use repo::todo_list_repo::{
    RepoError, RepoResult, SqliteTodoListRepository, TodoListRepository,
};
pub use service::todo_service::{ServiceResult, TodoService, TodoServiceError};

/// Minimal health-check API for host wiring.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
