//! Todo list use-case service.
//!
//! # Responsibility
//! - Provide the instruction-level entry points hosts call: initialize, add,
//!   mark done, update content, delete.
//! - Resolve the signer's list, enforce the owner check, persist the result
//!   through one repository `update_list` call.
//! - Emit one metadata-only log event per call.
//!
//! # Invariants
//! - A failed call never saves; the stored list is left as it was.
//! - Todo content never appears in log events.

use crate::list::todo_list::{SlotIndex, TodoList, TodoListError};
use crate::model::todo::{OwnerId, TodoId};
use crate::repo::todo_list_repo::{RepoError, TodoListRepository};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for todo list use-cases.
#[derive(Debug)]
pub enum TodoServiceError {
    /// Stored list is owned by a different authority than the signer.
    Unauthorized { signer: OwnerId, owner: OwnerId },
    /// Signer has no list yet.
    ListNotFound(OwnerId),
    /// Engine rejected the operation.
    List(TodoListError),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl TodoServiceError {
    /// Stable tag forwarded to hosts. Engine tags pass through unchanged.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "unauthorized",
            Self::ListNotFound(_) => "list_not_found",
            Self::List(err) => err.code(),
            Self::Repo(_) => "storage",
        }
    }
}

impl Display for TodoServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized { signer, owner } => {
                write!(f, "signer {signer} is not the owner ({owner}) of this list")
            }
            Self::ListNotFound(owner) => write!(f, "todo list not found for owner {owner}"),
            Self::List(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TodoServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::List(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TodoListError> for TodoServiceError {
    fn from(value: TodoListError) -> Self {
        Self::List(value)
    }
}

impl From<RepoError> for TodoServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::AlreadyExists(owner) => Self::List(TodoListError::AlreadyExists(owner)),
            RepoError::ListNotFound(owner) => Self::ListNotFound(owner),
            other => Self::Repo(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, TodoServiceError>;

/// Slot position reported in service log events.
trait LoggedSlot {
    fn log_fields(&self) -> String;
}

impl LoggedSlot for usize {
    fn log_fields(&self) -> String {
        format!("index={self}")
    }
}

impl LoggedSlot for SlotIndex {
    fn log_fields(&self) -> String {
        format!("index={} reused={}", self.index, self.reused)
    }
}

/// Todo list service facade over repository implementations.
pub struct TodoService<R: TodoListRepository> {
    repo: R,
}

impl<R: TodoListRepository> TodoService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns the wrapped repository.
    pub fn into_inner(self) -> R {
        self.repo
    }

    /// Creates the signer's empty list.
    ///
    /// Fails with `already_exists` when the signer already has one.
    pub fn initialize(&mut self, signer: OwnerId) -> ServiceResult<TodoList> {
        match self.repo.create_list(signer) {
            Ok(list) => {
                info!("event=todo_initialize module=service status=ok owner={signer}");
                Ok(list)
            }
            Err(err) => {
                let err = TodoServiceError::from(err);
                log_failure("todo_initialize", signer, &err);
                Err(err)
            }
        }
    }

    /// Adds a todo to the signer's list and returns the slot written.
    pub fn add_todo(
        &mut self,
        signer: OwnerId,
        id: TodoId,
        content: impl Into<String>,
    ) -> ServiceResult<SlotIndex> {
        let content = content.into();
        self.mutate("todo_add", signer, |list| list.add(id, content))
    }

    /// Marks one todo completed.
    pub fn mark_done(&mut self, signer: OwnerId, id: TodoId) -> ServiceResult<usize> {
        self.mutate("todo_mark_done", signer, |list| list.mark_done(id))
    }

    /// Replaces one todo's content.
    pub fn update_content(
        &mut self,
        signer: OwnerId,
        id: TodoId,
        content: impl Into<String>,
    ) -> ServiceResult<usize> {
        let content = content.into();
        self.mutate("todo_update_content", signer, |list| {
            list.update_content(id, content)
        })
    }

    /// Tombstones one todo and frees its slot for reuse.
    pub fn delete_todo(&mut self, signer: OwnerId, id: TodoId) -> ServiceResult<usize> {
        self.mutate("todo_delete", signer, |list| list.delete(id))
    }

    /// Loads the signer's list for reading.
    pub fn get_list(&self, signer: OwnerId) -> ServiceResult<TodoList> {
        self.authorized_list(signer)
    }

    fn authorized_list(&self, signer: OwnerId) -> ServiceResult<TodoList> {
        let list = self
            .repo
            .load_list(signer)?
            .ok_or(TodoServiceError::ListNotFound(signer))?;
        ensure_owner(signer, &list)?;
        Ok(list)
    }

    fn mutate<T: LoggedSlot>(
        &mut self,
        event: &'static str,
        signer: OwnerId,
        op: impl FnOnce(&mut TodoList) -> Result<T, TodoListError>,
    ) -> ServiceResult<T> {
        let result = self
            .repo
            .update_list(signer, |list| -> ServiceResult<(T, usize)> {
                ensure_owner(signer, list)?;
                let slot = op(&mut *list)?;
                Ok((slot, list.live_count()))
            });

        match result {
            Ok((slot, live)) => {
                info!(
                    "event={} module=service status=ok owner={} {} live={}",
                    event,
                    signer,
                    slot.log_fields(),
                    live
                );
                Ok(slot)
            }
            Err(err) => {
                log_failure(event, signer, &err);
                Err(err)
            }
        }
    }
}

fn ensure_owner(signer: OwnerId, list: &TodoList) -> ServiceResult<()> {
    if list.owner() != signer {
        return Err(TodoServiceError::Unauthorized {
            signer,
            owner: list.owner(),
        });
    }
    Ok(())
}

fn log_failure(event: &str, signer: OwnerId, err: &TodoServiceError) {
    match err {
        TodoServiceError::Repo(_) => error!(
            "event={} module=service status=error owner={} error_code={} error={}",
            event,
            signer,
            err.code(),
            err
        ),
        _ => warn!(
            "event={} module=service status=rejected owner={} error_code={}",
            event,
            signer,
            err.code()
        ),
    }
}
