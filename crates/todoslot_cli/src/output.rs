//! JSON views and error mapping for CLI output.

use serde::Serialize;
use todoslot_core::db::DbError;
use todoslot_core::{OwnerId, RepoError, SlotState, Todo, TodoId, TodoList, TodoServiceError};

/// Failure printed to stderr as `error: <code>: <message>`.
#[derive(Debug)]
pub struct CliError {
    pub code: &'static str,
    pub message: String,
}

impl From<TodoServiceError> for CliError {
    fn from(value: TodoServiceError) -> Self {
        Self {
            code: value.code(),
            message: value.to_string(),
        }
    }
}

impl From<RepoError> for CliError {
    fn from(value: RepoError) -> Self {
        TodoServiceError::from(value).into()
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self {
            code: "storage",
            message: value.to_string(),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self {
            code: "output",
            message: value.to_string(),
        }
    }
}

/// Printable list snapshot.
#[derive(Debug, Serialize)]
pub struct ListView {
    pub owner: OwnerId,
    pub live_count: usize,
    pub slot_count: usize,
    pub remaining_capacity: usize,
    pub deleted_indexes: Vec<u16>,
    pub slots: Vec<SlotView>,
}

#[derive(Debug, Serialize)]
pub struct SlotView {
    pub index: usize,
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<TodoId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub completed: bool,
}

impl SlotView {
    fn live(index: usize, todo: &Todo) -> Self {
        Self {
            index,
            state: "live",
            id: Some(todo.id),
            content: Some(todo.content.clone()),
            completed: todo.completed,
        }
    }

    fn tombstoned(index: usize) -> Self {
        Self {
            index,
            state: "tombstoned",
            id: None,
            content: None,
            completed: false,
        }
    }
}

impl ListView {
    /// Builds a view; tombstoned slots are listed only when `include_tombstones`.
    pub fn new(list: &TodoList, include_tombstones: bool) -> Self {
        let slots = if include_tombstones {
            list.slots()
                .iter()
                .enumerate()
                .filter_map(|(index, todo)| match list.slot_state(index)? {
                    SlotState::Live => Some(SlotView::live(index, todo)),
                    SlotState::Tombstoned => Some(SlotView::tombstoned(index)),
                })
                .collect()
        } else {
            list.live_todos()
                .map(|(index, todo)| SlotView::live(index, todo))
                .collect()
        };

        Self {
            owner: list.owner(),
            live_count: list.live_count(),
            slot_count: list.slot_count(),
            remaining_capacity: list.remaining_capacity(),
            deleted_indexes: list.deleted_indexes().to_vec(),
            slots,
        }
    }
}

/// Writes `value` as pretty JSON to stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{CliError, ListView};
    use todoslot_core::{RepoError, TodoList};
    use uuid::Uuid;

    #[test]
    fn list_view_hides_tombstones_unless_requested() {
        let mut list = TodoList::new(Uuid::new_v4());
        let gone = Uuid::new_v4();
        list.add(gone, "gone").unwrap();
        list.add(Uuid::new_v4(), "kept").unwrap();
        list.delete(gone).unwrap();

        let live_only = ListView::new(&list, false);
        assert_eq!(live_only.slots.len(), 1);
        assert_eq!(live_only.slots[0].index, 1);

        let all = ListView::new(&list, true);
        assert_eq!(all.slots.len(), 2);
        assert_eq!(all.slots[0].state, "tombstoned");
        assert_eq!(all.slots[0].id, None);
        assert_eq!(all.deleted_indexes, vec![0]);
    }

    #[test]
    fn repo_errors_keep_service_codes() {
        let owner = Uuid::new_v4();
        let err = CliError::from(RepoError::AlreadyExists(owner));
        assert_eq!(err.code, "already_exists");

        let err = CliError::from(RepoError::ListNotFound(owner));
        assert_eq!(err.code, "list_not_found");
    }
}
