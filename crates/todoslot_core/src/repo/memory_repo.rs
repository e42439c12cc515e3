//! In-process todo list repository.
//!
//! Keeps one `TodoList` per owner in a map. Used by hosts that manage their
//! own durability and by tests.

use crate::list::todo_list::TodoList;
use crate::model::todo::OwnerId;
use crate::repo::todo_list_repo::{RepoError, RepoResult, TodoListRepository};
use std::collections::HashMap;

/// Map-backed todo list repository.
#[derive(Debug, Default)]
pub struct InMemoryTodoListRepository {
    lists: HashMap<OwnerId, TodoList>,
}

impl InMemoryTodoListRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TodoListRepository for InMemoryTodoListRepository {
    fn create_list(&mut self, owner: OwnerId) -> RepoResult<TodoList> {
        if self.lists.contains_key(&owner) {
            return Err(RepoError::AlreadyExists(owner));
        }
        let list = TodoList::new(owner);
        self.lists.insert(owner, list.clone());
        Ok(list)
    }

    fn load_list(&self, owner: OwnerId) -> RepoResult<Option<TodoList>> {
        Ok(self.lists.get(&owner).cloned())
    }

    fn save_list(&mut self, list: &TodoList) -> RepoResult<()> {
        match self.lists.get_mut(&list.owner()) {
            Some(stored) => {
                *stored = list.clone();
                Ok(())
            }
            None => Err(RepoError::ListNotFound(list.owner())),
        }
    }

    fn update_list<T, E, F>(&mut self, owner: OwnerId, op: F) -> Result<T, E>
    where
        F: FnOnce(&mut TodoList) -> Result<T, E>,
        E: From<RepoError>,
    {
        let stored = self
            .lists
            .get_mut(&owner)
            .ok_or(RepoError::ListNotFound(owner))?;
        let mut working = stored.clone();
        let value = op(&mut working)?;
        *stored = working;
        Ok(value)
    }
}
