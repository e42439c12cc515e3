//! Todo list repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Resolve the one list owned by an owner id, create it once, save it whole.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - A second `create_list` for the same owner fails with `AlreadyExists`.
//! - `save_list` replaces slots and free list in one transaction.
//! - `update_list` holds one write transaction from load to save, so
//!   concurrent writers on the same database are serialized.
//! - Read paths reject state that breaks list invariants instead of masking it.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::list::invariants::InvariantViolation;
use crate::list::todo_list::{TodoList, TodoListRecord};
use crate::model::todo::{OwnerId, Todo};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for todo list persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// A list for this owner has already been created.
    AlreadyExists(OwnerId),
    /// No list exists for this owner.
    ListNotFound(OwnerId),
    /// Persisted rows cannot be converted into a list.
    InvalidData(String),
    /// Persisted rows convert but break list invariants.
    CorruptList {
        owner: OwnerId,
        violation: InvariantViolation,
    },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::AlreadyExists(owner) => write!(f, "todo list already exists for owner {owner}"),
            Self::ListNotFound(owner) => write!(f, "todo list not found for owner {owner}"),
            Self::InvalidData(message) => write!(f, "invalid persisted todo data: {message}"),
            Self::CorruptList { owner, violation } => {
                write!(f, "persisted todo list for owner {owner} is corrupt: {violation}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "todo list repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "todo list repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "todo list repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::CorruptList { violation, .. } => Some(violation),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Owner-addressed storage for todo lists.
pub trait TodoListRepository {
    /// Creates and persists an empty list for `owner`.
    fn create_list(&mut self, owner: OwnerId) -> RepoResult<TodoList>;
    /// Loads the list for `owner`, `None` when it was never created.
    fn load_list(&self, owner: OwnerId) -> RepoResult<Option<TodoList>>;
    /// Persists `list` in full. The list must have been created before.
    fn save_list(&mut self, list: &TodoList) -> RepoResult<()>;
    /// Loads the list for `owner`, applies `op` and persists the result as
    /// one atomic step. Nothing is written when `op` fails.
    ///
    /// # Errors
    /// - `ListNotFound` (converted into `E`) when `owner` has no list.
    /// - Whatever `op` returns.
    fn update_list<T, E, F>(&mut self, owner: OwnerId, op: F) -> Result<T, E>
    where
        F: FnOnce(&mut TodoList) -> Result<T, E>,
        E: From<RepoError>;
}

const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("todo_lists", &["owner", "live_count", "created_at", "updated_at"]),
    (
        "todo_slots",
        &["owner", "slot_index", "todo_id", "content", "completed"],
    ),
    ("todo_free_slots", &["owner", "position", "slot_index"]),
];

/// SQLite-backed todo list repository.
pub struct SqliteTodoListRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTodoListRepository<'conn> {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` on schema drift.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl TodoListRepository for SqliteTodoListRepository<'_> {
    fn create_list(&mut self, owner: OwnerId) -> RepoResult<TodoList> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if list_exists(&tx, owner)? {
            return Err(RepoError::AlreadyExists(owner));
        }

        tx.execute(
            "INSERT INTO todo_lists (owner, live_count) VALUES (?1, 0);",
            [owner.to_string()],
        )?;
        tx.commit()?;

        Ok(TodoList::new(owner))
    }

    fn load_list(&self, owner: OwnerId) -> RepoResult<Option<TodoList>> {
        load_list_rows(self.conn, owner)
    }

    fn save_list(&mut self, list: &TodoList) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        save_list_rows(&tx, list)?;
        tx.commit()?;
        Ok(())
    }

    fn update_list<T, E, F>(&mut self, owner: OwnerId, op: F) -> Result<T, E>
    where
        F: FnOnce(&mut TodoList) -> Result<T, E>,
        E: From<RepoError>,
    {
        // The write lock is taken before the read; a second writer waits on
        // the busy timeout instead of loading a list that is about to change.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
            .map_err(RepoError::from)?;
        let mut list = load_list_rows(&tx, owner)?.ok_or(RepoError::ListNotFound(owner))?;
        let value = op(&mut list)?;
        save_list_rows(&tx, &list)?;
        tx.commit().map_err(RepoError::from)?;
        Ok(value)
    }
}

fn load_list_rows(conn: &Connection, owner: OwnerId) -> RepoResult<Option<TodoList>> {
    let owner_key = owner.to_string();
    let live_count: Option<i64> = conn
        .query_row(
            "SELECT live_count FROM todo_lists WHERE owner = ?1;",
            [owner_key.as_str()],
            |row| row.get(0),
        )
        .optional()?;
    let Some(live_count) = live_count else {
        return Ok(None);
    };
    let count = u16::try_from(live_count).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid live_count `{live_count}` in todo_lists.live_count"
        ))
    })?;

    let todos = load_slots(conn, owner_key.as_str())?;
    let deleted_indexes = load_free_slots(conn, owner_key.as_str())?;

    let record = TodoListRecord {
        owner,
        count,
        deleted_indexes,
        todos,
    };
    TodoList::try_from(record)
        .map(Some)
        .map_err(|violation| RepoError::CorruptList { owner, violation })
}

fn save_list_rows(conn: &Connection, list: &TodoList) -> RepoResult<()> {
    let owner_key = list.owner().to_string();

    let changed = conn.execute(
        "UPDATE todo_lists
         SET
            live_count = ?2,
            updated_at = (strftime('%s', 'now') * 1000)
         WHERE owner = ?1;",
        params![owner_key, list.live_count() as i64],
    )?;
    if changed == 0 {
        return Err(RepoError::ListNotFound(list.owner()));
    }

    conn.execute("DELETE FROM todo_slots WHERE owner = ?1;", [&owner_key])?;
    for (index, todo) in list.slots().iter().enumerate() {
        conn.execute(
            "INSERT INTO todo_slots (owner, slot_index, todo_id, content, completed)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                owner_key,
                index as i64,
                todo.id.to_string(),
                todo.content.as_str(),
                bool_to_int(todo.completed),
            ],
        )?;
    }

    conn.execute("DELETE FROM todo_free_slots WHERE owner = ?1;", [&owner_key])?;
    for (position, slot_index) in list.deleted_indexes().iter().enumerate() {
        conn.execute(
            "INSERT INTO todo_free_slots (owner, position, slot_index)
             VALUES (?1, ?2, ?3);",
            params![owner_key, position as i64, i64::from(*slot_index)],
        )?;
    }

    Ok(())
}

fn list_exists(conn: &Connection, owner: OwnerId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM todo_lists WHERE owner = ?1);",
        [owner.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn load_slots(conn: &Connection, owner_key: &str) -> RepoResult<Vec<Todo>> {
    let mut stmt = conn.prepare(
        "SELECT slot_index, todo_id, content, completed
         FROM todo_slots
         WHERE owner = ?1
         ORDER BY slot_index ASC;",
    )?;
    let mut rows = stmt.query([owner_key])?;
    let mut todos = Vec::new();

    while let Some(row) = rows.next()? {
        let slot_index: i64 = row.get("slot_index")?;
        if slot_index != todos.len() as i64 {
            return Err(RepoError::InvalidData(format!(
                "gap in todo_slots.slot_index: expected {}, found {slot_index}",
                todos.len()
            )));
        }

        let id_text: String = row.get("todo_id")?;
        let id = Uuid::parse_str(&id_text).map_err(|_| {
            RepoError::InvalidData(format!("invalid uuid value `{id_text}` in todo_slots.todo_id"))
        })?;

        let completed = match row.get::<_, i64>("completed")? {
            0 => false,
            1 => true,
            other => {
                return Err(RepoError::InvalidData(format!(
                    "invalid completed value `{other}` in todo_slots.completed"
                )));
            }
        };

        todos.push(Todo {
            id,
            content: row.get("content")?,
            completed,
        });
    }

    Ok(todos)
}

fn load_free_slots(conn: &Connection, owner_key: &str) -> RepoResult<Vec<u16>> {
    let mut stmt = conn.prepare(
        "SELECT slot_index
         FROM todo_free_slots
         WHERE owner = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([owner_key])?;
    let mut indexes = Vec::new();

    while let Some(row) = rows.next()? {
        let value: i64 = row.get(0)?;
        let index = u16::try_from(value).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid slot_index `{value}` in todo_free_slots.slot_index"
            ))
        })?;
        indexes.push(index);
    }

    Ok(indexes)
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in REQUIRED_COLUMNS {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
