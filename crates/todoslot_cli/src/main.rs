//! TodoSlot CLI host.
//!
//! # Responsibility
//! - Resolve the signer's list in a SQLite file and run one instruction.
//! - Print results as JSON on stdout, failures as `error: <code>: <message>`.

use clap::{Parser, Subcommand};
use log::{error, info};
use serde_json::{json, Value};
use std::path::PathBuf;
use todoslot_core::db::open_db;
use todoslot_core::{
    default_log_level, init_logging, InvariantViolation, OwnerId, RepoError,
    SqliteTodoListRepository, TodoId, TodoListRepository, TodoService, TodoServiceError,
};
use uuid::Uuid;

mod output;

use output::{CliError, ListView};

const DATA_DIR_NAME: &str = "todoslot";
const DEFAULT_DB_FILE_NAME: &str = "todoslot.sqlite3";

#[derive(Parser)]
#[command(name = "todoslot", version, about = "Owner-scoped fixed-capacity todo list")]
struct Cli {
    /// SQLite database file. Defaults to `todoslot/todoslot.sqlite3` in the
    /// per-user data directory.
    #[arg(long, global = true, env = "TODOSLOT_DB_PATH")]
    db: Option<PathBuf>,
    /// Identity of the list owner acting as signer.
    #[arg(long, global = true, env = "TODOSLOT_OWNER")]
    owner: Option<Uuid>,
    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long, global = true)]
    log_dir: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Owner(OwnerCommand),
    /// Print core health info
    Ping,
}

/// Instructions that act on the signer's list.
#[derive(Subcommand)]
enum OwnerCommand {
    /// Create the owner's empty list
    Init,
    /// Add a todo; a random id is generated unless --id is given
    Add {
        content: String,
        #[arg(long)]
        id: Option<TodoId>,
    },
    /// Mark a todo completed
    Done { id: TodoId },
    /// Replace a todo's content
    Update { id: TodoId, content: String },
    /// Delete a todo, freeing its slot for reuse
    Delete { id: TodoId },
    /// Show the list
    List {
        /// Include tombstoned slots
        #[arg(long)]
        all: bool,
    },
    /// Re-verify list invariants
    Check,
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Self::Owner(command) => command.name(),
            Self::Ping => "ping",
        }
    }
}

impl OwnerCommand {
    fn name(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Add { .. } => "add",
            Self::Done { .. } => "done",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
            Self::List { .. } => "list",
            Self::Check => "check",
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    if let Err(err) = run(cli) {
        error!(
            "event=cli_command module=cli status=error error_code={}",
            err.code
        );
        eprintln!("error: {}: {}", err.code, err.message);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    info!(
        "event=cli_command module=cli status=start command={}",
        cli.command.name()
    );
    let value = match cli.command {
        Commands::Ping => json!({
            "ping": todoslot_core::ping(),
            "version": todoslot_core::core_version(),
        }),
        Commands::Owner(command) => {
            let signer = require_owner(cli.owner)?;
            let db_path = match cli.db {
                Some(path) => path,
                None => default_db_path(dirs::data_dir())?,
            };
            let conn = open_db(&db_path)?;
            let repo = SqliteTodoListRepository::try_new(&conn)?;
            execute(&mut TodoService::new(repo), signer, command)?
        }
    };
    output::print_json(&value)
}

fn execute<R: TodoListRepository>(
    service: &mut TodoService<R>,
    signer: OwnerId,
    command: OwnerCommand,
) -> Result<Value, CliError> {
    let value = match command {
        OwnerCommand::Init => {
            let list = service.initialize(signer)?;
            serde_json::to_value(ListView::new(&list, false))?
        }
        OwnerCommand::Add { content, id } => {
            let id = id.unwrap_or_else(Uuid::new_v4);
            let slot = service.add_todo(signer, id, content)?;
            json!({ "id": id, "index": slot.index, "reused": slot.reused })
        }
        OwnerCommand::Done { id } => {
            let index = service.mark_done(signer, id)?;
            json!({ "id": id, "index": index })
        }
        OwnerCommand::Update { id, content } => {
            let index = service.update_content(signer, id, content)?;
            json!({ "id": id, "index": index })
        }
        OwnerCommand::Delete { id } => {
            let index = service.delete_todo(signer, id)?;
            json!({ "id": id, "index": index })
        }
        OwnerCommand::List { all } => {
            let list = service.get_list(signer)?;
            serde_json::to_value(ListView::new(&list, all))?
        }
        OwnerCommand::Check => {
            let list = match service.get_list(signer) {
                Err(TodoServiceError::Repo(RepoError::CorruptList { violation, .. })) => {
                    return Err(invariant_violation(&violation));
                }
                other => other?,
            };
            list.verify_invariants()
                .map_err(|violation| invariant_violation(&violation))?;
            json!({
                "ok": true,
                "live_count": list.live_count(),
                "slot_count": list.slot_count(),
                "free_slots": list.deleted_indexes().len(),
            })
        }
    };
    Ok(value)
}

fn invariant_violation(violation: &InvariantViolation) -> CliError {
    CliError {
        code: "invariant_violation",
        message: violation.to_string(),
    }
}

fn require_owner(owner: Option<OwnerId>) -> Result<OwnerId, CliError> {
    owner.ok_or_else(|| CliError {
        code: "missing_owner",
        message: "pass --owner <uuid> or set TODOSLOT_OWNER".to_string(),
    })
}

/// Resolves `<data dir>/todoslot/todoslot.sqlite3`, creating the directory.
fn default_db_path(data_dir: Option<PathBuf>) -> Result<PathBuf, CliError> {
    let dir = data_dir
        .ok_or_else(|| CliError {
            code: "missing_db_path",
            message: "no per-user data directory; pass --db <path> or set TODOSLOT_DB_PATH"
                .to_string(),
        })?
        .join(DATA_DIR_NAME);
    std::fs::create_dir_all(&dir).map_err(|err| CliError {
        code: "storage",
        message: format!("failed to create data directory `{}`: {err}", dir.display()),
    })?;
    Ok(dir.join(DEFAULT_DB_FILE_NAME))
}
