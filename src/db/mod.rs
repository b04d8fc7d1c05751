use std::{fs, path::Path, path::PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use chrono::Utc;
use rusqlite::{Connection, params, types::Type};
use uuid::Uuid;

use crate::types::{Board, Priority, StatusColumn, Task};

const DEFAULT_BOARD_TITLE: &str = "My Kanban Board";
const DEFAULT_BOARD_DESCRIPTION: &str = "Default board";

/// Name, position and color of the columns seeded on first run.
const DEFAULT_COLUMNS: [(&str, i64, &str); 3] = [
    ("To Do", 0, "#ff6b6b"),
    ("In Progress", 1, "#4ecdc4"),
    ("Done", 2, "#45b7d1"),
];

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();

        if path_ref != Path::new(":memory:")
            && let Some(parent) = path_ref.parent()
        {
            fs::create_dir_all(parent).with_context(|| {
                format!(
                    "failed to create parent directories for {}",
                    path_ref.display()
                )
            })?;
        }

        let conn = Connection::open(path_ref)
            .with_context(|| format!("failed to open sqlite db at {}", path_ref.display()))?;

        conn.execute("PRAGMA foreign_keys = ON", params![])
            .context("failed to enable foreign keys")?;

        let db = Self { conn };
        db.run_migrations()?;
        Ok(db)
    }

    /// Per-user store location: `<local data dir>/kanban-tui/kanban.sqlite`.
    pub fn default_db_path() -> Result<PathBuf> {
        let data_dir =
            dirs::data_local_dir().ok_or_else(|| anyhow!("failed to determine local data dir"))?;
        Ok(data_dir.join("kanban-tui").join("kanban.sqlite"))
    }

    pub fn create_board(
        &self,
        title: impl AsRef<str>,
        description: impl AsRef<str>,
    ) -> Result<Board> {
        let now = now_iso();
        let id = Uuid::new_v4();
        self.conn
            .execute(
                "INSERT INTO boards (id, title, description, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id.to_string(), title.as_ref(), description.as_ref(), now, now],
            )
            .context("failed to insert board")?;

        self.get_board(id)
    }

    /// Loads a board row together with its columns (ordered by position) and
    /// every task on the board.
    pub fn get_board(&self, id: Uuid) -> Result<Board> {
        let mut board = self
            .conn
            .query_row(
                "SELECT id, title, description, created_at, updated_at
                 FROM boards WHERE id = ?1",
                params![id.to_string()],
                map_board_row,
            )
            .with_context(|| format!("board {id} not found"))?;

        board.columns = self.list_columns(id)?;
        board.tasks = self.list_tasks_by_board(id)?;
        Ok(board)
    }

    /// Board rows only, most recently created first. Columns and tasks are
    /// not loaded here.
    pub fn list_boards(&self) -> Result<Vec<Board>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, description, created_at, updated_at
             FROM boards ORDER BY created_at DESC",
        )?;

        let boards = stmt
            .query_map(params![], map_board_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to load boards")?;

        Ok(boards)
    }

    pub fn create_column(
        &self,
        board_id: Uuid,
        name: impl AsRef<str>,
        position: i64,
        color: impl AsRef<str>,
    ) -> Result<StatusColumn> {
        let id = Uuid::new_v4();
        self.conn
            .execute(
                "INSERT INTO status_columns (id, board_id, name, position, color)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    id.to_string(),
                    board_id.to_string(),
                    name.as_ref(),
                    position,
                    color.as_ref()
                ],
            )
            .context("failed to insert status column")?;

        self.get_column(id)
    }

    pub fn list_columns(&self, board_id: Uuid) -> Result<Vec<StatusColumn>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, board_id, name, position, color
             FROM status_columns WHERE board_id = ?1 ORDER BY position ASC",
        )?;

        let columns = stmt
            .query_map(params![board_id.to_string()], map_column_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to load status columns")?;

        Ok(columns)
    }

    /// Inserts a transient task, assigning its identifier, timestamps and the
    /// next free position within its column. Returns the persisted row.
    pub fn create_task(&self, task: &Task) -> Result<Task> {
        if task.title.trim().is_empty() {
            bail!("task title cannot be empty");
        }

        let position: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM tasks WHERE status_column_id = ?1",
            params![task.status_column_id.to_string()],
            |row| row.get(0),
        )?;

        let now = now_iso();
        let id = Uuid::new_v4();
        self.conn
            .execute(
                "INSERT INTO tasks (
                    id, board_id, status_column_id, title, description, position,
                    priority, due_date, assignee, tags, created_at, updated_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    id.to_string(),
                    task.board_id.to_string(),
                    task.status_column_id.to_string(),
                    task.title,
                    task.description,
                    position,
                    task.priority.as_i64(),
                    task.due_date,
                    task.assignee,
                    task.tags,
                    now,
                    now
                ],
            )
            .context("failed to insert task")?;

        self.get_task(id)
    }

    pub fn get_task(&self, id: Uuid) -> Result<Task> {
        self.conn
            .query_row(
                "SELECT id, board_id, status_column_id, title, description, position,
                        priority, due_date, assignee, tags, created_at, updated_at
                 FROM tasks WHERE id = ?1",
                params![id.to_string()],
                map_task_row,
            )
            .with_context(|| format!("task {id} not found"))
    }

    /// Writes every mutable task attribute and refreshes `updated_at`.
    /// Returns the persisted row.
    pub fn update_task(&self, task: &Task) -> Result<Task> {
        let id = task
            .id
            .ok_or_else(|| anyhow!("cannot update a task without an identifier"))?;

        self.conn
            .execute(
                "UPDATE tasks
                 SET status_column_id = ?1, title = ?2, description = ?3, position = ?4,
                     priority = ?5, due_date = ?6, assignee = ?7, tags = ?8, updated_at = ?9
                 WHERE id = ?10",
                params![
                    task.status_column_id.to_string(),
                    task.title,
                    task.description,
                    task.position,
                    task.priority.as_i64(),
                    task.due_date,
                    task.assignee,
                    task.tags,
                    now_iso(),
                    id.to_string()
                ],
            )
            .context("failed to update task")?;

        self.get_task(id)
    }

    pub fn delete_task(&self, id: Uuid) -> Result<()> {
        self.conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id.to_string()])
            .context("failed to delete task")?;
        Ok(())
    }

    pub fn list_tasks_by_column(&self, column_id: Uuid) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, board_id, status_column_id, title, description, position,
                    priority, due_date, assignee, tags, created_at, updated_at
             FROM tasks WHERE status_column_id = ?1 ORDER BY position ASC",
        )?;

        let tasks = stmt
            .query_map(params![column_id.to_string()], map_task_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to load tasks for column")?;

        Ok(tasks)
    }

    pub fn list_tasks_by_board(&self, board_id: Uuid) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, board_id, status_column_id, title, description, position,
                    priority, due_date, assignee, tags, created_at, updated_at
             FROM tasks WHERE board_id = ?1 ORDER BY status_column_id ASC, position ASC",
        )?;

        let tasks = stmt
            .query_map(params![board_id.to_string()], map_task_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to load tasks for board")?;

        Ok(tasks)
    }

    /// Loads the most recent board, creating the default board with its three
    /// fixed columns when the store is empty.
    pub fn bootstrap_board(&self) -> Result<Board> {
        let boards = self.list_boards()?;
        if let Some(board) = boards.first() {
            return self.get_board(board.id);
        }

        let board = self.create_board(DEFAULT_BOARD_TITLE, DEFAULT_BOARD_DESCRIPTION)?;
        for (name, position, color) in DEFAULT_COLUMNS {
            self.create_column(board.id, name, position, color)?;
        }

        self.get_board(board.id)
    }

    fn run_migrations(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS boards (
                    id TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    description TEXT NOT NULL DEFAULT '',
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS status_columns (
                    id TEXT PRIMARY KEY,
                    board_id TEXT NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
                    name TEXT NOT NULL,
                    position INTEGER NOT NULL,
                    color TEXT NOT NULL DEFAULT ''
                );

                CREATE TABLE IF NOT EXISTS tasks (
                    id TEXT PRIMARY KEY,
                    board_id TEXT NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
                    status_column_id TEXT NOT NULL
                        REFERENCES status_columns(id) ON DELETE CASCADE,
                    title TEXT NOT NULL,
                    description TEXT NOT NULL DEFAULT '',
                    position INTEGER NOT NULL DEFAULT 0,
                    priority INTEGER NOT NULL DEFAULT 1,
                    due_date TEXT,
                    assignee TEXT NOT NULL DEFAULT '',
                    tags TEXT NOT NULL DEFAULT '',
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_status_columns_board_id
                    ON status_columns(board_id);
                CREATE INDEX IF NOT EXISTS idx_tasks_board_id ON tasks(board_id);
                CREATE INDEX IF NOT EXISTS idx_tasks_status_column_id
                    ON tasks(status_column_id);
                CREATE INDEX IF NOT EXISTS idx_tasks_position
                    ON tasks(status_column_id, position);",
            )
            .context("failed to run sqlite migrations")?;

        Ok(())
    }

    fn get_column(&self, id: Uuid) -> Result<StatusColumn> {
        self.conn
            .query_row(
                "SELECT id, board_id, name, position, color
                 FROM status_columns WHERE id = ?1",
                params![id.to_string()],
                map_column_row,
            )
            .with_context(|| format!("status column {id} not found"))
    }

    /// Drops the tasks table so the next task write fails. Rollback-path
    /// tests only.
    #[cfg(test)]
    pub(crate) fn sabotage_tasks_table(&self) {
        self.conn
            .execute_batch("DROP TABLE tasks")
            .expect("dropping tasks table should succeed");
    }
}

fn map_board_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Board> {
    Ok(Board {
        id: parse_uuid_column(row.get::<_, String>(0)?, 0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
        columns: Vec::new(),
        tasks: Vec::new(),
    })
}

fn map_column_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StatusColumn> {
    Ok(StatusColumn {
        id: parse_uuid_column(row.get::<_, String>(0)?, 0)?,
        board_id: parse_uuid_column(row.get::<_, String>(1)?, 1)?,
        name: row.get(2)?,
        position: row.get(3)?,
        color: row.get(4)?,
    })
}

fn map_task_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: Some(parse_uuid_column(row.get::<_, String>(0)?, 0)?),
        board_id: parse_uuid_column(row.get::<_, String>(1)?, 1)?,
        status_column_id: parse_uuid_column(row.get::<_, String>(2)?, 2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        position: row.get(5)?,
        priority: Priority::from_i64(row.get(6)?).unwrap_or_default(),
        due_date: row.get(7)?,
        assignee: row.get(8)?,
        tags: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

fn parse_uuid_column(value: String, idx: usize) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(&value)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

fn now_iso() -> String {
    Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use uuid::Uuid;

    use super::Database;
    use crate::types::{Priority, Task};

    #[test]
    fn test_bootstrap_seeds_default_board() -> Result<()> {
        let db = Database::open(":memory:")?;
        let board = db.bootstrap_board()?;

        assert_eq!(board.title, "My Kanban Board");
        assert_eq!(board.columns.len(), 3);
        assert_eq!(board.columns[0].name, "To Do");
        assert_eq!(board.columns[0].position, 0);
        assert_eq!(board.columns[1].name, "In Progress");
        assert_eq!(board.columns[2].name, "Done");
        assert!(board.tasks.is_empty());

        Ok(())
    }

    #[test]
    fn test_bootstrap_is_idempotent() -> Result<()> {
        let db = Database::open(":memory:")?;
        let first = db.bootstrap_board()?;
        let second = db.bootstrap_board()?;

        assert_eq!(first.id, second.id);
        assert_eq!(db.list_boards()?.len(), 1);

        Ok(())
    }

    #[test]
    fn test_open_creates_database_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("kanban.sqlite");
        let _db = Database::open(&path)?;
        assert!(path.exists());

        Ok(())
    }

    #[test]
    fn test_create_task_assigns_identity_position_and_defaults() -> Result<()> {
        let db = Database::open(":memory:")?;
        let board = db.bootstrap_board()?;
        let todo = board.columns[0].id;

        let first = db.create_task(&Task::new(board.id, todo, "Buy milk", ""))?;
        let second = db.create_task(&Task::new(board.id, todo, "Walk the dog", "daily"))?;

        assert!(first.id.is_some());
        assert_eq!(first.position, 0);
        assert_eq!(first.priority, Priority::Low);
        assert!(!first.created_at.is_empty());
        assert_eq!(second.position, 1);

        let listed = db.list_tasks_by_column(todo)?;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].title, "Buy milk");
        assert_eq!(listed[1].title, "Walk the dog");

        Ok(())
    }

    #[test]
    fn test_create_task_rejects_empty_title() -> Result<()> {
        let db = Database::open(":memory:")?;
        let board = db.bootstrap_board()?;
        let todo = board.columns[0].id;

        assert!(db.create_task(&Task::new(board.id, todo, "", "")).is_err());
        assert!(db.create_task(&Task::new(board.id, todo, "   ", "")).is_err());
        assert!(db.list_tasks_by_board(board.id)?.is_empty());

        Ok(())
    }

    #[test]
    fn test_update_task_moves_between_columns() -> Result<()> {
        let db = Database::open(":memory:")?;
        let board = db.bootstrap_board()?;
        let todo = board.columns[0].id;
        let in_progress = board.columns[1].id;

        let mut task = db.create_task(&Task::new(board.id, todo, "Refactor", ""))?;
        task.status_column_id = in_progress;
        let updated = db.update_task(&task)?;

        assert_eq!(updated.status_column_id, in_progress);
        assert!(db.list_tasks_by_column(todo)?.is_empty());
        assert_eq!(db.list_tasks_by_column(in_progress)?.len(), 1);

        Ok(())
    }

    #[test]
    fn test_update_task_without_identifier_fails() -> Result<()> {
        let db = Database::open(":memory:")?;
        let board = db.bootstrap_board()?;
        let transient = Task::new(board.id, board.columns[0].id, "No id", "");

        assert!(db.update_task(&transient).is_err());

        Ok(())
    }

    #[test]
    fn test_delete_task_removes_row() -> Result<()> {
        let db = Database::open(":memory:")?;
        let board = db.bootstrap_board()?;
        let todo = board.columns[0].id;
        let task = db.create_task(&Task::new(board.id, todo, "Ephemeral", ""))?;
        let id = task.id.expect("persisted task has id");

        db.delete_task(id)?;
        assert!(db.get_task(id).is_err());
        assert!(db.list_tasks_by_column(todo)?.is_empty());

        Ok(())
    }

    #[test]
    fn test_deleting_board_cascades_to_columns_and_tasks() -> Result<()> {
        let db = Database::open(":memory:")?;
        let board = db.bootstrap_board()?;
        let todo = board.columns[0].id;
        db.create_task(&Task::new(board.id, todo, "Orphan-to-be", ""))?;

        db.conn.execute(
            "DELETE FROM boards WHERE id = ?1",
            rusqlite::params![board.id.to_string()],
        )?;

        assert!(db.list_columns(board.id)?.is_empty());
        assert!(db.list_tasks_by_board(board.id)?.is_empty());

        Ok(())
    }

    #[test]
    fn test_get_board_loads_columns_and_tasks() -> Result<()> {
        let db = Database::open(":memory:")?;
        let board = db.bootstrap_board()?;
        let done = board.columns[2].id;
        db.create_task(&Task::new(board.id, done, "Shipped", ""))?;

        let reloaded = db.get_board(board.id)?;
        assert_eq!(reloaded.columns.len(), 3);
        assert_eq!(reloaded.tasks.len(), 1);
        assert_eq!(reloaded.tasks[0].status_column_id, done);

        Ok(())
    }

    #[test]
    fn test_list_boards_most_recent_first() -> Result<()> {
        let db = Database::open(":memory:")?;
        let older = db.create_board("First", "")?;
        db.conn.execute(
            "UPDATE boards SET created_at = '2020-01-01T00:00:00+00:00' WHERE id = ?1",
            rusqlite::params![older.id.to_string()],
        )?;
        let newer = db.create_board("Second", "")?;

        let boards = db.list_boards()?;
        assert_eq!(boards.len(), 2);
        assert_eq!(boards[0].id, newer.id);
        assert_eq!(boards[1].id, older.id);

        Ok(())
    }

    #[test]
    fn test_unknown_identifiers_are_errors() -> Result<()> {
        let db = Database::open(":memory:")?;
        db.bootstrap_board()?;

        assert!(db.get_task(Uuid::new_v4()).is_err());
        assert!(db.get_board(Uuid::new_v4()).is_err());

        Ok(())
    }
}
