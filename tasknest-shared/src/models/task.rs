/// Task model and database operations
///
/// Tasks are the core entity of TaskNest: each belongs to exactly one
/// user and is only ever visible to, or mutable by, its owner. Every
/// operation here takes the requesting user's id explicitly and
/// enforces ownership before touching a row, so the authorization
/// rules are testable without standing up a server.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     title TEXT NOT NULL,
///     description TEXT,
///     priority TEXT NOT NULL DEFAULT 'Medium',
///     status TEXT NOT NULL DEFAULT 'Pending',
///     due_date TEXT,
///     created_at TEXT NOT NULL,
///     updated_at TEXT NOT NULL,
///     user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use tasknest_shared::models::task::{CreateTask, Task, TaskPriority};
/// use tasknest_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let task = Task::create(&pool, CreateTask {
///     title: "Write report".to_string(),
///     description: None,
///     priority: TaskPriority::High,
///     due_date: None,
///     user_id: 1,
/// }).await?;
///
/// let toggled = Task::toggle_owned(&pool, task.id, 1).await?;
/// # Ok(())
/// # }
/// ```
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::fmt;
use std::str::FromStr;

/// Task priority level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "Low",
            TaskPriority::Medium => "Medium",
            TaskPriority::High => "High",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(TaskPriority::Low),
            "Medium" => Ok(TaskPriority::Medium),
            "High" => Ok(TaskPriority::High),
            other => Err(ParseFilterError {
                field: "priority",
                value: other.to_string(),
            }),
        }
    }
}

/// Task completion status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum TaskStatus {
    Pending,
    Completed,
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::Completed => "Completed",
        }
    }

    /// Flips the status: anything other than Completed becomes
    /// Completed, Completed becomes Pending. An involution on the
    /// {Pending, Completed} domain.
    pub fn toggled(&self) -> Self {
        match self {
            TaskStatus::Completed => TaskStatus::Pending,
            _ => TaskStatus::Completed,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(TaskStatus::Pending),
            "Completed" => Ok(TaskStatus::Completed),
            other => Err(ParseFilterError {
                field: "status",
                value: other.to_string(),
            }),
        }
    }
}

/// Error for an unrecognized status/priority filter value
#[derive(Debug, Clone, thiserror::Error)]
#[error("unrecognized {field} value: {value}")]
pub struct ParseFilterError {
    pub field: &'static str,
    pub value: String,
}

/// Error type for owner-checked task operations
///
/// `NotFound` and `NotOwner` are reported without performing any
/// mutation.
#[derive(Debug, thiserror::Error)]
pub enum TaskAccessError {
    /// No task with the given id exists
    #[error("task not found")]
    NotFound,

    /// The task exists but belongs to another user
    #[error("task belongs to another user")]
    NotOwner,

    /// Underlying database failure
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: i64,

    /// Short title, non-empty
    pub title: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Priority (Low/Medium/High, default Medium)
    pub priority: TaskPriority,

    /// Completion status (Pending/Completed, default Pending)
    pub status: TaskStatus,

    /// Optional due date (calendar date, no time component)
    pub due_date: Option<NaiveDate>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last mutated
    pub updated_at: DateTime<Utc>,

    /// Owning user
    pub user_id: i64,
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,

    /// The requester; the created task is owned by them
    pub user_id: i64,
}

/// Input for overwriting an existing task's editable fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
}

/// Per-user task statistics, derived and never persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    /// All tasks owned by the user
    pub total: usize,

    /// Tasks with Completed status
    pub completed: usize,

    /// Tasks with Pending status
    pub pending: usize,

    /// Pending tasks whose due date is strictly before `today`
    pub overdue: usize,
}

impl TaskStats {
    /// Computes statistics over a task slice
    ///
    /// Pure function of its inputs: `today` is injected by the caller
    /// rather than read from a clock.
    pub fn compute(tasks: &[Task], today: NaiveDate) -> Self {
        let total = tasks.len();
        let completed = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .count();
        let pending = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Pending)
            .count();
        let overdue = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Pending && t.due_date.is_some_and(|d| d < today))
            .count();

        Self {
            total,
            completed,
            pending,
            overdue,
        }
    }
}

const TASK_COLUMNS: &str =
    "id, title, description, priority, status, due_date, created_at, updated_at, user_id";

impl Task {
    /// Creates a new pending task owned by `data.user_id`
    pub async fn create(pool: &SqlitePool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let now = Utc::now();
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, priority, status, due_date, created_at, updated_at, user_id)
            VALUES (?, ?, ?, 'Pending', ?, ?, ?, ?)
            RETURNING id, title, description, priority, status, due_date, created_at, updated_at, user_id
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.priority)
        .bind(data.due_date)
        .bind(now)
        .bind(now)
        .bind(data.user_id)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID, with no ownership check
    ///
    /// Callers that act on the result must check ownership themselves;
    /// prefer the `*_owned` operations.
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let task =
            sqlx::query_as::<_, Task>(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?"))
                .bind(id)
                .fetch_optional(pool)
                .await?;

        Ok(task)
    }

    /// Lists all tasks owned by a user, due-soonest first
    ///
    /// Tasks without a due date sort first: SQLite places NULLs at the
    /// start of an ascending order.
    pub async fn list_by_owner(pool: &SqlitePool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = ? ORDER BY due_date ASC"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists a user's tasks restricted by optional status/priority
    ///
    /// Filters are independent and combine with AND semantics; `None`
    /// means no restriction on that axis. Ordering matches
    /// [`Task::list_by_owner`].
    pub async fn filter_by_owner(
        pool: &SqlitePool,
        user_id: i64,
        status: Option<TaskStatus>,
        priority: Option<TaskPriority>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = ?");
        if status.is_some() {
            sql.push_str(" AND status = ?");
        }
        if priority.is_some() {
            sql.push_str(" AND priority = ?");
        }
        sql.push_str(" ORDER BY due_date ASC");

        let mut query = sqlx::query_as::<_, Task>(&sql).bind(user_id);
        if let Some(status) = status {
            query = query.bind(status);
        }
        if let Some(priority) = priority {
            query = query.bind(priority);
        }

        let tasks = query.fetch_all(pool).await?;
        Ok(tasks)
    }

    /// Loads a task after verifying the requester owns it
    pub async fn get_owned(
        pool: &SqlitePool,
        id: i64,
        requester_id: i64,
    ) -> Result<Self, TaskAccessError> {
        let task = Self::find_by_id(pool, id).await?.ok_or(TaskAccessError::NotFound)?;
        if task.user_id != requester_id {
            return Err(TaskAccessError::NotOwner);
        }
        Ok(task)
    }

    /// Overwrites a task's editable fields, owner-checked
    ///
    /// Runs as a single read-check-write transaction so a concurrent
    /// edit cannot slip between the ownership check and the write.
    /// Refreshes `updated_at`.
    pub async fn update_owned(
        pool: &SqlitePool,
        id: i64,
        requester_id: i64,
        data: UpdateTask,
    ) -> Result<Self, TaskAccessError> {
        let mut tx = pool.begin().await?;

        let owner: Option<(i64,)> = sqlx::query_as("SELECT user_id FROM tasks WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        match owner {
            None => return Err(TaskAccessError::NotFound),
            Some((owner_id,)) if owner_id != requester_id => {
                return Err(TaskAccessError::NotOwner)
            }
            Some(_) => {}
        }

        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = ?, description = ?, priority = ?, status = ?, due_date = ?, updated_at = ?
            WHERE id = ?
            RETURNING id, title, description, priority, status, due_date, created_at, updated_at, user_id
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.priority)
        .bind(data.status)
        .bind(data.due_date)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(task)
    }

    /// Permanently deletes a task, owner-checked
    ///
    /// No soft-delete or undo.
    pub async fn delete_owned(
        pool: &SqlitePool,
        id: i64,
        requester_id: i64,
    ) -> Result<(), TaskAccessError> {
        let mut tx = pool.begin().await?;

        let owner: Option<(i64,)> = sqlx::query_as("SELECT user_id FROM tasks WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        match owner {
            None => return Err(TaskAccessError::NotFound),
            Some((owner_id,)) if owner_id != requester_id => {
                return Err(TaskAccessError::NotOwner)
            }
            Some(_) => {}
        }

        sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Flips a task between Pending and Completed, owner-checked
    ///
    /// Refreshes `updated_at` and returns the new status.
    pub async fn toggle_owned(
        pool: &SqlitePool,
        id: i64,
        requester_id: i64,
    ) -> Result<TaskStatus, TaskAccessError> {
        let mut tx = pool.begin().await?;

        let row: Option<(i64, TaskStatus)> =
            sqlx::query_as("SELECT user_id, status FROM tasks WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let status = match row {
            None => return Err(TaskAccessError::NotFound),
            Some((owner_id, _)) if owner_id != requester_id => {
                return Err(TaskAccessError::NotOwner)
            }
            Some((_, status)) => status.toggled(),
        };

        sqlx::query("UPDATE tasks SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status)
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(status)
    }
}
