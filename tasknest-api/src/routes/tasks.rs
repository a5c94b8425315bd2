/// Task mutation endpoints
///
/// Add, update, delete, and toggle. Every handler takes the requester
/// from the [`CurrentUser`] extension and passes it explicitly into
/// the owner-checked model operations.
///
/// The form-posting endpoints preserve the soft-fail contract: any
/// domain error becomes a flash notice plus a redirect back to the
/// dashboard. Toggle is machine-facing and answers with JSON and a
/// real status code instead.
use crate::{
    app::{AppState, CurrentUser},
    error::{ApiError, ApiResult},
    flash,
};
use axum::{
    extract::{Path, State},
    response::Response,
    Extension, Form, Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tasknest_shared::models::task::{
    CreateTask, Task, TaskPriority, TaskStatus, UpdateTask,
};

/// Form payload for creating a task
#[derive(Debug, Deserialize)]
pub struct AddTaskForm {
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub priority: TaskPriority,

    /// ISO calendar date; blank means no due date
    #[serde(default)]
    pub due_date: Option<String>,
}

/// Form payload for overwriting a task
#[derive(Debug, Deserialize)]
pub struct UpdateTaskForm {
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    pub priority: TaskPriority,

    pub status: TaskStatus,

    #[serde(default)]
    pub due_date: Option<String>,
}

/// Toggle response body
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    /// The task's status after the flip
    pub status: TaskStatus,
}

/// Parses an optional form due date
///
/// A blank or missing field means "no due date"; anything else must be
/// an ISO `YYYY-MM-DD` calendar date. A malformed value is reported as
/// an error rather than faulting the request.
fn parse_due_date(raw: Option<&str>) -> ApiResult<Option<NaiveDate>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ApiError::InvalidDateFormat(value.to_string())),
    }
}

/// Empty-or-whitespace descriptions are stored as NULL
fn normalize_description(description: Option<String>) -> Option<String> {
    description.filter(|d| !d.trim().is_empty())
}

/// `POST /add_task` - create a task owned by the requester
///
/// Always redirects to the dashboard; the outcome rides a flash
/// notice.
pub async fn add_task(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Form(form): Form<AddTaskForm>,
) -> Response {
    let result = try_add_task(&state, current.user_id, form).await;

    match result {
        Ok(task) => {
            tracing::info!(task_id = task.id, user_id = current.user_id, "Task added");
            flash::flash_redirect("Task added successfully!", "/dashboard")
        }
        Err(err) => flash::flash_redirect(&err.user_message(), "/dashboard"),
    }
}

async fn try_add_task(state: &AppState, requester_id: i64, form: AddTaskForm) -> ApiResult<Task> {
    if form.title.trim().is_empty() {
        return Err(ApiError::ValidationError(vec![
            crate::error::ValidationErrorDetail {
                field: "title".to_string(),
                message: "Title must not be empty".to_string(),
            },
        ]));
    }

    let due_date = parse_due_date(form.due_date.as_deref())?;

    let task = Task::create(
        &state.db,
        CreateTask {
            title: form.title.trim().to_string(),
            description: normalize_description(form.description),
            priority: form.priority,
            due_date,
            user_id: requester_id,
        },
    )
    .await?;

    Ok(task)
}

/// `POST /update_task/:id` - overwrite a task's editable fields
///
/// Owner-checked; refreshes the updated timestamp. Soft-fails to the
/// dashboard on any error, leaving the task untouched.
pub async fn update_task(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(task_id): Path<i64>,
    Form(form): Form<UpdateTaskForm>,
) -> Response {
    let result = try_update_task(&state, current.user_id, task_id, form).await;

    match result {
        Ok(_) => {
            tracing::info!(task_id, user_id = current.user_id, "Task updated");
            flash::flash_redirect("Task updated successfully!", "/dashboard")
        }
        Err(err) => flash::flash_redirect(&err.user_message(), "/dashboard"),
    }
}

async fn try_update_task(
    state: &AppState,
    requester_id: i64,
    task_id: i64,
    form: UpdateTaskForm,
) -> ApiResult<Task> {
    if form.title.trim().is_empty() {
        return Err(ApiError::ValidationError(vec![
            crate::error::ValidationErrorDetail {
                field: "title".to_string(),
                message: "Title must not be empty".to_string(),
            },
        ]));
    }

    let due_date = parse_due_date(form.due_date.as_deref())?;

    let task = Task::update_owned(
        &state.db,
        task_id,
        requester_id,
        UpdateTask {
            title: form.title.trim().to_string(),
            description: normalize_description(form.description),
            priority: form.priority,
            status: form.status,
            due_date,
        },
    )
    .await?;

    Ok(task)
}

/// `POST /delete_task/:id` - permanently remove a task
///
/// Owner-checked; no undo.
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(task_id): Path<i64>,
) -> Response {
    match Task::delete_owned(&state.db, task_id, current.user_id).await {
        Ok(()) => {
            tracing::info!(task_id, user_id = current.user_id, "Task deleted");
            flash::flash_redirect("Task deleted successfully!", "/dashboard")
        }
        Err(err) => {
            let err: ApiError = err.into();
            flash::flash_redirect(&err.user_message(), "/dashboard")
        }
    }
}

/// `POST /toggle_task/:id` - flip a task between Pending and Completed
///
/// Machine-facing: returns `{"status": "..."}` on success, a JSON error
/// with 403/404 on an ownership violation or missing task.
pub async fn toggle_task(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(task_id): Path<i64>,
) -> ApiResult<Json<ToggleResponse>> {
    let status = Task::toggle_owned(&state.db, task_id, current.user_id).await?;

    tracing::debug!(task_id, user_id = current.user_id, status = %status, "Task toggled");

    Ok(Json(ToggleResponse { status }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_due_date_blank_means_none() {
        assert_eq!(parse_due_date(None).unwrap(), None);
        assert_eq!(parse_due_date(Some("")).unwrap(), None);
        assert_eq!(parse_due_date(Some("   ")).unwrap(), None);
    }

    #[test]
    fn test_parse_due_date_iso() {
        let parsed = parse_due_date(Some("2024-01-01")).unwrap();
        assert_eq!(parsed, Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
    }

    #[test]
    fn test_parse_due_date_malformed_is_reported_not_fatal() {
        for bad in ["01/02/2024", "2024-13-01", "tomorrow", "2024-1-1-1"] {
            let err = parse_due_date(Some(bad)).unwrap_err();
            assert!(matches!(err, ApiError::InvalidDateFormat(_)), "{bad}");
        }
    }

    #[test]
    fn test_normalize_description() {
        assert_eq!(normalize_description(None), None);
        assert_eq!(normalize_description(Some("".to_string())), None);
        assert_eq!(normalize_description(Some("  ".to_string())), None);
        assert_eq!(
            normalize_description(Some("notes".to_string())),
            Some("notes".to_string())
        );
    }

    #[test]
    fn test_toggle_response_serialization() {
        let body = serde_json::to_string(&ToggleResponse {
            status: TaskStatus::Completed,
        })
        .unwrap();
        assert_eq!(body, r#"{"status":"Completed"}"#);
    }
}
