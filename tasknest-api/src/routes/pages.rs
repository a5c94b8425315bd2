/// Browser view endpoints
///
/// Template rendering is an external concern; these handlers return
/// JSON view models (task lists, stats, pending flash notice) that the
/// frontend renders.
///
/// # Endpoints
///
/// - `GET /`             - Dashboard redirect when logged in, else landing view
/// - `GET /dashboard`    - Task list plus statistics
/// - `GET /filter_tasks` - Partial view of the filtered task list
use crate::{
    app::{resolve_current_user, AppState, CurrentUser},
    error::ApiResult,
    flash,
};
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tasknest_shared::models::task::{Task, TaskPriority, TaskStats, TaskStatus};

/// `GET /` - landing page
///
/// Authenticated visitors go straight to the dashboard; everyone else
/// gets the landing view.
pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    if resolve_current_user(&state, &headers).await?.is_some() {
        return Ok(Redirect::to("/dashboard").into_response());
    }

    let notice = flash::peek_flash(&headers);
    let had_notice = notice.is_some();

    let body = Json(json!({ "view": "index", "flash": notice }));

    if had_notice {
        Ok(flash::with_set_cookie(body, &flash::clear_flash_cookie()))
    } else {
        Ok(body.into_response())
    }
}

/// `GET /dashboard` - the requester's tasks plus statistics
///
/// Tasks come back due-soonest first (undated tasks lead). Statistics
/// are computed against today's date at request time. A pending flash
/// notice is included once and its cookie cleared.
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let tasks = Task::list_by_owner(&state.db, current.user_id).await?;

    let today = Utc::now().date_naive();
    let stats = TaskStats::compute(&tasks, today);

    let notice = flash::peek_flash(&headers);
    let had_notice = notice.is_some();

    let body = Json(json!({
        "view": "dashboard",
        "tasks": tasks,
        "stats": stats,
        "today": today,
        "flash": notice,
    }));

    if had_notice {
        Ok(flash::with_set_cookie(body, &flash::clear_flash_cookie()))
    } else {
        Ok(body.into_response())
    }
}

/// Query parameters for `/filter_tasks`
///
/// Raw strings so that an empty value ("no filter", as an empty
/// `<select>` submits) is distinguishable from an invalid one.
#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub priority: Option<String>,
}

/// `GET /filter_tasks` - the task list restricted by optional filters
///
/// Status and priority filter independently and combine with AND
/// semantics. An unrecognized value is a 400, not an empty list.
pub async fn filter_tasks(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<FilterParams>,
) -> ApiResult<Response> {
    let status = parse_filter::<TaskStatus>(params.status.as_deref())?;
    let priority = parse_filter::<TaskPriority>(params.priority.as_deref())?;

    let tasks = Task::filter_by_owner(&state.db, current.user_id, status, priority).await?;

    Ok(Json(json!({
        "view": "task_list",
        "tasks": tasks,
        "today": Utc::now().date_naive(),
    }))
    .into_response())
}

/// Empty or absent filter values mean "no restriction"
fn parse_filter<T>(raw: Option<&str>) -> ApiResult<Option<T>>
where
    T: std::str::FromStr,
    crate::error::ApiError: From<T::Err>,
{
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => Ok(Some(value.parse::<T>()?)),
    }
}
