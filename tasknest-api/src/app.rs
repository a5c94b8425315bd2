/// Application state and router builder
///
/// This module defines the shared application state, the session
/// middleware, and the function that assembles the Axum router.
///
/// # Example
///
/// ```no_run
/// use tasknest_api::{app::AppState, config::Config};
/// use tasknest_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig {
///     url: config.database.url.clone(),
///     max_connections: config.database.max_connections,
///     ..Default::default()
/// })
/// .await?;
/// let state = AppState::new(pool, config);
/// let app = tasknest_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```
use crate::{error::ApiError, flash};
use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use tasknest_shared::{auth::session::hash_session_token, models::session::Session};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::Config;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: SqlitePool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}

/// The identity resolved from the session cookie
///
/// Injected into request extensions by the session middleware; every
/// task operation receives `user_id` from here explicitly rather than
/// from any ambient global.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// Authenticated user ID
    pub user_id: i64,

    /// Digest of the session token that authenticated this request
    ///
    /// Logout uses it to delete the exact session row.
    pub token_hash: String,
}

/// Resolves the current user from the request's session cookie
///
/// Returns `Ok(None)` for anonymous callers: missing cookie, unknown
/// token, or expired session.
pub async fn resolve_current_user(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Option<CurrentUser>, ApiError> {
    let Some(token) = flash::cookie_value(headers, flash::SESSION_COOKIE) else {
        return Ok(None);
    };

    let token_hash = hash_session_token(&token);
    let session = Session::find_valid(&state.db, &token_hash, Utc::now()).await?;

    Ok(session.map(|s| CurrentUser {
        user_id: s.user_id,
        token_hash,
    }))
}

/// Builds the complete Axum router
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /                    # landing / dashboard redirect (optional auth)
/// ├── GET  /health              # health check (public)
/// ├── GET|POST /register        # registration (public)
/// ├── GET|POST /login           # login (public)
/// ├── GET  /logout              # end session        ┐
/// ├── GET  /dashboard           # task list + stats  │ browser-protected:
/// ├── POST /add_task            #                    │ anonymous callers are
/// ├── POST /update_task/:id     #                    │ redirected to /login
/// ├── POST /delete_task/:id     #                    │
/// ├── GET  /filter_tasks        #                    ┘
/// └── POST /toggle_task/:id     # JSON-protected: anonymous callers get 401
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/", get(routes::pages::index))
        .route("/health", get(routes::health::health_check))
        .route(
            "/register",
            get(routes::auth::register_view).post(routes::auth::register),
        )
        .route(
            "/login",
            get(routes::auth::login_view).post(routes::auth::login),
        );

    // Browser-facing routes: anonymous callers are redirected to the
    // login entry point instead of receiving a hard error.
    let browser_routes = Router::new()
        .route("/logout", get(routes::auth::logout))
        .route("/dashboard", get(routes::pages::dashboard))
        .route("/add_task", post(routes::tasks::add_task))
        .route("/update_task/:id", post(routes::tasks::update_task))
        .route("/delete_task/:id", post(routes::tasks::delete_task))
        .route("/filter_tasks", get(routes::pages::filter_tasks))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_auth_browser_layer,
        ));

    // Machine-facing routes answer with a status code, not a redirect.
    let api_routes = Router::new()
        .route("/toggle_task/:id", post(routes::tasks::toggle_task))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_auth_api_layer,
        ));

    Router::new()
        .merge(public_routes)
        .merge(browser_routes)
        .merge(api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Session middleware for browser routes
///
/// Resolves the session cookie and injects [`CurrentUser`]; anonymous
/// callers are redirected to `/login`.
async fn session_auth_browser_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    match resolve_current_user(&state, req.headers()).await? {
        Some(current) => {
            req.extensions_mut().insert(current);
            Ok(next.run(req).await)
        }
        None => Ok(Redirect::to("/login").into_response()),
    }
}

/// Session middleware for JSON routes
///
/// Same resolution as the browser flavor, but anonymous callers get a
/// 401 body instead of a redirect.
async fn session_auth_api_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    match resolve_current_user(&state, req.headers()).await? {
        Some(current) => {
            req.extensions_mut().insert(current);
            Ok(next.run(req).await)
        }
        None => Err(ApiError::Unauthenticated),
    }
}
