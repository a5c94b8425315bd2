/// Shared test harness for the API integration tests
///
/// Spins up the full router over an in-memory SQLite database, so the
/// suite exercises real queries without an external store. Helpers
/// drive the browser flow: register, log in, capture the session
/// cookie, and submit forms the way a browser would.
use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use sqlx::SqlitePool;
use tasknest_api::app::{build_router, AppState};
use tasknest_api::config::{ApiConfig, Config, DatabaseConfig, SessionConfig};
use tasknest_shared::db::migrations::run_migrations;
use tasknest_shared::db::pool::{create_pool, DatabaseConfig as PoolConfig};
use tower::Service as _;

pub struct TestContext {
    pub app: Router,
    pub db: SqlitePool,
}

impl TestContext {
    pub async fn new() -> anyhow::Result<Self> {
        // One connection: each :memory: connection is its own database.
        let db = create_pool(PoolConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            ..Default::default()
        })
        .await?;

        run_migrations(&db).await?;

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
            },
            session: SessionConfig { ttl_hours: 1 },
        };

        let app = build_router(AppState::new(db.clone(), config));

        Ok(Self { app, db })
    }

    pub async fn call(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().call(request).await.unwrap()
    }

    /// Submits the registration form
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Response<Body> {
        let body = format!("username={username}&email={email}&password={password}");
        let request = Request::builder()
            .method("POST")
            .uri("/register")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();

        self.call(request).await
    }

    /// Submits the login form, returning the session cookie on success
    pub async fn login(&self, username: &str, password: &str) -> Option<String> {
        let body = format!("username={username}&password={password}");
        let request = Request::builder()
            .method("POST")
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();

        let response = self.call(request).await;
        if response.status() != StatusCode::SEE_OTHER {
            return None;
        }

        session_cookie(&response)
    }

    /// Registers and logs in, returning the session cookie
    pub async fn signup(&self, username: &str, email: &str, password: &str) -> String {
        let response = self.register(username, email, password).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "registration failed");
        self.login(username, password).await.expect("login failed")
    }

    /// Posts a form to an authenticated endpoint
    pub async fn post_form(&self, cookie: &str, uri: &str, body: String) -> Response<Body> {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(header::COOKIE, cookie)
            .body(Body::from(body))
            .unwrap();

        self.call(request).await
    }

    /// Gets an authenticated endpoint
    pub async fn get(&self, cookie: &str, uri: &str) -> Response<Body> {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap();

        self.call(request).await
    }

    /// Adds a task through the form endpoint and asserts the redirect
    pub async fn add_task(&self, cookie: &str, title: &str, priority: &str, due_date: &str) {
        let body =
            format!("title={title}&description=&priority={priority}&due_date={due_date}");
        let response = self.post_form(cookie, "/add_task", body).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    /// Fetches the dashboard view model
    pub async fn dashboard(&self, cookie: &str) -> serde_json::Value {
        let response = self.get(cookie, "/dashboard").await;
        assert_eq!(response.status(), StatusCode::OK);
        json_body(response).await
    }
}

/// Extracts the `session=...` pair from a response's Set-Cookie headers
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("session=") && !v.starts_with("session=;"))
        .and_then(|v| v.split(';').next())
        .map(|v| v.to_string())
}

/// Collects the first Set-Cookie header that names the flash cookie
pub fn flash_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("flash="))
        .map(|v| v.to_string())
}

/// Reads a response body as JSON
pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
