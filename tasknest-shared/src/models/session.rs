/// Session model and database operations
///
/// Login sessions live server-side; the browser only holds the opaque
/// token whose SHA-256 digest is stored here. Expired rows are treated
/// as anonymous and swept opportunistically at startup.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE sessions (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     token_hash TEXT NOT NULL UNIQUE,
///     user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TEXT NOT NULL,
///     expires_at TEXT NOT NULL
/// );
/// ```
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// A server-side login session
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    /// Unique session ID
    pub id: i64,

    /// SHA-256 hex digest of the cookie token
    pub token_hash: String,

    /// The authenticated user
    pub user_id: i64,

    /// When the session was established
    pub created_at: DateTime<Utc>,

    /// When the session stops being honored
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Creates a session for a user with the given lifetime
    pub async fn create(
        pool: &SqlitePool,
        user_id: i64,
        token_hash: &str,
        ttl: Duration,
    ) -> Result<Self, sqlx::Error> {
        let now = Utc::now();
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (token_hash, user_id, created_at, expires_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, token_hash, user_id, created_at, expires_at
            "#,
        )
        .bind(token_hash)
        .bind(user_id)
        .bind(now)
        .bind(now + ttl)
        .fetch_one(pool)
        .await?;

        Ok(session)
    }

    /// Resolves a token digest to a live session
    ///
    /// Returns `None` for unknown tokens and for sessions that have
    /// expired as of `now`.
    pub async fn find_valid(
        pool: &SqlitePool,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, token_hash, user_id, created_at, expires_at
            FROM sessions
            WHERE token_hash = ? AND expires_at > ?
            "#,
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(pool)
        .await?;

        Ok(session)
    }

    /// Invalidates the session for a token digest
    ///
    /// Idempotent: deleting an unknown or already-removed token is not
    /// an error. Returns whether a row was removed.
    pub async fn delete_by_token(pool: &SqlitePool, token_hash: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
            .bind(token_hash)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes all sessions that expired before `now`
    ///
    /// Returns the number of rows swept.
    pub async fn purge_expired(pool: &SqlitePool, now: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(now)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::db::pool::{create_pool, DatabaseConfig};
    use crate::models::user::{CreateUser, User};

    async fn test_pool() -> SqlitePool {
        let pool = create_pool(DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            ..Default::default()
        })
        .await
        .unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    async fn test_user(pool: &SqlitePool) -> User {
        User::create(
            pool,
            CreateUser {
                username: "alice".to_string(),
                email: "a@x.com".to_string(),
                password_hash: "$argon2id$fake".to_string(),
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_resolve() {
        let pool = test_pool().await;
        let user = test_user(&pool).await;

        let session = Session::create(&pool, user.id, "digest-1", Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(session.user_id, user.id);

        let found = Session::find_valid(&pool, "digest-1", Utc::now()).await.unwrap();
        assert_eq!(found.map(|s| s.id), Some(session.id));

        let unknown = Session::find_valid(&pool, "digest-2", Utc::now()).await.unwrap();
        assert!(unknown.is_none());
    }

    #[tokio::test]
    async fn test_expired_session_is_anonymous() {
        let pool = test_pool().await;
        let user = test_user(&pool).await;

        Session::create(&pool, user.id, "digest-1", Duration::hours(1))
            .await
            .unwrap();

        let later = Utc::now() + Duration::hours(2);
        let found = Session::find_valid(&pool, "digest-1", later).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let pool = test_pool().await;
        let user = test_user(&pool).await;

        Session::create(&pool, user.id, "digest-1", Duration::hours(1))
            .await
            .unwrap();

        assert!(Session::delete_by_token(&pool, "digest-1").await.unwrap());
        assert!(!Session::delete_by_token(&pool, "digest-1").await.unwrap());
        assert!(!Session::delete_by_token(&pool, "never-existed").await.unwrap());
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let pool = test_pool().await;
        let user = test_user(&pool).await;

        Session::create(&pool, user.id, "live", Duration::hours(1))
            .await
            .unwrap();
        Session::create(&pool, user.id, "dead", Duration::hours(1))
            .await
            .unwrap();

        // Neither session has expired half an hour in.
        let later = Utc::now() + Duration::minutes(30);
        let purged = Session::purge_expired(&pool, later).await.unwrap();
        assert_eq!(purged, 0);

        let much_later = Utc::now() + Duration::hours(2);
        let purged = Session::purge_expired(&pool, much_later).await.unwrap();
        assert_eq!(purged, 2);
    }
}
