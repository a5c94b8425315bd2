/// Authentication endpoints
///
/// This module provides user registration, login, and logout.
///
/// # Endpoints
///
/// - `GET  /register` - Registration view descriptor
/// - `POST /register` - Create an account (form-encoded)
/// - `GET  /login`    - Login view descriptor
/// - `POST /login`    - Authenticate and establish a session
/// - `GET  /logout`   - Invalidate the session
///
/// Login and registration accept URL-encoded form bodies, as a browser
/// form submits them. On success they redirect; failures come back as
/// JSON errors with the matching status code so the (external) frontend
/// can re-render the form. Unknown-user and wrong-password failures
/// share one message.
use crate::{
    app::{AppState, CurrentUser},
    error::{ApiError, ApiResult, ValidationErrorDetail},
    flash,
};
use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    Extension, Form, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tasknest_shared::{
    auth::{password, session::generate_session_token},
    models::{
        session::Session,
        user::{CreateUser, User},
    },
};
use validator::Validate;

/// Registration form payload
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterForm {
    /// Login name
    #[validate(length(min = 1, max = 80, message = "Username must not be empty"))]
    pub username: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Plaintext password, hashed before storage
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Login form payload
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// Login name
    pub username: String,

    /// Plaintext password
    pub password: String,
}

/// Maps `validator` output onto the API's validation error shape
fn validation_errors(e: validator::ValidationErrors) -> ApiError {
    let errors: Vec<ValidationErrorDetail> = e
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| ValidationErrorDetail {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
            })
        })
        .collect();
    ApiError::ValidationError(errors)
}

/// Registration form view
pub async fn register_view() -> Json<serde_json::Value> {
    Json(json!({ "view": "register" }))
}

/// Register a new user
///
/// # Errors
///
/// - `409 Conflict`: username or email already taken
/// - `422 Unprocessable Entity`: validation failed
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> ApiResult<Response> {
    form.validate().map_err(validation_errors)?;

    // Friendly pre-checks; the UNIQUE constraints remain authoritative
    // if a concurrent registration slips in between.
    if User::find_by_username(&state.db, &form.username).await?.is_some() {
        return Err(ApiError::DuplicateUsername);
    }
    if User::find_by_email(&state.db, &form.email).await?.is_some() {
        return Err(ApiError::DuplicateEmail);
    }

    let password_hash = password::hash_password(&form.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: form.username,
            email: form.email,
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "User registered");

    Ok(flash::flash_redirect(
        "Registration successful! Please log in.",
        "/login",
    ))
}

/// Login form view
///
/// Registration redirects here with a flash notice; it is included in
/// the view model once and its cookie cleared.
pub async fn login_view(headers: HeaderMap) -> Response {
    let notice = flash::peek_flash(&headers);
    let had_notice = notice.is_some();

    let body = Json(json!({ "view": "login", "flash": notice }));

    if had_notice {
        flash::with_set_cookie(body, &flash::clear_flash_cookie())
    } else {
        body.into_response()
    }
}

/// Authenticate and establish a session
///
/// On success, stores a new session row and hands the browser the
/// opaque token in an HttpOnly cookie, then redirects to the
/// dashboard.
///
/// # Errors
///
/// - `401 Unauthorized`: unknown user or wrong password (one message
///   for both)
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> ApiResult<Response> {
    let user = User::find_by_username(&state.db, &form.username)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    let valid = password::verify_password(&form.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::InvalidCredentials);
    }

    let (token, token_hash) = generate_session_token();
    let ttl = state.config.session_ttl();
    Session::create(&state.db, user.id, &token_hash, ttl).await?;

    tracing::info!(user_id = user.id, "User logged in");

    let cookie = flash::session_cookie(&token, ttl.num_seconds());
    Ok(flash::with_set_cookie(Redirect::to("/dashboard"), &cookie))
}

/// End the current session
///
/// Deletes the session row and clears the cookie; harmless to repeat.
pub async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Response> {
    Session::delete_by_token(&state.db, &current.token_hash).await?;

    tracing::info!(user_id = current.user_id, "User logged out");

    Ok(flash::with_set_cookie(
        Redirect::to("/"),
        &flash::clear_session_cookie(),
    ))
}

/// Serialized user shape for view payloads, without the credential
#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_view_omits_credential() {
        let user = User {
            id: 1,
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            created_at: chrono::Utc::now(),
        };

        let view: UserView = user.into();
        let json = serde_json::to_string(&view).unwrap();
        assert!(json.contains("alice"));
        assert!(!json.contains("argon2id"));
    }

    #[test]
    fn test_register_form_validation() {
        let ok = RegisterForm {
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
            password: "longenough".to_string(),
        };
        assert!(ok.validate().is_ok());

        let empty_username = RegisterForm {
            username: String::new(),
            ..ok_form()
        };
        assert!(empty_username.validate().is_err());

        let bad_email = RegisterForm {
            email: "not-an-email".to_string(),
            ..ok_form()
        };
        assert!(bad_email.validate().is_err());

        let short_password = RegisterForm {
            password: "short".to_string(),
            ..ok_form()
        };
        assert!(short_password.validate().is_err());
    }

    fn ok_form() -> RegisterForm {
        RegisterForm {
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
            password: "longenough".to_string(),
        }
    }
}
