/// Authentication primitives for TaskNest
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`session`]: Session token generation and digest hashing
///
/// # Example
///
/// ```
/// use tasknest_shared::auth::password::{hash_password, verify_password};
/// use tasknest_shared::auth::session::generate_session_token;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let (token, digest) = generate_session_token();
/// assert_ne!(token, digest);
/// # Ok(())
/// # }
/// ```
pub mod password;
pub mod session;
