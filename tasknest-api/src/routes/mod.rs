/// HTTP route handlers
///
/// This module contains all route handlers organized by concern:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, logout
/// - `tasks`: Task mutations (add, update, delete, toggle)
/// - `pages`: Browser views (landing, dashboard, filtered list)
pub mod auth;
pub mod health;
pub mod pages;
pub mod tasks;
