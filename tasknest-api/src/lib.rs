//! # TaskNest API Server Library
//!
//! This library provides the core functionality for the TaskNest API
//! server: a single-user-session task tracker with cookie-based
//! authentication.
//!
//! ## Modules
//!
//! - `app`: Application state, router, and session middleware
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `flash`: Flash-notice cookie helpers
//! - `routes`: HTTP route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod flash;
pub mod routes;
