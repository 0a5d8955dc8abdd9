//! # worklog-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **JSON management API** for rules and their execution history
//!   (`/api/rules`, `/api/executions`)
//! - Accept host events on `POST /api/events` and hand them to the
//!   dispatcher, synchronously or detached
//! - Map application errors into HTTP status codes
//!
//! ## Dependency rule
//! Depends on `worklog-app` (for port traits and services) and `worklog-domain`
//! (for domain types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
