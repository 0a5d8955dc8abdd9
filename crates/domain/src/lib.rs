//! # worklog-domain
//!
//! Pure domain model for the worklog workflow automation engine.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Rules** (trigger type → conditions → actions)
//! - Define **Events** (a trigger type plus a path-addressable payload)
//! - Define **Executions** (the audit record of one matched rule)
//! - Evaluate condition clauses against event payloads
//! - Resolve `{{dotted.path}}` templates against a context map
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod event;
pub mod execution;
pub mod path;
pub mod rule;
pub mod template;
