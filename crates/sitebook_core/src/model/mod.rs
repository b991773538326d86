//! Domain model for projects and their to-do tasks.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Hold the pure validation rules shared by every write path.
//!
//! # Invariants
//! - Every project and task is identified by a stable opaque id.
//! - A task belongs to exactly one project and is reachable only through it.

pub mod project;
pub mod task;
pub mod validation;
