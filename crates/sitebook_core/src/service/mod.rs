//! Core use-case services.
//!
//! # Responsibility
//! - Own the in-memory project registry and its snapshot format.
//! - Layer persistence on top without leaking storage into the registry.

pub mod project_manager;
pub mod project_service;
pub mod snapshot;
