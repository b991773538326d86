//! Persistence collaborators.
//!
//! # Responsibility
//! - Define the storage-agnostic record store contract.
//! - Isolate SQLite details from service orchestration.
//!
//! # Invariants
//! - The in-memory manager never depends on this layer; only the project
//!   service writes through it.

pub mod record_store;
