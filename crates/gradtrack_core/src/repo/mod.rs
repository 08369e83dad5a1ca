//! Persistence backends for the application store.
//!
//! # Responsibility
//! - Define the storage contract the store is written against.
//! - Provide the local (JSON blob) and table (SQLite) implementations.
//!
//! # Invariants
//! - Backends are interchangeable behind `ApplicationBackend`.
//! - The camelCase model and the snake_case table meet only in `row`.

pub mod backend;
pub mod json_repo;
pub mod row;
pub mod sqlite_repo;
