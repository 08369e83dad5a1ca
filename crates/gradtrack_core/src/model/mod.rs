//! Domain model for tracked graduate-program applications.
//!
//! # Responsibility
//! - Define the canonical record shared by store, views and backends.
//! - Own the status vocabulary and the checklist step shape.
//!
//! # Invariants
//! - Every application is identified by a stable, non-nil `ApplicationId`.
//! - A saved application always carries at least one status.

pub mod application;
