//! Application store: the in-memory mirror kept in step with a backend.
//!
//! # Responsibility
//! - Orchestrate backend calls into list/add/update/remove use-cases.
//! - Keep views decoupled from storage details.

pub mod application_store;
