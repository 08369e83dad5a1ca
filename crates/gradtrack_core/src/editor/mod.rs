//! Detail editor: form validation and checklist editing for one record.
//!
//! # Responsibility
//! - Stage edits to one application and commit them through the store.
//! - Refuse to call the store while the form is invalid.

pub mod checklist;
pub mod draft;
