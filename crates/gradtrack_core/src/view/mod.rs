//! List view: sorting, search, delete confirmation and display helpers.

pub mod delete_confirm;
pub mod display;
pub mod filter;
pub mod list_view;
pub mod sort;
