//! Core logic for GradTrack, a personal graduate-application tracker.
//! This crate owns the records, their persistence and the view state.

pub mod auth;
pub mod config;
pub mod db;
pub mod editor;
pub mod logging;
pub mod model;
pub mod repo;
pub mod stats;
pub mod store;
pub mod view;

pub use auth::{AuthFlags, AuthOutcome, PasswordGate};
pub use config::{AppConfig, BackendChoice, ConfigError};
pub use editor::draft::{ApplicationDraft, ApplicationEditor, EditorError, Field, FieldErrors};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::application::{
    Application, ApplicationId, ApplicationPatch, ApplicationValidationError, ChecklistStep,
    EtatSet, NewApplication, Status, StepId,
};
pub use repo::backend::{ApplicationBackend, BackendKind, RepoError, RepoResult};
pub use repo::json_repo::JsonFileBackend;
pub use repo::row::ApplicationRow;
pub use repo::sqlite_repo::SqliteTableBackend;
pub use stats::{status_counts, ChecklistProgress};
pub use store::application_store::{ApplicationStore, StoreError, StoreResult};
pub use view::delete_confirm::{DeleteClick, DeleteConfirm, DEFAULT_CONFIRM_TIMEOUT};
pub use view::list_view::{DeleteOutcome, ListView};
pub use view::sort::{natural_cmp, SortDirection, SortKey, SortState};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
