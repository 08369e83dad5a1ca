//! Persistence contract shared by every application backend.
//!
//! # Responsibility
//! - Define the four operations the store relies on.
//! - Define the error vocabulary backends report to the store.
//!
//! # Invariants
//! - `insert` and `update` return the stored representation, which is the
//!   only value the store may put into its mirror.
//! - Write paths call `Application::validate()` before touching storage.

use crate::db::DbError;
use crate::model::application::{Application, ApplicationId, ApplicationValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error reported by a persistence backend.
#[derive(Debug)]
pub enum RepoError {
    Validation(ApplicationValidationError),
    Db(DbError),
    Io(std::io::Error),
    Json(serde_json::Error),
    NotFound(ApplicationId),
    Conflict(ApplicationId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "storage i/o failed: {err}"),
            Self::Json(err) => write!(f, "storage encoding failed: {err}"),
            Self::NotFound(id) => write!(f, "application not found: {id}"),
            Self::Conflict(id) => write!(f, "application already exists: {id}"),
            Self::InvalidData(message) => write!(f, "invalid stored application: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::NotFound(_) | Self::Conflict(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<ApplicationValidationError> for RepoError {
    fn from(value: ApplicationValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<std::io::Error> for RepoError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Which storage flavor a backend implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Single JSON blob rewritten on every mutation. Loads never fail.
    Local,
    /// Row-oriented table; every call can fail and is reported.
    Table,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Table => "table",
        }
    }
}

/// Storage capability behind the application store.
pub trait ApplicationBackend {
    fn kind(&self) -> BackendKind;
    /// All records, newest `created_at` first, ties broken by id.
    fn fetch_all(&self) -> RepoResult<Vec<Application>>;
    /// Persists a new record and returns its stored form.
    fn insert(&self, app: &Application) -> RepoResult<Application>;
    /// Replaces the record with the same id and returns its stored form.
    fn update(&self, app: &Application) -> RepoResult<Application>;
    fn delete(&self, id: ApplicationId) -> RepoResult<()>;
}

impl<B: ApplicationBackend + ?Sized> ApplicationBackend for Box<B> {
    fn kind(&self) -> BackendKind {
        (**self).kind()
    }

    fn fetch_all(&self) -> RepoResult<Vec<Application>> {
        (**self).fetch_all()
    }

    fn insert(&self, app: &Application) -> RepoResult<Application> {
        (**self).insert(app)
    }

    fn update(&self, app: &Application) -> RepoResult<Application> {
        (**self).update(app)
    }

    fn delete(&self, id: ApplicationId) -> RepoResult<()> {
        (**self).delete(id)
    }
}

/// Canonical listing order shared by both backends.
pub(crate) fn sort_newest_first(apps: &mut [Application]) {
    apps.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
}
