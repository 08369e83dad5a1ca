//! In-memory mirror of persisted applications.
//!
//! # Responsibility
//! - Expose `list`, `loading`, `error` and the three mutation operations.
//! - Keep the mirror equal to what the backend last acknowledged.
//!
//! # Invariants
//! - The mirror is only written with records returned by the backend.
//! - A failed mutation leaves the mirror exactly as it was.
//! - `loading` is true only while the full fetch is running. Backends are
//!   synchronous and `load` holds `&mut self`, so callers always read `false`.

use crate::model::application::{Application, ApplicationId, ApplicationPatch, NewApplication};
use crate::repo::backend::{ApplicationBackend, BackendKind, RepoError};
use chrono::Utc;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level error.
#[derive(Debug)]
pub enum StoreError {
    /// Target id is not present in the mirror.
    NotFound(ApplicationId),
    /// Backend rejected the call.
    Backend(RepoError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "application not found: {id}"),
            Self::Backend(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Backend(err) => Some(err),
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Backend(other),
        }
    }
}

/// Application store over one persistence backend.
pub struct ApplicationStore<B: ApplicationBackend> {
    backend: B,
    mirror: Vec<Application>,
    loading: bool,
    error: Option<String>,
}

impl<B: ApplicationBackend> ApplicationStore<B> {
    /// Creates a store with an empty mirror. Call [`Self::load`] to fill it.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            mirror: Vec::new(),
            loading: false,
            error: None,
        }
    }

    /// Creates a store and runs the initial fetch.
    ///
    /// A failed fetch is kept in [`Self::error`] rather than returned, so the
    /// caller can still render a banner over an empty list.
    pub fn open(backend: B) -> Self {
        let mut store = Self::new(backend);
        let _ = store.load();
        store
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Current mirror, newest first unless a mutation inserted at the front.
    pub fn list(&self) -> &[Application] {
        &self.mirror
    }

    pub fn get(&self, id: ApplicationId) -> Option<&Application> {
        self.mirror.iter().find(|app| app.id == id)
    }

    pub fn len(&self) -> usize {
        self.mirror.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mirror.is_empty()
    }

    /// Whether a full fetch is in progress.
    ///
    /// Always `false` from the caller's side with the synchronous backends:
    /// the flag is raised and lowered inside one `load` call. It only carries
    /// information for a caller that drives fetches asynchronously.
    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Last full-fetch error, cleared by the next successful fetch.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Replaces the mirror with a full fetch from the backend.
    pub fn load(&mut self) -> StoreResult<()> {
        self.loading = true;
        let result = self.backend.fetch_all();
        self.loading = false;

        match result {
            Ok(apps) => {
                info!(
                    "event=store_load module=store status=ok backend={} count={}",
                    self.backend.kind().as_str(),
                    apps.len()
                );
                self.mirror = apps;
                self.error = None;
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=store_load module=store status=error backend={} error={err}",
                    self.backend.kind().as_str()
                );
                self.error = Some(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Creates a record with generated identity and puts it first in the mirror.
    pub fn add(&mut self, fields: NewApplication) -> StoreResult<Application> {
        let candidate = fields.into_application(Uuid::new_v4(), Utc::now());

        match self.backend.insert(&candidate) {
            Ok(stored) => {
                info!("event=store_add module=store status=ok id={}", stored.id);
                self.mirror.insert(0, stored.clone());
                Ok(stored)
            }
            Err(err) => {
                error!(
                    "event=store_add module=store status=error id={} error={err}",
                    candidate.id
                );
                Err(err.into())
            }
        }
    }

    /// Merges `patch` onto the mirrored record and persists the result.
    ///
    /// The merge reads the mirror at call time. On failure the error is logged
    /// and returned, and the mirror keeps its previous value.
    pub fn update(&mut self, id: ApplicationId, patch: ApplicationPatch) -> StoreResult<Application> {
        let Some(index) = self.position(id) else {
            error!("event=store_update module=store status=error id={id} error_code=not_found");
            return Err(StoreError::NotFound(id));
        };

        let merged = patch.merged_onto(&self.mirror[index]);
        match self.backend.update(&merged) {
            Ok(stored) => {
                info!("event=store_update module=store status=ok id={id}");
                self.mirror[index] = stored.clone();
                Ok(stored)
            }
            Err(err) => {
                error!("event=store_update module=store status=error id={id} error={err}");
                Err(err.into())
            }
        }
    }

    /// Deletes the record from the backend, then from the mirror.
    pub fn remove(&mut self, id: ApplicationId) -> StoreResult<()> {
        if let Err(err) = self.backend.delete(id) {
            error!("event=store_remove module=store status=error id={id} error={err}");
            return Err(err.into());
        }

        info!("event=store_remove module=store status=ok id={id}");
        self.mirror.retain(|app| app.id != id);
        Ok(())
    }

    fn position(&self, id: ApplicationId) -> Option<usize> {
        self.mirror.iter().position(|app| app.id == id)
    }
}
