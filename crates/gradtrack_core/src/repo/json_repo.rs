//! Local backend: one JSON array file holding every application.
//!
//! # Responsibility
//! - Load the whole blob and rewrite it on every mutation.
//!
//! # Invariants
//! - A missing or unparsable blob loads as an empty list, never as an error.
//! - Writes replace the file atomically through a sibling temp file.

use crate::model::application::{Application, ApplicationId};
use crate::repo::backend::{
    sort_newest_first, ApplicationBackend, BackendKind, RepoError, RepoResult,
};
use chrono::Utc;
use log::warn;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File name of the blob inside the data directory.
pub const STORAGE_FILE_NAME: &str = "masters_applications.json";

/// JSON-file backed local backend.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backend storing its blob as `STORAGE_FILE_NAME` under `data_dir`.
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join(STORAGE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_blob(&self) -> Vec<Application> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(err) => {
                warn!("event=blob_load module=repo status=error error_code=read_failed error={err}");
                return Vec::new();
            }
        };

        if raw.trim().is_empty() {
            return Vec::new();
        }

        match serde_json::from_str::<Vec<Application>>(&raw) {
            Ok(apps) => apps,
            Err(err) => {
                warn!("event=blob_load module=repo status=error error_code=parse_failed error={err}");
                Vec::new()
            }
        }
    }

    fn store_blob(&self, apps: &[Application]) -> RepoResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let encoded = serde_json::to_vec(apps)?;
        let mut tmp_name = self.path.clone().into_os_string();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        fs::write(&tmp_path, encoded)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl ApplicationBackend for JsonFileBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    fn fetch_all(&self) -> RepoResult<Vec<Application>> {
        let mut apps = self.load_blob();
        sort_newest_first(&mut apps);
        Ok(apps)
    }

    fn insert(&self, app: &Application) -> RepoResult<Application> {
        app.validate()?;

        let mut apps = self.load_blob();
        if apps.iter().any(|existing| existing.id == app.id) {
            return Err(RepoError::Conflict(app.id));
        }

        let mut stored = app.clone();
        stored.updated_at = Some(Utc::now());
        apps.insert(0, stored.clone());
        self.store_blob(&apps)?;
        Ok(stored)
    }

    fn update(&self, app: &Application) -> RepoResult<Application> {
        app.validate()?;

        let mut apps = self.load_blob();
        let slot = apps
            .iter_mut()
            .find(|existing| existing.id == app.id)
            .ok_or(RepoError::NotFound(app.id))?;

        let mut stored = app.clone();
        stored.created_at = slot.created_at;
        stored.updated_at = Some(Utc::now());
        *slot = stored.clone();

        self.store_blob(&apps)?;
        Ok(stored)
    }

    fn delete(&self, id: ApplicationId) -> RepoResult<()> {
        let mut apps = self.load_blob();
        let before = apps.len();
        apps.retain(|existing| existing.id != id);
        if apps.len() == before {
            return Err(RepoError::NotFound(id));
        }

        self.store_blob(&apps)
    }
}

#[cfg(test)]
mod tests {
    use super::{JsonFileBackend, STORAGE_FILE_NAME};
    use crate::model::application::{NewApplication, Status};
    use crate::repo::backend::{ApplicationBackend, RepoError};
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn missing_and_corrupt_blobs_load_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::in_dir(dir.path());
        assert!(backend.fetch_all().unwrap().is_empty());

        std::fs::write(dir.path().join(STORAGE_FILE_NAME), "{not json").unwrap();
        assert!(backend.fetch_all().unwrap().is_empty());
    }

    #[test]
    fn legacy_blob_with_scalar_status_and_blank_dates_loads() {
        let dir = tempfile::tempdir().unwrap();
        let id = Uuid::new_v4();
        let blob = format!(
            r#"[{{"id":"{id}","uni":"Rennes","formation":"M2","etat":"Accepté","dateApplied":"","createdAt":"2024-11-02T10:00:00.000Z"}}]"#
        );
        std::fs::write(dir.path().join(STORAGE_FILE_NAME), blob).unwrap();

        let apps = JsonFileBackend::in_dir(dir.path()).fetch_all().unwrap();
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].id, id);
        assert!(apps[0].etat.contains(Status::Accepted));
        assert_eq!(apps[0].date_applied, None);
        assert!(apps[0].checklist.is_empty());
    }

    #[test]
    fn mutations_rewrite_the_blob() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::in_dir(dir.path());
        let app = NewApplication::new("Lille", "M1", Status::Pending)
            .into_application(Uuid::new_v4(), Utc::now());

        let stored = backend.insert(&app).unwrap();
        assert!(stored.updated_at.is_some());
        assert!(matches!(backend.insert(&app), Err(RepoError::Conflict(_))));

        let raw = std::fs::read_to_string(backend.path()).unwrap();
        assert!(raw.contains("\"createdAt\""));
        assert!(raw.contains("\"formation\":\"M1\""));

        backend.delete(app.id).unwrap();
        assert!(backend.fetch_all().unwrap().is_empty());
        assert!(matches!(
            backend.delete(app.id),
            Err(RepoError::NotFound(id)) if id == app.id
        ));
    }
}
