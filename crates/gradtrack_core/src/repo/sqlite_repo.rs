//! Table backend over the SQLite `applications` table.
//!
//! # Responsibility
//! - Provide row-level insert/update/delete keyed by `id`.
//! - Read every written row back so storage-computed columns reach the caller.
//!
//! # Invariants
//! - `updated_at` is computed by SQLite, never by the caller.
//! - Read paths reject undecodable rows instead of masking them.

use crate::model::application::{Application, ApplicationId};
use crate::repo::backend::{ApplicationBackend, BackendKind, RepoError, RepoResult};
use crate::repo::row::ApplicationRow;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};

const APPLICATION_SELECT_SQL: &str = "SELECT
    id,
    uni,
    formation,
    ville,
    campus,
    mail,
    etat,
    site,
    date_applied,
    deadline,
    notes,
    checklist,
    created_at,
    updated_at
FROM applications";

const NOW_SQL: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

/// SQLite-backed table backend.
pub struct SqliteTableBackend<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTableBackend<'conn> {
    /// Wraps a connection returned by `db::open_db*`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn get(&self, id: ApplicationId) -> RepoResult<Option<Application>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{APPLICATION_SELECT_SQL} WHERE id = ?1;"))?;
        let row = stmt
            .query_row([id.to_string()], read_row)
            .optional()?;
        row.map(ApplicationRow::into_application).transpose()
    }

    fn read_back(&self, id: ApplicationId) -> RepoResult<Application> {
        self.get(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("application {id} missing after write"))
        })
    }
}

impl ApplicationBackend for SqliteTableBackend<'_> {
    fn kind(&self) -> BackendKind {
        BackendKind::Table
    }

    fn fetch_all(&self) -> RepoResult<Vec<Application>> {
        let mut stmt = self.conn.prepare(&format!(
            "{APPLICATION_SELECT_SQL} ORDER BY created_at DESC, id ASC;"
        ))?;
        let rows = stmt.query_map([], read_row)?;

        let mut apps = Vec::new();
        for row in rows {
            apps.push(row?.into_application()?);
        }
        Ok(apps)
    }

    fn insert(&self, app: &Application) -> RepoResult<Application> {
        app.validate()?;
        let row = ApplicationRow::from_application(app)?;

        let result = self.conn.execute(
            &format!(
                "INSERT INTO applications (
                    id,
                    uni,
                    formation,
                    ville,
                    campus,
                    mail,
                    etat,
                    site,
                    date_applied,
                    deadline,
                    notes,
                    checklist,
                    created_at,
                    updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, {NOW_SQL});"
            ),
            params![
                row.id,
                row.uni,
                row.formation,
                row.ville,
                row.campus,
                row.mail,
                row.etat,
                row.site,
                row.date_applied,
                row.deadline,
                row.notes,
                row.checklist,
                row.created_at,
            ],
        );

        match result {
            Ok(_) => self.read_back(app.id),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(RepoError::Conflict(app.id))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn update(&self, app: &Application) -> RepoResult<Application> {
        app.validate()?;
        let row = ApplicationRow::from_application(app)?;

        // created_at is immutable: not part of the SET list.
        let changed = self.conn.execute(
            &format!(
                "UPDATE applications
                 SET
                    uni = ?1,
                    formation = ?2,
                    ville = ?3,
                    campus = ?4,
                    mail = ?5,
                    etat = ?6,
                    site = ?7,
                    date_applied = ?8,
                    deadline = ?9,
                    notes = ?10,
                    checklist = ?11,
                    updated_at = {NOW_SQL}
                 WHERE id = ?12;"
            ),
            params![
                row.uni,
                row.formation,
                row.ville,
                row.campus,
                row.mail,
                row.etat,
                row.site,
                row.date_applied,
                row.deadline,
                row.notes,
                row.checklist,
                row.id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(app.id));
        }

        self.read_back(app.id)
    }

    fn delete(&self, id: ApplicationId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM applications WHERE id = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<ApplicationRow> {
    Ok(ApplicationRow {
        id: row.get("id")?,
        uni: row.get("uni")?,
        formation: row.get("formation")?,
        ville: row.get("ville")?,
        campus: row.get("campus")?,
        mail: row.get("mail")?,
        etat: row.get("etat")?,
        site: row.get("site")?,
        date_applied: row.get("date_applied")?,
        deadline: row.get("deadline")?,
        notes: row.get("notes")?,
        checklist: row.get("checklist")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
