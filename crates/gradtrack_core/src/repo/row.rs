//! Snake_case table row shape and its mapping to the camelCase model.
//!
//! # Invariants
//! - `etat` and `checklist` travel as JSON text columns.
//! - Dates travel as `YYYY-MM-DD`, timestamps as fixed-width RFC 3339 so that
//!   text ordering of `created_at` matches time ordering.
//! - Mapping a model to a row and back is lossless.

use crate::model::application::{Application, EtatSet, DATE_FORMAT};
use crate::repo::backend::{RepoError, RepoResult};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One row of the `applications` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRow {
    pub id: String,
    pub uni: String,
    pub formation: String,
    pub ville: String,
    pub campus: String,
    pub mail: String,
    pub etat: String,
    pub site: String,
    pub date_applied: Option<String>,
    pub deadline: Option<String>,
    pub notes: String,
    pub checklist: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl ApplicationRow {
    pub fn from_application(app: &Application) -> RepoResult<Self> {
        Ok(Self {
            id: app.id.to_string(),
            uni: app.uni.clone(),
            formation: app.formation.clone(),
            ville: app.ville.clone(),
            campus: app.campus.clone(),
            mail: app.mail.clone(),
            etat: serde_json::to_string(&app.etat)?,
            site: app.site.clone(),
            date_applied: app.date_applied.map(format_date),
            deadline: app.deadline.map(format_date),
            notes: app.notes.clone(),
            checklist: serde_json::to_string(&app.checklist)?,
            created_at: format_timestamp(app.created_at),
            updated_at: app.updated_at.map(format_timestamp),
        })
    }

    pub fn into_application(self) -> RepoResult<Application> {
        let id = Uuid::parse_str(&self.id).map_err(|_| {
            RepoError::InvalidData(format!("invalid uuid value `{}` in applications.id", self.id))
        })?;
        let etat: EtatSet = serde_json::from_str(&self.etat).map_err(|err| {
            RepoError::InvalidData(format!("invalid etat in applications.etat: {err}"))
        })?;
        let checklist = serde_json::from_str(&self.checklist).map_err(|err| {
            RepoError::InvalidData(format!("invalid checklist in applications.checklist: {err}"))
        })?;

        Ok(Application {
            id,
            uni: self.uni,
            formation: self.formation,
            ville: self.ville,
            campus: self.campus,
            mail: self.mail,
            site: self.site,
            notes: self.notes,
            etat,
            date_applied: parse_date_column(self.date_applied, "date_applied")?,
            deadline: parse_date_column(self.deadline, "deadline")?,
            checklist,
            created_at: parse_timestamp(&self.created_at, "created_at")?,
            updated_at: self
                .updated_at
                .map(|value| parse_timestamp(&value, "updated_at"))
                .transpose()?,
        })
    }
}

pub(crate) fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn format_date(value: NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

fn parse_date_column(value: Option<String>, column: &str) -> RepoResult<Option<NaiveDate>> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => NaiveDate::parse_from_str(text, DATE_FORMAT)
            .map(Some)
            .map_err(|_| {
                RepoError::InvalidData(format!("invalid date `{text}` in applications.{column}"))
            }),
    }
}

fn parse_timestamp(value: &str, column: &str) -> RepoResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| {
            RepoError::InvalidData(format!("invalid timestamp `{value}` in applications.{column}"))
        })
}

#[cfg(test)]
mod tests {
    use super::ApplicationRow;
    use crate::model::application::{ChecklistStep, NewApplication, Status};
    use crate::repo::backend::RepoError;
    use chrono::{NaiveDate, TimeZone, Utc};
    use uuid::Uuid;

    #[test]
    fn row_uses_snake_case_columns_and_maps_back() {
        let mut fields = NewApplication::new("Lyon 1", "M1 Data", Status::Submitted);
        fields.date_applied = NaiveDate::from_ymd_opt(2025, 2, 3);
        fields.checklist.push(ChecklistStep::new("Send transcript"));
        let app = fields.into_application(
            Uuid::new_v4(),
            Utc.with_ymd_and_hms(2025, 2, 3, 8, 30, 0).unwrap(),
        );

        let row = ApplicationRow::from_application(&app).unwrap();
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["date_applied"], "2025-02-03");
        assert_eq!(json["created_at"], "2025-02-03T08:30:00.000000000Z");
        assert_eq!(json["etat"], "[\"Candidature envoyée\"]");
        assert!(json.get("dateApplied").is_none());

        assert_eq!(row.into_application().unwrap(), app);
    }

    #[test]
    fn bad_uuid_is_reported_as_invalid_data() {
        let app = NewApplication::new("A", "B", Status::Pending)
            .into_application(Uuid::new_v4(), Utc::now());
        let mut row = ApplicationRow::from_application(&app).unwrap();
        row.id = "not-a-uuid".to_string();

        let err = row.into_application().unwrap_err();
        assert!(matches!(err, RepoError::InvalidData(message) if message.contains("applications.id")));
    }
}
