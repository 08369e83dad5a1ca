//! Form state and validation for creating or editing one application.
//!
//! # Invariants
//! - `save` never calls the store while any field is invalid.
//! - Validation reports every invalid field at once.
//! - Editing never rewrites the checklist; that goes through `checklist`.

use crate::model::application::{
    parse_optional_date, Application, ApplicationId, ApplicationPatch, EtatSet, NewApplication,
    Status, DATE_FORMAT,
};
use crate::repo::backend::ApplicationBackend;
use crate::store::application_store::{ApplicationStore, StoreError};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Form field that can fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Uni,
    Formation,
    Etat,
    DateApplied,
    Deadline,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Self::Uni => "uni",
            Self::Formation => "formation",
            Self::Etat => "etat",
            Self::DateApplied => "dateApplied",
            Self::Deadline => "deadline",
        }
    }
}

/// Set of fields marked invalid by the last validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeSet<Field>);

impl FieldErrors {
    pub fn contains(&self, field: Field) -> bool {
        self.0.contains(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.iter().copied()
    }

    fn mark(&mut self, field: Field) {
        self.0.insert(field);
    }

    fn clear(&mut self, field: Field) {
        self.0.remove(&field);
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let names = self.iter().map(Field::name).collect::<Vec<_>>().join(", ");
        write!(f, "invalid fields: {names}")
    }
}

#[derive(Debug)]
pub enum EditorError {
    /// Form did not validate; the store was not called.
    Invalid(FieldErrors),
    /// Store rejected the save.
    Store(StoreError),
}

impl Display for EditorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(errors) => write!(f, "{errors}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EditorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(_) => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for EditorError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Raw form values, as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationDraft {
    pub uni: String,
    pub formation: String,
    pub ville: String,
    pub campus: String,
    pub mail: String,
    pub site: String,
    pub notes: String,
    pub etat: EtatSet,
    /// `YYYY-MM-DD` or blank.
    pub date_applied: String,
    /// `YYYY-MM-DD` or blank.
    pub deadline: String,
}

impl Default for ApplicationDraft {
    /// Empty form; new applications start as pending.
    fn default() -> Self {
        Self {
            uni: String::new(),
            formation: String::new(),
            ville: String::new(),
            campus: String::new(),
            mail: String::new(),
            site: String::new(),
            notes: String::new(),
            etat: EtatSet::single(Status::Pending),
            date_applied: String::new(),
            deadline: String::new(),
        }
    }
}

impl ApplicationDraft {
    /// Seeds the form from an existing record.
    pub fn from_application(app: &Application) -> Self {
        let format = |date: Option<chrono::NaiveDate>| {
            date.map(|value| value.format(DATE_FORMAT).to_string())
                .unwrap_or_default()
        };
        Self {
            uni: app.uni.clone(),
            formation: app.formation.clone(),
            ville: app.ville.clone(),
            campus: app.campus.clone(),
            mail: app.mail.clone(),
            site: app.site.clone(),
            notes: app.notes.clone(),
            etat: app.etat.clone(),
            date_applied: format(app.date_applied),
            deadline: format(app.deadline),
        }
    }

    /// Checks required fields and dates, collecting every failure.
    pub fn validate(&self) -> Result<NewApplication, FieldErrors> {
        let mut errors = FieldErrors::default();

        if self.uni.trim().is_empty() {
            errors.mark(Field::Uni);
        }
        if self.formation.trim().is_empty() {
            errors.mark(Field::Formation);
        }
        if self.etat.is_empty() {
            errors.mark(Field::Etat);
        }
        let date_applied = parse_optional_date(&self.date_applied).unwrap_or_else(|_| {
            errors.mark(Field::DateApplied);
            None
        });
        let deadline = parse_optional_date(&self.deadline).unwrap_or_else(|_| {
            errors.mark(Field::Deadline);
            None
        });

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewApplication {
            uni: self.uni.clone(),
            formation: self.formation.clone(),
            ville: self.ville.clone(),
            campus: self.campus.clone(),
            mail: self.mail.clone(),
            site: self.site.clone(),
            notes: self.notes.clone(),
            etat: self.etat.clone(),
            date_applied,
            deadline,
            checklist: Vec::new(),
        })
    }
}

/// Editor for one new or existing application.
#[derive(Debug, Clone)]
pub struct ApplicationEditor {
    existing: Option<ApplicationId>,
    pub draft: ApplicationDraft,
    errors: FieldErrors,
}

impl ApplicationEditor {
    /// Editor for a record that does not exist yet.
    pub fn create() -> Self {
        Self {
            existing: None,
            draft: ApplicationDraft::default(),
            errors: FieldErrors::default(),
        }
    }

    /// Editor seeded from an existing record.
    pub fn edit(app: &Application) -> Self {
        Self {
            existing: Some(app.id),
            draft: ApplicationDraft::from_application(app),
            errors: FieldErrors::default(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.existing.is_none()
    }

    /// Fields marked invalid by the last failed save.
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Adds or removes one status, clearing a pending status error.
    pub fn toggle_status(&mut self, status: Status) {
        self.draft.etat.toggle(status);
        self.errors.clear(Field::Etat);
    }

    /// Validates and commits through `add` or `update`.
    ///
    /// On success the editor is done and the caller should drop it. On an
    /// invalid form the offending fields are kept in [`Self::errors`] and the
    /// draft is untouched, so the user can fix and resubmit.
    pub fn save<B: ApplicationBackend>(
        &mut self,
        store: &mut ApplicationStore<B>,
    ) -> Result<Application, EditorError> {
        let fields = match self.draft.validate() {
            Ok(fields) => fields,
            Err(errors) => {
                self.errors = errors.clone();
                return Err(EditorError::Invalid(errors));
            }
        };
        self.errors = FieldErrors::default();

        let saved = match self.existing {
            None => store.add(fields)?,
            Some(id) => {
                let mut patch = ApplicationPatch::full(fields);
                patch.checklist = None;
                store.update(id, patch)?
            }
        };
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::{ApplicationDraft, Field};
    use crate::model::application::Status;

    #[test]
    fn default_draft_starts_pending() {
        let draft = ApplicationDraft::default();
        assert!(draft.etat.contains(Status::Pending));
        assert_eq!(draft.etat.len(), 1);
    }

    #[test]
    fn validate_collects_every_invalid_field() {
        let mut draft = ApplicationDraft::default();
        draft.uni = "  ".to_string();
        draft.etat.toggle(Status::Pending);
        draft.deadline = "31/02/2025".to_string();

        let errors = draft.validate().unwrap_err();
        assert!(errors.contains(Field::Uni));
        assert!(errors.contains(Field::Formation));
        assert!(errors.contains(Field::Etat));
        assert!(errors.contains(Field::Deadline));
        assert!(!errors.contains(Field::DateApplied));
        assert_eq!(errors.to_string(), "invalid fields: uni, formation, etat, deadline");
    }
}
