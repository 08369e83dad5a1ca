//! Application domain model.
//!
//! # Responsibility
//! - Define the canonical `Application` record and its camelCase wire shape.
//! - Provide status-set, checklist and partial-update helpers.
//!
//! # Invariants
//! - `id` is stable and never reused for another application.
//! - `etat` keeps selection order and never holds the same status twice.
//! - `created_at` is assigned once and never rewritten by updates.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier of one tracked application.
pub type ApplicationId = Uuid;

/// Stable identifier of one checklist step.
pub type StepId = Uuid;

/// Wire format for calendar dates (`YYYY-MM-DD`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Application stage label.
///
/// Serialized with the French labels used by stored data. Aliases cover the
/// label variants written by older builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "En attente")]
    Pending,
    #[serde(rename = "Candidature envoyée", alias = "Envoyée")]
    Submitted,
    #[serde(rename = "Campus", alias = "Entretien")]
    Interview,
    #[serde(rename = "Accepté")]
    Accepted,
    #[serde(rename = "Refusé")]
    Rejected,
    #[serde(rename = "Liste d'attente")]
    Waitlisted,
}

impl Status {
    /// Every status in display order.
    pub const ALL: [Status; 6] = [
        Status::Pending,
        Status::Submitted,
        Status::Interview,
        Status::Accepted,
        Status::Rejected,
        Status::Waitlisted,
    ];

    /// Canonical display/storage label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "En attente",
            Self::Submitted => "Candidature envoyée",
            Self::Interview => "Campus",
            Self::Accepted => "Accepté",
            Self::Rejected => "Refusé",
            Self::Waitlisted => "Liste d'attente",
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a status label is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl Display for UnknownStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown status `{}`", self.0)
    }
}

impl Error for UnknownStatus {}

impl FromStr for Status {
    type Err = UnknownStatus;

    /// Accepts stored labels, their aliases, and ASCII slugs for terminal use.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let status = match trimmed.to_lowercase().as_str() {
            "en attente" | "pending" => Self::Pending,
            "candidature envoyée" | "envoyée" | "submitted" | "sent" => Self::Submitted,
            "campus" | "entretien" | "interview" => Self::Interview,
            "accepté" | "accepted" => Self::Accepted,
            "refusé" | "rejected" => Self::Rejected,
            "liste d'attente" | "waitlisted" | "waitlist" => Self::Waitlisted,
            _ => return Err(UnknownStatus(trimmed.to_string())),
        };
        Ok(status)
    }
}

/// Ordered, duplicate-free set of statuses attached to one application.
///
/// Serialized as a JSON array. A bare string is accepted on read and becomes a
/// one-element set, which is how single-status records were stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EtatSet(Vec<Status>);

impl EtatSet {
    /// Empty set. Not valid for a saved record.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// One-element set.
    pub fn single(status: Status) -> Self {
        Self(vec![status])
    }

    pub fn contains(&self, status: Status) -> bool {
        self.0.contains(&status)
    }

    /// Adds `status` at the end. Returns `false` if it was already present.
    pub fn insert(&mut self, status: Status) -> bool {
        if self.contains(status) {
            return false;
        }
        self.0.push(status);
        true
    }

    /// Removes `status`. Returns `false` if it was absent.
    pub fn remove(&mut self, status: Status) -> bool {
        let before = self.0.len();
        self.0.retain(|existing| *existing != status);
        self.0.len() != before
    }

    /// Adds `status` when absent, removes it when present.
    pub fn toggle(&mut self, status: Status) {
        if !self.remove(status) {
            self.0.push(status);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Status> + '_ {
        self.0.iter().copied()
    }

    /// Labels joined with `, `, used for display and sorting.
    pub fn joined_labels(&self) -> String {
        self.0
            .iter()
            .map(|status| status.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromIterator<Status> for EtatSet {
    fn from_iter<I: IntoIterator<Item = Status>>(iter: I) -> Self {
        let mut set = Self::new();
        for status in iter {
            set.insert(status);
        }
        set
    }
}

impl<'de> Deserialize<'de> for EtatSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            One(Status),
            Many(Vec<Status>),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::One(status) => Self::single(status),
            Repr::Many(statuses) => statuses.into_iter().collect(),
        })
    }
}

impl Display for EtatSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.joined_labels())
    }
}

/// One post-decision procedural step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistStep {
    pub id: StepId,
    pub text: String,
    pub done: bool,
}

impl ChecklistStep {
    /// Creates an unchecked step with a generated id.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            done: false,
        }
    }
}

/// Validation failure for an application about to be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationValidationError {
    NilId,
    EmptyUni,
    EmptyFormation,
    EmptyEtat,
}

impl Display for ApplicationValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "application id must not be nil"),
            Self::EmptyUni => write!(f, "university must not be empty"),
            Self::EmptyFormation => write!(f, "formation must not be empty"),
            Self::EmptyEtat => write!(f, "at least one status is required"),
        }
    }
}

impl Error for ApplicationValidationError {}

/// Canonical record for one graduate-program application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: ApplicationId,
    #[serde(default)]
    pub uni: String,
    #[serde(default)]
    pub formation: String,
    #[serde(default)]
    pub ville: String,
    #[serde(default)]
    pub campus: String,
    #[serde(default)]
    pub mail: String,
    #[serde(default)]
    pub site: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub etat: EtatSet,
    #[serde(default, with = "opt_date", skip_serializing_if = "Option::is_none")]
    pub date_applied: Option<NaiveDate>,
    #[serde(default, with = "opt_date", skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub checklist: Vec<ChecklistStep>,
    pub created_at: DateTime<Utc>,
    /// Set by the backend on every successful write.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Application {
    /// Checks the invariants every persisted record must satisfy.
    pub fn validate(&self) -> Result<(), ApplicationValidationError> {
        if self.id.is_nil() {
            return Err(ApplicationValidationError::NilId);
        }
        if self.uni.trim().is_empty() {
            return Err(ApplicationValidationError::EmptyUni);
        }
        if self.formation.trim().is_empty() {
            return Err(ApplicationValidationError::EmptyFormation);
        }
        if self.etat.is_empty() {
            return Err(ApplicationValidationError::EmptyEtat);
        }
        Ok(())
    }

    /// Returns a step by id.
    pub fn step(&self, step_id: StepId) -> Option<&ChecklistStep> {
        self.checklist.iter().find(|step| step.id == step_id)
    }
}

/// User-editable fields of a record that does not exist yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewApplication {
    pub uni: String,
    pub formation: String,
    pub ville: String,
    pub campus: String,
    pub mail: String,
    pub site: String,
    pub notes: String,
    pub etat: EtatSet,
    pub date_applied: Option<NaiveDate>,
    pub deadline: Option<NaiveDate>,
    pub checklist: Vec<ChecklistStep>,
}

impl NewApplication {
    /// Minimal record: the two required text fields and one status.
    pub fn new(uni: impl Into<String>, formation: impl Into<String>, status: Status) -> Self {
        Self {
            uni: uni.into(),
            formation: formation.into(),
            etat: EtatSet::single(status),
            ..Self::default()
        }
    }

    /// Builds the full record with caller-assigned identity.
    pub fn into_application(self, id: ApplicationId, created_at: DateTime<Utc>) -> Application {
        Application {
            id,
            uni: self.uni,
            formation: self.formation,
            ville: self.ville,
            campus: self.campus,
            mail: self.mail,
            site: self.site,
            notes: self.notes,
            etat: self.etat,
            date_applied: self.date_applied,
            deadline: self.deadline,
            checklist: self.checklist,
            created_at,
            updated_at: None,
        }
    }
}

/// Partial update. `Some` replaces the field, `None` leaves it untouched.
///
/// Date fields are doubly optional so a patch can clear them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationPatch {
    pub uni: Option<String>,
    pub formation: Option<String>,
    pub ville: Option<String>,
    pub campus: Option<String>,
    pub mail: Option<String>,
    pub site: Option<String>,
    pub notes: Option<String>,
    pub etat: Option<EtatSet>,
    pub date_applied: Option<Option<NaiveDate>>,
    pub deadline: Option<Option<NaiveDate>>,
    pub checklist: Option<Vec<ChecklistStep>>,
}

impl ApplicationPatch {
    /// Patch that replaces every editable field.
    pub fn full(fields: NewApplication) -> Self {
        Self {
            uni: Some(fields.uni),
            formation: Some(fields.formation),
            ville: Some(fields.ville),
            campus: Some(fields.campus),
            mail: Some(fields.mail),
            site: Some(fields.site),
            notes: Some(fields.notes),
            etat: Some(fields.etat),
            date_applied: Some(fields.date_applied),
            deadline: Some(fields.deadline),
            checklist: Some(fields.checklist),
        }
    }

    /// Patch that replaces only the status set.
    pub fn etat(etat: EtatSet) -> Self {
        Self {
            etat: Some(etat),
            ..Self::default()
        }
    }

    /// Patch that replaces only the checklist.
    pub fn checklist(steps: Vec<ChecklistStep>) -> Self {
        Self {
            checklist: Some(steps),
            ..Self::default()
        }
    }

    /// Returns a copy of `base` with every `Some` field replaced.
    ///
    /// Identity and timestamps are never touched.
    pub fn merged_onto(&self, base: &Application) -> Application {
        let mut merged = base.clone();
        if let Some(value) = &self.uni {
            merged.uni = value.clone();
        }
        if let Some(value) = &self.formation {
            merged.formation = value.clone();
        }
        if let Some(value) = &self.ville {
            merged.ville = value.clone();
        }
        if let Some(value) = &self.campus {
            merged.campus = value.clone();
        }
        if let Some(value) = &self.mail {
            merged.mail = value.clone();
        }
        if let Some(value) = &self.site {
            merged.site = value.clone();
        }
        if let Some(value) = &self.notes {
            merged.notes = value.clone();
        }
        if let Some(value) = &self.etat {
            merged.etat = value.clone();
        }
        if let Some(value) = self.date_applied {
            merged.date_applied = value;
        }
        if let Some(value) = self.deadline {
            merged.deadline = value;
        }
        if let Some(value) = &self.checklist {
            merged.checklist = value.clone();
        }
        merged
    }
}

/// Parses a `YYYY-MM-DD` date, treating blank input as absent.
pub fn parse_optional_date(value: &str) -> Result<Option<NaiveDate>, chrono::ParseError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map(Some)
}

/// Serde adapter for optional ISO dates where `""` and `null` both mean absent.
pub(crate) mod opt_date {
    use super::{parse_optional_date, DATE_FORMAT};
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => serializer.serialize_str(&date.format(DATE_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(text) => parse_optional_date(&text).map_err(de::Error::custom),
            None => Ok(None),
        }
    }
}
