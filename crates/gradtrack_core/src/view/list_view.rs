//! List view state: sort, search and delete confirmation over the store.
//!
//! # Invariants
//! - The view never mutates records itself; deletions go through the store.
//! - Rows are filtered first, then sorted.

use crate::model::application::{Application, ApplicationId};
use crate::repo::backend::ApplicationBackend;
use crate::store::application_store::ApplicationStore;
use crate::view::delete_confirm::{DeleteClick, DeleteConfirm};
use crate::view::filter::filter_applications;
use crate::view::sort::{SortKey, SortState};
use std::time::Instant;

/// Outcome of a delete click routed through the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// First click; the row is waiting for confirmation.
    Armed,
    /// Second click; the record is gone from backend and mirror.
    Deleted,
    /// Second click, but the store refused. The row is still listed.
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct ListView {
    pub sort: SortState,
    pub query: String,
    pub delete: DeleteConfirm,
}

impl ListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn click_header(&mut self, key: SortKey) {
        self.sort.click(key);
    }

    /// Filtered and sorted rows borrowed from the store mirror.
    pub fn rows<'a, B: ApplicationBackend>(
        &self,
        store: &'a ApplicationStore<B>,
    ) -> Vec<&'a Application> {
        let mut rows = filter_applications(store.list(), &self.query);
        self.sort.sort(&mut rows);
        rows
    }

    /// Handles a delete click on `id`, committing on confirmation.
    pub fn click_delete<B: ApplicationBackend>(
        &mut self,
        store: &mut ApplicationStore<B>,
        id: ApplicationId,
        now: Instant,
    ) -> DeleteOutcome {
        match self.delete.click(id, now) {
            DeleteClick::Armed => DeleteOutcome::Armed,
            DeleteClick::Confirmed => match store.remove(id) {
                Ok(()) => DeleteOutcome::Deleted,
                Err(err) => DeleteOutcome::Failed(err.to_string()),
            },
        }
    }
}
