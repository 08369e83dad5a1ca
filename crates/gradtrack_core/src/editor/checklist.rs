//! Checklist sub-editor.
//!
//! Every mutation writes the whole `checklist` back through the store's
//! partial-update path, same as any other field edit.

use crate::model::application::{
    Application, ApplicationId, ApplicationPatch, ChecklistStep, StepId,
};
use crate::repo::backend::ApplicationBackend;
use crate::store::application_store::{ApplicationStore, StoreError, StoreResult};

/// Appends an unchecked step with trimmed `text`.
///
/// Blank input is ignored and returns `Ok(None)` without touching the store.
pub fn append<B: ApplicationBackend>(
    store: &mut ApplicationStore<B>,
    id: ApplicationId,
    text: &str,
) -> StoreResult<Option<ChecklistStep>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    let mut steps = current_steps(store, id)?;
    let step = ChecklistStep::new(text);
    steps.push(step.clone());
    store.update(id, ApplicationPatch::checklist(steps))?;
    Ok(Some(step))
}

/// Flips `done` on the matching step.
pub fn toggle<B: ApplicationBackend>(
    store: &mut ApplicationStore<B>,
    id: ApplicationId,
    step_id: StepId,
) -> StoreResult<Application> {
    let steps = current_steps(store, id)?
        .into_iter()
        .map(|mut step| {
            if step.id == step_id {
                step.done = !step.done;
            }
            step
        })
        .collect();
    store.update(id, ApplicationPatch::checklist(steps))
}

/// Drops the matching step.
pub fn remove<B: ApplicationBackend>(
    store: &mut ApplicationStore<B>,
    id: ApplicationId,
    step_id: StepId,
) -> StoreResult<Application> {
    let steps = current_steps(store, id)?
        .into_iter()
        .filter(|step| step.id != step_id)
        .collect();
    store.update(id, ApplicationPatch::checklist(steps))
}

fn current_steps<B: ApplicationBackend>(
    store: &ApplicationStore<B>,
    id: ApplicationId,
) -> StoreResult<Vec<ChecklistStep>> {
    store
        .get(id)
        .map(|app| app.checklist.clone())
        .ok_or(StoreError::NotFound(id))
}
