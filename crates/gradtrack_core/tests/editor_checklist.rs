use gradtrack_core::db::open_db_in_memory;
use gradtrack_core::editor::checklist;
use gradtrack_core::{
    ApplicationEditor, ApplicationStore, ChecklistProgress, EditorError, Field, JsonFileBackend,
    NewApplication, SqliteTableBackend, Status,
};
use uuid::Uuid;

#[test]
fn invalid_form_never_reaches_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = ApplicationStore::new(JsonFileBackend::in_dir(dir.path()));
    let mut editor = ApplicationEditor::create();
    editor.draft.uni = "Paris-Saclay".to_string();
    editor.toggle_status(Status::Pending);

    let err = editor.save(&mut store).unwrap_err();
    assert!(matches!(err, EditorError::Invalid(_)));
    assert!(editor.errors().contains(Field::Formation));
    assert!(editor.errors().contains(Field::Etat));
    assert!(store.is_empty());
    assert!(!dir.path().join("masters_applications.json").exists());

    editor.draft.formation = "M2 MVA".to_string();
    editor.toggle_status(Status::Submitted);
    assert!(!editor.errors().contains(Field::Etat));

    let saved = editor.save(&mut store).unwrap();
    assert!(editor.errors().is_empty());
    assert_eq!(saved.formation, "M2 MVA");
    assert_eq!(store.len(), 1);
}

#[test]
fn editing_preserves_identity_and_checklist() {
    let conn = open_db_in_memory().unwrap();
    let mut store = ApplicationStore::new(SqliteTableBackend::new(&conn));
    let created = store
        .add(NewApplication::new("EPFL", "MSc DS", Status::Pending))
        .unwrap();
    checklist::append(&mut store, created.id, "Relevés de notes").unwrap();

    let current = store.get(created.id).unwrap().clone();
    let mut editor = ApplicationEditor::edit(&current);
    assert!(!editor.is_new());
    editor.draft.ville = "Lausanne".to_string();
    editor.draft.deadline = "2025-01-15".to_string();
    editor.toggle_status(Status::Pending);
    editor.toggle_status(Status::Interview);

    let saved = editor.save(&mut store).unwrap();
    assert_eq!(saved.id, created.id);
    assert_eq!(saved.created_at, created.created_at);
    assert_eq!(saved.ville, "Lausanne");
    assert!(saved.etat.contains(Status::Interview));
    assert!(!saved.etat.contains(Status::Pending));
    assert_eq!(saved.checklist.len(), 1);
    assert_eq!(store.len(), 1);
}

#[test]
fn bad_date_is_reported_against_its_field() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = ApplicationStore::new(JsonFileBackend::in_dir(dir.path()));
    let created = store
        .add(NewApplication::new("KTH", "MSc ML", Status::Pending))
        .unwrap();

    let mut editor = ApplicationEditor::edit(&created);
    editor.draft.date_applied = "15/01/2025".to_string();
    let err = editor.save(&mut store).unwrap_err();

    match err {
        EditorError::Invalid(errors) => {
            assert_eq!(errors.len(), 1);
            assert!(errors.contains(Field::DateApplied));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.get(created.id).unwrap(), &created);
}

#[test]
fn checklist_append_toggle_remove_persist() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = ApplicationStore::new(JsonFileBackend::in_dir(dir.path()));
    let app = store
        .add(NewApplication::new("TU Delft", "MSc CS", Status::Submitted))
        .unwrap();

    let first = checklist::append(&mut store, app.id, "  Lettre de motivation ")
        .unwrap()
        .unwrap();
    assert_eq!(first.text, "Lettre de motivation");
    assert!(!first.done);
    let second = checklist::append(&mut store, app.id, "CV").unwrap().unwrap();

    let toggled = checklist::toggle(&mut store, app.id, first.id).unwrap();
    assert!(toggled.step(first.id).is_some_and(|step| step.done));
    assert!(toggled.step(second.id).is_some_and(|step| !step.done));
    let progress = ChecklistProgress::of(&store.get(app.id).unwrap().checklist);
    assert_eq!((progress.done, progress.total), (1, 2));

    checklist::remove(&mut store, app.id, second.id).unwrap();

    let reopened = ApplicationStore::open(JsonFileBackend::in_dir(dir.path()));
    let steps = &reopened.get(app.id).unwrap().checklist;
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0].id, first.id);
    assert!(steps[0].done);
}

#[test]
fn blank_append_is_a_no_op_and_unknown_step_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = ApplicationStore::new(JsonFileBackend::in_dir(dir.path()));
    let app = store
        .add(NewApplication::new("ETH", "MSc Robotics", Status::Pending))
        .unwrap();
    checklist::append(&mut store, app.id, "Portfolio").unwrap();
    let before = store.get(app.id).unwrap().checklist.clone();

    assert_eq!(checklist::append(&mut store, app.id, "   ").unwrap(), None);
    let after_toggle = checklist::toggle(&mut store, app.id, Uuid::new_v4()).unwrap();
    assert_eq!(after_toggle.checklist, before);
    let after_remove = checklist::remove(&mut store, app.id, Uuid::new_v4()).unwrap();
    assert_eq!(after_remove.checklist, before);
}

#[test]
fn checklist_on_unknown_application_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = ApplicationStore::new(JsonFileBackend::in_dir(dir.path()));
    let missing = Uuid::new_v4();

    assert!(checklist::append(&mut store, missing, "CV").is_err());
    assert!(checklist::toggle(&mut store, missing, Uuid::new_v4()).is_err());
}
