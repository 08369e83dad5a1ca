use chrono::{Duration, NaiveDate, TimeZone, Utc};
use gradtrack_core::view::filter::filter_applications;
use gradtrack_core::{
    Application, ApplicationStore, DeleteOutcome, JsonFileBackend, ListView, NewApplication,
    SortDirection, SortKey, SortState, Status,
};
use std::time::{Duration as StdDuration, Instant};
use uuid::Uuid;

fn records() -> Vec<Application> {
    let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let rows = [
        ("Université M10", "M2 Info", "Paris", Status::Pending, Some(5)),
        ("université m2", "M1 Maths", "Lyon", Status::Accepted, None),
        ("École Polytechnique", "M2 Data", "Palaiseau", Status::Submitted, Some(1)),
        ("Ecole Centrale", "M2 Data", "Lyon", Status::Rejected, Some(1)),
        ("Zurich", "MSc CS", "", Status::Waitlisted, None),
    ];
    rows.into_iter()
        .enumerate()
        .map(|(index, (uni, formation, ville, status, deadline_day))| {
            let mut fields = NewApplication::new(uni, formation, status);
            fields.ville = ville.to_string();
            fields.deadline = deadline_day.and_then(|day| NaiveDate::from_ymd_opt(2025, 6, day));
            fields.into_application(Uuid::new_v4(), base + Duration::hours(index as i64))
        })
        .collect()
}

fn sorted_ids(apps: &[Application], state: SortState) -> Vec<Uuid> {
    let mut rows: Vec<&Application> = apps.iter().collect();
    state.sort(&mut rows);
    rows.into_iter().map(|app| app.id).collect()
}

#[test]
fn sort_is_natural_and_accent_insensitive() {
    let apps = records();
    let state = SortState {
        key: SortKey::Uni,
        direction: SortDirection::Asc,
    };
    let mut rows: Vec<&Application> = apps.iter().collect();
    state.sort(&mut rows);
    let unis: Vec<&str> = rows.iter().map(|app| app.uni.as_str()).collect();

    assert_eq!(
        unis,
        vec![
            "Ecole Centrale",
            "École Polytechnique",
            "université m2",
            "Université M10",
            "Zurich",
        ]
    );
}

#[test]
fn toggling_direction_exactly_reverses_every_key() {
    let apps = records();
    for key in [
        SortKey::Uni,
        SortKey::Formation,
        SortKey::Ville,
        SortKey::Etat,
        SortKey::Deadline,
        SortKey::DateApplied,
        SortKey::CreatedAt,
    ] {
        let asc = SortState {
            key,
            direction: SortDirection::Asc,
        };
        let mut desc = asc;
        desc.click(key);

        let forward = sorted_ids(&apps, asc);
        let mut backward = sorted_ids(&apps, desc);
        backward.reverse();
        assert_eq!(forward, backward, "key {key:?}");
        assert_eq!(forward, sorted_ids(&apps, asc), "key {key:?} not deterministic");
    }
}

#[test]
fn missing_deadlines_sort_first_ascending() {
    let apps = records();
    let state = SortState {
        key: SortKey::Deadline,
        direction: SortDirection::Asc,
    };
    let mut rows: Vec<&Application> = apps.iter().collect();
    state.sort(&mut rows);
    assert!(rows[0].deadline.is_none());
    assert!(rows[1].deadline.is_none());
    assert_eq!(rows[4].deadline, NaiveDate::from_ymd_opt(2025, 6, 5));
}

#[test]
fn filter_matches_iff_query_is_substring_of_a_searched_field() {
    let apps = records();
    for query in [
        "lyon", "M2", "ÉCOLE", "refus", "zz", "data", "attente", " lyon", "m2 ", "M2 D",
    ] {
        let needle = query.to_lowercase();
        let expected: Vec<Uuid> = apps
            .iter()
            .filter(|app| {
                [&app.uni, &app.formation, &app.ville]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
                    || app
                        .etat
                        .iter()
                        .any(|status| status.label().to_lowercase().contains(&needle))
            })
            .map(|app| app.id)
            .collect();
        let actual: Vec<Uuid> = filter_applications(&apps, query)
            .into_iter()
            .map(|app| app.id)
            .collect();
        assert_eq!(actual, expected, "query {query}");
    }
}

#[test]
fn view_rows_filter_then_sort_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = ApplicationStore::new(JsonFileBackend::in_dir(dir.path()));
    store
        .add(NewApplication::new("Lyon 2", "M1", Status::Pending))
        .unwrap();
    let newer = store
        .add(NewApplication::new("Lyon 3", "M2", Status::Pending))
        .unwrap();
    store
        .add(NewApplication::new("Lille", "M2", Status::Pending))
        .unwrap();

    let mut view = ListView::new();
    view.set_query("lyon");
    let rows = view.rows(&store);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, newer.id);
}

#[test]
fn delete_needs_two_clicks_within_the_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = ApplicationStore::new(JsonFileBackend::in_dir(dir.path()));
    let keep = store
        .add(NewApplication::new("Keep", "M1", Status::Pending))
        .unwrap();
    let target = store
        .add(NewApplication::new("Drop", "M1", Status::Pending))
        .unwrap();
    let mut view = ListView::new();
    let start = Instant::now();

    assert_eq!(view.click_delete(&mut store, target.id, start), DeleteOutcome::Armed);
    assert_eq!(store.len(), 2);

    let expired = start + StdDuration::from_secs(4);
    assert_eq!(view.click_delete(&mut store, target.id, expired), DeleteOutcome::Armed);
    assert_eq!(store.len(), 2);

    // Arming another row disarms the first.
    assert_eq!(view.click_delete(&mut store, keep.id, expired), DeleteOutcome::Armed);
    assert_eq!(view.click_delete(&mut store, target.id, expired), DeleteOutcome::Armed);

    let confirm = expired + StdDuration::from_millis(500);
    assert_eq!(view.click_delete(&mut store, target.id, confirm), DeleteOutcome::Deleted);
    assert_eq!(store.len(), 1);
    assert!(store.get(target.id).is_none());
    assert!(store.get(keep.id).is_some());
}
