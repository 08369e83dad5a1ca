//! Substring search over the application list.

use crate::model::application::Application;

/// Case-insensitive substring match on university, formation, city and
/// every status label.
///
/// Surrounding whitespace is part of the needle. Only a query that is blank
/// after trimming matches everything.
pub fn matches_query(app: &Application, query: &str) -> bool {
    if query.trim().is_empty() {
        return true;
    }
    matches_lowered(app, &query.to_lowercase())
}

fn matches_lowered(app: &Application, needle: &str) -> bool {
    [&app.uni, &app.formation, &app.ville]
        .into_iter()
        .any(|field| field.to_lowercase().contains(needle))
        || app
            .etat
            .iter()
            .any(|status| status.label().to_lowercase().contains(needle))
}

/// Keeps the records matching `query`, preserving input order.
///
/// A blank query keeps everything.
pub fn filter_applications<'a>(apps: &'a [Application], query: &str) -> Vec<&'a Application> {
    if query.trim().is_empty() {
        return apps.iter().collect();
    }
    let needle = query.to_lowercase();
    apps.iter()
        .filter(|app| matches_lowered(app, &needle))
        .collect()
}
