//! Aggregates shown above the list and in the checklist panel.

use crate::model::application::{Application, ChecklistStep, Status};

/// Number of applications carrying each status, in `Status::ALL` order.
///
/// A record with several statuses counts once under each of them.
pub fn status_counts(apps: &[Application]) -> Vec<(Status, usize)> {
    Status::ALL
        .iter()
        .map(|status| {
            let count = apps.iter().filter(|app| app.etat.contains(*status)).count();
            (*status, count)
        })
        .collect()
}

/// Completed versus total checklist steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChecklistProgress {
    pub done: usize,
    pub total: usize,
}

impl ChecklistProgress {
    pub fn of(steps: &[ChecklistStep]) -> Self {
        Self {
            done: steps.iter().filter(|step| step.done).count(),
            total: steps.len(),
        }
    }

    /// Rounded completion percentage; 0 for an empty checklist.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let ratio = self.done as f64 / self.total as f64;
        (ratio * 100.0).round() as u8
    }
}

#[cfg(test)]
mod tests {
    use super::{status_counts, ChecklistProgress};
    use crate::model::application::{ChecklistStep, NewApplication, Status};
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn counts_each_status_in_a_set() {
        let mut first = NewApplication::new("A", "M1", Status::Submitted);
        first.etat.insert(Status::Accepted);
        let second = NewApplication::new("B", "M2", Status::Accepted);
        let apps = vec![
            first.into_application(Uuid::new_v4(), Utc::now()),
            second.into_application(Uuid::new_v4(), Utc::now()),
        ];

        let counts = status_counts(&apps);
        assert_eq!(counts.len(), Status::ALL.len());
        assert_eq!(counts[0], (Status::Pending, 0));
        assert!(counts.contains(&(Status::Accepted, 2)));
        assert!(counts.contains(&(Status::Submitted, 1)));
    }

    #[test]
    fn progress_rounds_and_handles_empty() {
        assert_eq!(ChecklistProgress::of(&[]).percent(), 0);

        let mut steps = vec![
            ChecklistStep::new("visa"),
            ChecklistStep::new("housing"),
            ChecklistStep::new("enrol"),
        ];
        steps[0].done = true;
        let progress = ChecklistProgress::of(&steps);
        assert_eq!((progress.done, progress.total), (1, 3));
        assert_eq!(progress.percent(), 33);
    }
}
