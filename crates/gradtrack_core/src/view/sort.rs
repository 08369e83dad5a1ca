//! Column sorting for the application list.
//!
//! # Invariants
//! - Ordering is total: equal field values fall back to the application id.
//! - Flipping the direction of a given key exactly reverses the order.

use crate::model::application::{Application, DATE_FORMAT};
use crate::repo::row::format_timestamp;
use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

/// Sortable list column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Uni,
    Formation,
    Ville,
    Etat,
    Deadline,
    DateApplied,
    CreatedAt,
}

impl SortKey {
    /// Stringified field value. Missing values are the empty string.
    pub fn value_of(self, app: &Application) -> String {
        match self {
            Self::Uni => app.uni.clone(),
            Self::Formation => app.formation.clone(),
            Self::Ville => app.ville.clone(),
            Self::Etat => app.etat.joined_labels(),
            Self::Deadline => date_value(app.deadline),
            Self::DateApplied => date_value(app.date_applied),
            Self::CreatedAt => format_timestamp(app.created_at),
        }
    }
}

fn date_value(date: Option<chrono::NaiveDate>) -> String {
    date.map(|value| value.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Current sort column and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortState {
    /// Newest first.
    fn default() -> Self {
        Self {
            key: SortKey::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl SortState {
    /// Header click: same key flips direction, new key starts ascending.
    pub fn click(&mut self, key: SortKey) {
        if self.key == key {
            self.direction = self.direction.flipped();
        } else {
            self.key = key;
            self.direction = SortDirection::Asc;
        }
    }

    /// Sorts borrowed rows in place.
    pub fn sort(&self, rows: &mut [&Application]) {
        let mut keyed: Vec<(String, &Application)> = rows
            .iter()
            .map(|app| (self.key.value_of(app), *app))
            .collect();
        keyed.sort_by(|(va, a), (vb, b)| self.compare_values(va, a, vb, b));
        for (slot, (_, app)) in rows.iter_mut().zip(keyed) {
            *slot = app;
        }
    }

    fn compare_values(&self, va: &str, a: &Application, vb: &str, b: &Application) -> Ordering {
        let ordering = natural_cmp(va, vb).then_with(|| a.id.cmp(&b.id));
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Locale-aware, numeric-aware string comparison.
///
/// Primary level ignores case and French diacritics, and compares digit runs
/// by numeric value (`M2` < `M10`). Ties fall to accents (`e` < `é`), then
/// case with lowercase first (`paris` < `Paris`), then exact text.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    compare_folded(&fold(a), &fold(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| lower_first(a).cmp(lower_first(b)))
        .then_with(|| a.cmp(b))
}

fn lower_first(value: &str) -> impl Iterator<Item = (bool, char)> + '_ {
    value.chars().map(|ch| (ch.is_uppercase(), ch))
}

fn fold(value: &str) -> String {
    let mut folded = String::with_capacity(value.len());
    for ch in value.chars().flat_map(char::to_lowercase) {
        match ch {
            'à' | 'â' | 'ä' | 'á' | 'ã' | 'å' => folded.push('a'),
            'ç' => folded.push('c'),
            'é' | 'è' | 'ê' | 'ë' => folded.push('e'),
            'î' | 'ï' | 'í' | 'ì' => folded.push('i'),
            'ô' | 'ö' | 'ó' | 'ò' | 'õ' => folded.push('o'),
            'ù' | 'û' | 'ü' | 'ú' => folded.push('u'),
            'ÿ' => folded.push('y'),
            'ñ' => folded.push('n'),
            'œ' => folded.push_str("oe"),
            'æ' => folded.push_str("ae"),
            other => folded.push(other),
        }
    }
    folded
}

fn compare_folded(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let ordering = compare_digit_runs(&take_digits(&mut left), &take_digits(&mut right));
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(l), Some(r)) => {
                left.next();
                right.next();
                if l != r {
                    return l.cmp(&r);
                }
            }
        }
    }
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(ch) = chars.next_if(char::is_ascii_digit) {
        run.push(ch);
    }
    run
}

fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a_trimmed = a.trim_start_matches('0');
    let b_trimmed = b.trim_start_matches('0');
    a_trimmed
        .len()
        .cmp(&b_trimmed.len())
        .then_with(|| a_trimmed.cmp(b_trimmed))
}
