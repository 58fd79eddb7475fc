//! Session audit log of state-changing actions.

use chrono::{DateTime, Local, NaiveDate, Utc};
use uuid::Uuid;

use crate::models::{TimelineAction, TimelineEntry};

/// Which kind of entries a timeline view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimelineFilter {
    #[default]
    All,
    Task,
    Accomplishment,
}

impl TimelineFilter {
    pub fn next(self) -> Self {
        match self {
            TimelineFilter::All => TimelineFilter::Task,
            TimelineFilter::Task => TimelineFilter::Accomplishment,
            TimelineFilter::Accomplishment => TimelineFilter::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimelineFilter::All => "All",
            TimelineFilter::Task => "Tasks",
            TimelineFilter::Accomplishment => "Accomplishments",
        }
    }

    fn matches(self, action: TimelineAction) -> bool {
        let label = action.label().to_lowercase();
        match self {
            TimelineFilter::All => true,
            TimelineFilter::Task => label.contains("task"),
            TimelineFilter::Accomplishment => label.contains("accomplishment"),
        }
    }
}

/// Append-only list of entries, newest first. Entries are never edited or
/// removed.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an action now and returns the new entry.
    pub fn record(
        &mut self,
        action: TimelineAction,
        description: Option<String>,
        task_id: Option<String>,
        accomplishment_id: Option<String>,
    ) -> &TimelineEntry {
        let entry = TimelineEntry {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            action,
            description,
            task_id,
            accomplishment_id,
        };
        self.entries.insert(0, entry);
        &self.entries[0]
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries of the given kind whose action or description contains
    /// `search`, ignoring case.
    pub fn filter(&self, kind: TimelineFilter, search: &str) -> Vec<&TimelineEntry> {
        let needle = search.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|e| kind.matches(e.action))
            .filter(|e| {
                needle.is_empty()
                    || e.action.label().to_lowercase().contains(&needle)
                    || e.description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            })
            .collect()
    }
}

/// Groups entries by local calendar day, newest day first.
///
/// Entry order within a day is preserved.
pub fn group_by_day<'a>(entries: &[&'a TimelineEntry]) -> Vec<(NaiveDate, Vec<&'a TimelineEntry>)> {
    let mut groups: Vec<(NaiveDate, Vec<&'a TimelineEntry>)> = Vec::new();
    for &entry in entries {
        let day = local_day(entry.timestamp);
        match groups.iter_mut().find(|(d, _)| *d == day) {
            Some((_, list)) => list.push(entry),
            None => groups.push((day, vec![entry])),
        }
    }
    groups.sort_by(|a, b| b.0.cmp(&a.0));
    groups
}

fn local_day(ts: DateTime<Utc>) -> NaiveDate {
    ts.with_timezone(&Local).date_naive()
}

/// Heading for a group of entries: `Today`, `Yesterday` or e.g. `Monday, January 1`.
pub fn day_label(day: NaiveDate, today: NaiveDate) -> String {
    if day == today {
        "Today".to_string()
    } else if today.pred_opt() == Some(day) {
        "Yesterday".to_string()
    } else {
        day.format("%A, %B %-d").to_string()
    }
}
