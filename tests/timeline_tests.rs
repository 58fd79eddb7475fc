use chrono::{Duration, Local, TimeZone, Utc};

use focusboard::models::{TimelineAction, TimelineEntry};
use focusboard::timeline::{day_label, group_by_day, Timeline, TimelineFilter};

fn sample() -> Timeline {
    let mut timeline = Timeline::new();
    timeline.record(TimelineAction::TaskCreated, Some("Created task: Write report".into()), Some("1".into()), None);
    timeline.record(TimelineAction::TaskMoved, Some("Moved to In Progress".into()), Some("1".into()), None);
    timeline.record(
        TimelineAction::AccomplishmentAdded,
        Some("Added accomplishment: Completed: Write report".into()),
        Some("1".into()),
        Some("a1".into()),
    );
    timeline
}

#[test]
fn newest_entry_comes_first() {
    let timeline = sample();
    let actions: Vec<_> = timeline.entries().iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![TimelineAction::AccomplishmentAdded, TimelineAction::TaskMoved, TimelineAction::TaskCreated]
    );
    assert_eq!(timeline.len(), 3);
    assert_ne!(timeline.entries()[0].id, timeline.entries()[1].id);
}

#[test]
fn filters_by_kind_and_search() {
    let timeline = sample();

    assert_eq!(timeline.filter(TimelineFilter::All, "").len(), 3);
    assert_eq!(timeline.filter(TimelineFilter::Task, "").len(), 2);
    assert_eq!(timeline.filter(TimelineFilter::Accomplishment, "").len(), 1);

    let hits = timeline.filter(TimelineFilter::All, "IN PROGRESS");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].action, TimelineAction::TaskMoved);

    // Search covers the action label too.
    assert_eq!(timeline.filter(TimelineFilter::All, "task created").len(), 1);
    assert!(timeline.filter(TimelineFilter::Accomplishment, "moved").is_empty());
}

#[test]
fn filter_cycles_through_kinds() {
    let f = TimelineFilter::default();
    assert_eq!(f, TimelineFilter::All);
    assert_eq!(f.next(), TimelineFilter::Task);
    assert_eq!(f.next().next(), TimelineFilter::Accomplishment);
    assert_eq!(f.next().next().next(), TimelineFilter::All);
}

fn entry_at(id: &str, day: u32, hour: u32) -> TimelineEntry {
    TimelineEntry {
        id: id.to_string(),
        timestamp: Local.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap().with_timezone(&Utc),
        action: TimelineAction::TaskUpdated,
        description: None,
        task_id: None,
        accomplishment_id: None,
    }
}

#[test]
fn groups_by_day_newest_first() {
    let today = entry_at("today", 12, 10);
    let yesterday_a = entry_at("y-a", 11, 18);
    let yesterday_b = entry_at("y-b", 11, 9);
    let older = entry_at("old", 7, 12);
    let entries = vec![&today, &yesterday_a, &yesterday_b, &older];

    let groups = group_by_day(&entries);

    assert_eq!(groups.len(), 3);
    let days: Vec<_> = groups.iter().map(|(d, _)| d.format("%d").to_string()).collect();
    assert_eq!(days, vec!["12", "11", "07"]);
    assert_eq!(groups[0].1[0].id, "today");
    let ids: Vec<_> = groups[1].1.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["y-a", "y-b"]);
}

#[test]
fn labels_days_relative_to_today() {
    let today = Local.with_ymd_and_hms(2025, 3, 12, 10, 0, 0).unwrap().date_naive();

    assert_eq!(day_label(today, today), "Today");
    assert_eq!(day_label(today.pred_opt().unwrap(), today), "Yesterday");
    assert_eq!(day_label(today - Duration::days(2), today), "Monday, March 10");
}
