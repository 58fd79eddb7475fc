mod common;

use common::{day, task};
use focusboard::models::TaskStatus;
use focusboard::stats::{compute_stats, format_minutes};

#[test]
fn empty_collection_has_zero_rate() {
    let stats = compute_stats(&[]);
    assert_eq!(stats.total_tasks(), 0);
    assert_eq!(stats.completion_rate, 0.0);
    assert_eq!(stats.total_estimated_minutes, 0);
}

#[test]
fn counts_sum_to_collection_size() {
    let mut tasks = vec![
        task("1", "a", TaskStatus::Planned, day(2025, 3, 10)),
        task("2", "b", TaskStatus::InProgress, day(2025, 3, 10)),
        task("3", "c", TaskStatus::Completed, day(2025, 3, 10)),
        task("4", "d", TaskStatus::Completed, day(2025, 3, 10)),
        task("5", "e", TaskStatus::Discarded, day(2025, 3, 10)),
    ];
    tasks[2].actual_minutes = Some(20);
    tasks[3].estimated_minutes = 0;

    let stats = compute_stats(&tasks);

    assert_eq!(stats.total_tasks() as usize, tasks.len());
    assert_eq!(stats.planned_tasks, 1);
    assert_eq!(stats.in_progress_tasks, 1);
    assert_eq!(stats.completed_tasks, 2);
    assert_eq!(stats.discarded_tasks, 1);
    assert_eq!(stats.total_estimated_minutes, 120);
    assert_eq!(stats.total_actual_minutes, 20);
    assert_eq!(stats.completion_rate, 40.0);
}

#[test]
fn formats_durations() {
    assert_eq!(format_minutes(0), "0m");
    assert_eq!(format_minutes(45), "45m");
    assert_eq!(format_minutes(60), "1h");
    assert_eq!(format_minutes(120), "2h");
    assert_eq!(format_minutes(90), "1h 30m");
}
