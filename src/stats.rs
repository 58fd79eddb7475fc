use crate::models::{DashboardStats, Task, TaskStatus};

/// Derives dashboard statistics from an in-memory task collection.
///
/// Missing actual durations count as zero. The completion rate is a
/// percentage of completed tasks and is `0.0` for an empty collection.
pub fn compute_stats(tasks: &[Task]) -> DashboardStats {
    let mut stats = DashboardStats::default();
    for task in tasks {
        match task.status {
            TaskStatus::Planned => stats.planned_tasks += 1,
            TaskStatus::InProgress => stats.in_progress_tasks += 1,
            TaskStatus::Completed => stats.completed_tasks += 1,
            TaskStatus::Discarded => stats.discarded_tasks += 1,
        }
        stats.total_estimated_minutes += u64::from(task.estimated_minutes);
        stats.total_actual_minutes += u64::from(task.actual_minutes.unwrap_or(0));
    }
    stats.completion_rate = if tasks.is_empty() {
        0.0
    } else {
        f64::from(stats.completed_tasks) / tasks.len() as f64 * 100.0
    };
    stats
}

/// Formats a duration the way the dashboard shows it: `45m`, `2h`, `1h 30m`.
pub fn format_minutes(minutes: u64) -> String {
    if minutes < 60 {
        return format!("{}m", minutes);
    }
    let hours = minutes / 60;
    let mins = minutes % 60;
    if mins > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}h", hours)
    }
}
