//! Session statistics tracking.
//!
//! Records how long each task took from presentation to completion and how
//! many presses the operator made, then formats a summary for the exit screen.

use std::time::{Duration, Instant};

use crate::pick_path::PickSummary;
use crate::task::PickTask;

/// Timing of one finished task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskTiming {
    pub task_id: u32,
    pub order_id: u32,
    pub rack: char,
    pub elapsed: Duration,
}

/// Statistics for one pick session.
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    /// Finished tasks in completion order
    pub tasks: Vec<TaskTiming>,
    /// Source bins confirmed across all tasks
    pub confirmed_picks: usize,
    /// Presses that matched nothing in the current task
    pub unexpected_presses: usize,
    /// Items moved across all finished tasks
    pub items_picked: u32,
    start_time: Option<Instant>,
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// Record a completed task.
    pub fn record_task(&mut self, task: &PickTask, summary: PickSummary, elapsed: Duration) {
        self.tasks.push(TaskTiming {
            task_id: task.task_id,
            order_id: task.order_id,
            rack: task.rack,
            elapsed,
        });
        self.confirmed_picks += summary.confirmed;
        self.unexpected_presses += summary.unexpected_presses;
        self.items_picked = self.items_picked.saturating_add(task.total_items());
    }

    /// Count a press made at the ready gate that was not the ready bin.
    pub fn record_unexpected(&mut self) {
        self.unexpected_presses += 1;
    }

    pub fn tasks_completed(&self) -> usize {
        self.tasks.len()
    }

    pub fn session_duration(&self) -> Duration {
        self.start_time
            .map(|start| start.elapsed())
            .unwrap_or_default()
    }

    pub fn has_activity(&self) -> bool {
        !self.tasks.is_empty() || self.unexpected_presses > 0
    }

    pub fn avg_task_duration(&self) -> Duration {
        if self.tasks.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.tasks.iter().map(|timing| timing.elapsed).sum();
        total / self.tasks.len() as u32
    }
}

/// Format session stats for display on exit.
pub fn format_session_stats(stats: &SessionStats) -> String {
    if !stats.has_activity() {
        return String::new();
    }

    let mut lines = vec![
        String::new(),
        "Session Summary".to_string(),
        "───────────────".to_string(),
        format_stat_line("Tasks", &stats.tasks_completed().to_string()),
        format_stat_line("Picks", &stats.confirmed_picks.to_string()),
        format_stat_line("Items", &stats.items_picked.to_string()),
    ];

    if !stats.tasks.is_empty() {
        let avg = format_duration(stats.avg_task_duration().as_secs_f32());
        lines.push(format_stat_line("Avg task", &avg));
    }

    if stats.unexpected_presses > 0 {
        lines.push(format_stat_line(
            "Unexpected",
            &stats.unexpected_presses.to_string(),
        ));
    }

    let session_dur = format_duration(stats.session_duration().as_secs_f32());
    lines.push(format_stat_line("Session", &session_dur));

    for timing in &stats.tasks {
        lines.push(format!(
            "  task {:<4} order {:<4} rack {}  {}",
            timing.task_id,
            timing.order_id,
            timing.rack,
            format_duration(timing.elapsed.as_secs_f32())
        ));
    }

    lines.push(String::new());
    lines.join("\n")
}

fn format_stat_line(label: &str, value: &str) -> String {
    format!("{:<12} {}", label, value)
}

fn format_duration(secs: f32) -> String {
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else if secs < 3600.0 {
        let mins = (secs / 60.0).floor();
        let remaining_secs = secs % 60.0;
        format!("{}m {:.0}s", mins as u32, remaining_secs)
    } else {
        let hours = (secs / 3600.0).floor();
        let remaining_mins = ((secs % 3600.0) / 60.0).floor();
        format!("{}h {}m", hours as u32, remaining_mins as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{BinTag, ReceiveBin, SourceBin};

    fn task(task_id: u32, rack: char, counts: &[u32]) -> PickTask {
        let source_bins: Vec<SourceBin> = counts
            .iter()
            .enumerate()
            .map(|(index, count)| SourceBin {
                tag: BinTag::parse(&format!("{rack}1{}", index + 1)).expect("tag"),
                count: *count,
            })
            .collect();
        PickTask {
            task_id,
            order_id: task_id * 10,
            rack,
            training: false,
            receive_bin: ReceiveBin {
                tag: BinTag::parse("C11").expect("tag"),
                expected_count: counts.iter().sum(),
            },
            source_bins,
        }
    }

    #[test]
    fn session_stats_new_has_no_activity() {
        let stats = SessionStats::new();
        assert_eq!(stats.tasks_completed(), 0);
        assert!(!stats.has_activity());
        assert_eq!(format_session_stats(&stats), "");
    }

    #[test]
    fn record_task_accumulates_counters() {
        let mut stats = SessionStats::new();
        stats.record_task(
            &task(1, 'A', &[3, 5]),
            PickSummary {
                confirmed: 2,
                unexpected_presses: 1,
            },
            Duration::from_secs(4),
        );
        stats.record_task(
            &task(2, 'B', &[1]),
            PickSummary {
                confirmed: 1,
                unexpected_presses: 0,
            },
            Duration::from_secs(2),
        );
        assert_eq!(stats.tasks_completed(), 2);
        assert_eq!(stats.confirmed_picks, 3);
        assert_eq!(stats.unexpected_presses, 1);
        assert_eq!(stats.items_picked, 9);
        assert_eq!(stats.avg_task_duration(), Duration::from_secs(3));
        assert_eq!(stats.tasks[1].rack, 'B');
        assert_eq!(stats.tasks[1].order_id, 20);
    }

    #[test]
    fn items_picked_saturates_instead_of_wrapping() {
        let mut stats = SessionStats::new();
        for task_id in 1..=2 {
            stats.record_task(
                &task(task_id, 'A', &[u32::MAX]),
                PickSummary::default(),
                Duration::from_secs(1),
            );
        }
        assert_eq!(stats.items_picked, u32::MAX);
        assert_eq!(stats.tasks_completed(), 2);
    }

    #[test]
    fn gate_presses_count_as_unexpected() {
        let mut stats = SessionStats::new();
        stats.record_unexpected();
        assert!(stats.has_activity());
        assert!(format_session_stats(&stats).contains("Unexpected"));
    }

    #[test]
    fn summary_lists_every_task() {
        let mut stats = SessionStats::new();
        stats.record_task(
            &task(3, 'A', &[2]),
            PickSummary {
                confirmed: 1,
                unexpected_presses: 0,
            },
            Duration::from_millis(1500),
        );
        let text = format_session_stats(&stats);
        assert!(text.contains("Session Summary"));
        assert!(text.contains("Tasks        1"));
        assert!(text.contains("Items        2"));
        assert!(text.contains("task 3    order 30   rack A  1.5s"));
        assert!(!text.contains("Unexpected"));
    }

    #[test]
    fn format_duration_scales_units() {
        assert_eq!(format_duration(30.5), "30.5s");
        assert_eq!(format_duration(90.0), "1m 30s");
        assert_eq!(format_duration(3720.0), "1h 2m");
    }
}
