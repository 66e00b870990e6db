//! Statistics shown on the dashboard

use crate::task::{Priority, Task, TaskStatus};

/// How many tasks the dashboard lists under "Recent Tasks"
pub const RECENT_TASKS_COUNT: usize = 5;

/// Task counters, recomputed from every snapshot
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub high_priority: usize,
}

impl Summary {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        tasks.iter().fold(Self::default(), |mut summary, task| {
            summary.total += 1;
            match task.status() {
                TaskStatus::Pending => summary.pending += 1,
                TaskStatus::InProgress => summary.in_progress += 1,
                TaskStatus::Completed => summary.completed += 1,
            }
            if task.priority() == Priority::High {
                summary.high_priority += 1;
            }
            summary
        })
    }
}

/// The first `count` tasks of a snapshot. Snapshots of every task are sorted most recent first
pub fn recent(tasks: &[Task], count: usize) -> &[Task] {
    &tasks[..tasks.len().min(count)]
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::task::{NewTask, TaskColor, TaskId};

    fn task(n: usize, status: TaskStatus, priority: Priority) -> Task {
        let fields = NewTask {
            title: format!("task {}", n),
            description: None,
            status,
            priority,
            color: TaskColor::default(),
            due_date: None,
            created_by: "user-1".to_string(),
        };
        Task::from_new(TaskId::from(format!("t{}", n)), fields, Utc::now())
    }

    #[test]
    fn empty_snapshot() {
        assert_eq!(Summary::from_tasks(&[]), Summary::default());
        assert!(recent(&[], RECENT_TASKS_COUNT).is_empty());
    }

    #[test]
    fn counters() {
        let statuses = [TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Completed];
        let priorities = [Priority::Low, Priority::Medium, Priority::High, Priority::High];
        let tasks: Vec<Task> = (0..23)
            .map(|n| task(n, statuses[n % 3], priorities[n % 4]))
            .collect();

        let summary = Summary::from_tasks(&tasks);
        assert_eq!(summary.total, 23);
        assert_eq!(summary.pending, 8);
        assert_eq!(summary.in_progress, 8);
        assert_eq!(summary.completed, 7);
        assert_eq!(summary.high_priority, 11);
        assert_eq!(summary.pending + summary.in_progress + summary.completed, summary.total);
        assert!(summary.high_priority <= summary.total);
    }

    #[test]
    fn recent_keeps_the_snapshot_order() {
        let tasks: Vec<Task> = (0..8).map(|n| task(n, TaskStatus::Pending, Priority::Low)).collect();
        let ids: Vec<&str> = recent(&tasks, RECENT_TASKS_COUNT).iter().map(|t| t.id().as_str()).collect();
        assert_eq!(ids, vec!["t0", "t1", "t2", "t3", "t4"]);
        assert_eq!(recent(&tasks[..2], RECENT_TASKS_COUNT).len(), 2);
    }
}
