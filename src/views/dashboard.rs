use crate::dashboard::{recent, Summary, RECENT_TASKS_COUNT};
use crate::provider::Provider;
use crate::task::Task;
use crate::traits::{TaskFilter, TaskStore};
use crate::utils::{self, Palette};

use super::{Snapshot, ViewState};

/// Counters and the most recent tasks
pub struct DashboardView<S> {
    provider: Provider<S>,
    tasks: Snapshot<Vec<Task>>,
}

impl<S: TaskStore + 'static> DashboardView<S> {
    /// Create the view and start fetching its data
    pub fn mount(provider: Provider<S>) -> Self {
        let mut view = Self { provider, tasks: Snapshot::new() };
        view.start_fetch();
        view
    }

    fn start_fetch(&mut self) {
        let provider = self.provider.clone();
        self.tasks.start(async move { provider.list_tasks(&TaskFilter::All).await });
    }

    /// Wait for the data requested by [`Self::mount`] or [`Self::refresh`]
    pub async fn loaded(&mut self) {
        self.tasks.settle().await;
    }

    /// Fetch a fresh snapshot
    pub async fn refresh(&mut self) {
        self.start_fetch();
        self.tasks.settle().await;
    }

    pub fn state(&self) -> &ViewState<Vec<Task>> {
        self.tasks.state()
    }

    /// Counters of the latest snapshot
    pub fn summary(&self) -> Option<Summary> {
        self.tasks.state().ready().map(|tasks| Summary::from_tasks(tasks))
    }

    pub fn render(&self, palette: &Palette) -> String {
        let mut out = format!("{}\n\n", palette.bold("Dashboard"));

        let tasks = match self.tasks.state() {
            ViewState::Ready(tasks) => tasks,
            other => {
                if let Some(text) = other.placeholder(palette, "tasks") {
                    out.push_str(&text);
                    out.push('\n');
                }
                return out;
            },
        };

        let summary = Summary::from_tasks(tasks);
        out.push_str(&format!("  Pending Tasks    {}\n", summary.pending));
        out.push_str(&format!("  Completed Tasks  {}\n", summary.completed));
        out.push_str(&format!("  High Priority    {}\n", summary.high_priority));

        out.push_str(&format!("\n{}\n", palette.bold("Recent Tasks")));
        let latest = recent(tasks, RECENT_TASKS_COUNT);
        if latest.is_empty() {
            out.push_str(&palette.muted("  No tasks yet"));
            out.push('\n');
        }
        for task in latest {
            out.push_str(&format!("  {} {}  {}  {}\n",
                palette.dot(task.color()),
                task.title(),
                palette.muted(&format!("Due: {}", utils::format_due_date(task.due_date()))),
                utils::priority_badge(palette, task.priority()),
            ));
        }
        out
    }
}
