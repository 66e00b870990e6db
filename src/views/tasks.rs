use crate::error::StoreError;
use crate::provider::{Provider, TaskForm};
use crate::task::{Task, TaskId, TaskStatus};
use crate::traits::{TaskFilter, TaskStore};
use crate::utils::{self, Palette};

use super::{Snapshot, ViewState};

/// The creation form, and the error of its last submission
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormState {
    pub form: TaskForm,
    pub error: Option<String>,
}

/// Every task, with status toggles and a creation form
pub struct TasksView<S> {
    provider: Provider<S>,
    tasks: Snapshot<Vec<Task>>,
    /// `Some` while the creation form is open
    form: Option<FormState>,
    /// Error of the last status change, until the next successful one
    action_error: Option<String>,
}

impl<S: TaskStore + 'static> TasksView<S> {
    /// Create the view and start fetching its data
    pub fn mount(provider: Provider<S>) -> Self {
        let mut view = Self {
            provider,
            tasks: Snapshot::new(),
            form: None,
            action_error: None,
        };
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

    pub fn action_error(&self) -> Option<&str> {
        self.action_error.as_deref()
    }

    pub fn form(&self) -> Option<&FormState> {
        self.form.as_ref()
    }

    /// Open an empty creation form (or keep the one that is already open)
    pub fn open_form(&mut self) -> &mut TaskForm {
        &mut self.form.get_or_insert_with(FormState::default).form
    }

    pub fn close_form(&mut self) {
        self.form = None;
    }

    /// Create a task from the open form.
    ///
    /// On success the form is closed and the list is fetched again.
    /// On failure the form stays open with the error, so that nothing the user typed is lost
    pub async fn submit_form(&mut self) -> Result<Task, StoreError> {
        let form = match &self.form {
            None => return Err(StoreError::validation("the creation form is not open")),
            Some(state) => state.form.clone(),
        };

        match self.provider.create_task(&form).await {
            Ok(task) => {
                self.form = None;
                self.refresh().await;
                Ok(task)
            },
            Err(err) => {
                log::warn!("Unable to create task: {}", err);
                if let Some(state) = self.form.as_mut() {
                    state.error = Some(err.to_string());
                }
                Err(err)
            },
        }
    }

    /// The task with this ID in the current snapshot
    pub fn find(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.state().ready()
            .and_then(|tasks| tasks.iter().find(|t| t.id() == id))
    }

    /// Flip a task between completed and pending, then fetch the list again
    pub async fn toggle(&mut self, id: &TaskId) -> Result<Task, StoreError> {
        let tasks = match self.tasks.state().ready() {
            None => return Err(StoreError::validation("tasks are not loaded")),
            Some(tasks) => tasks,
        };
        let task = match tasks.iter().find(|t| t.id() == id) {
            None => return Err(StoreError::NotFound(id.to_string())),
            Some(t) => t.clone(),
        };
        let result = self.provider.toggle_status(&task).await;
        self.after_mutation(result).await
    }

    /// Set the status of a task, then fetch the list again
    pub async fn set_status(&mut self, id: &TaskId, status: TaskStatus) -> Result<Task, StoreError> {
        let result = self.provider.update_task_status(id, status).await;
        self.after_mutation(result).await
    }

    async fn after_mutation(&mut self, result: Result<Task, StoreError>) -> Result<Task, StoreError> {
        match &result {
            Ok(_) => self.action_error = None,
            Err(err) => {
                log::warn!("Unable to update task: {}", err);
                self.action_error = Some(err.to_string());
            },
        }
        self.refresh().await;
        result
    }

    pub fn render(&self, palette: &Palette) -> String {
        let mut out = format!("{}\n\n", palette.bold("Tasks"));

        if let Some(err) = &self.action_error {
            out.push_str(&palette.error(&format!("Unable to update the task: {}", err)));
            out.push_str("\n\n");
        }

        match self.tasks.state() {
            ViewState::Ready(tasks) => {
                if tasks.is_empty() {
                    out.push_str(&palette.muted("Your tasks will appear here."));
                    out.push('\n');
                }
                for task in tasks {
                    out.push_str(&utils::task_line(palette, task));
                    out.push('\n');
                    if let Some(description) = task.description() {
                        out.push_str(&format!("      {}\n", palette.muted(description)));
                    }
                }
            },
            other => {
                if let Some(text) = other.placeholder(palette, "tasks") {
                    out.push_str(&text);
                    out.push('\n');
                }
            },
        }

        if let Some(state) = &self.form {
            out.push_str(&render_form(palette, state));
        }
        out
    }
}

fn render_form(palette: &Palette, state: &FormState) -> String {
    let form = &state.form;
    let mut out = format!("\n{}\n", palette.bold("New Task"));
    out.push_str(&format!("  Title:       {}\n", form.title));
    out.push_str(&format!("  Description: {}\n", form.description));
    out.push_str(&format!("  Priority:    {}\n", form.priority.unwrap_or_default()));
    out.push_str(&format!("  Due date:    {}\n", form.due_date.map(|d| d.to_string()).unwrap_or_default()));
    if let Some(err) = &state.error {
        out.push_str(&format!("  {}\n", palette.error(err)));
    }
    out
}
