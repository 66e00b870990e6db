//! The pages of the application, rendered as text
//!
//! Every view fetches its own snapshot of the tasks when it is mounted, and again after each of its
//! mutations. Views do not share derived state, so two views may disagree until both re-fetch.

use std::future::Future;

use tokio::task::JoinHandle;

use crate::error::StoreError;
use crate::user::User;
use crate::utils::Palette;

mod dashboard;
pub use dashboard::DashboardView;
mod tasks;
pub use tasks::TasksView;
mod calendar;
pub use calendar::CalendarView;


/// What a view has to show about its data
#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    /// The first fetch has not completed yet
    Loading,
    /// The last fetch failed
    Failed(String),
    Ready(T),
}

impl<T> ViewState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ViewState::Failed(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            ViewState::Ready(data) => Some(data),
            _ => None,
        }
    }

    /// The text shown instead of the data while it is not available
    pub fn placeholder(&self, palette: &Palette, what: &str) -> Option<String> {
        match self {
            ViewState::Loading => Some(palette.muted("Loading...")),
            ViewState::Failed(err) => Some(palette.error(&format!("Unable to load {}: {}", what, err))),
            ViewState::Ready(_) => None,
        }
    }
}


/// A fetch running in the background.
///
/// Dropping it aborts the request, so that a view that is gone never receives its result
pub struct PendingFetch<T> {
    handle: Option<JoinHandle<Result<T, StoreError>>>,
}

impl<T: Send + 'static> PendingFetch<T> {
    /// Start a fetch. This must be called from within a tokio runtime
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, StoreError>> + Send + 'static,
    {
        Self { handle: Some(tokio::spawn(future)) }
    }

    /// Wait for the fetch to complete
    pub async fn resolve(mut self) -> Result<T, StoreError> {
        let handle = match self.handle.as_mut() {
            None => return Err(StoreError::remote("this fetch has been cancelled")),
            Some(h) => h,
        };
        match handle.await {
            Ok(result) => result,
            Err(err) => Err(StoreError::remote(format!("the fetch was interrupted: {}", err))),
        }
    }
}

impl<T> Drop for PendingFetch<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}


/// The data of a view, and the fetch that will replace it (at most one at a time)
pub(crate) struct Snapshot<T> {
    state: ViewState<T>,
    pending: Option<PendingFetch<T>>,
}

impl<T: Send + 'static> Snapshot<T> {
    pub(crate) fn new() -> Self {
        Self { state: ViewState::Loading, pending: None }
    }

    /// Start a new fetch. A fetch that is still in flight is aborted.
    /// The current data stays visible until the new fetch completes
    pub(crate) fn start<F>(&mut self, future: F)
    where
        F: Future<Output = Result<T, StoreError>> + Send + 'static,
    {
        self.pending = Some(PendingFetch::spawn(future));
    }

    /// Wait for the fetch in flight (if any) and store its result
    pub(crate) async fn settle(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.state = match pending.resolve().await {
                Ok(data) => ViewState::Ready(data),
                Err(err) => {
                    log::warn!("Fetch failed: {}", err);
                    ViewState::Failed(err.to_string())
                },
            };
        }
    }

    pub(crate) fn state(&self) -> &ViewState<T> {
        &self.state
    }

    #[cfg(test)]
    fn is_fetching(&self) -> bool {
        self.pending.is_some()
    }
}


/// The pages that can be shown
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    Tasks,
    Calendar,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Dashboard, Page::Tasks, Page::Calendar];

    pub fn label(&self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Tasks => "Tasks",
            Page::Calendar => "Calendar",
        }
    }
}

/// The navigation header: app name, pages, and who is signed in
pub fn render_sidebar(palette: &Palette, user: &User, active: Page) -> String {
    let links: Vec<String> = Page::ALL.iter()
        .map(|page| {
            if *page == active {
                palette.bold(&format!("[{}]", page.label()))
            } else {
                format!(" {} ", page.label())
            }
        })
        .collect();

    format!("{}  {}\n{} <{}>\n",
        palette.bold("Task Manager"),
        links.join(" "),
        user.display_name(),
        user.email,
    )
}
