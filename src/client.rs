//! This module provides a client to the REST row API of the remote store

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::StoreError;
use crate::resource::Resource;
use crate::task::{NewTask, Task, TaskId, TaskPatch};
use crate::traits::{TaskFilter, TaskStore};
use crate::user::{User, UserId};

static TASKS_TABLE: &str = "tasks";
static USERS_TABLE: &str = "users";
/// Ask the server to send back the rows it inserted or updated
static RETURN_REPRESENTATION: &str = "return=representation";


/// A [`TaskStore`] that fetches its data from the remote server
pub struct Client {
    resource: Resource,
    http: reqwest::Client,
}

impl Client {
    /// Create a client. This does not start a connection
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            http: reqwest::Client::new(),
        }
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    /// Build the URL of a `tasks` query
    pub fn list_url(&self, filter: &TaskFilter) -> Result<Url, StoreError> {
        let mut url = self.resource.table_url(TASKS_TABLE)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("select", "*");
            match filter {
                TaskFilter::All => {
                    query.append_pair("order", "created_at.desc");
                },
                TaskFilter::DueBetween { start, end } => {
                    // Due dates may be stored with a time of day: the upper bound is the start of the next day,
                    // so that anything due during `end` is included
                    query.append_pair("due_date", &format!("gte.{}", start.format("%Y-%m-%d")));
                    match end.succ_opt() {
                        Some(after_end) => query.append_pair("due_date", &format!("lt.{}", after_end.format("%Y-%m-%d"))),
                        None => query.append_pair("due_date", &format!("lte.{}", end.format("%Y-%m-%d"))),
                    };
                },
            }
        }
        Ok(url)
    }

    /// Build the URL that targets a single task
    pub fn task_url(&self, id: &TaskId) -> Result<Url, StoreError> {
        let mut url = self.resource.table_url(TASKS_TABLE)?;
        url.query_pairs_mut().append_pair("id", &format!("eq.{}", id));
        Ok(url)
    }

    /// Fetch the profile row of a user. Returns `None` if there is no such row
    pub async fn get_profile(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let mut url = self.resource.table_url(USERS_TABLE)?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("id", &format!("eq.{}", id));

        let response = self.resource.authorize(self.http.get(url)).send().await?;
        let mut users: Vec<User> = parse_rows(response).await?;
        Ok(users.pop())
    }
}

/// Turn an unsuccessful reply into an error, or decode the JSON body of a successful one
async fn parse_rows<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
    let status = response.status();
    let text = response.text().await?;

    if status.is_success() == false {
        return Err(status_error(status, &text));
    }
    Ok(serde_json::from_str(&text)?)
}

fn status_error(status: StatusCode, body: &str) -> StoreError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            StoreError::remote(format!("access denied ({}): {}", status, body))
        },
        _ => StoreError::remote(format!("unexpected HTTP status code {}: {}", status, body)),
    }
}

#[async_trait]
impl TaskStore for Client {
    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        let url = self.list_url(filter)?;
        log::debug!("Fetching tasks ({:?})", filter);

        let response = self.resource.authorize(self.http.get(url)).send().await?;
        let tasks: Vec<Task> = parse_rows(response).await?;
        log::debug!("Got {} tasks", tasks.len());
        Ok(tasks)
    }

    async fn insert_task(&self, new_task: NewTask) -> Result<Task, StoreError> {
        let url = self.resource.table_url(TASKS_TABLE)?;
        let response = self.resource.authorize(self.http.post(url))
            .header(CONTENT_TYPE, "application/json")
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&new_task)
            .send()
            .await?;

        let mut inserted: Vec<Task> = parse_rows(response).await?;
        match inserted.pop() {
            None => Err(StoreError::remote("the server did not return the inserted task")),
            Some(task) => {
                log::info!("Created task {} ({})", task.title(), task.id());
                Ok(task)
            },
        }
    }

    async fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, StoreError> {
        if patch.is_empty() {
            return Err(StoreError::validation("nothing to update"));
        }

        let url = self.task_url(id)?;
        let response = self.resource.authorize(self.http.patch(url))
            .header(CONTENT_TYPE, "application/json")
            .header("Prefer", RETURN_REPRESENTATION)
            .json(patch)
            .send()
            .await?;

        // The row API replies with every row that matched the filter: none means the ID is unknown
        let mut updated: Vec<Task> = parse_rows(response).await?;
        match updated.pop() {
            None => Err(StoreError::NotFound(id.to_string())),
            Some(task) => {
                log::debug!("Updated task {}", id);
                Ok(task)
            },
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn client() -> Client {
        let resource = Resource::new("https://abc.supabase.co".parse().unwrap(), "anon".into());
        Client::new(resource)
    }

    #[test]
    fn list_all_is_ordered_by_creation_date() {
        let url = client().list_url(&TaskFilter::All).unwrap();
        assert_eq!(url.as_str(), "https://abc.supabase.co/rest/v1/tasks?select=*&order=created_at.desc");
    }

    #[test]
    fn list_range_filters_on_due_date() {
        let filter = TaskFilter::DueBetween {
            start: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
        };
        let url = client().list_url(&filter).unwrap();
        assert_eq!(url.as_str(), "https://abc.supabase.co/rest/v1/tasks?select=*&due_date=gte.2024-02-01&due_date=lt.2024-03-01");
    }

    #[test]
    fn range_includes_the_whole_last_day() {
        // A task due at 15:00 on the last day of the month must be part of that month
        let filter = crate::calendar::Month::new(2024, 12).unwrap().due_filter();
        let url = client().list_url(&filter).unwrap();
        assert_eq!(url.as_str(), "https://abc.supabase.co/rest/v1/tasks?select=*&due_date=gte.2024-12-01&due_date=lt.2025-01-01");
        assert!(!url.as_str().contains("lte."));
    }

    #[test]
    fn single_task_url() {
        let url = client().task_url(&TaskId::from("abc-123")).unwrap();
        assert_eq!(url.as_str(), "https://abc.supabase.co/rest/v1/tasks?id=eq.abc-123");
    }

    #[test]
    fn status_errors_are_remote_errors() {
        let err = status_error(StatusCode::UNAUTHORIZED, "JWT expired");
        assert_eq!(err, StoreError::Remote("access denied (401 Unauthorized): JWT expired".into()));
        assert!(matches!(status_error(StatusCode::BAD_GATEWAY, ""), StoreError::Remote(_)));
    }

    #[tokio::test]
    async fn empty_patch_is_rejected_locally() {
        let err = client().update_task(&TaskId::from("abc"), &TaskPatch::default()).await.unwrap_err();
        assert!(err.is_validation());
    }
}
