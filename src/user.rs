//! Users and task assignments
//!
//! These are owned by the auth provider and the remote store. This crate only reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::TaskId;

/// The identifier the auth provider gives to a user
pub type UserId = String;

/// Used to build an avatar when a user did not upload any
const PLACEHOLDER_AVATAR_URL: &str = "https://ui-avatars.com/api/";


#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    User,
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}


/// The profile of an authenticated user
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The full name, or "User" when the profile does not have one
    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => "User",
        }
    }

    /// The avatar URL, or a generated placeholder based on the display name
    pub fn avatar_or_placeholder(&self) -> String {
        if let Some(url) = &self.avatar_url {
            return url.clone();
        }
        let mut url = match url::Url::parse(PLACEHOLDER_AVATAR_URL) {
            Ok(u) => u,
            Err(_) => return PLACEHOLDER_AVATAR_URL.to_string(),
        };
        url.query_pairs_mut().append_pair("name", self.display_name());
        url.to_string()
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}


/// Links a task to a user. At most one row exists per (task, user) pair.
///
/// This is part of the remote schema, but nothing in this crate restricts access based on it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskAssignment {
    pub id: String,
    pub task_id: TaskId,
    pub user_id: UserId,
    pub assigned_at: DateTime<Utc>,
}
