//! This crate provides a client for a hosted task-management backend.
//!
//! The backend exposes its `tasks` table over a REST API, and signs users in with email and password.
//! The REST client is in the [`client`] module, the sign-in flow in the [`auth`] module.
//!
//! Every store implements [`TaskStore`](traits::TaskStore), so that views do not care whether they talk to
//! the actual server, to the in-memory [`LocalStore`](local::LocalStore), or to a [`QueryCache`](cache::QueryCache)
//! in front of either of them. \
//! A [`Provider`] ties a store to the signed-in user, and is what the [`views`] use.
//!
//! The pure parts of the views (the [month grid](calendar::MonthGrid) and the [dashboard counters](dashboard::Summary))
//! do not need any store, and can be used on their own.

pub mod traits;
pub mod error;
pub use error::StoreError;

mod task;
pub use task::{parse_due_date, NewTask, Priority, Task, TaskColor, TaskId, TaskPatch, TaskStatus};
pub mod user;
pub use user::User;

pub mod resource;
pub mod client;
pub mod auth;
pub use auth::AuthContext;
pub mod local;
pub mod mock_behaviour;
pub mod cache;
pub mod provider;
pub use provider::{Provider, TaskForm};

pub mod calendar;
pub mod dashboard;
pub mod views;

pub mod config;
pub mod utils;
