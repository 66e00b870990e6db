//! Tests against an actual backend.
//!
//! They need the "integration_tests" Cargo feature, and read the backend and the credentials of a test account
//! from TASKBOARD_URL, TASKBOARD_ANON_KEY, TASKBOARD_EMAIL and TASKBOARD_PASSWORD.
#![cfg(feature = "integration_tests")]

use std::sync::Arc;

use taskboard::auth::{AuthClient, AuthContext};
use taskboard::calendar::Month;
use taskboard::client::Client;
use taskboard::config::Settings;
use taskboard::traits::TaskFilter;
use taskboard::{Provider, TaskForm, TaskStatus};

fn credentials() -> (String, String) {
    let email = std::env::var("TASKBOARD_EMAIL").expect("TASKBOARD_EMAIL must be set");
    let password = std::env::var("TASKBOARD_PASSWORD").expect("TASKBOARD_PASSWORD must be set");
    (email, password)
}

#[tokio::test]
async fn sign_in_create_and_toggle() {
    let _ = env_logger::builder().is_test(true).try_init();

    let resource = Settings::from_env().resource().unwrap();
    let (email, password) = credentials();
    let auth_client = AuthClient::new(resource.clone());
    let session = auth_client.sign_in(&email, &password).await.unwrap();
    assert_eq!(session.user.email, email);

    let auth = AuthContext::new(session);
    let client = Client::new(auth.authorize_resource(&resource));
    let provider = Provider::new(Arc::new(client), auth.clone());

    let mut form = TaskForm::new("taskboard integration test");
    form.due_date = Some(chrono::Local::now().date_naive());
    let task = provider.create_task(&form).await.unwrap();
    assert_eq!(task.created_by(), auth.user_id());

    let all = provider.list_tasks(&TaskFilter::All).await.unwrap();
    assert!(all.iter().any(|t| t.id() == task.id()));
    for pair in all.windows(2) {
        assert!(pair[0].created_at() >= pair[1].created_at());
    }

    let this_month = Month::containing(chrono::Local::now().date_naive());
    let due = provider.list_tasks(&this_month.due_filter()).await.unwrap();
    assert!(due.iter().any(|t| t.id() == task.id()));

    let toggled = provider.toggle_status(&task).await.unwrap();
    assert_eq!(toggled.status(), TaskStatus::Completed);

    auth.sign_out(&auth_client, None).await.unwrap();
}

#[tokio::test]
async fn wrong_password_is_refused() {
    let _ = env_logger::builder().is_test(true).try_init();

    let resource = Settings::from_env().resource().unwrap();
    let (email, _) = credentials();
    let err = AuthClient::new(resource).sign_in(&email, "definitely not the password").await.unwrap_err();
    assert!(!err.is_validation());
}
