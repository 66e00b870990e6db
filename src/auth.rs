//! Authentication against the auth API of the remote store
//!
//! Signing in gives a [`Session`]. Views never reach for a global "current user": they are handed an
//! [`AuthContext`], which lives from the moment a session is obtained (or restored from disk) until
//! [`AuthContext::sign_out`] consumes it.

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::error::StoreError;
use crate::resource::Resource;
use crate::user::{Role, User, UserId};


/// What the auth API gives back after a successful sign-in
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    pub user: User,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            None => false,
            Some(expiry) => expiry <= now,
        }
    }

    /// Load a session that has been saved with [`Session::save_to_file`]
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn Error>> {
        let session = match std::fs::File::open(path) {
            Err(err) => {
                return Err(format!("Unable to open file {:?}: {}", path, err).into());
            },
            Ok(file) => serde_json::from_reader(file)?,
        };
        Ok(session)
    }

    /// Store this session, so that the next runs do not have to sign in again
    pub fn save_to_file(&self, path: &Path) -> Result<(), Box<dyn Error>> {
        if let Some(folder) = path.parent() {
            std::fs::create_dir_all(folder)?;
        }
        let file = std::fs::File::create(path)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }
        serde_json::to_writer(file, self)?;
        Ok(())
    }

    /// Remove a saved session. Removing a session that does not exist is not an error
    pub fn forget(path: &Path) -> Result<(), Box<dyn Error>> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(format!("Unable to remove {:?}: {}", path, err).into()),
        }
    }
}


#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenReply {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    user: AuthUser,
}

#[derive(Deserialize)]
struct AuthUser {
    id: UserId,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl AuthUser {
    /// The profile to use when the `users` table has no row for this user
    fn into_minimal_profile(self) -> User {
        User {
            id: self.id,
            email: self.email.unwrap_or_default(),
            full_name: None,
            role: Role::User,
            avatar_url: None,
            created_at: self.created_at.unwrap_or_else(Utc::now),
        }
    }
}


/// A client to the auth API
pub struct AuthClient {
    resource: Resource,
    http: reqwest::Client,
}

impl AuthClient {
    pub fn new(resource: Resource) -> Self {
        Self { resource, http: reqwest::Client::new() }
    }

    /// Sign in with an email and a password, and fetch the profile of the user
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, StoreError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(StoreError::validation("email is required"));
        }
        if password.is_empty() {
            return Err(StoreError::validation("password is required"));
        }

        let mut url = self.resource.auth_url("token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let response = self.http.post(url)
            .header("apikey", self.resource.api_key())
            .header(CONTENT_TYPE, "application/json")
            .json(&PasswordGrant { email, password })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() == false {
            let body = response.text().await.unwrap_or_default();
            log::warn!("Sign-in refused for {} ({})", email, status);
            return Err(StoreError::remote(format!("sign-in failed ({}): {}", status, body)));
        }
        let reply: TokenReply = serde_json::from_str(&response.text().await?)?;
        let expires_at = reply.expires_in.map(|secs| Utc::now() + Duration::seconds(secs));

        let profile_client = Client::new(self.resource.with_access_token(reply.access_token.clone()));
        let user = match profile_client.get_profile(&reply.user.id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                log::info!("No profile row for user {}, using the account details", reply.user.id);
                reply.user.into_minimal_profile()
            },
            Err(err) => {
                log::warn!("Unable to fetch the profile of user {}: {}", reply.user.id, err);
                reply.user.into_minimal_profile()
            },
        };

        log::info!("Signed in as {}", user.email);
        Ok(Session {
            access_token: reply.access_token,
            refresh_token: reply.refresh_token,
            expires_at,
            user,
        })
    }

    /// Revoke a session on the server
    pub async fn sign_out(&self, session: &Session) -> Result<(), StoreError> {
        let url = self.resource.auth_url("logout")?;
        let response = self.resource.with_access_token(session.access_token.clone())
            .authorize(self.http.post(url))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() == false {
            return Err(StoreError::remote(format!("sign-out failed ({})", status)));
        }
        Ok(())
    }
}


/// The currently authenticated user, as handed to views.
///
/// Clones share the same session
#[derive(Clone, Debug)]
pub struct AuthContext {
    session: Arc<Session>,
}

impl AuthContext {
    pub fn new(session: Session) -> Self {
        Self { session: Arc::new(session) }
    }

    /// Restore a context from a saved session, if there is one that has not expired yet
    pub fn restore(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        match Session::from_file(path) {
            Err(err) => {
                log::warn!("Invalid session file: {}. Ignoring it", err);
                None
            },
            Ok(session) if session.is_expired(Utc::now()) => {
                log::info!("The saved session has expired");
                None
            },
            Ok(session) => Some(Self::new(session)),
        }
    }

    pub fn current_user(&self) -> &User {
        &self.session.user
    }

    pub fn user_id(&self) -> &UserId {
        &self.session.user.id
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The resource to use to act on behalf of this user
    pub fn authorize_resource(&self, resource: &Resource) -> Resource {
        resource.with_access_token(self.session.access_token.clone())
    }

    /// Tear down this context: revoke the session on the server and forget the saved copy (if any)
    pub async fn sign_out(self, auth: &AuthClient, saved_at: Option<&Path>) -> Result<(), Box<dyn Error>> {
        let remote_result = auth.sign_out(&self.session).await;
        if let Some(path) = saved_at {
            Session::forget(path)?;
        }
        remote_result?;
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn session(expires_at: Option<DateTime<Utc>>) -> Session {
        Session {
            access_token: "token".into(),
            refresh_token: None,
            expires_at,
            user: User {
                id: "user-1".into(),
                email: "jane@example.com".into(),
                full_name: Some("Jane".into()),
                role: Role::User,
                avatar_url: None,
                created_at: Utc::now(),
            },
        }
    }

    fn temp_path() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("taskboard-session-{}.json", uuid::Uuid::new_v4()))
    }

    #[test]
    fn expiry() {
        let now = Utc::now();
        assert!(!session(None).is_expired(now));
        assert!(!session(Some(now + Duration::hours(1))).is_expired(now));
        assert!(session(Some(now - Duration::seconds(1))).is_expired(now));
    }

    #[test]
    fn save_restore_and_forget() {
        let path = temp_path();
        let original = session(Some(Utc::now() + Duration::hours(1)));
        original.save_to_file(&path).unwrap();

        let restored = AuthContext::restore(&path).unwrap();
        assert_eq!(restored.session(), &original);
        assert_eq!(restored.user_id(), "user-1");

        Session::forget(&path).unwrap();
        assert!(AuthContext::restore(&path).is_none());
        // Forgetting twice is fine
        Session::forget(&path).unwrap();
    }

    #[test]
    fn expired_sessions_are_not_restored() {
        let path = temp_path();
        session(Some(Utc::now() - Duration::hours(1))).save_to_file(&path).unwrap();
        assert!(AuthContext::restore(&path).is_none());
        Session::forget(&path).unwrap();
    }

    #[test]
    fn context_clones_share_the_session() {
        let ctx = AuthContext::new(session(None));
        let other = ctx.clone();
        assert!(Arc::ptr_eq(&ctx.session, &other.session));

        let resource = Resource::new("https://abc.supabase.co".parse().unwrap(), "anon".into());
        assert_eq!(ctx.authorize_resource(&resource).access_token(), Some("token"));
    }

    #[tokio::test]
    async fn empty_credentials_are_rejected_before_any_request() {
        // Nothing listens on this port: reaching the network would give a Remote error instead
        let resource = Resource::new("http://127.0.0.1:9".parse().unwrap(), "anon".into());
        let auth = AuthClient::new(resource);
        assert!(auth.sign_in("  ", "secret").await.unwrap_err().is_validation());
        assert!(auth.sign_in("jane@example.com", "").await.unwrap_err().is_validation());
    }
}
