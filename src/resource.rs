use reqwest::RequestBuilder;
use url::Url;

use crate::error::StoreError;

/// Just a wrapper around the project URL and credentials
#[derive(Clone)]
pub struct Resource {
    url: Url,
    api_key: String,
    access_token: Option<String>,
}

impl Resource {
    pub fn new(url: Url, api_key: String) -> Self {
        Self { url, api_key, access_token: None }
    }

    pub fn url(&self) -> &Url { &self.url }
    pub fn api_key(&self) -> &str { &self.api_key }
    pub fn access_token(&self) -> Option<&str> { self.access_token.as_deref() }

    /// Build a new Resource with the same server and key, that acts on behalf of a signed-in user
    pub fn with_access_token(&self, token: String) -> Resource {
        let mut built = (*self).clone();
        built.access_token = Some(token);
        built
    }

    /// URL of a table of the REST row API, e.g. `<project>/rest/v1/tasks`
    pub fn table_url(&self, table: &str) -> Result<Url, StoreError> {
        self.combine(&format!("rest/v1/{}", table))
    }

    /// URL of an endpoint of the auth API, e.g. `<project>/auth/v1/logout`
    pub fn auth_url(&self, endpoint: &str) -> Result<Url, StoreError> {
        self.combine(&format!("auth/v1/{}", endpoint))
    }

    fn combine(&self, path: &str) -> Result<Url, StoreError> {
        let mut base = self.url.clone();
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        Ok(base.join(path)?)
    }

    /// Add the headers every request must carry
    pub fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.api_key);
        request
            .header("apikey", &self.api_key)
            .bearer_auth(bearer)
            .header("X-Client-Info", crate::config::client_name())
    }
}

impl std::fmt::Debug for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("url", &self.url.as_str())
            .field("signed_in", &self.access_token.is_some())
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints() {
        let res = Resource::new("https://abc.supabase.co".parse().unwrap(), "anon".into());
        assert_eq!(res.table_url("tasks").unwrap().as_str(), "https://abc.supabase.co/rest/v1/tasks");
        assert_eq!(res.auth_url("logout").unwrap().as_str(), "https://abc.supabase.co/auth/v1/logout");

        // Projects may be served below a path prefix
        let res = Resource::new("http://localhost:8000/project".parse().unwrap(), "anon".into());
        assert_eq!(res.table_url("users").unwrap().as_str(), "http://localhost:8000/project/rest/v1/users");
    }

    #[test]
    fn tokens_are_not_debug_printed() {
        let res = Resource::new("https://abc.supabase.co".parse().unwrap(), "anon".into())
            .with_access_token("secret-token".into());
        let printed = format!("{:?}", res);
        assert!(!printed.contains("secret-token"));
        assert!(!printed.contains("anon"));
        assert_eq!(res.access_token(), Some("secret-token"));
    }
}
