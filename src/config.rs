//! Support for configuration options

use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::resource::Resource;

const CONFIG_FILE_NAME: &str = "config.json";
const SESSION_FILE_NAME: &str = "session.json";

pub const CONFIG_PATH_ENV_VAR: &str = "TASKBOARD_CONFIG";
pub const URL_ENV_VAR: &str = "TASKBOARD_URL";
pub const ANON_KEY_ENV_VAR: &str = "TASKBOARD_ANON_KEY";

/// The name this client reports to the server in the `X-Client-Info` header.
/// Feel free to override it when initing this library.
pub static CLIENT_NAME: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new(format!("taskboard/{}", env!("CARGO_PKG_VERSION")))));

pub fn client_name() -> String {
    match CLIENT_NAME.lock() {
        Ok(name) => name.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}


/// Where to find the backend
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// The project URL, e.g. `https://xyzcompany.supabase.co`
    #[serde(default)]
    pub url: Option<String>,
    /// The public (anonymous) API key of the project
    #[serde(default)]
    pub anon_key: Option<String>,
}

impl Settings {
    /// Read settings from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn Error>> {
        let content = match std::fs::read_to_string(path) {
            Err(err) => return Err(format!("Unable to open file {:?}: {}", path, err).into()),
            Ok(c) => c,
        };
        let settings = serde_json::from_str(&content)
            .map_err(|err| format!("Invalid JSON in {:?}: {}", path, err))?;
        Ok(settings)
    }

    /// Read settings from the environment
    pub fn from_env() -> Self {
        Self {
            url: non_empty_var(URL_ENV_VAR),
            anon_key: non_empty_var(ANON_KEY_ENV_VAR),
        }
    }

    /// Values set in `overrides` take precedence over the values of `self`
    pub fn merged_with(&self, overrides: &Settings) -> Settings {
        Settings {
            url: overrides.url.clone().or_else(|| self.url.clone()),
            anon_key: overrides.anon_key.clone().or_else(|| self.anon_key.clone()),
        }
    }

    /// Load settings from the config file (if any), then the environment, then `overrides`
    pub fn load(overrides: &Settings) -> Result<Self, Box<dyn Error>> {
        let path = config_path()?;
        let from_file = if path.exists() {
            Settings::from_file(&path)?
        } else {
            log::debug!("No config file at {:?}", path);
            Settings::default()
        };

        Ok(from_file
            .merged_with(&Settings::from_env())
            .merged_with(overrides))
    }

    /// Check every required setting is here, and build the resource to talk to the backend
    pub fn resource(&self) -> Result<Resource, Box<dyn Error>> {
        let url = match &self.url {
            None => return Err(format!("The backend URL is not set (use --url, {} or the config file)", URL_ENV_VAR).into()),
            Some(u) => Url::parse(u).map_err(|err| format!("Invalid backend URL {:?}: {}", u, err))?,
        };
        let key = match &self.anon_key {
            None => return Err(format!("The API key is not set (use --anon-key, {} or the config file)", ANON_KEY_ENV_VAR).into()),
            Some(k) => k.clone(),
        };
        Ok(Resource::new(url, key))
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

/// The folder that contains the config file and the saved session
pub fn config_dir() -> Result<PathBuf, Box<dyn Error>> {
    if let Some(path) = non_empty_var(CONFIG_PATH_ENV_VAR) {
        let path = PathBuf::from(path);
        return Ok(path.parent().map(Path::to_path_buf).unwrap_or_default());
    }

    let home = std::env::var("HOME").map_err(|_| "HOME is not set")?;
    Ok(PathBuf::from(home).join(".config").join("taskboard"))
}

pub fn config_path() -> Result<PathBuf, Box<dyn Error>> {
    if let Some(path) = non_empty_var(CONFIG_PATH_ENV_VAR) {
        return Ok(PathBuf::from(path));
    }
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

pub fn session_path() -> Result<PathBuf, Box<dyn Error>> {
    Ok(config_dir()?.join(SESSION_FILE_NAME))
}
