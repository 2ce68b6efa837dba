use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::auth::Credential;
use crate::common::constants::{HTTP_TIMEOUT_SECS, USER_AGENT};
use crate::xmlrpc::HttpTransport;

fn default_timeout_secs() -> u64 {
    HTTP_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    USER_AGENT.to_string()
}

fn default_post_count() -> u32 {
    10
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct AuthSettings {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub site: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub callback_scheme: Option<String>,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default = "default_post_count")]
    pub default_post_count: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            site: None,
            endpoint: None,
            auth: AuthSettings::default(),
            callback_scheme: None,
            http: HttpSettings::default(),
            default_post_count: default_post_count(),
        }
    }
}

impl Settings {
    pub fn load(settings_file: &str) -> Result<Self> {
        let path = Path::new(settings_file);
        if !path.exists() {
            return Err(anyhow::anyhow!(
                "settings file not found at '{}'",
                settings_file
            ));
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", settings_file))?;

        let settings: Settings = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings file: {}", settings_file))?;

        info!("Settings loaded from '{}'.", settings_file);
        Ok(settings)
    }

    pub fn credential(&self) -> Result<Credential> {
        let non_empty = |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(str::to_string);

        if let Some(token) = non_empty(&self.auth.token) {
            debug!("Using delegated token credentials");
            return Ok(Credential::token(token));
        }
        match (non_empty(&self.auth.username), self.auth.password.clone()) {
            (Some(username), Some(password)) => {
                debug!("Using password credentials for '{}'", username);
                Ok(Credential::password(username, password))
            }
            _ => Err(anyhow::anyhow!(
                "settings need either auth.token or auth.username and auth.password"
            )),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }
}

impl HttpTransport {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        HttpTransport::with_options(settings.timeout(), &settings.http.user_agent)
            .context("Failed to build HTTP transport")
    }
}
