//! Application configuration management.
//!
//! This module handles loading and saving the client configuration: API
//! base URLs, endpoint routing overrides, where the two token storage scopes
//! live, the last used username and the saved tickets view.
//!
//! Configuration is stored at `~/.config/deskclient/config.json`. The
//! `DESKCLIENT_API_URL` and `DESKCLIENT_REFRESH_URL` environment variables
//! override the stored URLs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::{ApiClient, EndpointRoutes, API_URL, REFRESH_URL};
use crate::storage::{FileStore, KeyValueStore, KeyringStore, MemoryStore, StorageContext};
use crate::state::TicketsView;

/// Application name used for config/data directory paths
pub const APP_NAME: &str = "deskclient";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Persistent scope file name
const STORAGE_FILE: &str = "storage.json";

/// Session scope file name
const SESSION_FILE: &str = "session.json";

pub const API_URL_ENV: &str = "DESKCLIENT_API_URL";
pub const REFRESH_URL_ENV: &str = "DESKCLIENT_REFRESH_URL";

/// Where the persistent scope is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Keyring,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_url: Option<String>,
    pub refresh_url: Option<String>,
    /// Merged over the built-in routing table
    pub endpoint_routes: BTreeMap<String, String>,
    pub request_timeout_secs: Option<u64>,
    pub storage_backend: StorageBackend,
    /// Directory for the persistent scope file
    pub storage_dir: Option<PathBuf>,
    /// Directory for the session scope file
    pub session_dir: Option<PathBuf>,
    pub last_username: Option<String>,
    pub tickets_view: TicketsView,
}

impl Config {
    /// Load from the default location and apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply environment-style overrides from `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.is_empty()) {
            self.api_url = Some(url);
        }
        if let Some(url) = lookup(REFRESH_URL_ENV).filter(|v| !v.is_empty()) {
            self.refresh_url = Some(url);
        }
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(API_URL)
    }

    pub fn refresh_url(&self) -> &str {
        self.refresh_url.as_deref().unwrap_or(REFRESH_URL)
    }

    pub fn routes(&self) -> EndpointRoutes {
        let mut routes = EndpointRoutes::default();
        for (endpoint, url) in &self.endpoint_routes {
            routes.insert(endpoint.clone(), url.clone());
        }
        routes
    }

    pub fn persistent_store_path(&self) -> Result<PathBuf> {
        let dir = match &self.storage_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_dir()
                .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?
                .join(APP_NAME),
        };
        Ok(dir.join(STORAGE_FILE))
    }

    /// Session scope file. The per-login runtime directory is emptied when
    /// the user's session ends; `None` when the platform has none.
    pub fn session_store_path(&self) -> Option<PathBuf> {
        let dir = match &self.session_dir {
            Some(dir) => dir.clone(),
            None => dirs::runtime_dir()?.join(APP_NAME),
        };
        Some(dir.join(SESSION_FILE))
    }

    /// Build both storage scopes as configured
    pub fn storage_context(&self) -> Result<StorageContext> {
        let persistent: Arc<dyn KeyValueStore> = match self.storage_backend {
            StorageBackend::File => Arc::new(FileStore::new(self.persistent_store_path()?)),
            StorageBackend::Keyring => Arc::new(KeyringStore::default()),
        };

        let session: Arc<dyn KeyValueStore> = match self.session_store_path() {
            Some(path) => Arc::new(FileStore::new(path)),
            None => {
                warn!("No runtime directory, session logins will not outlive this process");
                Arc::new(MemoryStore::new())
            }
        };

        Ok(StorageContext::new(persistent, session))
    }

    /// Build an API client reading credentials from `storage`
    pub fn api_client(&self, storage: StorageContext) -> Result<ApiClient> {
        let client = match self.request_timeout_secs {
            Some(secs) => ApiClient::with_timeout(storage, Duration::from_secs(secs)),
            None => ApiClient::new(storage),
        }
        .context("Failed to build HTTP client")?;

        Ok(client
            .with_api_url(self.api_url())
            .with_refresh_url(self.refresh_url())
            .with_routes(self.routes()))
    }
}
