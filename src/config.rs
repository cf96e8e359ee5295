//! Client configuration.
//!
//! Settings are layered: built-in defaults, then `kanban.toml`, then
//! environment variables, then CLI flags (applied by the binary).
//!
//! ```toml
//! [api]
//! url = "https://kanban.example.com/api"
//! timeout_secs = 15
//! user_agent = "my-kanban/1.0"
//!
//! [session]
//! file = "/home/me/.config/kanban-sync/session.json"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const CONFIG_FILE_NAME: &str = "kanban.toml";
pub const SESSION_FILE_NAME: &str = "session.json";

pub const ENV_API_URL: &str = "KANBAN_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "KANBAN_TIMEOUT_SECS";
pub const ENV_TOKEN: &str = "KANBAN_TOKEN";

/// `[api]` table of `kanban.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiSection {
    pub url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

/// `[session]` table of `kanban.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSection {
    pub file: Option<PathBuf>,
}

/// The complete kanban.toml structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KanbanToml {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub session: SessionSection,
}

impl KanbanToml {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse kanban.toml")
    }

    /// Load `kanban.toml` from `dir`, or defaults if there is none.
    pub fn load_or_default(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Per-user configuration directory (`~/.config/kanban-sync` on Linux).
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("kanban-sync"))
}

/// Resolved settings for talking to the board API.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_url: String,
    pub timeout: Duration,
    pub user_agent: String,
    /// Where the CLI keeps the access token between invocations.
    pub session_file: Option<PathBuf>,
    /// Token supplied through the environment; wins over the session file.
    pub token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: format!("kanban-sync/{}", env!("CARGO_PKG_VERSION")),
            session_file: default_config_dir().map(|d| d.join(SESSION_FILE_NAME)),
            token: None,
        }
    }
}

impl ClientConfig {
    /// Load from an explicit file, or from the default config directory.
    /// Environment overrides are applied on top.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let toml = match explicit {
            Some(path) => KanbanToml::load(path)?,
            None => match default_config_dir() {
                Some(dir) => KanbanToml::load_or_default(&dir)?,
                None => KanbanToml::default(),
            },
        };
        let mut config = Self::from_toml(&toml);
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_toml(toml: &KanbanToml) -> Self {
        let mut config = Self::default();
        if let Some(url) = &toml.api.url {
            config.api_url = url.clone();
        }
        if let Some(secs) = toml.api.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(agent) = &toml.api.user_agent {
            config.user_agent = agent.clone();
        }
        if let Some(file) = &toml.session.file {
            config.session_file = Some(file.clone());
        }
        config
    }

    /// Apply environment overrides through `lookup` (normally `std::env::var`).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.is_empty()) {
            self.api_url = url;
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("{} must be a whole number of seconds", ENV_TIMEOUT_SECS))?;
            self.timeout = Duration::from_secs(secs);
        }
        if let Some(token) = lookup(ENV_TOKEN).filter(|v| !v.is_empty()) {
            self.token = Some(token);
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct StoredSession {
    access: String,
}

/// Read a previously saved access token. A missing file means "not logged in".
pub fn load_session_token(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read session file: {}", path.display()))?;
    let stored: StoredSession = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse session file: {}", path.display()))?;
    Ok(Some(stored.access))
}

pub fn save_session_token(path: &Path, token: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let content = serde_json::to_string(&StoredSession {
        access: token.to_string(),
    })?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write session file: {}", path.display()))
}
