/// Server configuration
use crate::error::{Result, ServerError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_webhook")]
    pub webhook: WebhookSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// JSON dataset imported into an empty table at startup
    #[serde(default)]
    pub seed_path: Option<PathBuf>,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct WebhookSettings {
    /// Shared HMAC secret. Never logged.
    #[serde(default)]
    pub secret: String,

    /// Working copy updated by a verified push
    #[serde(default = "default_repo_dir")]
    pub repo_dir: PathBuf,

    #[serde(default = "default_remote")]
    pub remote: String,

    /// Only pushes to this ref trigger a pull
    #[serde(default = "default_branch_ref")]
    pub branch_ref: String,

    /// Required prefix of the `User-Agent` header
    #[serde(default = "default_user_agent_prefix")]
    pub user_agent_prefix: String,

    #[serde(default = "default_git_path")]
    pub git_path: PathBuf,
}

impl fmt::Debug for WebhookSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookSettings")
            .field("secret", &"<redacted>")
            .field("repo_dir", &self.repo_dir)
            .field("remote", &self.remote)
            .field("branch_ref", &self.branch_ref)
            .field("user_agent_prefix", &self.user_agent_prefix)
            .field("git_path", &self.git_path)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from file and environment
    ///
    /// Sources, lowest precedence first:
    /// 1. `path`, or `roster.toml` in the working directory if present
    /// 2. `ROSTER_*` environment variables (`ROSTER_WEBHOOK__SECRET`, ...)
    /// 3. `PORT`, overriding `server.port`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from("roster.toml");
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("ROSTER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut config = Self::build(settings)?;

        if let Ok(port) = std::env::var("PORT") {
            config.server.port = port
                .parse()
                .map_err(|_| ServerError::Config(format!("PORT is not a valid port: {port:?}")))?;
        }

        Ok(config)
    }

    fn build(settings: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        let config = settings
            .build()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.webhook.secret.is_empty() {
            return Err(ServerError::Config(
                "Webhook secret is required (set ROSTER_WEBHOOK__SECRET)".to_string(),
            ));
        }

        if self.webhook.user_agent_prefix.is_empty() {
            return Err(ServerError::Config(
                "Webhook user agent prefix must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings {
        host: default_host(),
        port: default_port(),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_storage() -> StorageSettings {
    StorageSettings {
        database_url: default_database_url(),
        seed_path: None,
    }
}

fn default_database_url() -> String {
    "sqlite://./data/roster.db".to_string()
}

fn default_webhook() -> WebhookSettings {
    WebhookSettings {
        secret: String::new(),
        repo_dir: default_repo_dir(),
        remote: default_remote(),
        branch_ref: default_branch_ref(),
        user_agent_prefix: default_user_agent_prefix(),
        git_path: default_git_path(),
    }
}

fn default_repo_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_branch_ref() -> String {
    "refs/heads/master".to_string()
}

fn default_user_agent_prefix() -> String {
    "GitHub-Hookshot/".to_string()
}

fn default_git_path() -> PathBuf {
    PathBuf::from("git")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            storage: default_storage(),
            webhook: default_webhook(),
        }
    }
}
