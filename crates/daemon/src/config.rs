//! Daemon configuration
//!
//! Layered: built-in defaults, then an optional TOML file
//! (`QUEUELESS_CONFIG`, default `queueless.toml`), then `QUEUELESS_*`
//! environment variables with `__` between nested keys, e.g.
//! `QUEUELESS_SERVER__PORT=9090`.

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use queueless_core::application::CapacityPolicy;
use queueless_core::domain::{CenterSpec, DepartmentSpec};
use serde::Deserialize;
use std::path::PathBuf;

const DEFAULT_CONFIG_FILE: &str = "queueless.toml";
const FALLBACK_DB_PATH: &str = "~/.queueless/queueless.db";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub queue: QueueSettings,
    pub auth: AuthSettings,
    pub rate_limit: RateLimitSettings,
    pub log: LogSettings,
    pub catalog: CatalogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// `sqlite:` URL or a plain file path; `~` is expanded.
    /// Unset means the platform data directory.
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueueSettings {
    pub capacity_policy: CapacityPolicy,
    pub sweep_interval_secs: u64,
    pub no_show_grace_minutes: i64,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            capacity_policy: CapacityPolicy::Reject,
            sweep_interval_secs: 60,
            no_show_grace_minutes: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// HS256 secret; a random one is generated when unset
    pub jwt_secret: Option<String>,
    pub token_ttl_secs: u64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_secs: 24 * 60 * 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    pub burst: u32,
    pub per_second: u32,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            burst: 200,
            per_second: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `pretty` or `json`
    pub format: String,
    /// Daily-rolling JSON log files are written here when set
    pub directory: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            format: "pretty".to_string(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub centers: Vec<CenterSpec>,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            centers: vec![CenterSpec {
                name: "City Hospital".to_string(),
                departments: vec![
                    DepartmentSpec::new("General Medicine", 50, 10),
                    DepartmentSpec::new("Cardiology", 20, 15),
                    DepartmentSpec::new("Radiology", 30, 5),
                ],
            }],
        }
    }
}

impl Settings {
    /// Load from the default file location and the environment
    pub fn load() -> Result<Self> {
        let path = std::env::var("QUEUELESS_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(&path)
    }

    pub fn load_from(path: &str) -> Result<Self> {
        Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("QUEUELESS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(Config::try_deserialize)
            .with_context(|| format!("Invalid configuration (file: {})", path))
    }

    /// sqlx connection URL for the configured database
    pub fn database_url(&self) -> String {
        match &self.database.url {
            Some(url) if url.starts_with("sqlite:") => shellexpand::tilde(url).into_owned(),
            Some(path) => format!("sqlite://{}", shellexpand::tilde(path)),
            None => format!("sqlite://{}", default_db_path().display()),
        }
    }
}

fn default_db_path() -> PathBuf {
    directories::ProjectDirs::from("", "", "queueless")
        .map(|dirs| dirs.data_dir().join("queueless.db"))
        .unwrap_or_else(|| PathBuf::from(shellexpand::tilde(FALLBACK_DB_PATH).into_owned()))
}
