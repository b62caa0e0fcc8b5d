//! Service configuration from environment variables with an optional TOML
//! overlay.
//!
//! Every knob has a documented default; missing variables never panic.
//!
//! # Environment Variables
//!
//! - `HOST` (default `0.0.0.0`), `PORT` (default `8080`)
//! - `REPOSITORY_TYPE`: `local` | `file` | `github` | `sqlite`
//! - `DATA_DIR` (default `./data`): flat-file store directory
//! - `HISTORY_DB` (default `region_history.db`): SQLite database path
//! - `GITHUB_RAW_BASE`: raw-content base URL for the remote store
//! - `CACHE_TTL_SECS` (default 60): remote cached_data.json TTL
//! - `HISTORY_DEBOUNCE_MINUTES` (default 10): minimum gap between
//!   unforced history writes
//! - `HISTORY_LIMIT` (default 100): history query cap
//! - `ADMIN_USERNAME` / `ADMIN_PASSWORD` (default `admin`/`admin`)
//! - `AUTH_USERS`: comma list of `user:sha256hex` entries
//! - `LDAP_GATEWAY_URL`: enables the gateway verifier when set
//! - `CONFIG_FILE`: optional TOML file applied before env overrides

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_GITHUB_RAW_BASE: &str =
    "https://raw.githubusercontent.com/whoyak/region-data-cache/main/";

/// Authentication settings for the verifier chain.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Literal bypass credential, checked before any backend
    pub admin_username: String,
    pub admin_password: String,
    /// Static user table: (username, SHA-256 hex digest of the password)
    pub users: Vec<(String, String)>,
    /// LDAP gateway base URL; the gateway verifier is only built when set
    pub gateway_url: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_username: "admin".to_string(),
            admin_password: "admin".to_string(),
            users: Vec::new(),
            gateway_url: None,
        }
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub history_db: PathBuf,
    pub github_raw_base: String,
    pub cache_ttl: Duration,
    pub history_debounce: Duration,
    pub history_limit: usize,
    pub auth: AuthConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            history_db: PathBuf::from("region_history.db"),
            github_raw_base: DEFAULT_GITHUB_RAW_BASE.to_string(),
            cache_ttl: Duration::from_secs(60),
            history_debounce: Duration::from_secs(10 * 60),
            history_limit: 100,
            auth: AuthConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration: defaults, then the optional `CONFIG_FILE` TOML,
    /// then environment variable overrides.
    pub fn load() -> Result<Self, String> {
        let mut config = match env::var("CONFIG_FILE") {
            Ok(path) => Self::from_toml_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Read configuration from a TOML file (missing keys keep defaults).
    pub fn from_toml_file(path: &Path) -> Result<Self, String> {
        let raw = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;
        let file: ConfigFile = toml::from_str(&raw)
            .map_err(|e| format!("Failed to parse config file {}: {}", path.display(), e))?;
        Ok(file.into())
    }

    fn apply_env(&mut self) {
        if let Ok(host) = env::var("HOST") {
            self.host = host;
        }
        if let Some(port) = env_parse("PORT") {
            self.port = port;
        }
        if let Ok(dir) = env::var("DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Ok(db) = env::var("HISTORY_DB") {
            self.history_db = PathBuf::from(db);
        }
        if let Ok(base) = env::var("GITHUB_RAW_BASE") {
            self.github_raw_base = base;
        }
        if let Some(secs) = env_parse::<u64>("CACHE_TTL_SECS") {
            self.cache_ttl = Duration::from_secs(secs);
        }
        if let Some(minutes) = env_parse::<u64>("HISTORY_DEBOUNCE_MINUTES") {
            self.history_debounce = Duration::from_secs(minutes * 60);
        }
        if let Some(limit) = env_parse("HISTORY_LIMIT") {
            self.history_limit = limit;
        }
        if let Ok(user) = env::var("ADMIN_USERNAME") {
            self.auth.admin_username = user;
        }
        if let Ok(password) = env::var("ADMIN_PASSWORD") {
            self.auth.admin_password = password;
        }
        if let Ok(users) = env::var("AUTH_USERS") {
            self.auth.users = parse_user_table(&users);
        }
        if let Ok(url) = env::var("LDAP_GATEWAY_URL") {
            if !url.is_empty() {
                self.auth.gateway_url = Some(url);
            }
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

/// Parse `user:sha256hex` comma-separated entries; malformed entries are
/// skipped rather than failing startup.
pub fn parse_user_table(raw: &str) -> Vec<(String, String)> {
    raw.split(',')
        .filter_map(|entry| {
            let (user, digest) = entry.trim().split_once(':')?;
            if user.is_empty() || digest.is_empty() {
                return None;
            }
            Some((user.to_string(), digest.to_lowercase()))
        })
        .collect()
}

// ==================== TOML file schema ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    server: ServerSection,
    #[serde(default)]
    store: StoreSection,
    #[serde(default)]
    auth: AuthSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ServerSection {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreSection {
    #[serde(default = "default_data_dir")]
    data_dir: String,
    #[serde(default = "default_history_db")]
    history_db: String,
    #[serde(default = "default_github_raw_base")]
    github_raw_base: String,
    #[serde(default = "default_cache_ttl_secs")]
    cache_ttl_secs: u64,
    #[serde(default = "default_history_debounce_minutes")]
    history_debounce_minutes: u64,
    #[serde(default = "default_history_limit")]
    history_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AuthSection {
    #[serde(default = "default_admin")]
    admin_username: String,
    #[serde(default = "default_admin")]
    admin_password: String,
    /// `user:sha256hex` entries
    #[serde(default)]
    users: Vec<String>,
    #[serde(default)]
    gateway_url: Option<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            history_db: default_history_db(),
            github_raw_base: default_github_raw_base(),
            cache_ttl_secs: default_cache_ttl_secs(),
            history_debounce_minutes: default_history_debounce_minutes(),
            history_limit: default_history_limit(),
        }
    }
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            admin_username: default_admin(),
            admin_password: default_admin(),
            users: Vec::new(),
            gateway_url: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_history_db() -> String {
    "region_history.db".to_string()
}

fn default_github_raw_base() -> String {
    DEFAULT_GITHUB_RAW_BASE.to_string()
}

fn default_cache_ttl_secs() -> u64 {
    60
}

fn default_history_debounce_minutes() -> u64 {
    10
}

fn default_history_limit() -> usize {
    100
}

fn default_admin() -> String {
    "admin".to_string()
}

impl From<ConfigFile> for ServiceConfig {
    fn from(file: ConfigFile) -> Self {
        Self {
            host: file.server.host,
            port: file.server.port,
            data_dir: PathBuf::from(file.store.data_dir),
            history_db: PathBuf::from(file.store.history_db),
            github_raw_base: file.store.github_raw_base,
            cache_ttl: Duration::from_secs(file.store.cache_ttl_secs),
            history_debounce: Duration::from_secs(file.store.history_debounce_minutes * 60),
            history_limit: file.store.history_limit,
            auth: AuthConfig {
                admin_username: file.auth.admin_username,
                admin_password: file.auth.admin_password,
                users: parse_user_table(&file.auth.users.join(",")),
                gateway_url: file.auth.gateway_url,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = ServiceConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.history_debounce, Duration::from_secs(600));
        assert_eq!(config.history_limit, 100);
        assert_eq!(config.auth.admin_username, "admin");
        assert!(config.auth.gateway_url.is_none());
    }

    #[test]
    fn user_table_skips_malformed_entries() {
        let users = parse_user_table("alice:ABCD, broken, bob:1234,:nope,carol:");
        assert_eq!(
            users,
            vec![
                ("alice".to_string(), "abcd".to_string()),
                ("bob".to_string(), "1234".to_string()),
            ]
        );
    }

    #[test]
    fn toml_overlay_parses_partial_files() {
        let raw = r#"
            [server]
            port = 9000

            [store]
            history_debounce_minutes = 5

            [auth]
            users = ["alice:ff00"]
            gateway_url = "http://ldap-gw.local:8389"
        "#;
        let file: ConfigFile = toml::from_str(raw).expect("valid toml");
        let config: ServiceConfig = file.into();
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.history_debounce, Duration::from_secs(300));
        assert_eq!(config.auth.users, vec![("alice".into(), "ff00".into())]);
        assert_eq!(
            config.auth.gateway_url.as_deref(),
            Some("http://ldap-gw.local:8389")
        );
    }

    #[test]
    fn empty_toml_is_all_defaults() {
        let file: ConfigFile = toml::from_str("").expect("empty toml");
        let config: ServiceConfig = file.into();
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.github_raw_base, DEFAULT_GITHUB_RAW_BASE);
    }
}
