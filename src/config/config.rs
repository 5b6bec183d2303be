//! Config file handling
//!
//! `restbook.toml` names environments and user profiles whose variables sit
//! underneath the document's own declarations:
//!
//! ```toml
//! [defaults]
//! environment = "local"
//! user = "admin"
//!
//! [[environments]]
//! name = "local"
//! variables = { host = "http://localhost:3000" }
//!
//! [[users]]
//! name = "admin"
//! username = "admin@example.com"
//! password = "admin123"
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{RestbookError, Result};
use crate::models::VariableTable;

/// Overrides the directory searched for `config.toml`
pub const CONFIG_DIR_ENV: &str = "RESTBOOK_CONFIG_DIR";

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "restbook.toml";

/// Starter configuration written by `--init-config`
pub const EXAMPLE_CONFIG: &str = r#"[defaults]
environment = "local"
user = "admin"
locale = "en-US"
timeout_secs = 30

[[environments]]
name = "local"
variables = { host = "http://localhost:3000", apiVersion = "v1" }

[[environments]]
name = "staging"
variables = { host = "https://staging.mydomain.com", apiVersion = "v1" }

[[environments]]
name = "production"
variables = { host = "https://api.mydomain.com", apiVersion = "v1" }

[[users]]
name = "admin"
username = "admin@example.com"
password = "admin123"
token = "Bearer admin-token-here"
variables = { userId = "1", role = "admin" }

[[users]]
name = "tester"
username = "test@example.com"
password = "test123"
variables = { userId = "2", role = "user" }

[[locales]]
locale = "en-US"
timezone = "America/New_York"

[[locales]]
locale = "ja-JP"
timezone = "Asia/Tokyo"
"#;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub environment: Option<String>,
    pub user: Option<String>,
    pub locale: Option<String>,
    pub timeout_secs: Option<u64>,
    pub insecure: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub name: String,
    #[serde(default)]
    pub variables: IndexMap<String, String>,
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    pub name: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub variables: IndexMap<String, String>,
}

impl fmt::Debug for UserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserConfig")
            .field("name", &self.name)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("variables", &self.variables.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleConfig {
    pub locale: String,
    #[serde(default)]
    pub timezone: Option<String>,
}

/// restbook configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub defaults: Defaults,
    pub environments: Vec<EnvironmentConfig>,
    pub users: Vec<UserConfig>,
    pub locales: Vec<LocaleConfig>,
    /// File the config was read from
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Config {
    /// Load the first config file found; defaults when there is none.
    ///
    /// An explicitly requested file must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(RestbookError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            return Self::from_file(path);
        }

        match Self::search_paths().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::from_file(&path),
            None => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Parse a specific config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| RestbookError::Config(format!("Failed to read config: {}", e)))?;
        let mut config = Self::parse(&content)?;
        config.source = Some(path.to_path_buf());
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Candidate config files, highest priority first
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            paths.push(PathBuf::from(dir).join("config.toml"));
        }
        paths.push(PathBuf::from(LOCAL_CONFIG_FILE));
        paths.push(Self::default_config_dir().join("config.toml"));
        paths
    }

    /// Get the default config directory
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join("restbook"))
            .unwrap_or_else(|| PathBuf::from(".restbook"))
    }

    pub fn environment(&self, name: &str) -> Option<&EnvironmentConfig> {
        self.environments.iter().find(|e| e.name == name)
    }

    pub fn user(&self, name: &str) -> Option<&UserConfig> {
        self.users.iter().find(|u| u.name == name)
    }

    pub fn locale(&self, locale: &str) -> Option<&LocaleConfig> {
        self.locales.iter().find(|l| l.locale == locale)
    }

    /// Default locale settings, if configured
    pub fn active_locale(&self) -> Option<&LocaleConfig> {
        self.defaults.locale.as_deref().and_then(|l| self.locale(l))
    }

    /// Variables contributed by an environment and a user profile.
    ///
    /// `None` falls back to the configured default. User values win over
    /// environment values.
    pub fn merged_variables(&self, environment: Option<&str>, user: Option<&str>) -> VariableTable {
        let mut variables = VariableTable::new();

        if let Some(name) = environment.or(self.defaults.environment.as_deref()) {
            match self.environment(name) {
                Some(env) => variables.extend(env.variables.iter().map(|(k, v)| (k.as_str(), v.as_str()))),
                None => warn!(environment = %name, "Unknown environment"),
            }
        }

        if let Some(name) = user.or(self.defaults.user.as_deref()) {
            match self.user(name) {
                Some(profile) => {
                    let fields = [
                        ("username", &profile.username),
                        ("password", &profile.password),
                        ("token", &profile.token),
                    ];
                    for (key, value) in fields {
                        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                            variables.declare(key, value);
                        }
                    }
                    variables.extend(profile.variables.iter().map(|(k, v)| (k.as_str(), v.as_str())));
                }
                None => warn!(user = %name, "Unknown user"),
            }
        }

        variables
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_example_config_parses() {
        let config = Config::parse(EXAMPLE_CONFIG).unwrap();
        assert_eq!(config.environments.len(), 3);
        assert_eq!(config.defaults.environment.as_deref(), Some("local"));
        assert_eq!(config.active_locale().unwrap().timezone.as_deref(), Some("America/New_York"));
    }

    #[test]
    fn test_merged_variables_defaults() {
        let config = Config::parse(EXAMPLE_CONFIG).unwrap();
        let variables = config.merged_variables(None, None);
        assert_eq!(variables.get("host"), Some("http://localhost:3000"));
        assert_eq!(variables.get("username"), Some("admin@example.com"));
        assert_eq!(variables.get("token"), Some("Bearer admin-token-here"));
        assert_eq!(variables.get("role"), Some("admin"));
    }

    #[test]
    fn test_merged_variables_named() {
        let config = Config::parse(EXAMPLE_CONFIG).unwrap();
        let variables = config.merged_variables(Some("production"), Some("tester"));
        assert_eq!(variables.get("host"), Some("https://api.mydomain.com"));
        assert_eq!(variables.get("userId"), Some("2"));
        assert_eq!(variables.get("token"), None);
    }

    #[test]
    fn test_user_variables_override_environment() {
        let config = Config::parse(
            r#"
[[environments]]
name = "e"
variables = { host = "env", role = "env" }

[[users]]
name = "u"
variables = { role = "user" }
"#,
        )
        .unwrap();
        let variables = config.merged_variables(Some("e"), Some("u"));
        assert_eq!(variables.get("host"), Some("env"));
        assert_eq!(variables.get("role"), Some("user"));
    }

    #[test]
    fn test_unknown_names_contribute_nothing() {
        let config = Config::parse(EXAMPLE_CONFIG).unwrap();
        assert!(config.merged_variables(Some("nope"), Some("nobody")).is_empty());
    }

    #[test]
    fn test_empty_config() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.merged_variables(None, None).is_empty());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(Config::parse("[defaults"), Err(RestbookError::Toml(_))));
    }

    #[test]
    fn test_load_explicit() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[defaults]\ninsecure = true").unwrap();
        let config = Config::load(Some(file.path())).unwrap();
        assert!(config.defaults.insecure);
        assert_eq!(config.source.as_deref(), Some(file.path()));

        let missing = Config::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(missing, Err(RestbookError::Config(_))));
    }

    #[test]
    fn test_user_debug_redacts() {
        let config = Config::parse(EXAMPLE_CONFIG).unwrap();
        let debug = format!("{:?}", config.users[0]);
        assert!(!debug.contains("admin123"));
        assert!(!debug.contains("admin-token-here"));
    }
}
