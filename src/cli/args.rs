//! CLI argument definitions using clap

use clap::{ArgAction, ArgGroup, Parser, ValueEnum};
use std::fmt;
use std::path::PathBuf;

use crate::devexp::curl::CurlDialect;

/// A string that redacts its value in Debug output to prevent credential leakage
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecretString(pub String);

impl SecretString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "SecretString(\"\")")
        } else {
            write!(f, "SecretString(\"[REDACTED]\")")
        }
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        SecretString(s)
    }
}

impl std::str::FromStr for SecretString {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(SecretString(s.to_string()))
    }
}

/// `NAME=VALUE` from `--set`; the value may be a secret
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub name: String,
    pub value: SecretString,
}

fn parse_assignment(s: &str) -> Result<Assignment, String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    let name = name.trim();
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(format!("invalid variable name '{}'", name));
    }
    Ok(Assignment {
        name: name.to_string(),
        value: SecretString(value.to_string()),
    })
}

/// restbook - edit and replay saved HTTP requests
#[derive(Parser, Debug, Clone)]
#[command(name = "restbook", version, about, long_about = None)]
#[command(group(
    ArgGroup::new("mode")
        .args(["list", "curl", "import", "format", "init_config"])
        .multiple(false)
))]
pub struct Args {
    /// Request document (.http) to read, run or update
    #[arg(value_name = "FILE", required_unless_present = "init_config")]
    pub file: Option<PathBuf>,

    // Modes

    /// List the requests in the document
    #[arg(short = 'l', long = "list", action = ArgAction::SetTrue)]
    pub list: bool,

    /// Select requests by 1-based index or name substring (repeatable)
    #[arg(short = 'r', long = "request", value_name = "NAME|INDEX")]
    pub requests: Vec<String>,

    /// Print curl commands instead of sending
    #[arg(long = "curl", action = ArgAction::SetTrue)]
    pub curl: bool,

    /// Quoting style for --curl
    #[arg(long = "dialect", value_enum, default_value_t = CurlDialect::Posix)]
    pub dialect: CurlDialect,

    /// Import a curl command or Postman collection: inline text, a file path, or - for stdin
    #[arg(long = "import", value_name = "SOURCE")]
    pub import: Option<String>,

    /// Rewrite the document in canonical form
    #[arg(long = "format", action = ArgAction::SetTrue)]
    pub format: bool,

    /// Write an example restbook.toml to the current directory
    #[arg(long = "init-config", action = ArgAction::SetTrue)]
    pub init_config: bool,

    // Variables

    /// Environment from the config file
    #[arg(short = 'e', long = "env", value_name = "NAME", env = "RESTBOOK_ENV")]
    pub environment: Option<String>,

    /// User profile from the config file
    #[arg(short = 'u', long = "user", value_name = "NAME", env = "RESTBOOK_USER")]
    pub user: Option<String>,

    /// Config file to use instead of the default lookup
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Session variable overriding document and config values (repeatable)
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub set: Vec<Assignment>,

    // Pre-auth

    /// Username for the pre-auth step (overrides {{username}})
    #[arg(long = "pre-auth-username", value_name = "USERNAME", env = "RESTBOOK_PRE_AUTH_USERNAME")]
    pub pre_auth_username: Option<SecretString>,

    /// Password for the pre-auth step (overrides {{password}})
    #[arg(long = "pre-auth-password", value_name = "PASSWORD", env = "RESTBOOK_PRE_AUTH_PASSWORD", hide_env_values = true)]
    pub pre_auth_password: Option<SecretString>,

    /// Do not run the document's @PRE-AUTH request before sending
    #[arg(long = "no-pre-auth", action = ArgAction::SetTrue)]
    pub no_pre_auth: bool,

    // Network

    /// Request timeout in seconds
    #[arg(long = "timeout", value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Accept invalid TLS certificates
    #[arg(short = 'k', long = "insecure", action = ArgAction::SetTrue)]
    pub insecure: bool,

    // Output

    /// Print each response as a JSON object
    #[arg(long = "json", action = ArgAction::SetTrue)]
    pub json: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Log line format
    #[arg(long = "log-format", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Print the full error on failure
    #[arg(long = "traceback", action = ArgAction::SetTrue)]
    pub traceback: bool,
}

/// Log format for structured output (CI/CD)
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Plain text output (default)
    #[default]
    Text,
    /// JSON Lines format for parsing
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("restbook").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["api.http"]).unwrap();
        assert_eq!(args.file, Some(PathBuf::from("api.http")));
        assert!(!args.list && !args.curl && !args.format);
        assert_eq!(args.dialect, CurlDialect::Posix);
        assert_eq!(args.log_format, LogFormat::Text);
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn test_file_required() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["--init-config"]).is_ok());
    }

    #[test]
    fn test_modes_are_exclusive() {
        assert!(parse(&["--list", "--curl", "api.http"]).is_err());
        assert!(parse(&["--format", "--import", "curl x", "api.http"]).is_err());
    }

    #[test]
    fn test_repeatable_options() {
        let args = parse(&[
            "-r", "1", "--request", "users", "--set", "auth=abc", "--set", "page=2", "-vv", "api.http",
        ])
        .unwrap();
        assert_eq!(args.requests, vec!["1", "users"]);
        assert_eq!(args.set.len(), 2);
        assert_eq!(args.set[0].name, "auth");
        assert_eq!(args.set[0].value.as_str(), "abc");
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_invalid_assignment() {
        assert!(parse(&["--set", "novalue", "api.http"]).is_err());
        assert!(parse(&["--set", "bad name=1", "api.http"]).is_err());
        let args = parse(&["--set", "empty=", "api.http"]).unwrap();
        assert_eq!(args.set[0].value.as_str(), "");
    }

    #[test]
    fn test_dialect_and_log_format() {
        let args = parse(&["--curl", "--dialect", "windows", "--log-format", "json", "api.http"]).unwrap();
        assert_eq!(args.dialect, CurlDialect::Windows);
        assert_eq!(args.log_format, LogFormat::Json);
    }

    #[test]
    fn test_secrets_redacted_in_debug() {
        let args = parse(&["--pre-auth-password", "hunter2", "--set", "token=t0p", "api.http"]).unwrap();
        let debug = format!("{:?}", args);
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("t0p"));
    }
}
