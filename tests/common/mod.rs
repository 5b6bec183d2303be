//! Common test utilities for restbook integration tests
//!
//! - CLI invocation helpers
//! - Temporary workspaces for documents and config
//! - Test fixture management

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// Exit status codes matching the binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success = 0,
    Error = 1,
    Interrupted = 130,
}

impl From<i32> for ExitStatus {
    fn from(code: i32) -> Self {
        match code {
            0 => ExitStatus::Success,
            130 => ExitStatus::Interrupted,
            _ => ExitStatus::Error,
        }
    }
}

/// Result of running the CLI
#[derive(Debug)]
pub struct CliResponse {
    pub stdout: String,
    pub stderr: String,
    pub exit_status: ExitStatus,
    pub exit_code: i32,
}

impl CliResponse {
    /// Check if stdout contains a substring
    pub fn contains(&self, needle: &str) -> bool {
        self.stdout.contains(needle)
    }

    /// Parse stdout as one JSON document
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(self.stdout.trim()).expect("stdout is not JSON")
    }
}

/// Isolated working directory, config directory and environment
pub struct Workspace {
    pub dir: TempDir,
    pub config_dir: TempDir,
    pub env_vars: HashMap<String, String>,
    pub stdin: Option<Vec<u8>>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
            config_dir: TempDir::new().expect("Failed to create temp config dir"),
            env_vars: HashMap::new(),
            stdin: None,
        }
    }

    /// Write a file into the working directory and return its path
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Write the user config file
    pub fn write_config(&self, content: &str) -> PathBuf {
        let path = self.config_dir.path().join("config.toml");
        std::fs::write(&path, content).expect("Failed to write config");
        path
    }

    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn set_env(&mut self, key: &str, value: &str) -> &mut Self {
        self.env_vars.insert(key.to_string(), value.to_string());
        self
    }

    pub fn set_stdin(&mut self, content: &[u8]) -> &mut Self {
        self.stdin = Some(content.to_vec());
        self
    }

    /// Run the binary inside this workspace
    pub fn run(&self, args: &[&str]) -> CliResponse {
        run_in(self.dir.path(), self.config_dir.path(), args, &self.env_vars, self.stdin.as_deref())
    }
}

/// Run the CLI in a fresh workspace
pub fn restbook(args: &[&str]) -> CliResponse {
    Workspace::new().run(args)
}

fn run_in(
    cwd: &Path,
    config_dir: &Path,
    args: &[&str],
    env_vars: &HashMap<String, String>,
    stdin: Option<&[u8]>,
) -> CliResponse {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_restbook"));

    // Keep tests from hanging on unreachable hosts
    cmd.args(["--timeout", "2"]);
    cmd.args(args);
    cmd.current_dir(cwd);

    cmd.env("RESTBOOK_CONFIG_DIR", config_dir);
    for key in ["RESTBOOK_ENV", "RESTBOOK_USER", "RESTBOOK_PRE_AUTH_USERNAME", "RESTBOOK_PRE_AUTH_PASSWORD", "RESTBOOK_LOG"] {
        cmd.env_remove(key);
    }
    for (key, value) in env_vars {
        cmd.env(key, value);
    }

    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    if let Some(stdin_data) = stdin {
        cmd.stdin(Stdio::piped());
        let mut child = cmd.spawn().expect("Failed to spawn command");
        {
            let stdin = child.stdin.as_mut().expect("Failed to open stdin");
            stdin.write_all(stdin_data).expect("Failed to write to stdin");
        }
        let output = child.wait_with_output().expect("Failed to wait for command");
        parse_output(output)
    } else {
        cmd.stdin(Stdio::null());
        let output = cmd.output().expect("Failed to execute command");
        parse_output(output)
    }
}

fn parse_output(output: Output) -> CliResponse {
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(1);

    CliResponse {
        stdout,
        stderr,
        exit_status: ExitStatus::from(exit_code),
        exit_code,
    }
}

/// Test fixture paths
pub mod fixtures {
    use once_cell::sync::Lazy;
    use std::path::PathBuf;

    pub static FIXTURES_DIR: Lazy<PathBuf> =
        Lazy::new(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures"));

    /// Get path to a fixture file
    pub fn fixture_path(name: &str) -> PathBuf {
        FIXTURES_DIR.join(name)
    }

    pub fn fixture(name: &str) -> String {
        std::fs::read_to_string(fixture_path(name)).expect("Failed to read fixture")
    }
}
