//! Curl command generation
//!
//! Renders a [`Request`] as a curl command for sharing and debugging, in
//! either POSIX shell or PowerShell quoting.

use std::fmt;

use clap::ValueEnum;

use crate::devexp::redact::templatize_credentials;
use crate::models::Request;

/// Shell flavour a command is quoted for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum CurlDialect {
    /// Single quotes, `\` line continuations
    #[default]
    Posix,
    /// Double quotes, backtick line continuations (PowerShell)
    Windows,
}

impl CurlDialect {
    fn separator(&self) -> &'static str {
        match self {
            CurlDialect::Posix => " \\\n  ",
            CurlDialect::Windows => " `\n  ",
        }
    }

    fn quote(&self, s: &str) -> String {
        match self {
            CurlDialect::Posix => shell_escape(s),
            CurlDialect::Windows => format!("\"{}\"", escape_powershell(s).replace('"', "\\\"")),
        }
    }

    fn quote_body(&self, body: &str) -> String {
        match self {
            CurlDialect::Posix => shell_escape(body),
            CurlDialect::Windows => {
                let escaped = escape_powershell(body)
                    .replace('\\', "\\\\")
                    .replace('"', "\\\"")
                    .replace('\r', "")
                    .replace('\n', "\\n");
                format!("\"{}\"", escaped)
            }
        }
    }
}

impl fmt::Display for CurlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurlDialect::Posix => f.write_str("posix"),
            CurlDialect::Windows => f.write_str("windows"),
        }
    }
}

/// Generate an equivalent curl command for a request
pub fn build_curl(request: &Request, dialect: CurlDialect) -> String {
    let mut parts: Vec<String> = vec![
        "curl".to_string(),
        format!("-X {}", request.method),
        dialect.quote(&request.full_url()),
    ];

    for (name, value) in request.headers.iter() {
        if name.is_empty() || value.is_empty() {
            continue;
        }
        parts.push(format!("-H {}", dialect.quote(&format!("{}: {}", name, value))));
    }

    if !request.body.trim().is_empty() {
        parts.push(format!("-d {}", dialect.quote_body(&request.body)));
    }

    parts.join(dialect.separator())
}

/// Single-line command template for the pre-auth step.
///
/// Credential values in the body become `{{username}}` / `{{password}}` so
/// the real values can be substituted at execution time, and the body is
/// collapsed onto one line.
pub fn build_pre_auth_curl(request: &Request) -> String {
    let mut parts: Vec<String> = vec![
        "curl".to_string(),
        "-X".to_string(),
        request.method.to_string(),
        shell_escape(&request.full_url()),
    ];

    for (name, value) in request.headers.iter() {
        if name.is_empty() || value.is_empty() {
            continue;
        }
        parts.push("-H".to_string());
        parts.push(shell_escape(&format!("{}: {}", name, value)));
    }

    if !request.body.trim().is_empty() {
        let body = templatize_credentials(&request.body);
        let body = body.split_whitespace().collect::<Vec<_>>().join(" ");
        parts.push("-d".to_string());
        parts.push(shell_escape(&body));
    }

    parts.join(" ")
}

/// Keep PowerShell from expanding `$name` or treating a backtick as an
/// escape inside a double-quoted argument
fn escape_powershell(s: &str) -> String {
    s.replace('`', "``").replace('$', "`$")
}

/// Single-quote a string for a POSIX shell
fn shell_escape(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\"'\"'"))
}
