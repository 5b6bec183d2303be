//! Credential removal for bootstrap request bodies
//!
//! Values (never keys) of a fixed, case-insensitive set of credential fields
//! are rewritten in three shapes: `"key":"value"`, `'key':'value'` and form
//! style `key=value`. Nothing else in the body is touched, and running a
//! redaction twice gives the same text as running it once.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Fields whose values are treated as credentials
pub const CREDENTIAL_KEYS: &[&str] = &["email", "login", "username", "user", "password", "pass"];

const KEY_ALTERNATION: &str = "email|login|username|user|password|pass";

static DOUBLE_QUOTED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r#"(?i)("({})"\s*:\s*")((?:[^"\\]|\\.)*)(")"#,
        KEY_ALTERNATION
    ))
    .expect("Invalid double-quoted credential regex")
});

static SINGLE_QUOTED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r#"(?i)('({})'\s*:\s*')((?:[^'\\]|\\.)*)(')"#,
        KEY_ALTERNATION
    ))
    .expect("Invalid single-quoted credential regex")
});

static FORM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b(({})=)([^&\s]*)", KEY_ALTERNATION))
        .expect("Invalid form credential regex")
});

/// What a credential value is replaced with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redaction {
    /// Empty value, for bodies written to disk
    Blank,
    /// `{{username}}` / `{{password}}`, for the pre-auth curl template
    Placeholder,
}

impl Redaction {
    fn replacement(&self, key: &str) -> &'static str {
        match self {
            Redaction::Blank => "",
            Redaction::Placeholder => {
                let key = key.to_ascii_lowercase();
                if key == "password" || key == "pass" {
                    "{{password}}"
                } else {
                    "{{username}}"
                }
            }
        }
    }
}

/// Blank every credential value in `body`
pub fn redact(body: &str) -> String {
    redact_with(body, Redaction::Blank)
}

/// Replace credential values with `{{username}}` / `{{password}}`
pub fn templatize_credentials(body: &str) -> String {
    redact_with(body, Redaction::Placeholder)
}

pub fn redact_with(body: &str, mode: Redaction) -> String {
    if body.is_empty() {
        return String::new();
    }

    let sanitized = DOUBLE_QUOTED_RE.replace_all(body, |caps: &Captures| quoted(caps, mode));
    let sanitized =
        SINGLE_QUOTED_RE.replace_all(&sanitized, |caps: &Captures| quoted(caps, mode));
    let sanitized = FORM_RE.replace_all(&sanitized, |caps: &Captures| {
        format!("{}{}", &caps[1], mode.replacement(&caps[2]))
    });

    sanitized.into_owned()
}

fn quoted(caps: &Captures, mode: Redaction) -> String {
    format!("{}{}{}", &caps[1], mode.replacement(&caps[2]), &caps[4])
}

/// Whether `body` still holds a credential value that `mode` would rewrite
pub fn has_credentials(body: &str, mode: Redaction) -> bool {
    redact_with(body, mode) != body
}
