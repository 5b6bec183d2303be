//! Environment struct (stdin/stdout tty state, colors)

/// Execution environment
#[derive(Debug, Clone)]
pub struct Environment {
    pub stdin_isatty: bool,
    pub stdout_isatty: bool,
    pub colors: bool,
    pub program_name: String,
}

impl Environment {
    pub fn init() -> Self {
        Self::default()
    }

    /// Environment for tests and piped use: no tty, no colors
    pub fn plain() -> Self {
        Self {
            stdin_isatty: false,
            stdout_isatty: false,
            colors: false,
            program_name: "restbook".to_string(),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        let stdout_isatty = atty::is(atty::Stream::Stdout);
        Self {
            stdin_isatty: atty::is(atty::Stream::Stdin),
            stdout_isatty,
            colors: stdout_isatty && detect_color_support(),
            program_name: "restbook".to_string(),
        }
    }
}

fn detect_color_support() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    !matches!(std::env::var("TERM").as_deref(), Ok("dumb"))
}
