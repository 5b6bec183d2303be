//! Tracing subscriber setup
//!
//! Logs go to stderr so response output on stdout stays clean. The level
//! comes from `-v` flags unless `RESTBOOK_LOG` holds a filter directive:
//!
//! ```bash
//! restbook -vv api.http                      # debug for restbook, warn elsewhere
//! RESTBOOK_LOG=restbook=trace,reqwest=debug restbook api.http
//! ```

use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::cli::args::LogFormat;
use crate::errors::{RestbookError, Result};

/// Environment variable holding an explicit filter directive
pub const LOG_ENV: &str = "RESTBOOK_LOG";

/// Level for restbook's own events at a given `-v` count
pub fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn filter_for(verbosity: u8) -> EnvFilter {
    match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => filter,
        Err(_) => {
            let level = level_for(verbosity).as_str().to_ascii_lowercase();
            EnvFilter::new(format!("warn,restbook={}", level))
        }
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(verbosity: u8, format: LogFormat) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter_for(verbosity))
        .with_writer(std::io::stderr)
        .with_target(verbosity >= 2);

    let installed = match format {
        LogFormat::Text => builder
            .with_ansi(atty::is(atty::Stream::Stderr))
            .try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    installed.map_err(|e| RestbookError::Config(format!("cannot install logger: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for() {
        assert_eq!(level_for(0), Level::WARN);
        assert_eq!(level_for(1), Level::INFO);
        assert_eq!(level_for(2), Level::DEBUG);
        assert_eq!(level_for(9), Level::TRACE);
    }
}
