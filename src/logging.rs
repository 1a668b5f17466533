//! Tracing subscriber setup.
//!
//! The terminal belongs to the UI, so log output goes to a file under the
//! user's data directory (`~/.local/share/pswp/pswp.log` on Linux).

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable consulted when no level is given on the command line
pub const LOG_ENV: &str = "PSWP_LOG";

const DEFAULT_LEVEL: &str = "info";

pub fn log_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("pswp").join("pswp.log"))
}

/// Picks the filter directive: explicit level, then `PSWP_LOG`, then `info`
pub fn resolve_level(explicit: Option<&str>, env: Option<String>) -> String {
    explicit
        .map(str::to_string)
        .or(env)
        .filter(|level| !level.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LEVEL.to_string())
}

/// Installs the global subscriber.
///
/// Logging is optional: any failure leaves tracing disabled and the app
/// running. Only the first successful call takes effect.
pub fn init_logging(level: Option<&str>) -> Option<PathBuf> {
    let path = log_path()?;
    let level = resolve_level(level, std::env::var(LOG_ENV).ok());
    init_logging_to(&path, &level).then_some(path)
}

fn init_logging_to(path: &Path, level: &str) -> bool {
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return false;
        }
    }

    let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
        return false;
    };

    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_level_prefers_explicit() {
        assert_eq!(resolve_level(Some("debug"), Some("warn".into())), "debug");
    }

    #[test]
    fn test_resolve_level_falls_back_to_env() {
        assert_eq!(resolve_level(None, Some("pswp=trace".into())), "pswp=trace");
    }

    #[test]
    fn test_resolve_level_default() {
        assert_eq!(resolve_level(None, None), "info");
        assert_eq!(resolve_level(None, Some("  ".into())), "info");
    }

    #[test]
    fn test_log_path_is_under_pswp() {
        if let Some(path) = log_path() {
            assert!(path.ends_with("pswp/pswp.log"));
        }
    }

    #[test]
    fn test_init_creates_log_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("logs").join("pswp.log");

        // May lose the race for the global subscriber to another test
        let _ = init_logging_to(&path, "not a valid filter ===");
        assert!(path.exists());
    }
}
