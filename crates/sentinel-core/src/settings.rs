use clap::Parser;
use std::path::PathBuf;

use crate::error::{Result, SentinelError};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Scheduled broadcasting and keyword monitoring for chat accounts
#[derive(Parser, Debug, Clone)]
#[command(
    name = "chat-sentinel",
    about = "Scheduled broadcasting and keyword monitoring for chat accounts",
    version
)]
pub struct Settings {
    /// Directory holding the per-owner record files
    #[arg(long, env = "SENTINEL_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Scheduler tick interval in seconds
    #[arg(long, default_value = "60", value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub tick_secs: u64,

    /// Seconds to wait before restarting after a fatal runtime failure
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u64).range(1..=600))]
    pub restart_backoff_secs: u64,

    /// Logging level
    #[arg(long, env = "SENTINEL_LOG_LEVEL", default_value = "INFO",
          value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,
}

impl Settings {
    /// Parse settings from the process arguments and environment.
    pub fn load() -> Self {
        Self::parse()
    }

    /// Same as [`Settings::load`] but from an explicit argument list, for
    /// unit tests.
    pub fn load_from_args(args: Vec<std::ffi::OsString>) -> Self {
        Self::parse_from(args)
    }

    /// Resolve the owner-record directory.
    ///
    /// Uses `--data-dir` / `SENTINEL_DATA_DIR` when given, otherwise
    /// `~/.chat-sentinel/owners`. Failing to determine a home directory with
    /// no override set is a fatal startup error.
    pub fn resolve_data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        dirs::home_dir()
            .map(|home| home.join(".chat-sentinel").join("owners"))
            .ok_or_else(|| {
                SentinelError::Config(
                    "no data directory given and no home directory found".to_string(),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    fn args(extra: &[&str]) -> Vec<OsString> {
        std::iter::once("chat-sentinel")
            .chain(extra.iter().copied())
            .map(OsString::from)
            .collect()
    }

    #[test]
    fn test_defaults() {
        let s = Settings::load_from_args(args(&[]));
        assert_eq!(s.tick_secs, 60);
        assert_eq!(s.restart_backoff_secs, 10);
        assert_eq!(s.log_level, "INFO");
        assert!(s.data_dir.is_none());
    }

    #[test]
    fn test_explicit_values() {
        let s = Settings::load_from_args(args(&[
            "--data-dir",
            "/tmp/owners",
            "--tick-secs",
            "5",
            "--log-level",
            "DEBUG",
        ]));
        assert_eq!(s.data_dir.as_deref(), Some(std::path::Path::new("/tmp/owners")));
        assert_eq!(s.tick_secs, 5);
        assert_eq!(s.log_level, "DEBUG");
    }

    #[test]
    fn test_resolve_data_dir_prefers_explicit() {
        let s = Settings::load_from_args(args(&["--data-dir", "/tmp/owners"]));
        assert_eq!(
            s.resolve_data_dir().unwrap(),
            PathBuf::from("/tmp/owners")
        );
    }

    #[test]
    fn test_resolve_data_dir_falls_back_to_home() {
        let tmp = tempfile::TempDir::new().unwrap();
        let original_home = std::env::var_os("HOME");
        std::env::set_var("HOME", tmp.path());

        let s = Settings::load_from_args(args(&[]));
        let resolved = s.resolve_data_dir();

        match original_home {
            Some(v) => std::env::set_var("HOME", v),
            None => std::env::remove_var("HOME"),
        }

        assert_eq!(
            resolved.unwrap(),
            tmp.path().join(".chat-sentinel").join("owners")
        );
    }
}
