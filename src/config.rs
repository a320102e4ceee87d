use anyhow::Context;
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub const LOG_FILE_VAR: &str = "MINISH_LOG_FILE";
pub const TRACE_VAR: &str = "MINISH_TRACE";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Where child terminations are recorded. Always absolute.
    pub log_file: PathBuf,
    /// `tracing` filter directive.
    pub trace: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let cwd = env::current_dir().context("Failed to get the current directory.")?;
        Ok(Self::resolve(
            env::var_os(LOG_FILE_VAR),
            env::var(TRACE_VAR).ok(),
            &cwd,
        ))
    }

    fn resolve(log_file: Option<OsString>, trace: Option<String>, cwd: &Path) -> Self {
        let log_file = log_file
            .filter(|s| !s.is_empty())
            .map_or_else(|| PathBuf::from("log.txt"), PathBuf::from);
        Self {
            log_file: cwd.join(log_file),
            trace: trace
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| String::from("warn")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::resolve(None, None, Path::new("/work"));
        assert_eq!(config.log_file, Path::new("/work/log.txt"));
        assert_eq!(config.trace, "warn");
    }

    #[test]
    fn overrides() {
        let config = Config::resolve(
            Some(OsString::from("logs/minish.log")),
            Some(String::from("minish=debug")),
            Path::new("/work"),
        );
        assert_eq!(config.log_file, Path::new("/work/logs/minish.log"));
        assert_eq!(config.trace, "minish=debug");

        let config = Config::resolve(Some(OsString::from("/var/log/x")), None, Path::new("/work"));
        assert_eq!(config.log_file, Path::new("/var/log/x"));
    }
}
