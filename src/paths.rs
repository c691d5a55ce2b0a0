// File: ./src/paths.rs
use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Environment variable that relocates config, data and logs under one root.
pub const HOME_ENV: &str = "STARCHART_HOME";

const CONFIG_FILE: &str = "config.toml";
const EVENTS_FILE: &str = "star_events.json";
const LOG_DIR: &str = "logs";

/// On-disk locations used by the app.
#[derive(Debug, Clone)]
pub struct AppPaths {
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl AppPaths {
    /// Platform directories, or `$STARCHART_HOME/{config,data}` when set.
    pub fn resolve() -> Result<Self> {
        if let Ok(root) = std::env::var(HOME_ENV)
            && !root.trim().is_empty()
        {
            return Ok(Self::under(root.trim()));
        }

        let dirs = ProjectDirs::from("org", "starchart", "starchart")
            .context("could not determine a home directory")?;
        Ok(Self {
            config_dir: dirs.config_dir().to_path_buf(),
            data_dir: dirs.data_dir().to_path_buf(),
        })
    }

    /// Everything below a single root. Used by `STARCHART_HOME` and tests.
    pub fn under(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            config_dir: root.join("config"),
            data_dir: root.join("data"),
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    pub fn events_file(&self) -> PathBuf {
        self.data_dir.join(EVENTS_FILE)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join(LOG_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn under_keeps_everything_below_root() {
        let paths = AppPaths::under("/tmp/stars");
        assert_eq!(paths.config_file(), PathBuf::from("/tmp/stars/config/config.toml"));
        assert_eq!(paths.events_file(), PathBuf::from("/tmp/stars/data/star_events.json"));
        assert_eq!(paths.log_dir(), PathBuf::from("/tmp/stars/data/logs"));
    }
}
