use std::path::{Path, PathBuf};
use crate::error::ConfigError;

/// Get the container base path from environment variable, defaulting to "/app"
pub fn container_base_path() -> PathBuf {
    std::env::var("SHOWTIME_WATCH_BASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/app"))
}

pub struct PathManager {
    config_dir: PathBuf,
    data_dir: PathBuf,
    log_dir: PathBuf,
}

impl PathManager {
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NoDirectory("config"))?
            .join("showtime-watch");
        let data_dir = dirs::data_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".local/share")))
            .ok_or(ConfigError::NoDirectory("data"))?
            .join("showtime-watch");

        Ok(Self {
            config_dir,
            log_dir: data_dir.join("logs"),
            data_dir,
        })
    }

    pub fn from_docker_env() -> Self {
        Self::with_base(&container_base_path())
    }

    /// Everything under one directory: config at the top, data and logs below
    pub fn with_base(base: &Path) -> Self {
        Self {
            config_dir: base.to_path_buf(),
            data_dir: base.join("data"),
            log_dir: base.join("logs"),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Chromium profile directory
    pub fn browser_profile_dir(&self) -> PathBuf {
        self.data_dir.join("browser")
    }

    /// Where the fetcher puts Chromium when no system binary exists
    pub fn chromium_download_dir(&self) -> PathBuf {
        self.data_dir.join("chromium_downloads")
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join("showtime-watch.log")
    }

    /// Resolve a relative state file against the working directory, the way
    /// scheduled runs that commit `state.json` next to the checkout expect
    pub fn resolve_state_file(&self, state_file: &Path) -> PathBuf {
        if state_file.is_absolute() {
            return state_file.to_path_buf();
        }
        std::env::current_dir()
            .map(|cwd| cwd.join(state_file))
            .unwrap_or_else(|_| state_file.to_path_buf())
    }

    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        for dir in [&self.config_dir, &self.data_dir, &self.log_dir] {
            std::fs::create_dir_all(dir).map_err(|source| ConfigError::Write {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

impl Default for PathManager {
    fn default() -> Self {
        // The container image creates the base directory, so its presence means Docker
        let base = container_base_path();
        if base.exists() {
            return Self::from_docker_env();
        }

        Self::new().unwrap_or_else(|_| Self::from_docker_env())
    }
}
