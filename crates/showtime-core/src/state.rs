use showtime_models::MonitorState;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug)]
pub enum StateError {
    #[error("Failed to read state file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("State file {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write state file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// JSON file holding the single `MonitorState` record
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current state; a missing or damaged file reads as the default
    pub fn load(&self) -> MonitorState {
        match self.try_load() {
            Ok(Some(state)) => state,
            Ok(None) => {
                debug!("No state file at {:?}, starting from defaults", self.path);
                MonitorState::default()
            }
            Err(e) => {
                warn!("{}. Starting from defaults.", e);
                MonitorState::default()
            }
        }
    }

    /// `Ok(None)` when the file does not exist
    pub fn try_load(&self) -> Result<Option<MonitorState>, StateError> {
        let data = match std::fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StateError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let state = serde_json::from_slice(&data).map_err(|source| StateError::Parse {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(state))
    }

    /// Write the state atomically. Failures are logged here as well, so
    /// callers are free to ignore the result.
    pub fn save(&self, state: &MonitorState) -> Result<(), StateError> {
        let result = self.write(state);
        match &result {
            Ok(()) => debug!("Saved state to {:?}: {}", self.path, state.last_status),
            Err(e) => error!("{}", e),
        }
        result
    }

    /// Overwrite with the default state
    pub fn reset(&self) -> Result<(), StateError> {
        self.save(&MonitorState::default())?;
        info!("State reset at {:?}", self.path);
        Ok(())
    }

    fn write(&self, state: &MonitorState) -> Result<(), StateError> {
        // serde_json leaves non-ASCII as UTF-8
        let mut json = serde_json::to_string_pretty(state)?;
        json.push('\n');

        let write_err = |source| StateError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        // Write to a sibling temp file, then rename over the old state
        let temp_path = self.temp_path();
        std::fs::write(&temp_path, json).map_err(write_err)?;
        if let Err(e) = std::fs::rename(&temp_path, &self.path) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(write_err(e));
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "state.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use showtime_models::Availability;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> StateStore {
        StateStore::new(dir.path().join("state.json"))
    }

    #[test]
    fn test_missing_file_loads_default() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.try_load().unwrap().is_none());
        assert_eq!(store.load(), MonitorState::default());
    }

    #[test]
    fn test_corrupt_file_loads_default() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "{ not json").unwrap();

        assert!(matches!(store.try_load(), Err(StateError::Parse { .. })));
        assert_eq!(store.load(), MonitorState::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let seen = Utc.with_ymd_and_hms(2025, 12, 10, 8, 15, 0).unwrap();
        let state = MonitorState::default().advance(Availability::Available, seen, None);

        store.save(&state).unwrap();
        assert_eq!(store.load(), state);
        assert!(!dir.path().join("state.json.tmp").exists());
    }

    #[test]
    fn test_unknown_status_loads_as_unavailable() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), r#"{"last_status": "pending", "last_seen_at": null}"#).unwrap();

        assert_eq!(store.load().last_status, Availability::Unavailable);
    }

    #[test]
    fn test_extra_keys_and_non_ascii_survive() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(
            store.path(),
            r#"{"last_status": "unavailable", "last_seen_at": null, "note": "Séance à Brumath"}"#,
        )
        .unwrap();

        let state = store.load();
        let next = state.advance(Availability::Available, Utc::now(), None);
        store.save(&next).unwrap();

        let written = std::fs::read_to_string(store.path()).unwrap();
        assert!(written.contains("Séance à Brumath"));
        assert!(written.contains("\"last_status\": \"available\""));
        assert!(!written.contains("last_error"));
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path().join("nested/deeper/state.json"));
        store.save(&MonitorState::default()).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_save_to_unwritable_location_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file, not a directory").unwrap();
        let store = StateStore::new(blocker.join("state.json"));

        assert!(matches!(
            store.save(&MonitorState::default()),
            Err(StateError::Write { .. })
        ));
    }

    #[test]
    fn test_reset_overwrites_state() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let state = MonitorState::default().advance(Availability::Available, Utc::now(), Some("boom".into()));
        store.save(&state).unwrap();

        store.reset().unwrap();
        assert_eq!(store.load(), MonitorState::default());
    }
}
