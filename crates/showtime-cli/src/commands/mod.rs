pub mod check;
pub mod probe;
pub mod state;
pub mod test_email;

use browser_debug::DebugConfig;
use color_eyre::eyre::{eyre, Result};
use showtime_config::{MonitorConfig, PathManager};
use showtime_core::{SmtpNotifier, StateStore};
use showtime_probe::{BrowserPaths, BrowserProbe};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Config and resolved paths shared by every command
pub struct AppContext {
    pub config: MonitorConfig,
    pub paths: PathManager,
    pub state_file: PathBuf,
}

impl AppContext {
    pub fn load(config_path: Option<&Path>, state_override: Option<&Path>) -> Result<Self> {
        let paths = PathManager::default();
        if let Err(e) = paths.ensure_directories() {
            warn!("Could not create application directories: {}", e);
        }

        let config = match config_path {
            // An explicit file has to exist
            Some(path) => MonitorConfig::load_from_file(path),
            None => MonitorConfig::load_or_default(&paths.config_file()),
        }
        .map_err(|e| eyre!("{}", e))?;

        let state_file = match state_override {
            Some(path) => path.to_path_buf(),
            None => paths.resolve_state_file(&config.state_file),
        };
        debug!("Using state file {:?}", state_file);

        Ok(Self {
            config,
            paths,
            state_file,
        })
    }

    pub fn state_store(&self) -> StateStore {
        StateStore::new(&self.state_file)
    }

    pub fn browser_probe(&self) -> BrowserProbe {
        BrowserProbe::new(
            self.config.target.clone(),
            self.config.probe.clone(),
            BrowserPaths::from_path_manager(&self.paths),
            DebugConfig::from_env(),
        )
    }

    pub fn notifier(&self) -> SmtpNotifier {
        SmtpNotifier::from_env(self.config.smtp.clone())
    }
}
