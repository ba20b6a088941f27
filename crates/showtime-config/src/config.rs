use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use crate::error::ConfigError;

/// Immutable settings for one monitored film at one venue.
///
/// Every field has a default so an absent or partial `config.toml` still
/// yields a usable configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MonitorConfig {
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub smtp: SmtpConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TargetConfig {
    #[serde(default = "default_film_title")]
    pub film_title: String,
    /// Short, stable part of the title used when the full title cannot be found
    #[serde(default = "default_title_fallback")]
    pub title_fallback: String,
    #[serde(default = "default_film_url")]
    pub film_url: String,
    /// Display name used in notifications
    #[serde(default = "default_venue_name")]
    pub venue_name: String,
    /// Word that identifies the venue in page content
    #[serde(default = "default_venue_keyword")]
    pub venue_keyword: String,
    #[serde(default = "default_venue_url")]
    pub venue_url: String,
    #[serde(default = "default_reservation_keywords")]
    pub reservation_keywords: Vec<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStrategy {
    /// Venue page, then follow the film link
    #[default]
    CinemaPage,
    /// Film page text and markup
    FilmPage,
    /// Film page with XHR/fetch response interception
    Network,
}

impl ProbeStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            ProbeStrategy::CinemaPage => "cinema_page",
            ProbeStrategy::FilmPage => "film_page",
            ProbeStrategy::Network => "network",
        }
    }
}

impl fmt::Display for ProbeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProbeConfig {
    #[serde(default)]
    pub strategy: ProbeStrategy,
    #[serde(default = "default_navigation_timeout_secs")]
    pub navigation_timeout_secs: u64,
    /// Pause after navigation so client-side rendering can finish
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    #[serde(default = "default_film_link_timeout_secs")]
    pub film_link_timeout_secs: u64,
    #[serde(default = "default_true")]
    pub headless: bool,
    #[serde(default)]
    pub chrome_executable: Option<PathBuf>,
    /// Skip images, fonts and media while loading pages
    #[serde(default)]
    pub block_resources: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SmtpConfig {
    #[serde(default = "default_smtp_host")]
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    #[serde(default = "default_smtp_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_state_file() -> PathBuf {
    PathBuf::from("state.json")
}

fn default_film_title() -> String {
    "Avatar : De feu et de cendres".to_string()
}

fn default_title_fallback() -> String {
    "avatar".to_string()
}

fn default_film_url() -> String {
    "https://www.pathe.fr/films/avatar-de-feu-et-de-cendres-11387".to_string()
}

fn default_venue_name() -> String {
    "Pathé Brumath".to_string()
}

fn default_venue_keyword() -> String {
    "Brumath".to_string()
}

fn default_venue_url() -> String {
    "https://www.pathe.fr/cinemas/cinema-pathe-brumath".to_string()
}

fn default_reservation_keywords() -> Vec<String> {
    ["réserver", "reserver", "e-billet", "billetterie"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_navigation_timeout_secs() -> u64 {
    45
}

fn default_settle_ms() -> u64 {
    1500
}

fn default_film_link_timeout_secs() -> u64 {
    8
}

fn default_smtp_host() -> String {
    "smtp-relay.brevo.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_timeout_secs() -> u64 {
    30
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            state_file: default_state_file(),
            target: TargetConfig::default(),
            probe: ProbeConfig::default(),
            smtp: SmtpConfig::default(),
        }
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            film_title: default_film_title(),
            title_fallback: default_title_fallback(),
            film_url: default_film_url(),
            venue_name: default_venue_name(),
            venue_keyword: default_venue_keyword(),
            venue_url: default_venue_url(),
            reservation_keywords: default_reservation_keywords(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            strategy: ProbeStrategy::default(),
            navigation_timeout_secs: default_navigation_timeout_secs(),
            settle_ms: default_settle_ms(),
            film_link_timeout_secs: default_film_link_timeout_secs(),
            headless: true,
            chrome_executable: None,
            block_resources: false,
        }
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: default_smtp_host(),
            port: default_smtp_port(),
            timeout_secs: default_smtp_timeout_secs(),
        }
    }
}

impl ProbeConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn film_link_timeout(&self) -> Duration {
        Duration::from_secs(self.film_link_timeout_secs)
    }
}

impl SmtpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl MonitorConfig {
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: MonitorConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, built-in defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target.film_title.trim().is_empty() {
            return Err(ConfigError::Invalid("target.film_title cannot be empty".to_string()));
        }
        if self.target.venue_keyword.trim().is_empty() {
            return Err(ConfigError::Invalid("target.venue_keyword cannot be empty".to_string()));
        }

        let url = match self.probe.strategy {
            ProbeStrategy::CinemaPage => &self.target.venue_url,
            ProbeStrategy::FilmPage | ProbeStrategy::Network => &self.target.film_url,
        };
        if !url.starts_with("https://") && !url.starts_with("http://") {
            return Err(ConfigError::Invalid(format!(
                "{} strategy needs an http(s) URL, got '{}'",
                self.probe.strategy, url
            )));
        }

        if self.probe.navigation_timeout_secs == 0 {
            return Err(ConfigError::Invalid("probe.navigation_timeout_secs must be positive".to_string()));
        }
        if self.smtp.host.trim().is_empty() {
            return Err(ConfigError::Invalid("smtp.host cannot be empty".to_string()));
        }

        Ok(())
    }
}
