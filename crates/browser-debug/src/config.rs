use std::path::{Path, PathBuf};

const ENABLED_VAR: &str = "BROWSER_DEBUG";
const OUTPUT_DIR_VAR: &str = "BROWSER_DEBUG_DIR";

#[derive(Debug, Clone, PartialEq)]
pub struct DebugConfig {
    pub enabled: bool,
    pub output_dir: PathBuf,
    pub capture_screenshots: bool,
    pub capture_html: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            output_dir: PathBuf::from("./browser_debug"),
            capture_screenshots: true,
            capture_html: true,
        }
    }
}

impl DebugConfig {
    /// Create a new DebugConfig from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let enabled = lookup(ENABLED_VAR)
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);
        let output_dir = lookup(OUTPUT_DIR_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| DebugConfig::default().output_dir);

        Self {
            enabled,
            output_dir,
            ..Default::default()
        }
    }

    /// Check if debugging is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Get the output directory path
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_without_env() {
        let config = DebugConfig::from_lookup(|_| None);
        assert!(!config.is_enabled());
        assert_eq!(config.output_dir(), Path::new("./browser_debug"));
    }

    #[test]
    fn test_enabled_values() {
        for value in ["1", "true", "YES"] {
            let config = DebugConfig::from_lookup(|key| {
                (key == ENABLED_VAR).then(|| value.to_string())
            });
            assert!(config.is_enabled(), "{} should enable debugging", value);
        }

        let config = DebugConfig::from_lookup(|key| (key == ENABLED_VAR).then(|| "0".to_string()));
        assert!(!config.is_enabled());
    }

    #[test]
    fn test_output_dir_override() {
        let config = DebugConfig::from_lookup(|key| match key {
            ENABLED_VAR => Some("1".to_string()),
            OUTPUT_DIR_VAR => Some("/tmp/probe-debug".to_string()),
            _ => None,
        });
        assert_eq!(config.output_dir(), Path::new("/tmp/probe-debug"));
    }
}
