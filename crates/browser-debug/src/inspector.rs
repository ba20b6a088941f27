use anyhow::{Context, Result};
use chromiumoxide::Page;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use crate::config::DebugConfig;

const PAGE_STATE_JS: &str = r#"
(() => {
    return {
        url: window.location.href,
        title: document.title,
        readyState: document.readyState,
        viewport: { width: window.innerWidth, height: window.innerHeight },
        bodyChildren: document.body ? document.body.children.length : 0,
        bodyTextPreview: document.body ? document.body.innerText.substring(0, 1000) : null,
    };
})()
"#;

/// Saves screenshots, HTML and page state for each probe step when
/// `BROWSER_DEBUG` is enabled. Every capture is best-effort.
pub struct PageInspector {
    config: DebugConfig,
    run_dir: PathBuf,
    step_counter: u32,
}

impl PageInspector {
    /// Returns `None` when debugging is disabled or the run directory
    /// cannot be created.
    pub fn for_run(config: &DebugConfig, run_label: &str) -> Option<Self> {
        if !config.is_enabled() {
            return None;
        }

        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%SZ");
        let run_dir = config
            .output_dir()
            .join(format!("{}_{}", stamp, sanitize_label(run_label)));

        match std::fs::create_dir_all(&run_dir) {
            Ok(()) => {
                info!("Browser debug output enabled: {:?}", run_dir);
                Some(Self {
                    config: config.clone(),
                    run_dir,
                    step_counter: 0,
                })
            }
            Err(e) => {
                warn!("Failed to create debug output directory {:?}: {}", run_dir, e);
                None
            }
        }
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// Capture everything configured for one step
    pub async fn capture(&mut self, page: &Page, step: &str) {
        self.step_counter += 1;
        let prefix = format!("{:03}_{}", self.step_counter, sanitize_label(step));

        if self.config.capture_screenshots {
            if let Err(e) = self.screenshot(page, &prefix).await {
                warn!("Debug screenshot for step '{}' failed: {}", step, e);
            }
        }
        if self.config.capture_html {
            if let Err(e) = self.save_page_html(page, &prefix).await {
                warn!("Debug HTML capture for step '{}' failed: {}", step, e);
            }
        }
        let state = page_state(page).await;
        let state_path = self.run_dir.join(format!("{}_state.json", prefix));
        match serde_json::to_string_pretty(&state) {
            Ok(content) => {
                if let Err(e) = std::fs::write(&state_path, content) {
                    warn!("Failed to write page state to {:?}: {}", state_path, e);
                }
            }
            Err(e) => warn!("Failed to serialize page state: {}", e),
        }

        debug!("Captured debug step {} ({})", self.step_counter, step);
    }

    async fn screenshot(&self, page: &Page, prefix: &str) -> Result<PathBuf> {
        let path = self.run_dir.join(format!("{}.png", prefix));
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();

        let data = page.screenshot(params).await.context("screenshot command failed")?;
        std::fs::write(&path, data)
            .with_context(|| format!("Failed to write screenshot to {:?}", path))?;
        info!("Screenshot saved: {:?}", path);
        Ok(path)
    }

    async fn save_page_html(&self, page: &Page, prefix: &str) -> Result<PathBuf> {
        let path = self.run_dir.join(format!("{}.html", prefix));
        let html = page.content().await.context("failed to read page content")?;
        std::fs::write(&path, html)
            .with_context(|| format!("Failed to write HTML to {:?}", path))?;
        info!("Page HTML saved: {:?}", path);
        Ok(path)
    }
}

/// Page URL, title and a text preview as JSON
pub async fn page_state(page: &Page) -> Value {
    let url = page.url().await.ok().flatten().unwrap_or_default();
    let mut state = json!({ "url": url });

    match page.evaluate(PAGE_STATE_JS).await {
        Ok(result) => {
            if let Some(Value::Object(obj)) = result.value() {
                for (key, val) in obj {
                    state[key] = val.clone();
                }
            }
        }
        Err(e) => {
            warn!("Failed to execute JavaScript for page state: {}", e);
        }
    }

    state
}

pub fn sanitize_label(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_label() {
        assert_eq!(sanitize_label("cinema page/consent"), "cinema_page_consent");
        assert_eq!(sanitize_label("film-page_1"), "film-page_1");
    }

    #[test]
    fn test_inspector_disabled() {
        let config = DebugConfig::default();
        assert!(PageInspector::for_run(&config, "probe").is_none());
    }

    #[test]
    fn test_inspector_creates_run_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = DebugConfig {
            enabled: true,
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        };

        let inspector = PageInspector::for_run(&config, "cinema page").unwrap();
        assert!(inspector.run_dir().is_dir());
        assert!(inspector.run_dir().starts_with(dir.path()));
        assert!(inspector
            .run_dir()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .ends_with("cinema_page"));
        assert_eq!(std::fs::read_dir(inspector.run_dir()).unwrap().count(), 0);
    }
}
