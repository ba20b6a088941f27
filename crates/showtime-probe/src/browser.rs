use chromiumoxide::cdp::browser_protocol::network::SetBlockedUrLsParams;
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use showtime_config::{PathManager, ProbeConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use which::which;
use crate::error::ProbeError;

const HANDLER_MAX_ERRORS: usize = 10;
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Directories the browser writes to
#[derive(Debug, Clone)]
pub struct BrowserPaths {
    pub profile_dir: PathBuf,
    pub download_dir: PathBuf,
}

impl BrowserPaths {
    pub fn from_path_manager(paths: &PathManager) -> Self {
        Self {
            profile_dir: paths.browser_profile_dir(),
            download_dir: paths.chromium_download_dir(),
        }
    }
}

/// A running headless Chromium plus the task pumping its CDP events.
/// Call `shutdown` on every path; dropping only kills the process.
pub struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

impl BrowserSession {
    pub async fn launch(settings: &ProbeConfig, paths: &BrowserPaths) -> Result<Self, ProbeError> {
        let chrome_path = match settings.chrome_executable.clone().or_else(find_system_chromium) {
            Some(path) => path,
            None => fetch_chromium(&paths.download_dir).await?,
        };

        std::fs::create_dir_all(&paths.profile_dir)
            .map_err(|e| ProbeError::Launch(format!("cannot create profile dir {:?}: {}", paths.profile_dir, e)))?;

        let config = build_browser_config(&chrome_path, &paths.profile_dir, settings)?;
        debug!("Launching Chromium from {:?}", chrome_path);

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ProbeError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            let mut error_count = 0;

            while let Some(h) = handler.next().await {
                match h {
                    Ok(_) => error_count = 0,
                    Err(e) => {
                        error_count += 1;
                        warn!(
                            "Browser handler error (count: {}/{}): {:?}",
                            error_count, HANDLER_MAX_ERRORS, e
                        );
                        if error_count >= HANDLER_MAX_ERRORS {
                            error!("Browser handler received {} consecutive errors, giving up", error_count);
                            break;
                        }
                    }
                }
            }

            debug!("Browser handler task ended");
        });

        Ok(Self { browser, handler_task })
    }

    pub async fn new_page(&self, block_resources: bool) -> Result<Page, ProbeError> {
        let page = self.browser.new_page("about:blank").await?;
        if block_resources {
            if let Err(e) = configure_resource_blocking(&page).await {
                warn!("Failed to configure resource blocking: {}", e);
            }
        }
        Ok(page)
    }

    pub async fn shutdown(mut self) {
        info!("Shutting down browser");
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser cleanly: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            warn!("Failed to wait for browser process: {}", e);
        }
        if tokio::time::timeout(SHUTDOWN_GRACE, &mut self.handler_task).await.is_err() {
            self.handler_task.abort();
        }
        debug!("Browser shut down");
    }
}

/// Block images, fonts and media; the heuristic only needs text
async fn configure_resource_blocking(page: &Page) -> Result<(), ProbeError> {
    let urls = [
        "*.jpg", "*.jpeg", "*.png", "*.gif", "*.webp", "*.svg",
        "*.woff", "*.woff2", "*.ttf", "*.otf",
        "*.mp4", "*.webm", "*.mp3",
    ]
    .into_iter()
    .map(String::from)
    .collect();

    page.execute(SetBlockedUrLsParams { urls }).await?;
    debug!("Resource blocking configured for page");
    Ok(())
}

async fn fetch_chromium(download_dir: &Path) -> Result<PathBuf, ProbeError> {
    info!("No system Chromium found, downloading via BrowserFetcher...");
    tokio::fs::create_dir_all(download_dir)
        .await
        .map_err(|e| ProbeError::Launch(format!("cannot create download dir {:?}: {}", download_dir, e)))?;

    let options = BrowserFetcherOptions::builder()
        .with_path(download_dir)
        .build()
        .map_err(|e| ProbeError::Launch(format!("invalid fetcher options: {}", e)))?;

    let info = BrowserFetcher::new(options)
        .fetch()
        .await
        .map_err(|e| ProbeError::Launch(format!("failed to fetch Chromium: {}", e)))?;

    info!("Chromium downloaded to: {:?}", info.executable_path);
    Ok(info.executable_path)
}

fn is_docker() -> bool {
    Path::new("/.dockerenv").exists()
        || std::fs::read_to_string("/proc/self/cgroup")
            .map(|s| s.contains("docker") || s.contains("containerd"))
            .unwrap_or(false)
}

fn find_system_chromium() -> Option<PathBuf> {
    let mut candidates: Vec<&str> = Vec::new();
    if cfg!(target_os = "macos") {
        candidates.extend([
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/opt/homebrew/bin/chromium",
        ]);
    }
    candidates.extend([
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/usr/local/bin/chromium",
        "/usr/local/bin/chromium-browser",
        "/opt/chromium/chromium",
        "/usr/bin/google-chrome",
    ]);

    candidates
        .into_iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
        .or_else(|| which("chromium").or_else(|_| which("chromium-browser")).ok())
}

fn build_browser_config(
    chrome_path: &Path,
    profile_dir: &Path,
    settings: &ProbeConfig,
) -> Result<BrowserConfig, ProbeError> {
    let mut builder = BrowserConfig::builder()
        .chrome_executable(chrome_path)
        .request_timeout(settings.navigation_timeout());

    if !settings.headless {
        builder = builder.with_head();
    }

    if is_docker() || !cfg!(target_os = "macos") {
        builder = builder
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage");
    }

    builder = builder
        .arg("--disable-extensions")
        .arg("--disable-notifications")
        .arg("--disable-sync")
        .arg("--disable-default-apps")
        .arg("--disable-gpu")
        .arg("--disable-crash-reporter")
        .arg("--disable-breakpad")
        .arg("--log-level=3")
        .arg("--lang=fr-FR")
        .arg("--window-size=1280,1024")
        .arg(format!("--user-data-dir={}", profile_dir.display()))
        .arg("--user-agent=Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36");

    builder
        .build()
        .map_err(|e| ProbeError::Launch(format!("failed to build browser config: {}", e)))
}
