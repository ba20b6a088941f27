use chromiumoxide::Page;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};
use crate::error::ProbeError;
use crate::heuristic::TargetMatcher;

const READY_POLL: Duration = Duration::from_millis(100);
const LINK_POLL: Duration = Duration::from_millis(500);

const LINKS_JS: &str = r#"
(() => Array.from(document.querySelectorAll('a[href]')).map(a => ({
    text: (a.innerText || '').replace(/\s+/g, ' ').trim(),
    label: a.getAttribute('aria-label') || a.getAttribute('title') || '',
    href: a.href,
})))()
"#;

const BODY_TEXT_JS: &str = "document.body ? document.body.innerText : ''";

/// An anchor as rendered on the page
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PageLink {
    pub text: String,
    #[serde(default)]
    pub label: String,
    pub href: String,
}

/// First link whose text or accessible label names the film
pub fn find_film_link<'a>(links: &'a [PageLink], matcher: &TargetMatcher) -> Option<&'a PageLink> {
    links.iter().find(|link| {
        link.href.starts_with("http") && (matcher.names_film(&link.text) || matcher.names_film(&link.label))
    })
}

/// Navigate and wait for the document to settle. Exceeding `limit` is a
/// `NavigationTimeout`.
pub async fn navigate(page: &Page, url: &str, limit: Duration, settle: Duration) -> Result<(), ProbeError> {
    info!("Opening {}", url);
    match timeout(limit, page.goto(url)).await {
        Err(_) => {
            return Err(ProbeError::NavigationTimeout {
                url: url.to_string(),
                secs: limit.as_secs(),
            })
        }
        Ok(Err(source)) => {
            return Err(ProbeError::Navigation {
                url: url.to_string(),
                source,
            })
        }
        Ok(Ok(_)) => {}
    }

    wait_for_page_ready(page, limit).await;
    sleep(settle).await;
    Ok(())
}

/// Poll `document.readyState`; a page that never completes is still usable
async fn wait_for_page_ready(page: &Page, limit: Duration) {
    let start = Instant::now();
    while start.elapsed() < limit {
        if let Ok(result) = page.evaluate("document.readyState === 'complete'").await {
            if result.value().and_then(|v| v.as_bool()).unwrap_or(false) {
                return;
            }
        }
        sleep(READY_POLL).await;
    }
    warn!("Page ready state check timed out, continuing anyway");
}

pub async fn visible_text(page: &Page) -> Result<String, ProbeError> {
    let result = page.evaluate(BODY_TEXT_JS).await?;
    Ok(result.into_value::<String>()?)
}

pub async fn markup(page: &Page) -> Result<String, ProbeError> {
    Ok(page.content().await?)
}

pub async fn current_url(page: &Page) -> Option<String> {
    page.url().await.ok().flatten()
}

pub async fn collect_links(page: &Page) -> Result<Vec<PageLink>, ProbeError> {
    let result = page.evaluate(LINKS_JS).await?;
    Ok(result.into_value::<Vec<PageLink>>()?)
}

/// Poll the page's links until one names the film or `limit` passes.
/// Listings are rendered client-side, so the link can appear late.
pub async fn wait_for_film_link(page: &Page, matcher: &TargetMatcher, limit: Duration) -> Option<PageLink> {
    let start = Instant::now();
    loop {
        match collect_links(page).await {
            Ok(links) => {
                if let Some(link) = find_film_link(&links, matcher) {
                    return Some(link.clone());
                }
                debug!("{} links on page, none naming the film yet", links.len());
            }
            Err(e) => debug!("Failed to list page links: {}", e),
        }

        if start.elapsed() >= limit {
            return None;
        }
        sleep(LINK_POLL).await;
    }
}
