use chromiumoxide::Page;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, info};

const ATTEMPT_TIMEOUT: Duration = Duration::from_millis(1500);
const PASS_PAUSE: Duration = Duration::from_millis(700);
const AFTER_CLICK_PAUSE: Duration = Duration::from_millis(400);
const PASSES: usize = 3;

/// Accept buttons of common consent-management platforms
const FRAMEWORK_SELECTORS: [&str; 4] = [
    "#onetrust-accept-btn-handler",
    "#didomi-notice-agree-button",
    "#axeptio_btn_acceptAll",
    ".fc-cta-consent",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlRole {
    Button,
    Link,
}

impl ControlRole {
    fn selector(self) -> &'static str {
        match self {
            ControlRole::Button => {
                "button, [role='button'], input[type='button'], input[type='submit']"
            }
            ControlRole::Link => "a, [role='link']",
        }
    }
}

/// A control to try, matched case-insensitively against its trimmed label
#[derive(Debug, Clone, Copy)]
pub struct ConsentCandidate {
    pub role: ControlRole,
    pub label_pattern: &'static str,
}

const fn candidate(role: ControlRole, label_pattern: &'static str) -> ConsentCandidate {
    ConsentCandidate { role, label_pattern }
}

/// Tried in order; the first visible match is clicked
pub const CANDIDATES: [ConsentCandidate; 11] = [
    candidate(ControlRole::Button, r"^tout accepter"),
    candidate(ControlRole::Button, r"^accepter( et fermer)?$"),
    candidate(ControlRole::Button, r"^j['’]?accepte"),
    candidate(ControlRole::Button, r"^accept all"),
    candidate(ControlRole::Button, r"^accept( cookies)?$"),
    candidate(ControlRole::Button, r"^continuer"),
    candidate(ControlRole::Button, r"^ok$"),
    candidate(ControlRole::Button, r"^(fermer|close)$"),
    candidate(ControlRole::Link, r"^tout accepter"),
    candidate(ControlRole::Link, r"^accepter"),
    candidate(ControlRole::Link, r"^accept all"),
];

impl ConsentCandidate {
    /// Script that clicks the first visible control whose label matches and
    /// returns that label, or `null`.
    pub fn click_script(&self) -> String {
        // JSON string literals are valid JS string literals
        let selector = serde_json::Value::from(self.role.selector()).to_string();
        let pattern = serde_json::Value::from(self.label_pattern).to_string();
        format!(
            r#"
            ((selector, source) => {{
                const re = new RegExp(source, 'i');
                for (const el of document.querySelectorAll(selector)) {{
                    const label = (el.innerText || el.value || el.getAttribute('aria-label') || '')
                        .replace(/\s+/g, ' ').trim();
                    if (!label || !re.test(label)) continue;
                    const rect = el.getBoundingClientRect();
                    if (rect.width === 0 || rect.height === 0) continue;
                    el.click();
                    return label;
                }}
                return null;
            }})({selector}, {pattern})
            "#
        )
    }
}

/// Try to get the consent overlay out of the way. Returns whether a control
/// was clicked; a page without an overlay simply returns `false`.
pub async fn dismiss_consent(page: &Page) -> bool {
    for pass in 0..PASSES {
        for selector in FRAMEWORK_SELECTORS {
            if let Ok(true) = timeout(ATTEMPT_TIMEOUT, click_selector(page, selector)).await {
                info!("Cookie consent dismissed ({})", selector);
                sleep(AFTER_CLICK_PAUSE).await;
                return true;
            }
        }

        for candidate in &CANDIDATES {
            if let Ok(Some(label)) = timeout(ATTEMPT_TIMEOUT, click_by_label(page, candidate)).await {
                info!("Cookie consent dismissed via '{}'", label);
                sleep(AFTER_CLICK_PAUSE).await;
                return true;
            }
        }

        debug!("No consent control found (pass {}/{})", pass + 1, PASSES);
        sleep(PASS_PAUSE).await;
    }

    debug!("No cookie consent overlay dismissed");
    false
}

async fn click_selector(page: &Page, selector: &str) -> bool {
    match page.find_element(selector.to_string()).await {
        Ok(element) => element.click().await.is_ok(),
        Err(_) => false,
    }
}

async fn click_by_label(page: &Page, candidate: &ConsentCandidate) -> Option<String> {
    let result = page.evaluate(candidate.click_script()).await.ok()?;
    result.value().and_then(|v| v.as_str()).map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::RegexBuilder;

    fn first_match(role: ControlRole, label: &str) -> Option<&'static str> {
        CANDIDATES
            .iter()
            .filter(|c| c.role == role)
            .find(|c| {
                RegexBuilder::new(c.label_pattern)
                    .case_insensitive(true)
                    .build()
                    .unwrap()
                    .is_match(label)
            })
            .map(|c| c.label_pattern)
    }

    #[test]
    fn test_patterns_compile() {
        for candidate in &CANDIDATES {
            assert!(RegexBuilder::new(candidate.label_pattern).build().is_ok());
        }
    }

    #[test]
    fn test_accept_all_preferred() {
        assert_eq!(first_match(ControlRole::Button, "Tout accepter"), Some(r"^tout accepter"));
        assert_eq!(first_match(ControlRole::Button, "Accepter et fermer"), Some(r"^accepter( et fermer)?$"));
        assert_eq!(first_match(ControlRole::Button, "J’accepte"), Some(r"^j['’]?accepte"));
        assert_eq!(first_match(ControlRole::Button, "Accept all cookies"), Some(r"^accept all"));
        assert_eq!(first_match(ControlRole::Link, "Accepter les cookies"), Some(r"^accepter"));
    }

    #[test]
    fn test_unrelated_controls_ignored() {
        assert_eq!(first_match(ControlRole::Button, "Book now"), None);
        assert_eq!(first_match(ControlRole::Button, "Réserver"), None);
        assert_eq!(first_match(ControlRole::Button, "Paramétrer les cookies"), None);
    }

    #[test]
    fn test_click_script_embeds_quoted_arguments() {
        let script = CANDIDATES[2].click_script();
        assert!(script.contains(r#""^j['’]?accepte""#));
        assert!(script.contains("new RegExp(source, 'i')"));
        assert!(script.contains("input[type='submit']"));
    }
}
