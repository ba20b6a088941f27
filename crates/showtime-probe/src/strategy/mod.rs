//! Interchangeable ways of turning the target site into `Evidence`.
//!
//! Every strategy receives an open page and the fixed target settings; the
//! heuristic that turns evidence into a verdict is shared.

mod cinema_page;
mod film_page;
mod network;

pub use cinema_page::CinemaPageStrategy;
pub use film_page::FilmPageStrategy;
pub use network::{NetworkStrategy, is_candidate_response};

use async_trait::async_trait;
use browser_debug::PageInspector;
use chromiumoxide::Page;
use showtime_config::{ProbeConfig, ProbeStrategy, TargetConfig};
use crate::consent::dismiss_consent;
use crate::error::ProbeError;
use crate::heuristic::{Evidence, TargetMatcher};
use crate::page::navigate;

#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn collect(&self, page: &Page, ctx: &mut StrategyContext<'_>) -> Result<Evidence, ProbeError>;
}

pub fn strategy_for(kind: ProbeStrategy) -> Box<dyn ExtractionStrategy> {
    match kind {
        ProbeStrategy::CinemaPage => Box::new(CinemaPageStrategy),
        ProbeStrategy::FilmPage => Box::new(FilmPageStrategy),
        ProbeStrategy::Network => Box::new(NetworkStrategy::default()),
    }
}

/// Settings and debug capture shared by the steps of one probe
pub struct StrategyContext<'a> {
    pub target: &'a TargetConfig,
    pub settings: &'a ProbeConfig,
    pub matcher: &'a TargetMatcher,
    pub inspector: Option<PageInspector>,
}

impl<'a> StrategyContext<'a> {
    pub fn new(
        target: &'a TargetConfig,
        settings: &'a ProbeConfig,
        matcher: &'a TargetMatcher,
        inspector: Option<PageInspector>,
    ) -> Self {
        Self {
            target,
            settings,
            matcher,
            inspector,
        }
    }

    pub async fn capture(&mut self, page: &Page, step: &str) {
        if let Some(inspector) = self.inspector.as_mut() {
            inspector.capture(page, step).await;
        }
    }

    /// Navigate, then clear the consent overlay. Returns whether a consent
    /// control was clicked.
    pub async fn open(&mut self, page: &Page, url: &str, step: &str) -> Result<bool, ProbeError> {
        navigate(
            page,
            url,
            self.settings.navigation_timeout(),
            self.settings.settle_delay(),
        )
        .await?;
        let dismissed = dismiss_consent(page).await;
        self.capture(page, step).await;
        Ok(dismissed)
    }
}
