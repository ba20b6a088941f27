use async_trait::async_trait;
use browser_debug::{DebugConfig, PageInspector};
use showtime_config::{ProbeConfig, TargetConfig};
use showtime_models::ProbeReport;
use std::time::Instant;
use tracing::{error, info, warn};
use crate::browser::{BrowserPaths, BrowserSession};
use crate::error::ProbeError;
use crate::heuristic::{Evidence, TargetMatcher};
use crate::strategy::{strategy_for, ExtractionStrategy, StrategyContext};

/// One availability check. Failures are folded into the report
/// (`available = false`, `error = Some(..)`), never returned.
#[async_trait]
pub trait AvailabilityProbe: Send + Sync {
    async fn probe(&self) -> ProbeReport;
}

/// Probe backed by a headless Chromium session opened and closed per call
pub struct BrowserProbe {
    target: TargetConfig,
    settings: ProbeConfig,
    paths: BrowserPaths,
    debug: DebugConfig,
    matcher: TargetMatcher,
    strategy: Box<dyn ExtractionStrategy>,
}

impl BrowserProbe {
    pub fn new(target: TargetConfig, settings: ProbeConfig, paths: BrowserPaths, debug: DebugConfig) -> Self {
        let matcher = TargetMatcher::new(&target);
        let strategy = strategy_for(settings.strategy);
        Self {
            target,
            settings,
            paths,
            debug,
            matcher,
            strategy,
        }
    }

    async fn collect_evidence(&self) -> Result<Evidence, ProbeError> {
        let session = BrowserSession::launch(&self.settings, &self.paths).await?;
        let result = self.collect_with_session(&session).await;
        session.shutdown().await;
        result
    }

    async fn collect_with_session(&self, session: &BrowserSession) -> Result<Evidence, ProbeError> {
        let page = session.new_page(self.settings.block_resources).await?;
        let inspector = PageInspector::for_run(&self.debug, self.strategy.name());
        let debug_dir = inspector.as_ref().map(|i| i.run_dir().to_path_buf());
        let mut ctx = StrategyContext::new(&self.target, &self.settings, &self.matcher, inspector);

        let result = self.strategy.collect(&page, &mut ctx).await;
        if result.is_err() {
            ctx.capture(&page, "error").await;
            if let Some(dir) = &debug_dir {
                warn!("Failing page captured under {}", dir.display());
            }
        }

        if let Err(e) = page.close().await {
            warn!("Failed to close page: {}", e);
        }
        result
    }
}

#[async_trait]
impl AvailabilityProbe for BrowserProbe {
    async fn probe(&self) -> ProbeReport {
        let started = Instant::now();
        let mut report = ProbeReport::empty(self.strategy.name());
        info!("Probing '{}' at {} ({} strategy)", self.target.film_title, self.target.venue_name, self.strategy.name());

        match self.collect_evidence().await {
            Ok(evidence) => {
                let assessment = self.matcher.assess(&evidence);
                assessment.apply_to(&mut report);
                report.film_page_url = evidence.film_page_url.clone();
                report.consent_dismissed = evidence.consent_dismissed;
                report.matched_responses = evidence.network_bodies.len();
                info!(
                    "Probe verdict: available={} film={} venue={} reservation_signal={} showtimes={}",
                    report.available,
                    report.film_presence,
                    report.venue_present,
                    report.reservation_signal,
                    report.showtime_count
                );
            }
            Err(e) => {
                error!("Probe failed: {}", e);
                report.error = Some(e.to_string());
            }
        }

        report.elapsed_ms = started.elapsed().as_millis() as u64;
        report
    }
}
