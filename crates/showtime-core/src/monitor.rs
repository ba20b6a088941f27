use chrono::{DateTime, Utc};
use serde::Serialize;
use showtime_config::TargetConfig;
use showtime_models::{Availability, ProbeReport};
use showtime_probe::AvailabilityProbe;
use std::fmt;
use tracing::{info, instrument, warn};
use crate::notify::{compose_alert, Notifier};
use crate::state::StateStore;

#[cfg(test)]
mod tests;

/// How the verdict moved relative to the persisted status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// unavailable → available: the one case that notifies
    BecameAvailable,
    StillAvailable,
    /// available → unavailable: eligibility is reset
    BecameUnavailable,
    StillUnavailable,
}

impl Transition {
    pub fn between(previous: Availability, current: Availability) -> Self {
        match (previous.is_available(), current.is_available()) {
            (false, true) => Transition::BecameAvailable,
            (true, true) => Transition::StillAvailable,
            (true, false) => Transition::BecameUnavailable,
            (false, false) => Transition::StillUnavailable,
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Transition::BecameAvailable => "became available",
            Transition::StillAvailable => "still available",
            Transition::BecameUnavailable => "became unavailable",
            Transition::StillUnavailable => "still unavailable",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "error", rename_all = "snake_case")]
pub enum NotificationOutcome {
    NotRequired,
    Sent,
    Failed(String),
}

impl NotificationOutcome {
    pub fn was_sent(&self) -> bool {
        matches!(self, NotificationOutcome::Sent)
    }
}

/// Result of one monitoring invocation
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub previous: Availability,
    pub current: Availability,
    pub transition: Transition,
    pub notification: NotificationOutcome,
    pub state_saved: bool,
    pub report: ProbeReport,
    pub finished_at: DateTime<Utc>,
}

/// Notify only on the unavailable → available edge
pub fn should_notify(previous: Availability, verdict: bool) -> bool {
    !previous.is_available() && verdict
}

/// One load → probe → compare → notify → persist cycle
pub struct Monitor<P, N> {
    probe: P,
    notifier: N,
    store: StateStore,
    target: TargetConfig,
}

impl<P, N> Monitor<P, N>
where
    P: AvailabilityProbe,
    N: Notifier,
{
    pub fn new(probe: P, notifier: N, store: StateStore, target: TargetConfig) -> Self {
        Self {
            probe,
            notifier,
            store,
            target,
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Never fails: probe, mail and disk errors all end up in the summary
    #[instrument(skip_all)]
    pub async fn run(&self) -> RunSummary {
        let state = self.store.load();
        let previous = state.last_status;
        info!(
            "Previous status: {} (last seen {})",
            previous,
            state
                .last_seen_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "never".to_string())
        );

        let report = self.probe.probe().await;
        let current = Availability::from_verdict(report.available);
        let transition = Transition::between(previous, current);
        info!("Current status: {} ({})", current, transition);

        let now = Utc::now();
        let notification = if should_notify(previous, report.available) {
            let (subject, body) = compose_alert(&self.target, &report, now);
            match self.notifier.notify(&subject, &body).await {
                Ok(()) => NotificationOutcome::Sent,
                Err(e) => {
                    warn!("Showtimes are open but the alert could not be delivered: {}", e);
                    NotificationOutcome::Failed(e.to_string())
                }
            }
        } else {
            NotificationOutcome::NotRequired
        };

        // Persist even when the alert failed
        let next = state.advance(current, now, report.error.clone());
        let state_saved = self.store.save(&next).is_ok();

        RunSummary {
            previous,
            current,
            transition,
            notification,
            state_saved,
            report,
            finished_at: now,
        }
    }
}
