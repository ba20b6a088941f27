use super::*;
use crate::notify::NotifyError;
use async_trait::async_trait;
use chrono::TimeZone;
use showtime_models::MonitorState;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Replays a fixed sequence of verdicts, then keeps returning the last one
struct ScriptedProbe {
    reports: Mutex<VecDeque<ProbeReport>>,
}

impl ScriptedProbe {
    fn verdicts(verdicts: &[bool]) -> Self {
        let reports = verdicts
            .iter()
            .map(|&available| {
                let mut report = ProbeReport::empty("cinema_page");
                report.available = available;
                report
            })
            .collect();
        Self {
            reports: Mutex::new(reports),
        }
    }

    fn failing(error: &str) -> Self {
        Self {
            reports: Mutex::new(VecDeque::from([ProbeReport::failed("cinema_page", error)])),
        }
    }
}

#[async_trait]
impl AvailabilityProbe for ScriptedProbe {
    async fn probe(&self) -> ProbeReport {
        let mut reports = self.reports.lock().unwrap();
        if reports.len() > 1 {
            reports.pop_front().unwrap()
        } else {
            reports.front().cloned().unwrap()
        }
    }
}

#[derive(Clone, Default)]
struct RecordingNotifier {
    sent: Arc<Mutex<Vec<(String, String)>>>,
    fail: bool,
}

impl RecordingNotifier {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::MissingSettings(vec!["BREVO_SMTP_USER"]));
        }
        self.sent
            .lock()
            .unwrap()
            .push((subject.to_string(), body.to_string()));
        Ok(())
    }
}

fn monitor(
    dir: &TempDir,
    probe: ScriptedProbe,
    notifier: RecordingNotifier,
) -> Monitor<ScriptedProbe, RecordingNotifier> {
    let store = StateStore::new(dir.path().join("state.json"));
    Monitor::new(probe, notifier, store, TargetConfig::default())
}

fn earlier() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 12, 1, 8, 0, 0).unwrap()
}

fn seed(dir: &TempDir, status: Availability, at: DateTime<Utc>) {
    let store = StateStore::new(dir.path().join("state.json"));
    store
        .save(&MonitorState::default().advance(status, at, None))
        .unwrap();
}

#[test]
fn test_should_notify_only_on_rising_edge() {
    assert!(should_notify(Availability::Unavailable, true));
    assert!(!should_notify(Availability::Unavailable, false));
    assert!(!should_notify(Availability::Available, true));
    assert!(!should_notify(Availability::Available, false));
}

#[test]
fn test_transition_between() {
    use Availability::*;
    assert_eq!(Transition::between(Unavailable, Available), Transition::BecameAvailable);
    assert_eq!(Transition::between(Available, Available), Transition::StillAvailable);
    assert_eq!(Transition::between(Available, Unavailable), Transition::BecameUnavailable);
    assert_eq!(Transition::between(Unavailable, Unavailable), Transition::StillUnavailable);
}

#[tokio::test]
async fn test_first_run_with_open_showtimes_notifies_once() {
    let dir = TempDir::new().unwrap();
    let seeded_at = earlier();
    seed(&dir, Availability::Unavailable, seeded_at);
    let notifier = RecordingNotifier::default();
    let monitor = monitor(&dir, ScriptedProbe::verdicts(&[true]), notifier.clone());

    let summary = monitor.run().await;

    assert_eq!(summary.previous, Availability::Unavailable);
    assert_eq!(summary.current, Availability::Available);
    assert_eq!(summary.transition, Transition::BecameAvailable);
    assert!(summary.notification.was_sent());
    assert!(summary.state_saved);
    assert_eq!(notifier.count(), 1);

    let state = monitor.store().load();
    assert_eq!(state.last_status, Availability::Available);
    assert!(state.last_seen_at > Some(seeded_at));
    assert_eq!(state.last_seen_at, Some(summary.finished_at));

    let (subject, _) = notifier.sent.lock().unwrap()[0].clone();
    assert!(subject.contains("Brumath"));
}

#[tokio::test]
async fn test_repeated_availability_sends_nothing() {
    let dir = TempDir::new().unwrap();
    let notifier = RecordingNotifier::default();
    let monitor = monitor(&dir, ScriptedProbe::verdicts(&[true]), notifier.clone());

    for _ in 0..5 {
        monitor.run().await;
    }

    assert_eq!(notifier.count(), 1);
    assert_eq!(monitor.store().load().last_status, Availability::Available);
}

#[tokio::test]
async fn test_already_available_state_does_not_notify() {
    let dir = TempDir::new().unwrap();
    let seeded_at = earlier();
    seed(&dir, Availability::Available, seeded_at);
    let notifier = RecordingNotifier::default();
    let monitor = monitor(&dir, ScriptedProbe::verdicts(&[true]), notifier.clone());

    let summary = monitor.run().await;

    assert_eq!(summary.transition, Transition::StillAvailable);
    assert_eq!(summary.notification, NotificationOutcome::NotRequired);
    assert!(summary.state_saved);
    assert_eq!(notifier.count(), 0);

    let state = monitor.store().load();
    assert_eq!(state.last_status, Availability::Available);
    assert!(state.last_seen_at > Some(seeded_at));
}

#[tokio::test]
async fn test_drop_then_return_notifies_again() {
    let dir = TempDir::new().unwrap();
    let notifier = RecordingNotifier::default();
    let monitor = monitor(
        &dir,
        ScriptedProbe::verdicts(&[true, true, false, true]),
        notifier.clone(),
    );

    let transitions: Vec<Transition> = {
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(monitor.run().await.transition);
        }
        seen
    };

    assert_eq!(
        transitions,
        vec![
            Transition::BecameAvailable,
            Transition::StillAvailable,
            Transition::BecameUnavailable,
            Transition::BecameAvailable,
        ]
    );
    assert_eq!(notifier.count(), 2);
}

#[tokio::test]
async fn test_probe_failure_persists_unavailable_with_error() {
    let dir = TempDir::new().unwrap();
    seed(&dir, Availability::Available, earlier());
    let notifier = RecordingNotifier::default();
    let monitor = monitor(&dir, ScriptedProbe::failing("navigation timed out"), notifier.clone());

    let summary = monitor.run().await;

    assert_eq!(summary.current, Availability::Unavailable);
    assert_eq!(summary.transition, Transition::BecameUnavailable);
    assert_eq!(notifier.count(), 0);

    let state = monitor.store().load();
    assert_eq!(state.last_status, Availability::Unavailable);
    assert_eq!(state.last_error.as_deref(), Some("navigation timed out"));
}

#[tokio::test]
async fn test_failed_notification_still_persists_state() {
    let dir = TempDir::new().unwrap();
    let monitor = monitor(&dir, ScriptedProbe::verdicts(&[true]), RecordingNotifier::failing());

    let summary = monitor.run().await;

    assert!(matches!(summary.notification, NotificationOutcome::Failed(_)));
    assert!(summary.state_saved);
    assert_eq!(monitor.store().load().last_status, Availability::Available);
}

#[tokio::test]
async fn test_unwritable_state_file_does_not_abort_run() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "file, not a directory").unwrap();
    let notifier = RecordingNotifier::default();
    let monitor = Monitor::new(
        ScriptedProbe::verdicts(&[true]),
        notifier.clone(),
        StateStore::new(blocker.join("state.json")),
        TargetConfig::default(),
    );

    let summary = monitor.run().await;

    assert!(!summary.state_saved);
    assert!(summary.notification.was_sent());
    assert_eq!(notifier.count(), 1);
}

#[tokio::test]
async fn test_corrupt_state_counts_as_unavailable() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("state.json"), "][").unwrap();
    let notifier = RecordingNotifier::default();
    let monitor = monitor(&dir, ScriptedProbe::verdicts(&[true]), notifier.clone());

    let summary = monitor.run().await;

    assert_eq!(summary.previous, Availability::Unavailable);
    assert_eq!(notifier.count(), 1);
}

#[tokio::test]
async fn test_unavailable_run_refreshes_last_seen() {
    let dir = TempDir::new().unwrap();
    let notifier = RecordingNotifier::default();
    let monitor = monitor(&dir, ScriptedProbe::verdicts(&[false]), notifier.clone());

    let summary = monitor.run().await;

    assert_eq!(summary.transition, Transition::StillUnavailable);
    let state = monitor.store().load();
    assert_eq!(state.last_seen_at, Some(summary.finished_at));
    assert!(state.last_error.is_none());
    assert_eq!(notifier.count(), 0);
}
