use crate::output::Output;
use super::AppContext;
use color_eyre::Result;
use showtime_core::{Monitor, NotificationOutcome, Transition};

/// One monitoring cycle. Always `Ok` once the config has loaded: probe,
/// mail and disk failures are reported, not returned.
pub async fn run_check(ctx: &AppContext, output: &Output) -> Result<()> {
    tracing::debug!("Check command started");

    let monitor = Monitor::new(
        ctx.browser_probe(),
        ctx.notifier(),
        ctx.state_store(),
        ctx.config.target.clone(),
    );
    let summary = monitor.run().await;

    if !output.is_human() {
        output.data(&summary);
        return Ok(());
    }

    output.report(&summary.report);
    output.info(format!(
        "Status: {} -> {} ({})",
        summary.previous, summary.current, summary.transition
    ));

    match &summary.notification {
        NotificationOutcome::Sent => output.success("Alert email sent"),
        NotificationOutcome::Failed(e) => output.error(format!("Alert email not sent: {}", e)),
        NotificationOutcome::NotRequired if summary.transition == Transition::StillAvailable => {
            output.info("Already notified for this availability")
        }
        NotificationOutcome::NotRequired => {}
    }

    if summary.report.is_error() {
        output.warn("Probe failed; saved as unavailable");
    }
    if !summary.state_saved {
        output.error(format!("State could not be saved to {}", ctx.state_file.display()));
    }

    Ok(())
}
