use crate::output::Output;
use super::AppContext;
use color_eyre::Result;
use showtime_probe::AvailabilityProbe;

pub async fn run_probe(ctx: &AppContext, output: &Output) -> Result<()> {
    let probe = ctx.browser_probe();
    let report = probe.probe().await;

    if output.is_human() {
        output.report(&report);
    } else {
        output.data(&report);
    }
    Ok(())
}
