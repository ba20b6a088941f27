use crate::output::Output;
use super::AppContext;
use chrono::Utc;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use showtime_core::Notifier;

pub async fn run_test_email(ctx: &AppContext, output: &Output) -> Result<()> {
    let notifier = ctx.notifier();
    let subject = format!("Test showtime-watch : {}", ctx.config.target.venue_name);
    let body = format!(
        "Message de test envoyé le {} UTC.\nLa surveillance de « {} » est configurée.\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S"),
        ctx.config.target.film_title
    );

    notifier
        .notify(&subject, &body)
        .await
        .map_err(|e| eyre!("Test email failed: {}", e))?;
    output.success(format!("Test email sent via {}:{}", ctx.config.smtp.host, ctx.config.smtp.port));
    Ok(())
}
