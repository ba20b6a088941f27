use async_trait::async_trait;
use chromiumoxide::Page;
use tracing::info;
use crate::error::ProbeError;
use crate::heuristic::Evidence;
use crate::page::{current_url, markup, visible_text, wait_for_film_link};
use super::{ExtractionStrategy, StrategyContext};

/// Start from the venue's page so the listing is already scoped to the
/// venue, then follow the film's link to its showtimes.
pub struct CinemaPageStrategy;

#[async_trait]
impl ExtractionStrategy for CinemaPageStrategy {
    fn name(&self) -> &'static str {
        "cinema_page"
    }

    async fn collect(&self, page: &Page, ctx: &mut StrategyContext<'_>) -> Result<Evidence, ProbeError> {
        let mut evidence = Evidence {
            venue_implied: true,
            ..Default::default()
        };

        let venue_url = ctx.target.venue_url.clone();
        evidence.consent_dismissed = ctx.open(page, &venue_url, "venue_page").await?;

        let link = wait_for_film_link(page, ctx.matcher, ctx.settings.film_link_timeout()).await;
        let Some(link) = link else {
            info!("Film not listed on the venue page");
            // Presence only: the listing's times belong to other films
            evidence.listing_texts.push(visible_text(page).await?);
            return Ok(evidence);
        };

        info!("Film found on the venue page: {}", link.href);
        evidence.film_located = true;

        let dismissed = ctx.open(page, &link.href, "film_page").await?;
        evidence.consent_dismissed |= dismissed;
        evidence.film_page_url = current_url(page).await.or(Some(link.href));
        evidence.texts.push(visible_text(page).await?);
        evidence.markups.push(markup(page).await?);

        Ok(evidence)
    }
}
