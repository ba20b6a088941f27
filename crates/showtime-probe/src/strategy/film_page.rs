use async_trait::async_trait;
use chromiumoxide::Page;
use crate::error::ProbeError;
use crate::heuristic::Evidence;
use crate::page::{current_url, markup, visible_text};
use super::{ExtractionStrategy, StrategyContext};

/// Read the film's page directly; the venue has to show up in its content.
pub struct FilmPageStrategy;

#[async_trait]
impl ExtractionStrategy for FilmPageStrategy {
    fn name(&self) -> &'static str {
        "film_page"
    }

    async fn collect(&self, page: &Page, ctx: &mut StrategyContext<'_>) -> Result<Evidence, ProbeError> {
        let film_url = ctx.target.film_url.clone();
        let consent_dismissed = ctx.open(page, &film_url, "film_page").await?;

        Ok(Evidence {
            film_implied: true,
            consent_dismissed,
            film_page_url: current_url(page).await.or(Some(film_url)),
            texts: vec![visible_text(page).await?],
            markups: vec![markup(page).await?],
            ..Default::default()
        })
    }
}
