use showtime_config::TargetConfig;
use showtime_models::{FilmPresence, ProbeReport};
use std::collections::BTreeSet;
use tracing::{debug, warn};
use crate::text::{find_showtimes, json_text, markup_text, normalize};


/// Raw material collected from the page(s) by an extraction strategy
#[derive(Debug, Clone, Default)]
pub struct Evidence {
    /// A link or element naming the film was found structurally
    pub film_located: bool,
    /// The evidence comes from the film's own page
    pub film_implied: bool,
    /// The evidence comes from the venue's own page or a page reached from it
    pub venue_implied: bool,
    pub film_page_url: Option<String>,
    pub consent_dismissed: bool,
    /// `innerText` of rendered pages
    pub texts: Vec<String>,
    /// Text of a multi-film listing. Only used to tell whether the film and
    /// venue appear; its times and keywords belong to other films.
    pub listing_texts: Vec<String>,
    /// Raw HTML of rendered pages
    pub markups: Vec<String>,
    /// Bodies of intercepted XHR/fetch responses
    pub network_bodies: Vec<String>,
}

/// Outcome of running the heuristic over one `Evidence`
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub film_presence: FilmPresence,
    pub venue_present: bool,
    pub reservation_signal: bool,
    pub showtimes: Vec<String>,
    pub available: bool,
}

impl Assessment {
    pub fn apply_to(&self, report: &mut ProbeReport) {
        report.available = self.available;
        report.film_presence = self.film_presence;
        report.venue_present = self.venue_present;
        report.reservation_signal = self.reservation_signal;
        report.showtime_count = self.showtimes.len();
        report.showtimes = self.showtimes.clone();
    }
}

/// Pre-normalized needles for one target film and venue
#[derive(Debug, Clone)]
pub struct TargetMatcher {
    title: String,
    title_fallback: String,
    venue: String,
    reservation_keywords: Vec<String>,
}

impl TargetMatcher {
    pub fn new(target: &TargetConfig) -> Self {
        let mut reservation_keywords: Vec<String> = target
            .reservation_keywords
            .iter()
            .map(|k| normalize(k))
            .filter(|k| !k.is_empty())
            .collect();
        reservation_keywords.dedup();

        Self {
            title: normalize(&target.film_title),
            title_fallback: normalize(&target.title_fallback),
            venue: normalize(&target.venue_keyword),
            reservation_keywords,
        }
    }

    /// Does a link label or text block name the film? Full title only.
    pub fn names_film(&self, text: &str) -> bool {
        !self.title.is_empty() && normalize(text).contains(&self.title)
    }

    pub fn mentions_film_or_venue(&self, normalized: &str) -> bool {
        (!self.title.is_empty() && normalized.contains(&self.title))
            || (!self.title_fallback.is_empty() && normalized.contains(&self.title_fallback))
            || (!self.venue.is_empty() && normalized.contains(&self.venue))
    }

    pub fn assess(&self, evidence: &Evidence) -> Assessment {
        let documents = searchable_documents(evidence);
        let listings: Vec<String> = evidence
            .listing_texts
            .iter()
            .map(|t| normalize(t))
            .filter(|t| !t.is_empty())
            .collect();
        let mentions: Vec<String> = documents.iter().chain(&listings).cloned().collect();

        let film_presence = self.film_presence(evidence, &mentions);
        let venue_present = evidence.venue_implied
            || (!self.venue.is_empty() && mentions.iter().any(|d| d.contains(&self.venue)));
        let reservation_signal = documents
            .iter()
            .any(|d| self.reservation_keywords.iter().any(|k| d.contains(k.as_str())));

        // Same showtime in text and markup counts once
        let showtimes: BTreeSet<String> = documents
            .iter()
            .flat_map(|d| find_showtimes(d))
            .collect();

        let available = film_presence.is_present()
            && venue_present
            && (!showtimes.is_empty() || reservation_signal);

        debug!(
            "Assessed {} documents: film={} venue={} reservation={} showtimes={}",
            documents.len(),
            film_presence,
            venue_present,
            reservation_signal,
            showtimes.len()
        );

        Assessment {
            film_presence,
            venue_present,
            reservation_signal,
            showtimes: showtimes.into_iter().collect(),
            available,
        }
    }

    fn film_presence(&self, evidence: &Evidence, documents: &[String]) -> FilmPresence {
        if evidence.film_located {
            return FilmPresence::Located;
        }
        if evidence.film_implied {
            return FilmPresence::Implied;
        }
        if !self.title.is_empty() && documents.iter().any(|d| d.contains(&self.title)) {
            return FilmPresence::TitleMatch;
        }
        if !self.title_fallback.is_empty()
            && documents.iter().any(|d| d.contains(&self.title_fallback))
        {
            warn!(
                "Film title not found; matched fallback '{}' instead (lower precision)",
                self.title_fallback
            );
            return FilmPresence::FallbackMatch;
        }
        FilmPresence::Absent
    }
}

fn searchable_documents(evidence: &Evidence) -> Vec<String> {
    evidence
        .texts
        .iter()
        .map(|t| normalize(t))
        .chain(evidence.markups.iter().map(|m| normalize(&markup_text(m))))
        .chain(evidence.network_bodies.iter().map(|b| normalize(&json_text(b))))
        .filter(|d| !d.is_empty())
        .collect()
}
