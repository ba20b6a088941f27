use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the target film was found in the venue listing, strongest first
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FilmPresence {
    /// A link or element naming the film was found in the DOM
    Located,
    /// The inspected page is the film's own page
    Implied,
    /// The full normalized title appears in the collected evidence
    TitleMatch,
    /// Only the short fallback substring matched (lower precision)
    FallbackMatch,
    Absent,
}

impl FilmPresence {
    pub fn is_present(self) -> bool {
        self != FilmPresence::Absent
    }
}

impl fmt::Display for FilmPresence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FilmPresence::Located => "located",
            FilmPresence::Implied => "implied",
            FilmPresence::TitleMatch => "title_match",
            FilmPresence::FallbackMatch => "fallback_match",
            FilmPresence::Absent => "absent",
        };
        f.write_str(label)
    }
}

/// Verdict and diagnostics of one probe
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProbeReport {
    pub available: bool,
    pub strategy: String,
    pub film_presence: FilmPresence,
    pub venue_present: bool,
    pub reservation_signal: bool,
    /// Distinct HH:MM matches, sorted
    pub showtimes: Vec<String>,
    pub showtime_count: usize,
    /// Intercepted network responses that mentioned the film or venue
    pub matched_responses: usize,
    pub film_page_url: Option<String>,
    pub consent_dismissed: bool,
    pub error: Option<String>,
    pub checked_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

impl ProbeReport {
    /// Report with every signal negative, used as the starting point of a probe
    pub fn empty(strategy: impl Into<String>) -> Self {
        Self {
            available: false,
            strategy: strategy.into(),
            film_presence: FilmPresence::Absent,
            venue_present: false,
            reservation_signal: false,
            showtimes: Vec::new(),
            showtime_count: 0,
            matched_responses: 0,
            film_page_url: None,
            consent_dismissed: false,
            error: None,
            checked_at: Utc::now(),
            elapsed_ms: 0,
        }
    }

    /// Report for a probe that could not complete
    pub fn failed(strategy: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::empty(strategy)
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
