use serde::{Deserialize, Serialize};
use std::fmt;

/// Persisted verdict of the most recent probe
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Availability {
    /// Bookable showtimes were detected
    Available,
    /// Nothing bookable yet, or the probe failed
    #[default]
    Unavailable,
}

impl Availability {
    pub fn from_verdict(available: bool) -> Self {
        if available {
            Availability::Available
        } else {
            Availability::Unavailable
        }
    }

    pub fn is_available(self) -> bool {
        self == Availability::Available
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Availability::Available => "available",
            Availability::Unavailable => "unavailable",
        }
    }
}

// Anything but "available" is eligible for a new notification.
impl From<String> for Availability {
    fn from(value: String) -> Self {
        if value.trim().eq_ignore_ascii_case("available") {
            Availability::Available
        } else {
            Availability::Unavailable
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
