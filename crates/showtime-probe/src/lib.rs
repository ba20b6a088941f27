pub mod browser;
pub mod consent;
pub mod error;
pub mod heuristic;
pub mod page;
pub mod probe;
pub mod strategy;
pub mod text;

pub use browser::{BrowserPaths, BrowserSession};
pub use error::ProbeError;
pub use heuristic::{Assessment, Evidence, TargetMatcher};
pub use probe::{AvailabilityProbe, BrowserProbe};
pub use strategy::{ExtractionStrategy, StrategyContext, strategy_for};
