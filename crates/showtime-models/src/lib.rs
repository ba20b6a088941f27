pub mod availability;
pub mod report;
pub mod state;

pub use availability::Availability;
pub use report::{FilmPresence, ProbeReport};
pub use state::MonitorState;
