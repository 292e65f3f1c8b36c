//! The playable sandbox: scenarios, the per-step population update, and a
//! fixed-step loop that records every step for pausing and rewinding.

pub mod app;
pub mod config;
pub mod history;
pub mod population;
pub mod scenario;

pub use app::App;
pub use config::SimConfig;
pub use history::History;
pub use population::Population;
pub use scenario::{build_walker, Scenario};
