pub mod aggregator;
pub mod calendar;
pub mod handlers;
pub mod models;
pub mod service;
pub mod types;
pub mod window;

pub use models::*;
pub use service::{summarize, StatsService};
pub use window::{DateWindow, Period, WindowError};
