pub mod journal_builders;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use journal_builders::{route, JournalBuilder};
#[allow(unused_imports)]
pub use setup::{TestApp, TestAppBuilder};
