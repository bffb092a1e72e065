//! Routing statistics

pub mod metrics;

pub use metrics::{RouterStats, RouterStatsSnapshot};
