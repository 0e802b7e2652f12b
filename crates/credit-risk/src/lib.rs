//! Credit-risk decisioning and population analytics.
//!
//! The [`scoring`] module turns a default probability into a decision and a
//! regulatory tier. The [`analytics`] module aggregates a historical
//! population under adjustable approval thresholds.

pub mod analytics;
pub mod config;
pub mod error;
pub mod scoring;
pub mod telemetry;
