//! burndown-core — deterministic capacity-planning simulation.
//!
//! Pipeline: raw work-order records -> classifier (three cohorts) ->
//! eligibility schedule (blocked cohort) -> burndown engine
//! (month-stepped recurrence) -> month result table.
//!
//! The crate is purely functional at its boundary: it consumes a
//! finite record set plus an immutable parameter bundle and produces
//! flat, serializable tables. Data warehouse access, charts, and UI
//! live outside.

pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod params;
pub mod record;
pub mod schedule;
pub mod source;
pub mod types;
