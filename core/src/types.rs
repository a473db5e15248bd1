//! Shared primitive types used across the entire simulation.

/// Backlog and capacity quantities, in hours.
pub type Hours = f64;

/// A simulated month counter. Month 0 is the opening snapshot.
pub type MonthIndex = u32;

/// The stable work-order key assigned by the source system.
pub type WorkOrderCode = String;
