//! Simulation parameters — one immutable bundle per run.
//!
//! Everything the burndown engine needs beyond the cohort totals and
//! the shift schedule lives here. Validation is a hard gate: an
//! inconsistent bundle is rejected before the simulation starts, it
//! never runs partially.

use crate::error::{SimError, SimResult};
use crate::types::{Hours, MonthIndex};
use serde::{Deserialize, Serialize};

/// Average working hours per FTE per month (2080 hours per year).
pub const MONTHLY_HOURS_PER_FTE: Hours = 2080.0 / 12.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimParams {
    /// Temporary-team headcount, full-time equivalents.
    pub temporary_fte: f64,
    /// Permanent-team headcount, full-time equivalents.
    pub permanent_fte: f64,
    /// Productive fraction of paid hours, 0..=1.
    pub utilization: f64,
    /// Incoming demand per quarter, hours.
    pub quarterly_demand: Hours,
    /// Fraction of incoming demand routed to the temporary bucket.
    pub temporary_demand_share: f64,
    /// Fraction of permanent capacity pre-allocated to the actionable
    /// bucket while the temporary team is active; the remainder
    /// supports the temporary bucket.
    pub permanent_capacity_to_actionable_share: f64,
    /// Number of simulated months after the month-0 snapshot.
    pub horizon_months: MonthIndex,
    /// Backlog coverage (months) at or below which the temporary team
    /// is permanently stood down.
    pub removal_threshold_months: f64,
    /// Month from which temporary capacity is halved. 0 disables.
    #[serde(default)]
    pub temporary_capacity_reduction_month: MonthIndex,
    /// Replacement quarterly demand from month 13 onward.
    #[serde(default)]
    pub demand_override_after_12_months: Option<Hours>,
    /// Replacement quarterly demand once the temporary team is
    /// removed. Takes precedence over the 12-month override.
    #[serde(default)]
    pub demand_override_after_removal: Option<Hours>,
}

impl SimParams {
    /// Parameters used across the test suite; production values come
    /// from scenario.json.
    pub fn default_test() -> Self {
        Self {
            temporary_fte: 6.0,
            permanent_fte: 2.0,
            utilization: 0.78,
            quarterly_demand: 1440.0,
            temporary_demand_share: 0.0,
            permanent_capacity_to_actionable_share: 1.0,
            horizon_months: 28,
            removal_threshold_months: 4.0,
            temporary_capacity_reduction_month: 0,
            demand_override_after_12_months: None,
            demand_override_after_removal: None,
        }
    }

    /// Reject inconsistent bundles before any simulation state exists.
    pub fn validate(&self) -> SimResult<()> {
        fn non_negative(field: &'static str, value: f64) -> SimResult<()> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(SimError::InvalidParameter {
                    field,
                    reason: format!("must be a non-negative number, got {value}"),
                })
            }
        }
        fn fraction(field: &'static str, value: f64) -> SimResult<()> {
            if value.is_finite() && (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(SimError::InvalidParameter {
                    field,
                    reason: format!("must be within [0, 1], got {value}"),
                })
            }
        }

        non_negative("temporary_fte", self.temporary_fte)?;
        non_negative("permanent_fte", self.permanent_fte)?;
        fraction("utilization", self.utilization)?;
        non_negative("quarterly_demand", self.quarterly_demand)?;
        fraction("temporary_demand_share", self.temporary_demand_share)?;
        fraction(
            "permanent_capacity_to_actionable_share",
            self.permanent_capacity_to_actionable_share,
        )?;
        non_negative("removal_threshold_months", self.removal_threshold_months)?;
        if let Some(value) = self.demand_override_after_12_months {
            non_negative("demand_override_after_12_months", value)?;
        }
        if let Some(value) = self.demand_override_after_removal {
            non_negative("demand_override_after_removal", value)?;
        }
        if self.horizon_months < 1 {
            return Err(SimError::InvalidParameter {
                field: "horizon_months",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Monthly capacity for a team: FTE × average monthly hours ×
    /// utilization.
    pub fn monthly_capacity(fte: f64, utilization: f64) -> Hours {
        fte * MONTHLY_HOURS_PER_FTE * utilization
    }

    pub fn temporary_capacity_full(&self) -> Hours {
        Self::monthly_capacity(self.temporary_fte, self.utilization)
    }

    pub fn permanent_capacity_full(&self) -> Hours {
        Self::monthly_capacity(self.permanent_fte, self.utilization)
    }
}
