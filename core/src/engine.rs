//! The burndown engine — the heart of the simulator.
//!
//! MONTHLY STEP ORDER (fixed, documented, never reordered):
//!   1. Effective quarterly demand (overrides applied)
//!   2. Capacities (temporary reduction step, permanent split)
//!   3. Burn actionable against its allocated share
//!   4. Reallocate unused actionable capacity to temporary
//!   5. Burn temporary, apply incoming demand
//!   6. Eligibility shift out of blocked
//!   7. Coverage metric and removal-threshold check
//!
//! RULES:
//!   - Every balance update clamps to >= 0.
//!   - Blocked is never burned; it only shifts.
//!   - The Active -> Removed transition is one-way and happens at
//!     most once per run. The emitted row for the transition month
//!     already reflects the post-transition state.
//!   - run() is a pure function of its inputs; identical inputs
//!     produce identical result sequences.

use crate::classifier::CohortSnapshot;
use crate::error::SimResult;
use crate::params::SimParams;
use crate::schedule::ShiftSchedule;
use crate::types::{Hours, MonthIndex};
use serde::{Deserialize, Serialize};

/// Opening balances for the three backlog buckets.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BucketTotals {
    pub temporary: Hours,
    pub blocked: Hours,
    pub actionable: Hours,
}

impl BucketTotals {
    pub fn from_snapshot(snapshot: &CohortSnapshot) -> Self {
        Self {
            temporary: snapshot.temporary_backlog,
            blocked: snapshot.blocked_backlog,
            actionable: snapshot.actionable_backlog,
        }
    }

    pub fn total(&self) -> Hours {
        self.temporary + self.blocked + self.actionable
    }
}

/// One output row per simulated month, month 0 included.
#[derive(Debug, Clone, Serialize)]
pub struct MonthResult {
    pub month: MonthIndex,
    pub total_backlog: Hours,
    pub temporary_backlog: Hours,
    pub blocked_backlog: Hours,
    pub actionable_backlog: Hours,
    /// Total monthly capacity in effect for this row.
    pub total_capacity: Hours,
    /// Backlog expressed in months of coverage. None when capacity
    /// is zero — never infinite, never a division error.
    pub backlog_months: Option<f64>,
    /// State at month end: false from the removal month onward.
    pub temporary_team_active: bool,
}

pub struct BurndownEngine {
    params: SimParams,
    schedule: ShiftSchedule,
}

impl BurndownEngine {
    /// Validates the parameter bundle; an invalid bundle never
    /// produces an engine.
    pub fn new(params: SimParams, schedule: ShiftSchedule) -> SimResult<Self> {
        params.validate()?;
        Ok(Self { params, schedule })
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn schedule(&self) -> &ShiftSchedule {
        &self.schedule
    }

    /// Run the month-stepped simulation from the opening balances.
    /// Returns one row per month 0..=horizon, append-only, strictly
    /// increasing month index.
    pub fn run(&self, opening: &BucketTotals) -> Vec<MonthResult> {
        let p = &self.params;
        let temporary_capacity_full = p.temporary_capacity_full();
        let permanent_capacity_full = p.permanent_capacity_full();

        let mut temporary = opening.temporary.max(0.0);
        let mut blocked = opening.blocked.max(0.0);
        let mut actionable = opening.actionable.max(0.0);
        let mut active = true;

        let mut results = Vec::with_capacity(p.horizon_months as usize + 1);

        // Month 0: diagnostic snapshot. No burn, no incoming, no shift.
        results.push(make_row(
            0,
            temporary,
            blocked,
            actionable,
            temporary_capacity_full + permanent_capacity_full,
            active,
        ));

        for month in 1..=p.horizon_months {
            let quarterly_demand = self.effective_quarterly_demand(month, active);

            // Capacities and incoming demand for this month.
            let temporary_capacity;
            let temporary_incoming;
            let actionable_incoming;
            let permanent_to_actionable;
            let permanent_to_temporary;
            if active {
                let mut capacity = temporary_capacity_full;
                if p.temporary_capacity_reduction_month > 0
                    && month >= p.temporary_capacity_reduction_month
                {
                    capacity *= 0.5;
                }
                temporary_capacity = capacity;
                temporary_incoming = quarterly_demand * p.temporary_demand_share / 3.0;
                actionable_incoming =
                    quarterly_demand * (1.0 - p.temporary_demand_share) / 3.0;
                permanent_to_actionable =
                    permanent_capacity_full * p.permanent_capacity_to_actionable_share;
                permanent_to_temporary = permanent_capacity_full - permanent_to_actionable;
            } else {
                temporary_capacity = 0.0;
                temporary_incoming = 0.0;
                actionable_incoming = quarterly_demand / 3.0;
                permanent_to_actionable = permanent_capacity_full;
                permanent_to_temporary = 0.0;
            }

            // Burn actionable first against its allocated share.
            let actionable_burn = actionable.min(permanent_to_actionable);
            let actionable_after_burn = actionable - actionable_burn;

            // Capacity left idle on an exhausted actionable bucket is
            // redirected to the temporary bucket in the same month.
            let unused_actionable_capacity = (permanent_to_actionable - actionable_burn).max(0.0);
            let temporary_burn = temporary
                .min(temporary_capacity + permanent_to_temporary + unused_actionable_capacity);

            temporary = (temporary - temporary_burn + temporary_incoming).max(0.0);
            actionable = (actionable_after_burn + actionable_incoming).max(0.0);

            // Eligibility shift. Matured work lands in the bucket that
            // owns contingency work under the current state.
            let scheduled = self.schedule.hours_for(month);
            if scheduled > 0.0 && blocked > 0.0 {
                let moved = blocked.min(scheduled);
                blocked -= moved;
                if active {
                    temporary += moved;
                } else {
                    actionable += moved;
                }
            }

            let mut total_backlog = temporary + blocked + actionable;
            let mut total_capacity = temporary_capacity + permanent_capacity_full;
            let mut backlog_months = coverage(total_backlog, total_capacity);

            // Removal-threshold check, evaluated after burn and shift
            // so the emitted row reflects the post-transition state.
            if active {
                if let Some(months) = backlog_months {
                    if months <= p.removal_threshold_months {
                        active = false;

                        // Post-removal demand override applies from the
                        // transition month itself: back out the temporary
                        // incoming already applied and replace the
                        // actionable incoming with the override figure.
                        if let Some(post_quarterly) = p.demand_override_after_removal {
                            let post_monthly = post_quarterly / 3.0;
                            temporary = (temporary - temporary_incoming).max(0.0);
                            actionable =
                                (actionable + (post_monthly - actionable_incoming)).max(0.0);
                        }

                        // Remaining temporary backlog becomes the
                        // permanent team's problem.
                        actionable += temporary;
                        temporary = 0.0;

                        total_backlog = temporary + blocked + actionable;
                        total_capacity = permanent_capacity_full;
                        backlog_months = coverage(total_backlog, total_capacity);

                        log::info!(
                            "temporary team removed at month {month}: coverage {months:.2} <= threshold {:.2}, {actionable:.0}h now actionable",
                            p.removal_threshold_months,
                        );
                    }
                }
            }

            log::debug!(
                "month {month}: temporary={temporary:.1} blocked={blocked:.1} actionable={actionable:.1} capacity={total_capacity:.1} active={active}",
            );

            results.push(MonthResult {
                month,
                total_backlog,
                temporary_backlog: temporary,
                blocked_backlog: blocked,
                actionable_backlog: actionable,
                total_capacity,
                backlog_months,
                temporary_team_active: active,
            });
        }

        results
    }

    /// Quarterly demand in effect for a given month and team state.
    /// The two overrides compose: post-removal takes precedence when
    /// configured, otherwise the 12-month override keeps applying.
    fn effective_quarterly_demand(&self, month: MonthIndex, active: bool) -> Hours {
        let p = &self.params;
        if !active {
            if let Some(quarterly) = p.demand_override_after_removal {
                return quarterly;
            }
        }
        if month >= 13 {
            if let Some(quarterly) = p.demand_override_after_12_months {
                return quarterly;
            }
        }
        p.quarterly_demand
    }
}

fn coverage(total_backlog: Hours, total_capacity: Hours) -> Option<f64> {
    if total_capacity > 0.0 {
        Some(total_backlog / total_capacity)
    } else {
        None
    }
}

fn make_row(
    month: MonthIndex,
    temporary: Hours,
    blocked: Hours,
    actionable: Hours,
    total_capacity: Hours,
    active: bool,
) -> MonthResult {
    let total_backlog = temporary + blocked + actionable;
    MonthResult {
        month,
        total_backlog,
        temporary_backlog: temporary,
        blocked_backlog: blocked,
        actionable_backlog: actionable,
        total_capacity,
        backlog_months: coverage(total_backlog, total_capacity),
        temporary_team_active: active,
    }
}
