//! Burndown engine tests — the monthly recurrence and the removal
//! policy transition.

use burndown_core::engine::{BucketTotals, BurndownEngine, MonthResult};
use burndown_core::params::{SimParams, MONTHLY_HOURS_PER_FTE};
use burndown_core::schedule::ShiftSchedule;

/// Demand-free baseline: six temporary FTE, two permanent FTE, all
/// permanent capacity on actionable. Individual tests override.
fn base_params() -> SimParams {
    SimParams {
        temporary_fte: 6.0,
        permanent_fte: 2.0,
        utilization: 0.78,
        quarterly_demand: 0.0,
        temporary_demand_share: 0.0,
        permanent_capacity_to_actionable_share: 1.0,
        horizon_months: 4,
        removal_threshold_months: 0.0,
        temporary_capacity_reduction_month: 0,
        demand_override_after_12_months: None,
        demand_override_after_removal: None,
    }
}

fn run(params: SimParams, schedule: ShiftSchedule, opening: BucketTotals) -> Vec<MonthResult> {
    BurndownEngine::new(params, schedule)
        .expect("valid params")
        .run(&opening)
}

fn assert_close(actual: f64, expected: f64, context: &str) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "{context}: got {actual}, expected {expected}"
    );
}

/// Temporary backlog smaller than one month of temporary capacity
/// burns to zero in month 1; coverage 0 <= threshold 0 then stands
/// the team down with nothing left to transfer.
#[test]
fn backlog_exhaustion_triggers_removal_at_zero_threshold() {
    let mut params = base_params();
    params.permanent_fte = 0.0;
    params.horizon_months = 3;
    let opening = BucketTotals {
        temporary: 800.0, // < 6 FTE * 173.3h * 0.78 = 811.2h/month
        blocked: 0.0,
        actionable: 0.0,
    };

    let results = run(params, ShiftSchedule::default(), opening);

    assert_eq!(results.len(), 4);
    assert!(results[0].temporary_team_active);
    for row in &results[1..] {
        assert_eq!(row.temporary_backlog, 0.0);
        assert_eq!(row.total_backlog, 0.0);
        assert!(!row.temporary_team_active);
        // Post-removal capacity is permanent-only, which is zero here.
        assert_eq!(row.backlog_months, None);
    }
}

/// Blocked backlog with a shift scheduled for month 1 moves into the
/// temporary bucket exactly at month 1 while the team is active.
#[test]
fn scheduled_shift_moves_blocked_into_temporary() {
    let mut params = base_params();
    params.temporary_fte = 0.0;
    params.permanent_fte = 0.0;
    params.horizon_months = 2;
    let schedule = ShiftSchedule::from_entries([(1, 100.0)]);
    let opening = BucketTotals {
        temporary: 0.0,
        blocked: 100.0,
        actionable: 0.0,
    };

    let results = run(params, schedule, opening);

    assert_eq!(results[0].blocked_backlog, 100.0);
    assert_eq!(results[1].blocked_backlog, 0.0);
    assert_eq!(results[1].temporary_backlog, 100.0);
    // Zero capacity: coverage is undefined, never infinite, and the
    // removal threshold can never fire.
    for row in &results {
        assert_eq!(row.backlog_months, None);
        assert!(row.temporary_team_active);
    }
}

/// Steady burn crossing the threshold: the transition month's row
/// already shows temporary forced to zero, the remainder moved to
/// actionable, and coverage recomputed against permanent-only
/// capacity.
#[test]
fn threshold_crossing_transfers_remainder_and_recomputes_coverage() {
    let mut params = base_params();
    params.removal_threshold_months = 4.0;
    let temporary_capacity = 6.0 * MONTHLY_HOURS_PER_FTE * 0.78;
    let permanent_capacity = 2.0 * MONTHLY_HOURS_PER_FTE * 0.78;
    let total_capacity = temporary_capacity + permanent_capacity;
    let opening = BucketTotals {
        temporary: 5500.0,
        blocked: 0.0,
        actionable: 0.0,
    };

    let results = run(params, ShiftSchedule::default(), opening);

    // Month 1: coverage just above 4, still active.
    let month1 = &results[1];
    assert!(month1.temporary_team_active);
    assert!(month1.backlog_months.unwrap() > 4.0);

    // Month 2: coverage crosses, team removed in the same row.
    let month2 = &results[2];
    let expected_remainder = 5500.0 - 2.0 * total_capacity;
    assert!(!month2.temporary_team_active);
    assert_eq!(month2.temporary_backlog, 0.0);
    assert_close(
        month2.actionable_backlog,
        expected_remainder,
        "transferred remainder",
    );
    assert_close(month2.total_capacity, permanent_capacity, "capacity");
    assert_close(
        month2.backlog_months.unwrap(),
        expected_remainder / permanent_capacity,
        "recomputed coverage",
    );

    // Month 3: permanent team keeps burning the transferred backlog.
    let month3 = &results[3];
    assert_close(
        month3.actionable_backlog,
        expected_remainder - permanent_capacity,
        "post-removal burn",
    );
}

/// The transition is one-way: active is true for a prefix of months
/// and false for the suffix, never toggling back.
#[test]
fn removal_is_monotonic() {
    let mut params = base_params();
    params.removal_threshold_months = 4.0;
    params.horizon_months = 12;
    let opening = BucketTotals {
        temporary: 5500.0,
        blocked: 0.0,
        actionable: 0.0,
    };

    let results = run(params, ShiftSchedule::default(), opening);

    let first_inactive = results
        .iter()
        .position(|r| !r.temporary_team_active)
        .expect("removal should occur");
    for (index, row) in results.iter().enumerate() {
        assert_eq!(row.temporary_team_active, index < first_inactive);
    }
}

/// All balances stay non-negative through burn, incoming, and shifts.
#[test]
fn balances_never_go_negative() {
    let mut params = base_params();
    params.quarterly_demand = 900.0;
    params.temporary_demand_share = 0.4;
    params.horizon_months = 24;
    params.removal_threshold_months = 2.0;
    let schedule = ShiftSchedule::from_entries([(1, 150.0), (3, 400.0), (7, 90.0)]);
    let opening = BucketTotals {
        temporary: 2000.0,
        blocked: 640.0,
        actionable: 1200.0,
    };

    let results = run(params, schedule, opening);

    assert_eq!(results.len(), 25);
    for row in &results {
        assert!(row.temporary_backlog >= 0.0, "month {}", row.month);
        assert!(row.blocked_backlog >= 0.0, "month {}", row.month);
        assert!(row.actionable_backlog >= 0.0, "month {}", row.month);
    }
}

/// Shifts move exactly min(scheduled, available): the blocked bucket
/// drains to zero without overshooting.
#[test]
fn shift_conservation_with_oversized_schedule() {
    let mut params = base_params();
    params.temporary_fte = 0.0;
    params.permanent_fte = 0.0;
    params.horizon_months = 3;
    let schedule = ShiftSchedule::from_entries([(1, 200.0), (2, 400.0)]);
    let opening = BucketTotals {
        temporary: 0.0,
        blocked: 500.0,
        actionable: 0.0,
    };

    let results = run(params, schedule, opening);

    assert_eq!(results[1].blocked_backlog, 300.0);
    assert_eq!(results[1].temporary_backlog, 200.0);
    // Month 2 wants 400 but only 300 remain.
    assert_eq!(results[2].blocked_backlog, 0.0);
    assert_eq!(results[2].temporary_backlog, 500.0);
    // Nothing left to shift afterwards.
    assert_eq!(results[3].blocked_backlog, 0.0);
    assert_eq!(results[3].temporary_backlog, 500.0);
}

/// Capacity left idle on an exhausted actionable bucket burns
/// temporary backlog in the same month.
#[test]
fn unused_actionable_capacity_reallocates_to_temporary() {
    let mut params = base_params();
    params.temporary_fte = 0.0;
    params.permanent_capacity_to_actionable_share = 0.5;
    params.horizon_months = 1;
    params.removal_threshold_months = 0.0;
    let permanent_capacity = 2.0 * MONTHLY_HOURS_PER_FTE * 0.78;
    let to_actionable = permanent_capacity * 0.5;
    let opening = BucketTotals {
        temporary: 1000.0,
        blocked: 0.0,
        actionable: to_actionable - 100.0, // exhausted with 100h to spare
    };

    let results = run(params, ShiftSchedule::default(), opening);

    let month1 = &results[1];
    assert_eq!(month1.actionable_backlog, 0.0);
    // Temporary burned its own share (none), the permanent remainder,
    // and the 100h of reallocated slack.
    assert_close(
        month1.temporary_backlog,
        1000.0 - (permanent_capacity - to_actionable) - 100.0,
        "reallocated burn",
    );
}

/// While actionable backlog remains, its allocation is never
/// redirected: temporary burns only its own supporting capacity.
#[test]
fn no_redirection_while_actionable_backlog_remains() {
    let mut params = base_params();
    params.temporary_fte = 0.0;
    params.permanent_capacity_to_actionable_share = 0.5;
    params.horizon_months = 1;
    let permanent_capacity = 2.0 * MONTHLY_HOURS_PER_FTE * 0.78;
    let to_actionable = permanent_capacity * 0.5;
    let opening = BucketTotals {
        temporary: 1000.0,
        blocked: 0.0,
        actionable: to_actionable + 200.0, // more than one month's share
    };

    let results = run(params, ShiftSchedule::default(), opening);

    let month1 = &results[1];
    assert_close(month1.actionable_backlog, 200.0, "actionable burn");
    assert_close(
        month1.temporary_backlog,
        1000.0 - (permanent_capacity - to_actionable),
        "temporary burn without slack",
    );
}

/// The one-way 50% capacity step applies from the configured month.
#[test]
fn capacity_reduction_halves_temporary_capacity() {
    let mut params = base_params();
    params.permanent_fte = 0.0;
    params.temporary_capacity_reduction_month = 2;
    params.horizon_months = 3;
    let full = 6.0 * MONTHLY_HOURS_PER_FTE * 0.78;
    let opening = BucketTotals {
        temporary: 4000.0,
        blocked: 0.0,
        actionable: 0.0,
    };

    let results = run(params, ShiftSchedule::default(), opening);

    assert_close(results[1].total_capacity, full, "month 1 capacity");
    assert_close(results[1].temporary_backlog, 4000.0 - full, "month 1 burn");
    assert_close(results[2].total_capacity, full * 0.5, "month 2 capacity");
    assert_close(
        results[2].temporary_backlog,
        4000.0 - full - full * 0.5,
        "month 2 burn",
    );
    assert_close(results[3].total_capacity, full * 0.5, "month 3 capacity");
}

/// The after-12-months override replaces incoming demand from month
/// 13 onward while the team is active.
#[test]
fn demand_override_applies_after_twelve_months() {
    let mut params = base_params();
    params.temporary_fte = 0.0;
    params.permanent_fte = 0.0;
    params.quarterly_demand = 300.0;
    params.demand_override_after_12_months = Some(600.0);
    params.horizon_months = 14;
    let opening = BucketTotals::default();

    let results = run(params, ShiftSchedule::default(), opening);

    // 100h/month through month 12, 200h/month afterwards.
    assert_close(results[12].actionable_backlog, 1200.0, "month 12");
    assert_close(results[13].actionable_backlog, 1400.0, "month 13");
    assert_close(results[14].actionable_backlog, 1600.0, "month 14");
}

/// With no post-removal override, the after-12-months override keeps
/// applying after the team is removed.
#[test]
fn twelve_month_override_survives_removal() {
    let mut params = base_params();
    params.permanent_fte = 0.0;
    params.quarterly_demand = 300.0;
    params.demand_override_after_12_months = Some(600.0);
    params.removal_threshold_months = 10.0;
    params.horizon_months = 14;
    let opening = BucketTotals::default();

    let results = run(params, ShiftSchedule::default(), opening);

    // Month 1: 100h arrives, coverage is tiny, removal fires.
    assert!(!results[1].temporary_team_active);
    assert_close(results[1].actionable_backlog, 100.0, "month 1");
    // Permanent capacity is zero, so incoming just accumulates:
    // 100h/month through month 12, 200h/month from month 13.
    assert_close(results[12].actionable_backlog, 1200.0, "month 12");
    assert_close(results[14].actionable_backlog, 1600.0, "month 14");
    for row in &results[1..] {
        assert_eq!(row.backlog_months, None); // permanent-only capacity is 0
    }
}

/// The post-removal override takes precedence and applies from the
/// transition month itself, replacing that month's incoming.
#[test]
fn post_removal_override_takes_precedence() {
    let mut params = base_params();
    params.quarterly_demand = 300.0;
    params.demand_override_after_removal = Some(900.0);
    params.removal_threshold_months = 10.0;
    params.horizon_months = 2;
    let permanent_capacity = 2.0 * MONTHLY_HOURS_PER_FTE * 0.78;
    let opening = BucketTotals::default();

    let results = run(params, ShiftSchedule::default(), opening);

    // Month 1: the 100h of base incoming is replaced by 300h when the
    // transition fires within the month.
    let month1 = &results[1];
    assert!(!month1.temporary_team_active);
    assert_close(month1.actionable_backlog, 300.0, "transition month");

    // Month 2: removed state, 300h/month incoming against permanent burn.
    let month2 = &results[2];
    assert_close(
        month2.actionable_backlog,
        300.0 - permanent_capacity + 300.0,
        "post-removal month",
    );
}

/// Blocked work maturing after removal lands directly in actionable —
/// contingency work is no longer temporary-team work once the team is
/// gone.
#[test]
fn post_removal_shift_lands_in_actionable() {
    let mut params = base_params();
    params.temporary_fte = 1.0;
    params.permanent_fte = 0.0;
    params.removal_threshold_months = 10.0;
    params.horizon_months = 3;
    let schedule = ShiftSchedule::from_entries([(2, 80.0)]);
    let opening = BucketTotals {
        temporary: 50.0,
        blocked: 80.0,
        actionable: 0.0,
    };

    let results = run(params, schedule, opening);

    // Month 1: burn clears temporary, coverage drops under threshold,
    // team removed before the month-2 shift.
    assert!(!results[1].temporary_team_active);
    // Month 2: the matured 80h lands in actionable, not temporary.
    assert_eq!(results[2].temporary_backlog, 0.0);
    assert_eq!(results[2].blocked_backlog, 0.0);
    assert_close(results[2].actionable_backlog, 80.0, "matured into actionable");
}

/// Month 0 is a pure snapshot: opening balances, full capacity, no
/// flows applied.
#[test]
fn month_zero_is_untouched_snapshot() {
    let params = base_params();
    let schedule = ShiftSchedule::from_entries([(1, 999.0)]);
    let opening = BucketTotals {
        temporary: 10.0,
        blocked: 20.0,
        actionable: 30.0,
    };

    let results = run(params, schedule, opening);

    let month0 = &results[0];
    assert_eq!(month0.month, 0);
    assert_eq!(month0.temporary_backlog, 10.0);
    assert_eq!(month0.blocked_backlog, 20.0);
    assert_eq!(month0.actionable_backlog, 30.0);
    assert_eq!(month0.total_backlog, 60.0);
    assert!(month0.temporary_team_active);
}

/// Invalid parameter bundles never produce an engine.
#[test]
fn invalid_params_are_rejected_up_front() {
    let mut params = base_params();
    params.horizon_months = 0;
    assert!(BurndownEngine::new(params, ShiftSchedule::default()).is_err());

    let mut params = base_params();
    params.temporary_demand_share = 1.5;
    assert!(BurndownEngine::new(params, ShiftSchedule::default()).is_err());
}
