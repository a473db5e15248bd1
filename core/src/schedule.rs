//! Eligibility scheduler — when does blocked work become burnable?
//!
//! Each blocked work order with a known contingency go-live date is
//! bucketed into the simulated month where its backlog shifts into
//! the temporary bucket. The schedule is built once from the cohort
//! snapshot relative to wall-clock "today" and never changes during
//! a run — eligibility is NOT re-derived as simulated months advance.

use crate::classifier::WorkOrderSummary;
use crate::types::{Hours, MonthIndex};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

/// Whole-calendar-month difference, year-safe.
/// Same calendar month = 0, next month = 1, prior month = -1.
pub fn month_offset(from: NaiveDate, to: NaiveDate) -> i32 {
    (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32)
}

/// First day of the month after `date`.
pub fn first_of_next_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).expect("day 1 exists in every month")
}

/// Calendar months until a work order's contingency matures, relative
/// to `today`. `None` when the go-live date is unknown. Negative for
/// past dates — this is the raw audit figure, not the clamped shift
/// month.
pub fn months_to_go_live(summary: &WorkOrderSummary, today: NaiveDate) -> Option<i32> {
    summary
        .contingent_go_live_date
        .map(|go_live| month_offset(today, go_live))
}

/// Month -> hours map of blocked backlog becoming burnable.
/// Immutable once built; the engine only reads it.
#[derive(Debug, Clone, Default)]
pub struct ShiftSchedule {
    entries: BTreeMap<MonthIndex, Hours>,
}

impl ShiftSchedule {
    /// Build the schedule from the blocked cohort snapshot.
    ///
    /// A work order is eligible iff it has a contingency link, a
    /// go-live date, and positive backlog; anything else stays in the
    /// blocked bucket for the whole run. Past go-live dates are
    /// clamped forward to the first day of next month, never applied
    /// retroactively. The shift lands the month AFTER the go-live
    /// month because month 0 is a no-flow snapshot row.
    pub fn build(blocked: &[WorkOrderSummary], today: NaiveDate) -> Self {
        let mut entries: BTreeMap<MonthIndex, Hours> = BTreeMap::new();

        for summary in blocked {
            if summary.contingent_work_order.is_none() {
                log::warn!(
                    "blocked {} has no contingency link; stays blocked all run",
                    summary.work_order_code,
                );
                continue;
            }
            let Some(mut go_live) = summary.contingent_go_live_date else {
                log::warn!(
                    "blocked {} has no contingency go-live date; stays blocked all run",
                    summary.work_order_code,
                );
                continue;
            };
            let backlog = summary.backlog();
            if backlog <= 0.0 {
                continue;
            }

            if go_live < today {
                go_live = first_of_next_month(today);
            }

            let offset = month_offset(today, go_live).max(0) as MonthIndex;
            let shift_month = (offset + 1).max(1);
            *entries.entry(shift_month).or_insert(0.0) += backlog;
        }

        let mut schedule = Self { entries };
        schedule.fold_month_zero();
        schedule
    }

    /// Nothing may shift in month 0. Unreachable through build(), but
    /// enforced so a hand-assembled schedule cannot violate it either.
    fn fold_month_zero(&mut self) {
        if let Some(hours) = self.entries.remove(&0) {
            *self.entries.entry(1).or_insert(0.0) += hours;
        }
    }

    /// Assemble a schedule directly from (month, hours) pairs.
    /// Month-0 entries are folded into month 1.
    pub fn from_entries(pairs: impl IntoIterator<Item = (MonthIndex, Hours)>) -> Self {
        let mut entries: BTreeMap<MonthIndex, Hours> = BTreeMap::new();
        for (month, hours) in pairs {
            *entries.entry(month).or_insert(0.0) += hours;
        }
        let mut schedule = Self { entries };
        schedule.fold_month_zero();
        schedule
    }

    /// Hours scheduled to shift in `month` (0 when none).
    pub fn hours_for(&self, month: MonthIndex) -> Hours {
        self.entries.get(&month).copied().unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_hours(&self) -> Hours {
        self.entries.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MonthIndex, Hours)> + '_ {
        self.entries.iter().map(|(m, h)| (*m, *h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn month_offset_is_year_safe() {
        assert_eq!(month_offset(d(2025, 11, 15), d(2026, 2, 1)), 3);
        assert_eq!(month_offset(d(2025, 6, 1), d(2025, 6, 30)), 0);
        assert_eq!(month_offset(d(2025, 6, 1), d(2025, 5, 31)), -1);
        assert_eq!(month_offset(d(2024, 1, 1), d(2026, 1, 1)), 24);
    }

    #[test]
    fn first_of_next_month_rolls_over_december() {
        assert_eq!(first_of_next_month(d(2025, 12, 31)), d(2026, 1, 1));
        assert_eq!(first_of_next_month(d(2025, 3, 1)), d(2025, 4, 1));
    }

    #[test]
    fn month_zero_entries_fold_into_month_one() {
        let schedule = ShiftSchedule::from_entries([(0, 40.0), (1, 10.0), (3, 5.0)]);
        assert_eq!(schedule.hours_for(0), 0.0);
        assert_eq!(schedule.hours_for(1), 50.0);
        assert_eq!(schedule.hours_for(3), 5.0);
        assert_eq!(schedule.total_hours(), 55.0);
    }
}
