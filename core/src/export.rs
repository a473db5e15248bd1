//! Flat audit tables for the presentation layer.
//!
//! Thin views over classifier and scheduler output. Rendering (CSV,
//! JSON, spreadsheets) belongs to whatever wraps the core; these rows
//! are just Serialize-able structs.

use crate::classifier::{Cohort, CohortSnapshot, WorkOrderSummary};
use crate::schedule::{months_to_go_live, ShiftSchedule};
use crate::types::{Hours, MonthIndex, WorkOrderCode};
use chrono::NaiveDate;
use serde::Serialize;

/// One row per in-scope work order, with its cohort label.
#[derive(Debug, Clone, Serialize)]
pub struct WorkOrderRow {
    pub work_order_code: WorkOrderCode,
    pub account_name: Option<String>,
    pub project_status: String,
    pub description: Option<String>,
    pub backlog: Hours,
    pub allocated_hours: Hours,
    pub logged_hours: Hours,
    pub slotted_go_live_date: Option<NaiveDate>,
    pub contingent_work_order: Option<WorkOrderCode>,
    pub contingent_go_live_date: Option<NaiveDate>,
    pub months_to_go_live: Option<i32>,
    pub cohort: Cohort,
}

impl WorkOrderRow {
    fn from_summary(summary: &WorkOrderSummary, today: NaiveDate) -> Self {
        Self {
            work_order_code: summary.work_order_code.clone(),
            account_name: summary.account_name.clone(),
            project_status: summary.project_status.clone(),
            description: summary.description.clone(),
            backlog: summary.backlog(),
            allocated_hours: summary.allocated_hours,
            logged_hours: summary.logged_hours,
            slotted_go_live_date: summary.slotted_go_live_date,
            contingent_work_order: summary.contingent_work_order.clone(),
            contingent_go_live_date: summary.contingent_go_live_date,
            months_to_go_live: months_to_go_live(summary, today),
            cohort: summary.cohort,
        }
    }
}

/// Every in-scope work order, sorted by code.
pub fn work_order_rows(snapshot: &CohortSnapshot, today: NaiveDate) -> Vec<WorkOrderRow> {
    let mut rows: Vec<WorkOrderRow> = snapshot
        .all_work_orders()
        .map(|summary| WorkOrderRow::from_summary(summary, today))
        .collect();
    rows.sort_by(|a, b| a.work_order_code.cmp(&b.work_order_code));
    rows
}

/// Blocked-cohort audit row: what is waiting, and on which contingency.
#[derive(Debug, Clone, Serialize)]
pub struct BlockedRow {
    pub work_order_code: WorkOrderCode,
    pub account_name: Option<String>,
    pub project_status: String,
    pub description: Option<String>,
    pub backlog: Hours,
    pub contingent_work_order: Option<WorkOrderCode>,
    pub contingent_go_live_date: Option<NaiveDate>,
    /// Nullable: unknown go-live means permanently ineligible.
    pub months_to_go_live: Option<i32>,
}

pub fn blocked_rows(snapshot: &CohortSnapshot, today: NaiveDate) -> Vec<BlockedRow> {
    snapshot
        .blocked
        .iter()
        .map(|summary| BlockedRow {
            work_order_code: summary.work_order_code.clone(),
            account_name: summary.account_name.clone(),
            project_status: summary.project_status.clone(),
            description: summary.description.clone(),
            backlog: summary.backlog(),
            contingent_work_order: summary.contingent_work_order.clone(),
            contingent_go_live_date: summary.contingent_go_live_date,
            months_to_go_live: months_to_go_live(summary, today),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct ShiftRow {
    pub month: MonthIndex,
    pub shift_hours: Hours,
}

/// Dense per-month shift table for months 1..=horizon, zeros where
/// nothing is scheduled.
pub fn shift_rows(schedule: &ShiftSchedule, horizon: MonthIndex) -> Vec<ShiftRow> {
    (1..=horizon)
        .map(|month| ShiftRow {
            month,
            shift_hours: schedule.hours_for(month),
        })
        .collect()
}
