//! Record classifier — partitions the raw extract into three cohorts.
//!
//! RULES:
//!   - A record is in scope iff its delivery team is recognized, its
//!     status is not terminal, and its sub-type matches the required
//!     project class. Everything else is dropped entirely.
//!   - Rows are collapsed to one summary per work-order code: hours
//!     are summed across assignees, descriptive fields keep the first
//!     non-null value.
//!   - Cohorts are disjoint and total over the in-scope set:
//!       Temporary  — owned by the temporary delivery team;
//!       Blocked    — incubating team, still pending activation;
//!       Actionable — every other in-scope work order.
//!
//! Pure transform, no error paths. Missing fields were already
//! defaulted at deserialization.

use crate::record::WorkOrderRecord;
use crate::types::{Hours, WorkOrderCode};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Predicate configuration for the cohort partition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierRules {
    /// Delivery teams whose work counts toward the overall backlog.
    pub in_scope_teams: Vec<String>,
    /// Tag of the temporary delivery team.
    pub temporary_team: String,
    /// Tag of the incubating team whose work is not yet actionable.
    pub blocked_team: String,
    /// Status marking blocked work that has not activated yet.
    pub blocked_pending_status: String,
    /// Terminal statuses excluded from scope.
    pub excluded_statuses: Vec<String>,
    /// Required project class; other sub-types are out of scope.
    pub required_sub_type: String,
}

impl ClassifierRules {
    /// Rules used across the test suite. Production rules come from
    /// scenario.json.
    pub fn default_test() -> Self {
        Self {
            in_scope_teams: vec![
                "Delivery - Surge".to_string(),
                "Delivery - Platform".to_string(),
            ],
            temporary_team: "Delivery - Surge".to_string(),
            blocked_team: "Delivery - Platform".to_string(),
            blocked_pending_status: "Pending Activation".to_string(),
            excluded_statuses: vec![
                "Cancelled".to_string(),
                "Completed".to_string(),
                "Customer Requested Cancellation".to_string(),
                "In Question".to_string(),
            ],
            required_sub_type: "Professional Services".to_string(),
        }
    }

    fn in_scope(&self, record: &WorkOrderRecord) -> bool {
        self.in_scope_teams.contains(&record.delivery_team)
            && !self.excluded_statuses.contains(&record.project_status)
            && record.project_sub_type == self.required_sub_type
    }

    fn cohort_for(&self, delivery_team: &str, project_status: &str) -> Cohort {
        if delivery_team == self.temporary_team {
            Cohort::Temporary
        } else if delivery_team == self.blocked_team
            && project_status == self.blocked_pending_status
        {
            Cohort::Blocked
        } else {
            Cohort::Actionable
        }
    }
}

/// The three disjoint backlog ownership cohorts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cohort {
    Temporary,
    Blocked,
    Actionable,
}

impl Cohort {
    pub fn label(&self) -> &'static str {
        match self {
            Cohort::Temporary => "temporary",
            Cohort::Blocked => "blocked",
            Cohort::Actionable => "actionable",
        }
    }
}

/// One collapsed row per in-scope work order.
#[derive(Debug, Clone, Serialize)]
pub struct WorkOrderSummary {
    pub work_order_code: WorkOrderCode,
    pub delivery_team: String,
    pub project_status: String,
    pub account_name: Option<String>,
    pub description: Option<String>,
    pub allocated_hours: Hours,
    pub logged_hours: Hours,
    pub slotted_go_live_date: Option<NaiveDate>,
    pub contingent_work_order: Option<WorkOrderCode>,
    pub contingent_go_live_date: Option<NaiveDate>,
    pub cohort: Cohort,
}

impl WorkOrderSummary {
    pub fn backlog(&self) -> Hours {
        self.allocated_hours - self.logged_hours
    }
}

/// Classifier output: the three cohort tables plus their totals.
#[derive(Debug, Clone, Serialize)]
pub struct CohortSnapshot {
    pub temporary: Vec<WorkOrderSummary>,
    pub blocked: Vec<WorkOrderSummary>,
    pub actionable: Vec<WorkOrderSummary>,
    /// Backlog over the whole in-scope set (unclamped sum).
    pub total_backlog: Hours,
    pub temporary_backlog: Hours,
    pub blocked_backlog: Hours,
    /// Residual: total minus temporary minus blocked, clamped >= 0.
    pub actionable_backlog: Hours,
    pub in_scope_work_orders: usize,
}

impl CohortSnapshot {
    /// All in-scope summaries in code order, across cohorts.
    pub fn all_work_orders(&self) -> impl Iterator<Item = &WorkOrderSummary> {
        self.temporary
            .iter()
            .chain(self.blocked.iter())
            .chain(self.actionable.iter())
    }
}

/// Partition the raw record set into cohorts and compute totals.
pub fn classify(records: &[WorkOrderRecord], rules: &ClassifierRules) -> CohortSnapshot {
    // Collapse to one summary per work-order code. BTreeMap keeps the
    // output in code order, so repeated runs produce identical tables.
    let mut by_code: BTreeMap<WorkOrderCode, WorkOrderSummary> = BTreeMap::new();

    for record in records.iter().filter(|r| rules.in_scope(r)) {
        let entry = by_code
            .entry(record.work_order_code.clone())
            .or_insert_with(|| WorkOrderSummary {
                work_order_code: record.work_order_code.clone(),
                delivery_team: record.delivery_team.clone(),
                project_status: record.project_status.clone(),
                account_name: None,
                description: None,
                allocated_hours: 0.0,
                logged_hours: 0.0,
                slotted_go_live_date: None,
                contingent_work_order: None,
                contingent_go_live_date: None,
                cohort: Cohort::Actionable, // assigned after collapse
            });

        entry.allocated_hours += record.allocated_hours;
        entry.logged_hours += record.logged_hours;

        // Descriptive fields: first non-null value wins.
        if entry.account_name.is_none() {
            entry.account_name = record.account_name.clone();
        }
        if entry.description.is_none() {
            entry.description = record.description.clone();
        }
        if entry.slotted_go_live_date.is_none() {
            entry.slotted_go_live_date = record.slotted_go_live_date;
        }
        if entry.contingent_work_order.is_none() {
            entry.contingent_work_order = record.contingent_work_order.clone();
        }
        if entry.contingent_go_live_date.is_none() {
            entry.contingent_go_live_date = record.contingent_go_live_date;
        }
    }

    let mut temporary = Vec::new();
    let mut blocked = Vec::new();
    let mut actionable = Vec::new();
    let mut total_backlog = 0.0;
    let mut temporary_backlog = 0.0;
    let mut blocked_backlog = 0.0;

    for (_, mut summary) in by_code {
        summary.cohort = rules.cohort_for(&summary.delivery_team, &summary.project_status);
        total_backlog += summary.backlog();
        match summary.cohort {
            Cohort::Temporary => {
                temporary_backlog += summary.backlog();
                temporary.push(summary);
            }
            Cohort::Blocked => {
                blocked_backlog += summary.backlog();
                blocked.push(summary);
            }
            Cohort::Actionable => actionable.push(summary),
        }
    }

    let actionable_backlog = (total_backlog - temporary_backlog - blocked_backlog).max(0.0);
    let in_scope_work_orders = temporary.len() + blocked.len() + actionable.len();

    log::debug!(
        "classified {} in-scope work orders: {} temporary ({:.0}h), {} blocked ({:.0}h), {} actionable ({:.0}h)",
        in_scope_work_orders,
        temporary.len(),
        temporary_backlog,
        blocked.len(),
        blocked_backlog,
        actionable.len(),
        actionable_backlog,
    );

    CohortSnapshot {
        temporary,
        blocked,
        actionable,
        total_backlog,
        temporary_backlog,
        blocked_backlog,
        actionable_backlog,
        in_scope_work_orders,
    }
}
