//! Raw work-order records as the upstream extract delivers them.
//!
//! One record per (work order × assignee). Source data is expected to
//! be incomplete: hours default to zero, descriptive fields and dates
//! to null. Nothing here is a fatal error — gaps propagate
//! structurally and the classifier deals with them.

use crate::types::{Hours, WorkOrderCode};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrderRecord {
    pub work_order_code: WorkOrderCode,
    #[serde(default)]
    pub delivery_team: String,
    #[serde(default)]
    pub project_status: String,
    #[serde(default)]
    pub project_sub_type: String,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub account_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub allocated_hours: Hours,
    #[serde(default)]
    pub logged_hours: Hours,
    #[serde(default)]
    pub slotted_go_live_date: Option<NaiveDate>,
    #[serde(default)]
    pub contingent_work_order: Option<WorkOrderCode>,
    #[serde(default)]
    pub contingent_go_live_date: Option<NaiveDate>,
}

impl WorkOrderRecord {
    /// Committed-but-unfinished hours on this row. May be negative
    /// when a resource over-logged; clamping happens only at the
    /// aggregate points that require it.
    pub fn backlog(&self) -> Hours {
        self.allocated_hours - self.logged_hours
    }
}
