//! burndown-runner: headless capacity-planning simulation runner.
//!
//! Usage:
//!   burndown-runner --data-dir ./data --out ./runs
//!   burndown-runner --data-dir ./data --months 36 --today 2026-09-01
//!
//! Loads the scenario (parameters + classifier rules) and the work
//! order extract from the data directory, runs the burndown model,
//! prints a month-by-month summary, and writes the result tables to
//! a timestamped run directory.

use anyhow::Result;
use burndown_core::{
    classifier::{classify, CohortSnapshot},
    config::ScenarioConfig,
    engine::{BucketTotals, BurndownEngine, MonthResult},
    export::{self, BlockedRow, ShiftRow, WorkOrderRow},
    schedule::ShiftSchedule,
    source::{JsonFileSource, RecordSource},
};
use chrono::{Local, NaiveDate};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let data_dir = str_arg(&args, "--data-dir", "./data");
    let out_dir = str_arg(&args, "--out", "./runs");

    let today = match str_arg_opt(&args, "--today") {
        Some(value) => NaiveDate::parse_from_str(&value, "%Y-%m-%d")
            .map_err(|e| anyhow::anyhow!("Invalid --today '{value}': {e}"))?,
        None => Local::now().date_naive(),
    };

    let mut config = ScenarioConfig::load(&data_dir)?;
    if let Some(months) = str_arg_opt(&args, "--months") {
        config.params.horizon_months = months
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid --months '{months}': {e}"))?;
        config.params.validate()?;
    }

    println!("Backlog Burndown Simulator — burndown-runner");
    println!("  data_dir: {data_dir}");
    println!("  out:      {out_dir}");
    println!("  today:    {today}");
    println!("  horizon:  {} months", config.params.horizon_months);
    println!();

    let mut source = JsonFileSource::new(format!("{data_dir}/work_orders.json"));
    let records = source.fetch()?;

    let snapshot = classify(&records, &config.rules);
    let schedule = ShiftSchedule::build(&snapshot.blocked, today);
    let opening = BucketTotals::from_snapshot(&snapshot);

    println!("=== OPENING SNAPSHOT ===");
    println!("  records:            {}", records.len());
    println!("  in-scope WOs:       {}", snapshot.in_scope_work_orders);
    println!("  total backlog:      {:>10.0} h", snapshot.total_backlog);
    println!("  temporary backlog:  {:>10.0} h", snapshot.temporary_backlog);
    println!("  blocked backlog:    {:>10.0} h", snapshot.blocked_backlog);
    println!("  actionable backlog: {:>10.0} h", snapshot.actionable_backlog);
    println!("  scheduled shifts:   {:>10.0} h", schedule.total_hours());
    println!();

    log::info!(
        "classified {} in-scope work orders, {:.0}h total backlog",
        snapshot.in_scope_work_orders,
        snapshot.total_backlog,
    );

    let engine = BurndownEngine::new(config.params.clone(), schedule.clone())?;
    let results = engine.run(&opening);
    log::info!("simulation complete: {} result rows", results.len());

    print_results(&results);

    let run_dir = PathBuf::from(&out_dir).join(format!(
        "burndown_{}",
        Local::now().format("%Y%m%d_%H%M%S")
    ));
    fs::create_dir_all(&run_dir)?;

    write_parameters_txt(&run_dir, &config, &snapshot, today)?;
    write_results_csv(&run_dir, &results)?;
    fs::write(
        run_dir.join("burndown_results.json"),
        serde_json::to_string_pretty(&results)?,
    )?;
    write_work_orders_csv(&run_dir, &export::work_order_rows(&snapshot, today))?;
    write_blocked_csv(&run_dir, &export::blocked_rows(&snapshot, today))?;
    write_shift_csv(
        &run_dir,
        &export::shift_rows(&schedule, config.params.horizon_months),
    )?;

    log::info!("run outputs written to {}", run_dir.display());
    println!();
    println!("Outputs written to {}", run_dir.display());
    Ok(())
}

fn print_results(results: &[MonthResult]) {
    println!("=== BURNDOWN RESULTS ===");
    println!(
        "  {:>5} {:>12} {:>12} {:>12} {:>12} {:>12} {:>10} {:>7}",
        "month", "total", "temporary", "blocked", "actionable", "capacity", "coverage", "active"
    );
    for row in results {
        let coverage = row
            .backlog_months
            .map(|m| format!("{m:.2}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:>5} {:>12.0} {:>12.0} {:>12.0} {:>12.0} {:>12.0} {:>10} {:>7}",
            row.month,
            row.total_backlog,
            row.temporary_backlog,
            row.blocked_backlog,
            row.actionable_backlog,
            row.total_capacity,
            coverage,
            row.temporary_team_active,
        );
    }
}

fn write_parameters_txt(
    run_dir: &Path,
    config: &ScenarioConfig,
    snapshot: &CohortSnapshot,
    today: NaiveDate,
) -> Result<()> {
    let p = &config.params;
    let fmt_override =
        |value: Option<f64>| value.map(|v| format!("{v:.0}")).unwrap_or_else(|| "N/A".into());
    let text = format!(
        "Backlog Burndown Simulation\n\
         ===========================\n\
         Run Timestamp: {}\n\
         Eligibility Today: {today}\n\
         \n\
         --- Capacity Assumptions ---\n\
         Temporary Headcount (FTE): {}\n\
         Permanent Headcount (FTE): {}\n\
         Utilization Rate: {:.2}\n\
         Permanent Capacity to Actionable: {:.2}\n\
         \n\
         --- Demand Assumptions ---\n\
         Quarterly Demand (hours): {:.0}\n\
         Temporary Share of Demand: {:.2}\n\
         Quarterly Demand After 12 Months: {}\n\
         Quarterly Demand After Removal: {}\n\
         \n\
         --- Structural Controls ---\n\
         Temporary Capacity Reduction Month (50%): {}\n\
         Removal Threshold (Backlog Months): {:.1}\n\
         \n\
         --- Simulation Controls ---\n\
         Simulation Horizon (months): {}\n\
         \n\
         --- Initial Backlog Snapshot ---\n\
         Total Backlog (hrs): {:.0}\n\
         Temporary Backlog (hrs): {:.0}\n\
         Blocked Backlog (hrs): {:.0}\n\
         Actionable Backlog (hrs): {:.0}\n",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        p.temporary_fte,
        p.permanent_fte,
        p.utilization,
        p.permanent_capacity_to_actionable_share,
        p.quarterly_demand,
        p.temporary_demand_share,
        fmt_override(p.demand_override_after_12_months),
        fmt_override(p.demand_override_after_removal),
        p.temporary_capacity_reduction_month,
        p.removal_threshold_months,
        p.horizon_months,
        snapshot.total_backlog,
        snapshot.temporary_backlog,
        snapshot.blocked_backlog,
        snapshot.actionable_backlog,
    );
    fs::write(run_dir.join("parameters.txt"), text)?;
    Ok(())
}

fn write_results_csv(run_dir: &Path, results: &[MonthResult]) -> Result<()> {
    let mut out = String::from(
        "month,total_backlog,temporary_backlog,blocked_backlog,actionable_backlog,total_capacity,backlog_months,temporary_team_active\n",
    );
    for row in results {
        out.push_str(&format!(
            "{},{:.2},{:.2},{:.2},{:.2},{:.2},{},{}\n",
            row.month,
            row.total_backlog,
            row.temporary_backlog,
            row.blocked_backlog,
            row.actionable_backlog,
            row.total_capacity,
            row.backlog_months
                .map(|m| format!("{m:.4}"))
                .unwrap_or_default(),
            row.temporary_team_active,
        ));
    }
    fs::write(run_dir.join("burndown_results.csv"), out)?;
    Ok(())
}

fn write_work_orders_csv(run_dir: &Path, rows: &[WorkOrderRow]) -> Result<()> {
    let mut out = String::from(
        "work_order_code,account_name,project_status,description,backlog,allocated_hours,logged_hours,slotted_go_live_date,contingent_work_order,contingent_go_live_date,months_to_go_live,cohort\n",
    );
    for row in rows {
        out.push_str(&format!(
            "{},{},{},{},{:.2},{:.2},{:.2},{},{},{},{},{}\n",
            csv_field(&row.work_order_code),
            opt_field(&row.account_name),
            csv_field(&row.project_status),
            opt_field(&row.description),
            row.backlog,
            row.allocated_hours,
            row.logged_hours,
            opt_date(&row.slotted_go_live_date),
            opt_field(&row.contingent_work_order),
            opt_date(&row.contingent_go_live_date),
            row.months_to_go_live
                .map(|m| m.to_string())
                .unwrap_or_default(),
            row.cohort.label(),
        ));
    }
    fs::write(run_dir.join("work_orders.csv"), out)?;
    Ok(())
}

fn write_blocked_csv(run_dir: &Path, rows: &[BlockedRow]) -> Result<()> {
    let mut out = String::from(
        "work_order_code,account_name,project_status,description,backlog,contingent_work_order,contingent_go_live_date,months_to_go_live\n",
    );
    for row in rows {
        out.push_str(&format!(
            "{},{},{},{},{:.2},{},{},{}\n",
            csv_field(&row.work_order_code),
            opt_field(&row.account_name),
            csv_field(&row.project_status),
            opt_field(&row.description),
            row.backlog,
            opt_field(&row.contingent_work_order),
            opt_date(&row.contingent_go_live_date),
            row.months_to_go_live
                .map(|m| m.to_string())
                .unwrap_or_default(),
        ));
    }
    fs::write(run_dir.join("blocked_work_orders.csv"), out)?;
    Ok(())
}

fn write_shift_csv(run_dir: &Path, rows: &[ShiftRow]) -> Result<()> {
    let mut out = String::from("month,shift_hours\n");
    for row in rows {
        out.push_str(&format!("{},{:.2}\n", row.month, row.shift_hours));
    }
    fs::write(run_dir.join("shift_schedule.csv"), out)?;
    Ok(())
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn opt_field(value: &Option<String>) -> String {
    value.as_deref().map(csv_field).unwrap_or_default()
}

fn opt_date(value: &Option<NaiveDate>) -> String {
    value.map(|d| d.to_string()).unwrap_or_default()
}

fn str_arg(args: &[String], flag: &str, default: &str) -> String {
    str_arg_opt(args, flag).unwrap_or_else(|| default.to_string())
}

fn str_arg_opt(args: &[String], flag: &str) -> Option<String> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].clone())
}
