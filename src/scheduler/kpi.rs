//! Schedule quality metrics (KPIs).
//!
//! Computes performance indicators from the finalized resource timelines.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Makespan | Latest occupancy end |
//! | Total Cost | Σ distinct rented billing periods × rate, per resource |
//! | Utilization | Σ busy time / Σ (last end − first start) × 100, over used resources |
//! | Avg Cost per Task | Total cost / task count |
//! | Avg Makespan per Task | Makespan / task count |
//! | Deadline Met | Makespan ≤ deadline |

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::models::{BillingPeriod, Resource, ResourceId};

/// Schedule performance indicators.
///
/// Times are in seconds; costs in the resources' rate unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleKpi {
    /// Latest completion time.
    pub makespan: f64,
    /// Sum of every resource's billed cost.
    pub total_cost: f64,
    /// Billed cost per resource id.
    pub cost_by_resource: HashMap<ResourceId, f64>,
    /// Overall utilization of the used resources, in percent (0..=100).
    pub utilization: f64,
    /// Total cost divided by the task count.
    pub avg_cost_per_task: f64,
    /// Makespan divided by the task count.
    pub avg_makespan_per_task: f64,
    /// Workflow deadline the schedule is judged against.
    pub deadline: f64,
    /// Whether the makespan is within the deadline.
    pub deadline_met: bool,
}

impl ScheduleKpi {
    /// Computes KPIs from scheduled resources.
    ///
    /// # Arguments
    /// * `resources` - The pool with populated timelines.
    /// * `task_count` - Number of tasks in the workflow (for per-task averages).
    /// * `billing_period` - Rental quantum used for billing.
    /// * `deadline` - Workflow deadline.
    pub fn calculate(
        resources: &[Resource],
        task_count: usize,
        billing_period: BillingPeriod,
        deadline: f64,
    ) -> Self {
        let makespan = resources
            .iter()
            .map(|r| r.timeline.last_end())
            .fold(0.0, f64::max);

        let cost_by_resource: HashMap<ResourceId, f64> = resources
            .iter()
            .map(|r| (r.id, r.total_cost(billing_period)))
            .collect();
        let total_cost = resources.iter().map(|r| r.total_cost(billing_period)).sum();

        let (busy, span) = resources
            .iter()
            .filter(|r| !r.timeline.is_empty())
            .fold((0.0, 0.0), |(busy, span), r| {
                (busy + r.timeline.busy_time(), span + r.timeline.busy_span())
            });
        let utilization = if span > 0.0 { busy / span * 100.0 } else { 0.0 };

        let per_task = |value: f64| {
            if task_count == 0 {
                0.0
            } else {
                value / task_count as f64
            }
        };

        Self {
            makespan,
            total_cost,
            cost_by_resource,
            utilization,
            avg_cost_per_task: per_task(total_cost),
            avg_makespan_per_task: per_task(makespan),
            deadline,
            deadline_met: makespan <= deadline,
        }
    }
}

impl fmt::Display for ScheduleKpi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Makespan: {:.2} s ({})",
            self.makespan,
            format_hms(self.makespan)
        )?;
        writeln!(f, "Total cost: {:.2}", self.total_cost)?;
        writeln!(f, "Utilization: {:.2}%", self.utilization)?;
        writeln!(f, "Average cost per task: {:.2}", self.avg_cost_per_task)?;
        writeln!(f, "Average makespan per task: {:.2}", self.avg_makespan_per_task)?;
        write!(
            f,
            "Deadline: {:.2} s ({}), {}",
            self.deadline,
            format_hms(self.deadline),
            if self.deadline_met { "met" } else { "exceeded" }
        )
    }
}

/// Renders seconds as `H:MM:SS`, truncating fractions.
///
/// # Example
///
/// ```
/// use u_workflow::scheduler::format_hms;
///
/// assert_eq!(format_hms(3725.9), "1:02:05");
/// ```
pub fn format_hms(seconds: f64) -> String {
    let hours = (seconds / 3600.0) as i64;
    let minutes = ((seconds % 3600.0) / 60.0) as i64;
    let secs = (seconds % 60.0) as i64;
    format!("{hours}:{minutes:02}:{secs:02}")
}

/// Text Gantt chart of the pool, `width` columns spanning the makespan.
///
/// Each row lists one resource's occupancies in start order as
/// `[==T3==]` blocks, preceded by spaces for idle time since the previous
/// block. Lengths are truncated to whole columns; every block is at least
/// one column.
pub fn gantt_chart(resources: &[Resource], width: usize) -> String {
    if resources.is_empty() {
        return "No schedule to display.".to_string();
    }
    let makespan = resources
        .iter()
        .map(|r| r.timeline.last_end())
        .fold(0.0, f64::max);
    if makespan == 0.0 {
        return "No tasks were scheduled.".to_string();
    }

    let columns = |length: f64| (length / makespan * width as f64) as i64;
    let mut lines = vec![format!("Timescale: 0 to {makespan:.2}s")];
    for resource in resources {
        let mut row = format!("VM {:<2} |", resource.id);
        let mut last_end = 0.0;
        for occupancy in resource.timeline.occupancies() {
            let idle = columns(occupancy.start - last_end);
            let block = columns(occupancy.end - occupancy.start).max(1);
            row.extend(std::iter::repeat(' ').take(idle.max(0) as usize));

            let label: Vec<char> = format!("T{}", occupancy.task_id).chars().collect();
            let inner = block - 2;
            let label_start = (inner - label.len() as i64) / 2;
            row.push('[');
            for i in 0..inner {
                let offset = i - label_start;
                match usize::try_from(offset).ok().and_then(|o| label.get(o)) {
                    Some(&c) => row.push(c),
                    None => row.push('='),
                }
            }
            row.push(']');
            last_end = occupancy.end;
        }
        lines.push(row);
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> Vec<Resource> {
        let mut m1 = Resource::cpu(1).with_cost(10.0);
        m1.place(0, 1000.0, 0.0, 0.0, 10.0);
        m1.place(1, 1000.0, 3000.0, 0.0, 0.0);
        let mut m2 = Resource::gpu(2).with_cost(4.0);
        m2.place(2, 2000.0, 2000.0, 0.0, 4.0);
        // M3 stays idle.
        let m3 = Resource::cpu(3).with_cost(100.0);
        vec![m1, m2, m3]
    }

    #[test]
    fn test_kpi_basic() {
        let kpi = ScheduleKpi::calculate(&pool(), 3, BillingPeriod::HOUR, 5000.0);
        assert!((kpi.makespan - 4000.0).abs() < 1e-10);
        // M1 rents period 0 (ends at 4000 → also period 1), M2 rents 0 and 1.
        assert!((kpi.cost_by_resource[&1] - 20.0).abs() < 1e-10);
        assert!((kpi.cost_by_resource[&2] - 8.0).abs() < 1e-10);
        assert!((kpi.cost_by_resource[&3] - 0.0).abs() < 1e-10);
        assert!((kpi.total_cost - 28.0).abs() < 1e-10);
        assert!((kpi.avg_cost_per_task - 28.0 / 3.0).abs() < 1e-10);
        assert!((kpi.avg_makespan_per_task - 4000.0 / 3.0).abs() < 1e-10);
        assert!(kpi.deadline_met);
    }

    #[test]
    fn test_kpi_utilization() {
        let kpi = ScheduleKpi::calculate(&pool(), 3, BillingPeriod::HOUR, 5000.0);
        // M1: busy 2000 over span 4000; M2: busy 2000 over span 2000.
        // Idle M3 is excluded. (2000 + 2000) / (4000 + 2000) × 100
        assert!((kpi.utilization - 400.0 / 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_kpi_deadline_missed() {
        let kpi = ScheduleKpi::calculate(&pool(), 3, BillingPeriod::HOUR, 3999.0);
        assert!(!kpi.deadline_met);
        let kpi = ScheduleKpi::calculate(&pool(), 3, BillingPeriod::HOUR, 4000.0);
        assert!(kpi.deadline_met);
    }

    #[test]
    fn test_kpi_empty() {
        let kpi = ScheduleKpi::calculate(&[], 0, BillingPeriod::HOUR, 0.0);
        assert!((kpi.makespan - 0.0).abs() < 1e-10);
        assert!((kpi.total_cost - 0.0).abs() < 1e-10);
        assert!((kpi.utilization - 0.0).abs() < 1e-10);
        assert!((kpi.avg_cost_per_task - 0.0).abs() < 1e-10);
        assert!(kpi.deadline_met);
    }

    #[test]
    fn test_kpi_display() {
        let kpi = ScheduleKpi::calculate(&pool(), 3, BillingPeriod::HOUR, 5000.0);
        let text = kpi.to_string();
        assert!(text.starts_with("Makespan: 4000.00 s (1:06:40)"));
        assert!(text.ends_with("met"));
    }

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(0.0), "0:00:00");
        assert_eq!(format_hms(59.99), "0:00:59");
        assert_eq!(format_hms(3600.0), "1:00:00");
        assert_eq!(format_hms(90061.0), "25:01:01");
    }

    #[test]
    fn test_gantt_chart() {
        let mut m1 = Resource::cpu(1);
        m1.place(3, 50.0, 0.0, 0.0, 0.0);
        m1.place(12, 25.0, 75.0, 0.0, 0.0);
        let chart = gantt_chart(&[m1], 20);
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines[0], "Timescale: 0 to 100.00s");
        // Block of 10 columns holds 8 inner characters; T3 centered at 3.
        // Idle 25 → 5 spaces; block of 5 holds 3 inner characters.
        assert_eq!(lines[1], "VM 1  |[===T3===]     [T12]");
    }

    #[test]
    fn test_gantt_chart_degenerate() {
        assert_eq!(gantt_chart(&[], 100), "No schedule to display.");
        assert_eq!(gantt_chart(&[Resource::cpu(1)], 100), "No tasks were scheduled.");
    }

    #[test]
    fn test_gantt_chart_minimum_block() {
        let mut m1 = Resource::cpu(1);
        m1.place(0, 1.0, 0.0, 0.0, 0.0);
        m1.place(1, 999.0, 1.0, 0.0, 0.0);
        let chart = gantt_chart(&[m1], 10);
        // The 1-second task rounds to zero columns and is widened to one.
        assert!(chart.lines().nth(1).unwrap().starts_with("VM 1  |[]"));
    }
}
