//! Deadline sweep: one scheduler, many deadlines.
//!
//! Each multiplier `m` yields a deadline `floor(base × m)`. Inputs are rebuilt
//! from the factories for every run, so no state leaks between runs.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{RunOutcome, ScheduleKpi, ScheduleRequest, WorkflowScheduler};
use crate::error::Result;
use crate::models::{BillingPeriod, Resource, Task};

/// Range of deadline multipliers, inclusive at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeadlineSweep {
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

impl Default for DeadlineSweep {
    fn default() -> Self {
        Self {
            start: 1.0,
            end: 3.0,
            step: 0.25,
        }
    }
}

/// Evaluation of one sweep run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepRow {
    pub multiplier: f64,
    pub deadline: f64,
    pub deadline_met: bool,
    pub makespan: f64,
    pub total_cost: f64,
    /// Percent.
    pub utilization: f64,
    pub avg_cost_per_task: f64,
    pub avg_makespan_per_task: f64,
    pub outcome: RunOutcome,
}

impl DeadlineSweep {
    /// Creates a sweep over `start..=end` in increments of `step`.
    pub fn new(start: f64, end: f64, step: f64) -> Self {
        Self { start, end, step }
    }

    /// Multipliers in ascending order.
    ///
    /// Computed as `start + k × step` to avoid accumulating rounding error.
    /// Empty when `step` is not positive or `end < start`.
    pub fn multipliers(&self) -> Vec<f64> {
        if self.step.is_nan() || self.step <= 0.0 || self.end < self.start {
            return Vec::new();
        }
        let tolerance = self.step * 1e-9;
        (0..)
            .map(|k| self.start + k as f64 * self.step)
            .take_while(|m| *m <= self.end + tolerance)
            .collect()
    }

    /// Runs `scheduler` once per multiplier and evaluates each schedule.
    ///
    /// `make_tasks` and `make_pool` are called before every run.
    pub fn run<T, P>(
        &self,
        scheduler: &dyn WorkflowScheduler,
        base_deadline: f64,
        billing_period: BillingPeriod,
        make_tasks: T,
        make_pool: P,
    ) -> Result<Vec<SweepRow>>
    where
        T: Fn() -> Vec<Task>,
        P: Fn() -> Vec<Resource>,
    {
        let mut rows = Vec::new();
        for multiplier in self.multipliers() {
            let deadline = (base_deadline * multiplier).floor();
            let mut tasks = make_tasks();
            let mut pool = make_pool();
            let request = ScheduleRequest::new(billing_period).with_deadline(deadline);

            let report = scheduler.schedule(&mut tasks, &mut pool, &request)?;
            let kpi = ScheduleKpi::calculate(&pool, tasks.len(), billing_period, deadline);
            info!(
                scheduler = scheduler.name(),
                multiplier,
                deadline,
                makespan = kpi.makespan,
                cost = kpi.total_cost,
                met = kpi.deadline_met,
                "sweep run"
            );

            rows.push(SweepRow {
                multiplier,
                deadline,
                deadline_met: kpi.deadline_met,
                makespan: kpi.makespan,
                total_cost: kpi.total_cost,
                utilization: kpi.utilization,
                avg_cost_per_task: kpi.avg_cost_per_task,
                avg_makespan_per_task: kpi.avg_makespan_per_task,
                outcome: report.outcome,
            });
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog_pool;
    use crate::scheduler::{DeadlineAwareScheduler, HeftScheduler};
    use crate::workloads::{epigenomics_skewed, EPIGENOMICS_BASE_DEADLINE};

    #[test]
    fn test_default_multipliers() {
        let multipliers = DeadlineSweep::default().multipliers();
        assert_eq!(multipliers.len(), 9);
        assert!((multipliers[0] - 1.0).abs() < 1e-12);
        assert!((multipliers[4] - 2.0).abs() < 1e-12);
        assert!((multipliers[8] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_ranges() {
        assert!(DeadlineSweep::new(1.0, 3.0, 0.0).multipliers().is_empty());
        assert!(DeadlineSweep::new(3.0, 1.0, 0.5).multipliers().is_empty());
        assert_eq!(DeadlineSweep::new(2.0, 2.0, 0.5).multipliers(), vec![2.0]);
    }

    #[test]
    fn test_sweep_rows() {
        let sweep = DeadlineSweep::new(1.0, 2.0, 0.5);
        let rows = sweep
            .run(
                &DeadlineAwareScheduler::new(),
                1001.0,
                BillingPeriod::HOUR,
                epigenomics_skewed,
                || catalog_pool(1),
            )
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].deadline, 1001.0);
        // floor(1001 × 1.5)
        assert_eq!(rows[1].deadline, 1501.0);
        assert_eq!(rows[2].deadline, 2002.0);
        for row in &rows {
            assert_eq!(row.outcome, RunOutcome::Completed);
            assert_eq!(row.deadline_met, row.makespan <= row.deadline);
        }
    }

    #[test]
    fn test_baseline_ignores_deadline() {
        let rows = DeadlineSweep::default()
            .run(
                &HeftScheduler::new(),
                EPIGENOMICS_BASE_DEADLINE,
                BillingPeriod::HOUR,
                epigenomics_skewed,
                || catalog_pool(1),
            )
            .unwrap();
        assert_eq!(rows.len(), 9);
        assert!(rows.iter().all(|r| r.makespan == rows[0].makespan));
        assert!(rows.iter().all(|r| r.total_cost == rows[0].total_cost));
    }

    #[test]
    fn test_rows_serialize() {
        let row = SweepRow {
            multiplier: 1.0,
            deadline: 10.0,
            deadline_met: true,
            makespan: 5.0,
            total_cost: 2.0,
            utilization: 50.0,
            avg_cost_per_task: 1.0,
            avg_makespan_per_task: 2.5,
            outcome: RunOutcome::Completed,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["deadline_met"], true);
        assert_eq!(json["outcome"], "Completed");
    }

    #[test]
    fn test_sweep_from_json() {
        let sweep: DeadlineSweep =
            serde_json::from_str(r#"{"start":1.0,"end":1.5,"step":0.1}"#).unwrap();
        assert_eq!(sweep.multipliers().len(), 6);
    }
}
