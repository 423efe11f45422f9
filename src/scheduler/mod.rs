//! Workflow schedulers and schedule evaluation.
//!
//! Every scheduler consumes a task graph and a resource pool, resets both,
//! and fills each resource's timeline.
//!
//! | Scheduler | Strategy |
//! |-----------|----------|
//! | [`HeftScheduler`] | Upward-rank list scheduling, minimum finish time |
//! | [`LoadBalancedScheduler`] | Same ranking, capacity-proportional workload caps |
//! | [`DeadlineAwareScheduler`] | Level subdeadlines, cheapest feasible placement, migration pass |
//!
//! # KPI
//!
//! [`ScheduleKpi`] computes makespan, billed cost, and utilization from the
//! finalized timelines.
//!
//! # References
//!
//! - Topcuoglu, Hariri & Wu (2002), "Performance-effective and low-complexity
//!   task scheduling for heterogeneous computing"
//! - Abrishami, Naghibzadeh & Epema (2013), "Deadline-constrained workflow
//!   scheduling algorithms for Infrastructure as a Service Clouds"

mod balanced;
pub mod deadline;
mod heft;
mod kpi;
mod list;
mod rank;
mod sweep;

pub use balanced::{workload_thresholds, LoadBalancedScheduler};
pub use deadline::{CalibrationWeights, DeadlineAwareConfig, DeadlineAwareScheduler};
pub use heft::HeftScheduler;
pub use kpi::{format_hms, gantt_chart, ScheduleKpi};
pub use rank::{rank_order, upward_ranks};
pub use sweep::{DeadlineSweep, SweepRow};

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::models::{BillingPeriod, Resource, Task, TaskId};

/// Deadline used when none is given.
pub const UNBOUNDED: f64 = f64::MAX;

/// Run parameters shared by all schedulers.
///
/// # Example
///
/// ```
/// use u_workflow::models::BillingPeriod;
/// use u_workflow::scheduler::ScheduleRequest;
///
/// let request = ScheduleRequest::new(BillingPeriod::HOUR).with_deadline(7200.0);
/// assert!(request.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    /// Rental quantum.
    pub billing_period: BillingPeriod,
    /// Workflow deadline; consulted only by the deadline-aware scheduler.
    #[serde(default = "unbounded")]
    pub deadline: f64,
}

fn unbounded() -> f64 {
    UNBOUNDED
}

impl ScheduleRequest {
    /// Creates a request with no deadline.
    pub fn new(billing_period: BillingPeriod) -> Self {
        Self {
            billing_period,
            deadline: UNBOUNDED,
        }
    }

    /// Sets the workflow deadline.
    pub fn with_deadline(mut self, deadline: f64) -> Self {
        self.deadline = deadline;
        self
    }

    /// Rejects negative or NaN deadlines.
    pub fn validate(&self) -> Result<()> {
        if self.deadline.is_nan() || self.deadline < 0.0 {
            return Err(ScheduleError::InvalidDeadline(self.deadline));
        }
        Ok(())
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    /// Every task was placed.
    Completed,
    /// The run stopped early; the listed tasks were never placed.
    Stalled { unscheduled: Vec<TaskId> },
}

/// Summary of a scheduling run. The schedule itself lives in the resource
/// timelines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleReport {
    /// How the run ended.
    pub outcome: RunOutcome,
    /// Number of tasks placed.
    pub scheduled: usize,
    /// Tasks moved by post-placement refinement.
    pub migrations: usize,
}

impl ScheduleReport {
    pub(crate) fn finished(scheduled: usize, unscheduled: Vec<TaskId>, migrations: usize) -> Self {
        let outcome = if unscheduled.is_empty() {
            RunOutcome::Completed
        } else {
            RunOutcome::Stalled { unscheduled }
        };
        Self {
            outcome,
            scheduled,
            migrations,
        }
    }

    /// Whether every task was placed.
    pub fn is_complete(&self) -> bool {
        self.outcome == RunOutcome::Completed
    }
}

/// A workflow scheduling strategy.
///
/// Implementations reset task state and clear every timeline on entry, so
/// repeated runs over the same inputs are independent and deterministic.
pub trait WorkflowScheduler: Debug {
    /// Scheduler name (e.g., "HEFT").
    fn name(&self) -> &'static str;

    /// Places `tasks` onto `resources`, filling their timelines.
    ///
    /// Returns an error, without touching any state, when the inputs are
    /// malformed. A run that cannot place every task returns
    /// [`RunOutcome::Stalled`] with the partial schedule left in place.
    fn schedule(
        &self,
        tasks: &mut [Task],
        resources: &mut [Resource],
        request: &ScheduleRequest,
    ) -> Result<ScheduleReport>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_validation() {
        let request = ScheduleRequest::new(BillingPeriod::HOUR);
        assert_eq!(request.deadline, UNBOUNDED);
        assert!(request.validate().is_ok());
        assert!(request.with_deadline(0.0).validate().is_ok());
        assert_eq!(
            request.with_deadline(-1.0).validate(),
            Err(ScheduleError::InvalidDeadline(-1.0))
        );
        assert!(request.with_deadline(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_request_from_json() {
        let request: ScheduleRequest =
            serde_json::from_str(r#"{"billing_period":60.0,"deadline":500.0}"#).unwrap();
        assert!((request.billing_period.length() - 60.0).abs() < 1e-10);
        assert!((request.deadline - 500.0).abs() < 1e-10);

        let request: ScheduleRequest = serde_json::from_str(r#"{"billing_period":60.0}"#).unwrap();
        assert_eq!(request.deadline, UNBOUNDED);

        assert!(serde_json::from_str::<ScheduleRequest>(r#"{"billing_period":-1.0}"#).is_err());
    }

    #[test]
    fn test_report_outcome() {
        assert!(ScheduleReport::finished(3, vec![], 1).is_complete());
        let report = ScheduleReport::finished(1, vec![2, 3], 0);
        assert_eq!(
            report.outcome,
            RunOutcome::Stalled {
                unscheduled: vec![2, 3]
            }
        );
    }
}
