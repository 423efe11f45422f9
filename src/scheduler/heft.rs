//! Heterogeneous Earliest Finish Time (HEFT) list scheduler.
//!
//! # Algorithm
//!
//! 1. Compute the upward rank of every task over the whole pool.
//! 2. Take tasks in descending rank order.
//! 3. Assign each to the hardware-matching resource with the minimum
//!    earliest finish time, using insertion into timeline gaps.
//!
//! Placements are committed with zero marginal cost; billing is evaluated
//! afterwards from the timelines.
//!
//! # Complexity
//! O(n² · m) where n=tasks, m=resources.
//!
//! # Reference
//! Topcuoglu et al. (2002), "Performance-effective and low-complexity task
//! scheduling for heterogeneous computing", Sec. 4.1

use super::list::run_list;
use super::{ScheduleReport, ScheduleRequest, WorkflowScheduler};
use crate::error::Result;
use crate::models::{Resource, Task};

/// Baseline rank-based list scheduler.
///
/// # Example
///
/// ```
/// use u_workflow::models::{connect, BillingPeriod, HardwareClass, Resource, Task};
/// use u_workflow::scheduler::{HeftScheduler, ScheduleRequest, WorkflowScheduler};
///
/// let mut tasks = vec![
///     Task::new(0, HardwareClass::Cpu).with_compute(10.0),
///     Task::new(1, HardwareClass::Cpu).with_compute(20.0),
/// ];
/// connect(&mut tasks, 0, 1);
/// let mut pool = vec![Resource::cpu(1), Resource::cpu(2)];
///
/// let report = HeftScheduler::new()
///     .schedule(&mut tasks, &mut pool, &ScheduleRequest::new(BillingPeriod::HOUR))
///     .unwrap();
/// assert!(report.is_complete());
/// assert_eq!(report.scheduled, 2);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HeftScheduler;

impl HeftScheduler {
    /// Creates a new scheduler.
    pub fn new() -> Self {
        Self
    }
}

impl WorkflowScheduler for HeftScheduler {
    fn name(&self) -> &'static str {
        "HEFT"
    }

    fn schedule(
        &self,
        tasks: &mut [Task],
        resources: &mut [Resource],
        request: &ScheduleRequest,
    ) -> Result<ScheduleReport> {
        run_list(self.name(), tasks, resources, request, |run, tasks, task_id, resources| {
            run.earliest_finish(tasks, task_id, resources, |_, _| true)
        })
    }
}
