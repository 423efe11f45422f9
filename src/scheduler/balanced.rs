//! Load-balanced HEFT variant (E-HEFT).
//!
//! # Algorithm
//!
//! 0. Give every resource a workload threshold: its share of the compute
//!    throughput of its hardware class.
//! 1. Rank tasks exactly as HEFT does.
//! 2. For each task, pick the minimum-finish resource among those whose
//!    assigned compute demand, as a fraction of the whole workflow's demand,
//!    is still below threshold. If every matching resource is saturated,
//!    fall back to the minimum-finish matching resource.
//!
//! Compute throughput stands in for a benchmark score of relative capacity.
//!
//! # Reference
//! Samadi et al. (2018), "E-HEFT: Enhancement Heterogeneous Earliest Finish
//! Time algorithm for Task Scheduling based on Load Balancing in Cloud
//! Computing"

use std::collections::HashMap;

use tracing::trace;

use super::list::run_list;
use super::{ScheduleReport, ScheduleRequest, WorkflowScheduler};
use crate::error::Result;
use crate::models::{HardwareClass, Resource, Task};

/// Workload threshold per resource, in pool order.
///
/// Within each hardware class the thresholds sum to 1.0. A class whose total
/// compute is not positive splits evenly among its members.
pub fn workload_thresholds(resources: &[Resource]) -> Vec<f64> {
    let mut capacity: HashMap<HardwareClass, (f64, usize)> = HashMap::new();
    for r in resources {
        let entry = capacity.entry(r.hardware).or_insert((0.0, 0));
        entry.0 += r.compute;
        entry.1 += 1;
    }

    resources
        .iter()
        .map(|r| {
            let (total, members) = capacity[&r.hardware];
            if total > 0.0 {
                r.compute / total
            } else {
                1.0 / members as f64
            }
        })
        .collect()
}

/// Rank-based list scheduler with capacity-proportional workload caps.
///
/// # Example
///
/// ```
/// use u_workflow::models::{BillingPeriod, HardwareClass, Resource, Task};
/// use u_workflow::scheduler::{LoadBalancedScheduler, ScheduleRequest, WorkflowScheduler};
///
/// let mut tasks: Vec<Task> = (0..4)
///     .map(|i| Task::new(i, HardwareClass::Cpu).with_compute(10.0))
///     .collect();
/// let mut pool = vec![
///     Resource::cpu(1).with_throughput(3.0, 1.0, 1.0),
///     Resource::cpu(2).with_throughput(1.0, 1.0, 1.0),
/// ];
///
/// let report = LoadBalancedScheduler::new()
///     .schedule(&mut tasks, &mut pool, &ScheduleRequest::new(BillingPeriod::HOUR))
///     .unwrap();
/// assert!(report.is_complete());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadBalancedScheduler;

impl LoadBalancedScheduler {
    /// Creates a new scheduler.
    pub fn new() -> Self {
        Self
    }
}

impl WorkflowScheduler for LoadBalancedScheduler {
    fn name(&self) -> &'static str {
        "E-HEFT"
    }

    fn schedule(
        &self,
        tasks: &mut [Task],
        resources: &mut [Resource],
        request: &ScheduleRequest,
    ) -> Result<ScheduleReport> {
        let thresholds = workload_thresholds(resources);
        let total_workload: f64 = tasks.iter().map(|t| t.compute_demand).sum();
        let mut assigned = vec![0.0; resources.len()];

        run_list(self.name(), tasks, resources, request, |run, tasks, task_id, resources| {
            let below_threshold = |index: usize, _: &Resource| {
                let load = if total_workload > 0.0 {
                    assigned[index] / total_workload
                } else {
                    0.0
                };
                load < thresholds[index]
            };
            let choice = run
                .earliest_finish(tasks, task_id, resources, below_threshold)
                .or_else(|| {
                    trace!(task = task_id, "all matching resources saturated");
                    run.earliest_finish(tasks, task_id, resources, |_, _| true)
                })?;
            assigned[choice.resource] += tasks[task_id].compute_demand;
            Some(choice)
        })
    }
}
