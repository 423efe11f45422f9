//! Deadline-constrained, cost-aware scheduling.
//!
//! # Algorithm
//!
//! 1. **Initialize**: verify ids, reset tasks, clear timelines.
//! 2. **Calibrate**: derive one standard resource per hardware class
//!    ([`Calibration`]).
//! 3. **Level analysis**: estimate earliest and latest finish times on the
//!    standard resources, group tasks by depth, and split the workflow
//!    deadline into level subdeadlines ([`LevelPlan`]).
//! 4. **Greedy placement**: repeatedly commit the cheapest (task, resource)
//!    pair that meets its level subdeadline, or the earliest-finishing pair
//!    when none does. Late finishes relax their level's subdeadline.
//! 5. **Refinement**: migrate paid tasks to strictly cheaper slots on other
//!    resources without disturbing their parents, children, or the initial
//!    level subdeadlines.
//!
//! Unlike the list schedulers, a task whose hardware class has no resource
//! does not fail the run: placement stops and the report lists what is
//! left.
//!
//! # Reference
//! Zhou et al. (2021), "Cost-efficient task scheduling for workflows on
//! heterogeneous IaaS clouds with deadline constraints"

mod calibration;
mod greedy;
mod levels;
mod refine;

pub use calibration::{heterogeneity, Calibration, CalibrationWeights, StandardResource};
pub use levels::{subdeadline, FinishTimes, LevelGroup, LevelPlan};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{ScheduleReport, ScheduleRequest, WorkflowScheduler};
use crate::error::Result;
use crate::graph::Topology;
use crate::models::{clear_all, reset_all, Resource, Task};
use crate::validation::check_task_ids;

/// Tuning knobs of [`DeadlineAwareScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeadlineAwareConfig {
    /// Weights of the heterogeneity factor.
    pub weights: CalibrationWeights,
    /// Slack below which a task counts as critical.
    pub critical_epsilon: f64,
    /// Maximum number of refinement sweeps. Sweeping stops early once a
    /// sweep moves nothing; 0 disables refinement.
    pub refine_sweeps: usize,
}

impl Default for DeadlineAwareConfig {
    fn default() -> Self {
        Self {
            weights: CalibrationWeights::default(),
            critical_epsilon: 1e-6,
            refine_sweeps: 1,
        }
    }
}

impl DeadlineAwareConfig {
    /// Sets the heterogeneity weights.
    pub fn with_weights(mut self, weights: CalibrationWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Sets the critical-task tolerance.
    pub fn with_critical_epsilon(mut self, epsilon: f64) -> Self {
        self.critical_epsilon = epsilon;
        self
    }

    /// Sets the maximum number of refinement sweeps.
    pub fn with_refine_sweeps(mut self, sweeps: usize) -> Self {
        self.refine_sweeps = sweeps;
        self
    }
}

/// Cost-minimizing scheduler that works against a workflow deadline.
///
/// # Example
///
/// ```
/// use u_workflow::models::{catalog_pool, BillingPeriod};
/// use u_workflow::scheduler::{DeadlineAwareScheduler, ScheduleRequest, WorkflowScheduler};
/// use u_workflow::workloads::epigenomics_skewed;
///
/// let mut tasks = epigenomics_skewed();
/// let mut pool = catalog_pool(1);
/// let request = ScheduleRequest::new(BillingPeriod::HOUR).with_deadline(1.0e9);
///
/// let report = DeadlineAwareScheduler::new()
///     .schedule(&mut tasks, &mut pool, &request)
///     .unwrap();
/// assert!(report.is_complete());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DeadlineAwareScheduler {
    config: DeadlineAwareConfig,
}

impl DeadlineAwareScheduler {
    /// Creates a scheduler with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: DeadlineAwareConfig) -> Self {
        self.config = config;
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &DeadlineAwareConfig {
        &self.config
    }
}

impl WorkflowScheduler for DeadlineAwareScheduler {
    fn name(&self) -> &'static str {
        "CETSS"
    }

    fn schedule(
        &self,
        tasks: &mut [Task],
        resources: &mut [Resource],
        request: &ScheduleRequest,
    ) -> Result<ScheduleReport> {
        request.validate()?;
        check_task_ids(tasks)?;
        reset_all(tasks);
        clear_all(resources);

        let topology = Topology::of(tasks);
        let calibration = Calibration::new(resources, &self.config.weights);
        let times = FinishTimes::analyze(tasks, &topology, &calibration);
        let mut plan = LevelPlan::build(
            tasks,
            &topology,
            &times,
            request.deadline,
            self.config.critical_epsilon,
        );
        let initial = plan.task_subdeadlines();
        debug!(
            levels = plan.groups.len(),
            estimated_makespan = times.makespan,
            deadline = request.deadline,
            "levels planned"
        );

        let unscheduled = greedy::place(
            tasks,
            resources,
            &mut plan,
            times.makespan,
            request.deadline,
            request.billing_period,
        );
        let scheduled = tasks.len() - unscheduled.len();
        if !unscheduled.is_empty() {
            warn!(scheduler = self.name(), unscheduled = ?unscheduled, "scheduling stalled");
            return Ok(ScheduleReport::finished(scheduled, unscheduled, 0));
        }

        let mut migrations = 0;
        for pass in 0..self.config.refine_sweeps {
            let moved = refine::sweep(
                tasks,
                resources,
                &topology,
                &initial,
                request.billing_period,
            );
            debug!(pass, moved, "refinement sweep");
            migrations += moved;
            if moved == 0 {
                break;
            }
        }

        info!(scheduler = self.name(), scheduled, migrations, "schedule complete");
        Ok(ScheduleReport::finished(scheduled, unscheduled, migrations))
    }
}
