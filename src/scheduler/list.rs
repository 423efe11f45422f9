//! Shared machinery of the rank-based list schedulers.
//!
//! # Algorithm
//! 1. Verify ids and hardware coverage; reset tasks and clear timelines.
//! 2. Rank tasks by upward rank.
//! 3. For each task in rank order, evaluate the earliest finish time on
//!    every candidate resource and commit the one picked by the caller.
//!
//! The start on a resource is the earliest insertion slot on its timeline
//! at or after the data-ready time (latest parent finish, plus the transfer
//! delay for parents placed elsewhere). The slot search is run with the
//! task's real duration, not a zero-length probe, so a task only lands in a
//! gap long enough to hold it and placements on one resource never overlap.
//!
//! A task no eligible resource can finish in finite time stays unplaced and
//! the run is reported as stalled.

use tracing::{debug, trace, warn};

use super::rank::{rank_order, upward_ranks};
use super::{ScheduleReport, ScheduleRequest};
use crate::cost::{communication_cost, execution_time};
use crate::error::{Result, ScheduleError};
use crate::graph::Topology;
use crate::models::{clear_all, reset_all, Resource, Task, TaskId, TaskStatus};
use crate::validation::check_task_ids;

/// A tentative placement of one task on one resource.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Estimate {
    /// Index of the resource in the pool.
    pub resource: usize,
    pub start: f64,
    pub finish: f64,
    pub duration: f64,
}

/// Where each task ended up during a list-scheduling run.
#[derive(Debug, Clone)]
pub(crate) struct ListRun {
    placed: Vec<Option<Estimate>>,
}

impl ListRun {
    /// Validates inputs and resets all run state.
    ///
    /// Fails before mutating anything if ids are malformed or a task has no
    /// resource of its hardware class.
    pub fn prepare(
        tasks: &mut [Task],
        resources: &mut [Resource],
        request: &ScheduleRequest,
    ) -> Result<Self> {
        request.validate()?;
        check_task_ids(tasks)?;
        if let Some(task) = tasks
            .iter()
            .find(|t| !resources.iter().any(|r| r.matches(t.hardware)))
        {
            return Err(ScheduleError::NoMatchingResource {
                task: task.id,
                hardware: task.hardware,
            });
        }

        reset_all(tasks);
        clear_all(resources);
        Ok(Self {
            placed: vec![None; tasks.len()],
        })
    }

    /// Time at which `task`'s inputs are available on `resources[index]`.
    fn data_ready(&self, tasks: &[Task], task: &Task, resources: &[Resource], index: usize) -> f64 {
        task.parents
            .iter()
            .filter_map(|&p| self.placed[p].map(|at| (p, at)))
            .map(|(p, at)| {
                if at.resource == index {
                    at.finish
                } else {
                    at.finish + communication_cost(&tasks[p], &resources[index])
                }
            })
            .fold(0.0, f64::max)
    }

    /// Earliest start and finish of `task_id` on `resources[index]`.
    pub fn estimate(
        &self,
        tasks: &[Task],
        task_id: TaskId,
        resources: &[Resource],
        index: usize,
    ) -> Estimate {
        let task = &tasks[task_id];
        let resource = &resources[index];
        let duration = execution_time(task, resource);
        let ready = self.data_ready(tasks, task, resources, index);
        let start = resource.timeline.earliest_available_start(duration, ready);
        let estimate = Estimate {
            resource: index,
            start,
            finish: start + duration,
            duration,
        };
        trace!(task = task_id, resource = resource.id, start, finish = estimate.finish, "estimate");
        estimate
    }

    /// Minimum-finish estimate among the resources accepted by `eligible`.
    ///
    /// Resources are visited in pool order; the first minimum wins. A
    /// resource on which the task would never finish is skipped.
    pub fn earliest_finish<F>(
        &self,
        tasks: &[Task],
        task_id: TaskId,
        resources: &[Resource],
        mut eligible: F,
    ) -> Option<Estimate>
    where
        F: FnMut(usize, &Resource) -> bool,
    {
        let hardware = tasks[task_id].hardware;
        let mut best: Option<Estimate> = None;
        for (index, resource) in resources.iter().enumerate() {
            if !resource.matches(hardware) || !eligible(index, resource) {
                continue;
            }
            let estimate = self.estimate(tasks, task_id, resources, index);
            if !estimate.finish.is_finite() {
                continue;
            }
            if best.map_or(true, |b| estimate.finish < b.finish) {
                best = Some(estimate);
            }
        }
        best
    }

    /// Commits `task_id` on the resource chosen by `estimate`.
    pub fn commit(
        &mut self,
        tasks: &mut [Task],
        task_id: TaskId,
        resources: &mut [Resource],
        estimate: Estimate,
    ) {
        let resource = &mut resources[estimate.resource];
        let occupancy = resource.place(task_id, estimate.duration, estimate.start, 0.0, 0.0);
        debug!(
            task = task_id,
            resource = resource.id,
            start = occupancy.start,
            finish = occupancy.end,
            "placed"
        );

        self.placed[task_id] = Some(Estimate {
            start: occupancy.start,
            finish: occupancy.end,
            ..estimate
        });
        tasks[task_id].status = TaskStatus::Scheduled;
        let children = tasks[task_id].children.clone();
        for child in children {
            tasks[child].release_dependency();
        }
    }

    /// Number of tasks placed so far.
    pub fn scheduled(&self) -> usize {
        self.placed.iter().filter(|p| p.is_some()).count()
    }
}

/// Runs a list scheduler: rank, then place each task with `select`.
///
/// `select` returns the estimate to commit for a task; `None` leaves the
/// task unplaced.
pub(crate) fn run_list<S>(
    name: &str,
    tasks: &mut [Task],
    resources: &mut [Resource],
    request: &ScheduleRequest,
    mut select: S,
) -> Result<ScheduleReport>
where
    S: FnMut(&ListRun, &[Task], TaskId, &[Resource]) -> Option<Estimate>,
{
    let mut run = ListRun::prepare(tasks, resources, request)?;
    let topology = Topology::of(tasks);
    let ranks = upward_ranks(tasks, resources, &topology);
    let order = rank_order(&ranks, &topology);
    debug!(scheduler = name, tasks = tasks.len(), resources = resources.len(), "ranked");

    let mut unscheduled = topology.unreached.clone();
    for task_id in order {
        match select(&run, &*tasks, task_id, &*resources) {
            Some(estimate) => run.commit(tasks, task_id, resources, estimate),
            None => unscheduled.push(task_id),
        }
    }

    if !unscheduled.is_empty() {
        unscheduled.sort_unstable();
        warn!(scheduler = name, unscheduled = ?unscheduled, "scheduling stalled");
    }
    Ok(ScheduleReport::finished(run.scheduled(), unscheduled, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{connect, BillingPeriod, HardwareClass};

    fn request() -> ScheduleRequest {
        ScheduleRequest::new(BillingPeriod::HOUR)
    }

    #[test]
    fn test_prepare_rejects_missing_class() {
        let mut tasks = vec![Task::new(0, HardwareClass::Gpu).with_compute(1.0)];
        let mut resources = vec![Resource::cpu(0)];
        resources[0].place(9, 10.0, 0.0, 0.0, 0.0);

        let err = ListRun::prepare(&mut tasks, &mut resources, &request()).unwrap_err();
        assert_eq!(
            err,
            ScheduleError::NoMatchingResource {
                task: 0,
                hardware: HardwareClass::Gpu
            }
        );
        // Nothing was cleared.
        assert_eq!(resources[0].timeline.len(), 1);
    }

    #[test]
    fn test_data_ready_adds_transfer_across_resources() {
        let mut tasks = vec![
            Task::new(0, HardwareClass::Cpu).with_data(0.0, 20.0).with_compute(10.0),
            Task::new(1, HardwareClass::Cpu).with_compute(10.0),
        ];
        connect(&mut tasks, 0, 1);
        let mut resources = vec![
            Resource::cpu(0).with_throughput(1.0, 10.0, 10.0),
            Resource::cpu(1).with_throughput(1.0, 4.0, 10.0),
        ];
        let mut run = ListRun::prepare(&mut tasks, &mut resources, &request()).unwrap();

        let first = run.estimate(&tasks, 0, &resources, 0);
        // 10/1 + 20/10
        assert!((first.finish - 12.0).abs() < 1e-10);
        run.commit(&mut tasks, 0, &mut resources, first);
        assert_eq!(tasks[1].remaining_dependencies(), 0);

        let same = run.estimate(&tasks, 1, &resources, 0);
        assert!((same.start - 12.0).abs() < 1e-10);
        let other = run.estimate(&tasks, 1, &resources, 1);
        // 12 + 20/4
        assert!((other.start - 17.0).abs() < 1e-10);
    }
}
