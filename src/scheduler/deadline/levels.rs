//! Finish-time analysis and level subdeadlines.
//!
//! # Algorithm
//!
//! 1. `te[i]`: earliest finish on the standard resource,
//!    `max(te[parent]) + duration(i)`.
//! 2. `tl[i]`: latest finish that keeps the estimated makespan,
//!    `min(tl[child] − duration(child))`, or the makespan for exit tasks.
//! 3. Group tasks by depth (longest path from an entry task).
//! 4. In each level the critical task is the zero-slack one
//!    (`|te − tl| < ε`) with the largest `te`. The level's subdeadline is
//!    `te[critical] / te_exit × D`; without a critical task it is the
//!    largest positive `tl` in the level, or unbounded.
//!
//! `te_exit` is the estimated makespan (largest `te` over exit tasks).

use tracing::debug;

use super::calibration::Calibration;
use crate::cost::execution_time;
use crate::graph::{depths, Topology};
use crate::models::{Task, TaskId};
use crate::scheduler::UNBOUNDED;

/// Proportional share of the workflow deadline for a task finishing at `te`.
///
/// Zero when the estimated makespan is zero.
pub fn subdeadline(te: f64, te_exit: f64, deadline: f64) -> f64 {
    if te_exit == 0.0 {
        0.0
    } else {
        te / te_exit * deadline
    }
}

/// Earliest and latest finish times on the standard resources.
#[derive(Debug, Clone, PartialEq)]
pub struct FinishTimes {
    /// Earliest finish per task (0 for unreached tasks).
    pub te: Vec<f64>,
    /// Latest finish per task (0 for unreached tasks).
    pub tl: Vec<f64>,
    /// Estimated makespan: largest `te` over exit tasks.
    pub makespan: f64,
}

impl FinishTimes {
    /// Runs the forward and backward passes over the reachable tasks.
    pub fn analyze(tasks: &[Task], topology: &Topology, calibration: &Calibration) -> Self {
        let n = tasks.len();
        let positions = topology.positions(n);
        let reached = |id: TaskId| positions[id].is_some();
        let duration = |id: TaskId| {
            let task = &tasks[id];
            execution_time(task, calibration.standard(task.hardware))
        };

        let mut te = vec![0.0; n];
        for &id in &topology.order {
            let ready = tasks[id].parents.iter().map(|&p| te[p]).fold(0.0, f64::max);
            te[id] = ready + duration(id);
        }

        let is_exit = |id: TaskId| !tasks[id].children.iter().any(|&c| reached(c));
        let makespan = topology
            .order
            .iter()
            .filter(|&&id| is_exit(id))
            .map(|&id| te[id])
            .fold(0.0, f64::max);

        let mut tl = vec![0.0; n];
        for &id in topology.order.iter().rev() {
            tl[id] = if is_exit(id) {
                makespan
            } else {
                tasks[id]
                    .children
                    .iter()
                    .filter(|&&c| reached(c))
                    .map(|&c| tl[c] - duration(c))
                    .fold(f64::INFINITY, f64::min)
            };
        }

        Self { te, tl, makespan }
    }
}

/// Tasks at one depth of the DAG.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelGroup {
    /// Depth from the entry tasks.
    pub level: usize,
    /// Members, in id order.
    pub tasks: Vec<TaskId>,
    /// Zero-slack member with the largest earliest finish.
    pub critical: Option<TaskId>,
    /// Latest finish committed so far in this level.
    pub high_water: f64,
    /// Deadline every member should finish by.
    pub subdeadline: f64,
}

/// Level groups of a workflow, indexed by depth.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelPlan {
    /// One group per depth, shallowest first.
    pub groups: Vec<LevelGroup>,
    level_of: Vec<Option<usize>>,
}

impl LevelPlan {
    /// Groups reachable tasks by depth and assigns subdeadlines.
    pub fn build(
        tasks: &[Task],
        topology: &Topology,
        times: &FinishTimes,
        deadline: f64,
        critical_epsilon: f64,
    ) -> Self {
        let level_of = depths(tasks, topology);
        let levels = level_of.iter().flatten().max().map_or(0, |&d| d + 1);

        let mut groups: Vec<LevelGroup> = (0..levels)
            .map(|level| LevelGroup {
                level,
                tasks: Vec::new(),
                critical: None,
                high_water: 0.0,
                subdeadline: UNBOUNDED,
            })
            .collect();
        for (id, depth) in level_of.iter().enumerate() {
            if let Some(depth) = depth {
                groups[*depth].tasks.push(id);
            }
        }

        for group in &mut groups {
            let mut critical: Option<TaskId> = None;
            for &id in &group.tasks {
                let zero_slack = (times.te[id] - times.tl[id]).abs() < critical_epsilon;
                if zero_slack && critical.map_or(true, |c| times.te[id] > times.te[c]) {
                    critical = Some(id);
                }
            }

            match critical {
                Some(id) => {
                    group.critical = Some(id);
                    group.high_water = times.te[id];
                    group.subdeadline = subdeadline(times.te[id], times.makespan, deadline);
                }
                None => {
                    let max_tl = group.tasks.iter().map(|&id| times.tl[id]).fold(0.0, f64::max);
                    group.subdeadline = if max_tl > 0.0 { max_tl } else { UNBOUNDED };
                }
            }
            debug!(
                level = group.level,
                tasks = group.tasks.len(),
                critical = ?group.critical,
                subdeadline = group.subdeadline,
                "level analyzed"
            );
        }

        Self { groups, level_of }
    }

    /// Depth of `task`, if reachable.
    pub fn level_of(&self, task: TaskId) -> Option<usize> {
        self.level_of.get(task).copied().flatten()
    }

    /// Group containing `task`, if reachable.
    pub fn group_of(&self, task: TaskId) -> Option<&LevelGroup> {
        self.level_of(task).map(|level| &self.groups[level])
    }

    /// Mutable group containing `task`, if reachable.
    pub fn group_of_mut(&mut self, task: TaskId) -> Option<&mut LevelGroup> {
        let level = self.level_of(task)?;
        self.groups.get_mut(level)
    }

    /// Current subdeadline of every task (`None` for unreached tasks).
    pub fn task_subdeadlines(&self) -> Vec<Option<f64>> {
        (0..self.level_of.len())
            .map(|id| self.group_of(id).map(|g| g.subdeadline))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::fixtures;
    use crate::models::{connect, HardwareClass, Resource};
    use crate::scheduler::CalibrationWeights;

    fn unit_calibration() -> Calibration {
        let pool = vec![Resource::cpu(1), Resource::gpu(2)];
        Calibration::new(&pool, &CalibrationWeights::default())
    }

    /// `0 → {1, 2} → 3` with unit-throughput standard resources:
    /// durations 2, 5, 3, 1.
    fn uneven_diamond() -> Vec<Task> {
        let mut tasks: Vec<Task> = [2.0, 5.0, 3.0, 1.0]
            .iter()
            .enumerate()
            .map(|(i, &c)| Task::new(i, HardwareClass::Cpu).with_compute(c))
            .collect();
        connect(&mut tasks, 0, 1);
        connect(&mut tasks, 0, 2);
        connect(&mut tasks, 1, 3);
        connect(&mut tasks, 2, 3);
        tasks
    }

    #[test]
    fn test_subdeadline() {
        assert!((subdeadline(5.0, 10.0, 100.0) - 50.0).abs() < 1e-10);
        assert!((subdeadline(5.0, 0.0, 100.0) - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_finish_times() {
        let tasks = uneven_diamond();
        let topology = Topology::of(&tasks);
        let times = FinishTimes::analyze(&tasks, &topology, &unit_calibration());
        assert_eq!(times.te, vec![2.0, 7.0, 5.0, 8.0]);
        assert_eq!(times.tl, vec![2.0, 7.0, 7.0, 8.0]);
        assert!((times.makespan - 8.0).abs() < 1e-10);
    }

    #[test]
    fn test_levels_and_critical_tasks() {
        let tasks = uneven_diamond();
        let topology = Topology::of(&tasks);
        let times = FinishTimes::analyze(&tasks, &topology, &unit_calibration());
        let plan = LevelPlan::build(&tasks, &topology, &times, 80.0, 1e-6);

        assert_eq!(plan.groups.len(), 3);
        assert_eq!(plan.groups[1].tasks, vec![1, 2]);
        assert_eq!(plan.groups[1].critical, Some(1));
        assert!((plan.groups[1].high_water - 7.0).abs() < 1e-10);
        // 7 / 8 × 80
        assert!((plan.groups[1].subdeadline - 70.0).abs() < 1e-10);
        assert!((plan.groups[2].subdeadline - 80.0).abs() < 1e-10);
        assert_eq!(plan.level_of(3), Some(2));
        assert_eq!(
            plan.task_subdeadlines(),
            vec![Some(20.0), Some(70.0), Some(70.0), Some(80.0)]
        );
    }

    #[test]
    fn test_level_without_critical_task_uses_latest_finish() {
        let tasks = uneven_diamond();
        let topology = Topology::of(&tasks);
        let times = FinishTimes::analyze(&tasks, &topology, &unit_calibration());
        // An epsilon of 0 admits no critical task anywhere.
        let plan = LevelPlan::build(&tasks, &topology, &times, 80.0, 0.0);
        assert!(plan.groups.iter().all(|g| g.critical.is_none()));
        assert!((plan.groups[1].subdeadline - 7.0).abs() < 1e-10);
        assert!((plan.groups[1].high_water - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_zero_length_workflow_is_unbounded() {
        let tasks: Vec<Task> = (0..2).map(|i| Task::new(i, HardwareClass::Cpu)).collect();
        let topology = Topology::of(&tasks);
        let times = FinishTimes::analyze(&tasks, &topology, &unit_calibration());
        let plan = LevelPlan::build(&tasks, &topology, &times, 80.0, 0.0);
        assert_eq!(plan.groups.len(), 1);
        assert_eq!(plan.groups[0].subdeadline, UNBOUNDED);
    }

    #[test]
    fn test_unreached_tasks_have_no_level() {
        let tasks = fixtures::with_cycle();
        let topology = Topology::of(&tasks);
        let times = FinishTimes::analyze(&tasks, &topology, &unit_calibration());
        let plan = LevelPlan::build(&tasks, &topology, &times, 100.0, 1e-6);
        assert_eq!(plan.groups.len(), 1);
        assert_eq!(plan.level_of(2), None);
        assert!(plan.group_of(3).is_none());
        // Task 0 is the only reachable exit: critical with the full deadline.
        assert!((plan.groups[0].subdeadline - 100.0).abs() < 1e-10);
    }
}
