//! Workflow task model.
//!
//! A task is one node of the workflow DAG. It reads `data_in`, performs
//! `compute_demand` units of work, and writes `data_out`, on a resource of a
//! matching hardware class.
//!
//! # Identity
//! Task ids are positional: the task with id `i` lives at index `i` of the
//! task slice, and `parents`/`children` hold such ids. Schedulers verify this
//! on entry (see [`check_task_ids`](crate::validation::check_task_ids)).

use serde::{Deserialize, Serialize};

use super::HardwareClass;

/// Positional task identifier.
pub type TaskId = usize;

/// Scheduling status of a task.
///
/// `Scheduled` is terminal within a run; every scheduler resets tasks to
/// `Unscheduled` on entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    Unscheduled,
    Scheduled,
}

/// A node of the workflow DAG.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Position of this task in the task slice.
    pub id: TaskId,
    /// Volume read before processing (GB).
    pub data_in: f64,
    /// Volume written after processing (GB).
    pub data_out: f64,
    /// Work to perform (FP64 TFLOP).
    pub compute_demand: f64,
    /// Tasks that must finish before this one starts.
    pub parents: Vec<TaskId>,
    /// Tasks that depend on this one.
    pub children: Vec<TaskId>,
    /// Hardware affinity; only resources of this class may run the task.
    pub hardware: HardwareClass,
    /// Current scheduling status.
    #[serde(default)]
    pub status: TaskStatus,
    /// Parents not yet scheduled in the current run.
    #[serde(default)]
    remaining_dependencies: usize,
}

impl Task {
    /// Creates an unconnected task with zero demand.
    pub fn new(id: TaskId, hardware: HardwareClass) -> Self {
        Self {
            id,
            data_in: 0.0,
            data_out: 0.0,
            compute_demand: 0.0,
            parents: Vec::new(),
            children: Vec::new(),
            hardware,
            status: TaskStatus::Unscheduled,
            remaining_dependencies: 0,
        }
    }

    /// Sets input and output data volumes.
    pub fn with_data(mut self, data_in: f64, data_out: f64) -> Self {
        self.data_in = data_in;
        self.data_out = data_out;
        self
    }

    /// Sets the compute demand.
    pub fn with_compute(mut self, compute_demand: f64) -> Self {
        self.compute_demand = compute_demand;
        self
    }

    /// Replaces the parent list and resets the dependency countdown.
    pub fn with_parents(mut self, parents: Vec<TaskId>) -> Self {
        self.parents = parents;
        self.remaining_dependencies = self.parents.len();
        self
    }

    /// Replaces the child list.
    pub fn with_children(mut self, children: Vec<TaskId>) -> Self {
        self.children = children;
        self
    }

    /// Parents not yet scheduled in the current run.
    pub fn remaining_dependencies(&self) -> usize {
        self.remaining_dependencies
    }

    /// Marks one parent as scheduled and returns the new count.
    pub fn release_dependency(&mut self) -> usize {
        self.remaining_dependencies = self.remaining_dependencies.saturating_sub(1);
        self.remaining_dependencies
    }

    /// Restores the run-start state: unscheduled, all parents pending.
    pub fn reset(&mut self) {
        self.status = TaskStatus::Unscheduled;
        self.remaining_dependencies = self.parents.len();
    }

    /// Whether this task has been placed in the current run.
    #[inline]
    pub fn is_scheduled(&self) -> bool {
        self.status == TaskStatus::Scheduled
    }

    /// Whether this task has no parents.
    #[inline]
    pub fn is_entry(&self) -> bool {
        self.parents.is_empty()
    }

    /// Whether this task has no children.
    #[inline]
    pub fn is_exit(&self) -> bool {
        self.children.is_empty()
    }
}

/// Adds a `parent → child` edge, keeping both adjacency lists in sync.
///
/// Duplicate edges are ignored.
///
/// # Panics
/// Panics if either id is out of range for `tasks`.
pub fn connect(tasks: &mut [Task], parent: TaskId, child: TaskId) {
    if !tasks[parent].children.contains(&child) {
        tasks[parent].children.push(child);
    }
    if !tasks[child].parents.contains(&parent) {
        tasks[child].parents.push(parent);
        tasks[child].remaining_dependencies = tasks[child].parents.len();
    }
}

/// Resets every task to its run-start state.
pub fn reset_all(tasks: &mut [Task]) {
    for task in tasks {
        task.reset();
    }
}
