//! Input validation for workflow scheduling.
//!
//! Checks structural integrity of the task graph and resource pool before
//! scheduling. Detects:
//! - Task ids that are not dense and positional
//! - Parent/child references to unknown tasks
//! - Parent/child lists that disagree
//! - Duplicate resource ids
//! - Non-positive or non-finite throughputs and negative rates
//! - Tasks whose hardware class has no resource
//! - Circular dependencies (DAG validation)
//!
//! Schedulers only enforce [`check_task_ids`] on entry; [`validate_input`]
//! is the full report for callers that want every problem at once.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4 (Topological Sort)

use std::collections::HashSet;

use crate::error::{Result, ScheduleError};
use crate::models::{HardwareClass, Resource, Task, TaskId};

/// Validation result.
pub type ValidationResult = std::result::Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A task id differs from its position.
    NonDenseId,
    /// A parent or child id is out of range.
    UnknownReference,
    /// A parent lists a child that does not list it back, or vice versa.
    AsymmetricLink,
    /// Two resources share the same id.
    DuplicateResourceId,
    /// A resource throughput is non-positive or a rate is negative.
    InvalidThroughput,
    /// No resource can run a task's hardware class.
    MissingHardwareClass,
    /// The dependency graph contains a cycle.
    CyclicDependency,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Verifies that task ids are positional and every reference is in range.
///
/// This is the entry check every scheduler runs before touching any state.
pub fn check_task_ids(tasks: &[Task]) -> Result<()> {
    for (position, task) in tasks.iter().enumerate() {
        if task.id != position {
            return Err(ScheduleError::NonDenseTaskId {
                position,
                id: task.id,
            });
        }
    }
    for task in tasks {
        if let Some(&reference) = task
            .parents
            .iter()
            .chain(&task.children)
            .find(|&&id| id >= tasks.len())
        {
            return Err(ScheduleError::UnknownTaskReference {
                task: task.id,
                reference,
            });
        }
    }
    Ok(())
}

/// Validates the input data for a scheduling run.
///
/// Checks:
/// 1. Task ids equal their positions
/// 2. Parent/child ids are in range
/// 3. Parent and child lists mirror each other
/// 4. No duplicate resource ids
/// 5. Throughputs are positive and finite, rates non-negative
/// 6. Every task's hardware class has at least one resource
/// 7. No circular dependencies
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(tasks: &[Task], resources: &[Resource]) -> ValidationResult {
    let mut errors = Vec::new();

    for (position, task) in tasks.iter().enumerate() {
        if task.id != position {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonDenseId,
                format!("Task at position {position} has id {}", task.id),
            ));
        }
    }

    let in_range = |id: TaskId| id < tasks.len();
    for (position, task) in tasks.iter().enumerate() {
        for &parent in &task.parents {
            if !in_range(parent) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownReference,
                    format!("Task {position} references unknown parent {parent}"),
                ));
            } else if !tasks[parent].children.contains(&position) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::AsymmetricLink,
                    format!("Task {parent} does not list child {position}"),
                ));
            }
        }
        for &child in &task.children {
            if !in_range(child) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownReference,
                    format!("Task {position} references unknown child {child}"),
                ));
            } else if !tasks[child].parents.contains(&position) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::AsymmetricLink,
                    format!("Task {child} does not list parent {position}"),
                ));
            }
        }
    }

    let mut resource_ids = HashSet::new();
    for r in resources {
        if !resource_ids.insert(r.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateResourceId,
                format!("Duplicate resource ID: {}", r.id),
            ));
        }
        let throughputs = [("compute", r.compute), ("read", r.read), ("write", r.write)];
        for (name, value) in throughputs {
            if !(value.is_finite() && value > 0.0) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidThroughput,
                    format!("Resource {} has {name} throughput {value}", r.id),
                ));
            }
        }
        if !(r.cost.is_finite() && r.cost >= 0.0) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidThroughput,
                format!("Resource {} has rate {}", r.id, r.cost),
            ));
        }
    }

    let available: HashSet<HardwareClass> = resources.iter().map(|r| r.hardware).collect();
    for task in tasks {
        if !available.contains(&task.hardware) {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingHardwareClass,
                format!("No {} resource can run task {}", task.hardware, task.id),
            ));
        }
    }

    if let Some(cycle_err) = detect_cycles(tasks) {
        errors.push(cycle_err);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Detects cycles in the dependency graph using DFS over child links.
///
/// # Algorithm
/// If a back-edge is found (visiting a node currently in the recursion
/// stack), a cycle exists. Out-of-range children are skipped.
///
/// # Reference
/// Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4
fn detect_cycles(tasks: &[Task]) -> Option<ValidationError> {
    let mut visited = vec![false; tasks.len()];
    let mut in_stack = vec![false; tasks.len()];

    for node in 0..tasks.len() {
        if !visited[node] && has_cycle_dfs(node, tasks, &mut visited, &mut in_stack) {
            return Some(ValidationError::new(
                ValidationErrorKind::CyclicDependency,
                format!("Circular dependency detected involving task {node}"),
            ));
        }
    }

    None
}

fn has_cycle_dfs(
    node: usize,
    tasks: &[Task],
    visited: &mut [bool],
    in_stack: &mut [bool],
) -> bool {
    visited[node] = true;
    in_stack[node] = true;

    for &next in &tasks[node].children {
        if next >= tasks.len() {
            continue;
        }
        if in_stack[next] {
            return true; // Back edge → cycle
        }
        if !visited[next] && has_cycle_dfs(next, tasks, visited, in_stack) {
            return true;
        }
    }

    in_stack[node] = false;
    false
}
