//! Error types for scheduling runs.

use thiserror::Error;

use crate::models::{HardwareClass, TaskId};

/// Errors that abort a scheduling run before any timeline is touched.
///
/// A run that starts but cannot place every task is not an error; it is
/// reported as [`RunOutcome::Stalled`](crate::scheduler::RunOutcome::Stalled).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error("billing period must be positive and finite, got {0}")]
    InvalidBillingPeriod(f64),

    #[error("workflow deadline must be non-negative, got {0}")]
    InvalidDeadline(f64),

    #[error("task at position {position} has id {id}; task ids must be dense and 0-based")]
    NonDenseTaskId { position: usize, id: TaskId },

    #[error("task {task} references unknown task {reference}")]
    UnknownTaskReference { task: TaskId, reference: TaskId },

    #[error("no {hardware} resource in the pool can run task {task}")]
    NoMatchingResource { task: TaskId, hardware: HardwareClass },
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
