//! Per-resource occupancy timeline.
//!
//! A timeline is the list of intervals during which a resource is busy,
//! kept sorted by start time. Occupancies never overlap when they are
//! committed through [`Timeline::place`].
//!
//! # Gap model
//! Idle gaps are derived by scanning occupancies in start order from time 0:
//! the gap before the first occupancy, the gaps between consecutive
//! occupancies, and the unbounded gap after the last one.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{BillingPeriod, TaskId};

/// A committed task placement on a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occupancy {
    /// Start time (inclusive).
    pub start: f64,
    /// End time (exclusive).
    pub end: f64,
    /// Task occupying the interval.
    pub task_id: TaskId,
    /// Deadline the scheduler was honoring when it placed the task.
    pub deadline: f64,
    /// Marginal cost paid at placement time.
    pub cost: f64,
}

impl Occupancy {
    /// Creates an occupancy.
    pub fn new(task_id: TaskId, start: f64, end: f64, deadline: f64, cost: f64) -> Self {
        Self {
            start,
            end,
            task_id,
            deadline,
            cost,
        }
    }

    /// Busy duration (end - start).
    #[inline]
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether two occupancies overlap in time.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// An idle interval `[start, end)` on a timeline. `end` is infinite for the
/// gap after the last occupancy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gap {
    pub start: f64,
    pub end: f64,
}

/// Start-ordered occupancies of one resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    occupancies: Vec<Occupancy>,
}

impl Timeline {
    /// Creates an empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Occupancies in start order.
    pub fn occupancies(&self) -> &[Occupancy] {
        &self.occupancies
    }

    /// Number of occupancies.
    pub fn len(&self) -> usize {
        self.occupancies.len()
    }

    /// Whether nothing is placed on this timeline.
    pub fn is_empty(&self) -> bool {
        self.occupancies.is_empty()
    }

    /// Empties the timeline.
    pub fn clear(&mut self) {
        self.occupancies.clear();
    }

    /// Occupancy belonging to `task_id`, if placed here.
    pub fn find(&self, task_id: TaskId) -> Option<&Occupancy> {
        self.occupancies.iter().find(|o| o.task_id == task_id)
    }

    /// Latest end time on this timeline (0 when empty).
    pub fn last_end(&self) -> f64 {
        self.occupancies.iter().map(|o| o.end).fold(0.0, f64::max)
    }

    /// Earliest start `>= not_before` at which `duration` fits without
    /// overlapping any occupancy.
    ///
    /// Checks the gap before the first occupancy, then each gap between
    /// consecutive occupancies, and finally falls back to the end of the last
    /// one. Times are non-negative, so the scan starts at 0.
    pub fn earliest_available_start(&self, duration: f64, not_before: f64) -> f64 {
        let mut last_finish = 0.0_f64;
        for occupancy in &self.occupancies {
            let candidate = not_before.max(last_finish);
            if candidate + duration <= occupancy.start {
                return candidate;
            }
            last_finish = last_finish.max(occupancy.end);
        }
        not_before.max(last_finish)
    }

    /// Idle gaps in ascending start order, ending with the unbounded tail gap.
    pub fn idle_gaps(&self) -> Vec<Gap> {
        let mut gaps = Vec::with_capacity(self.occupancies.len() + 1);
        let mut last_finish = 0.0_f64;
        for occupancy in &self.occupancies {
            if occupancy.start > last_finish {
                gaps.push(Gap {
                    start: last_finish,
                    end: occupancy.start,
                });
            }
            last_finish = last_finish.max(occupancy.end);
        }
        gaps.push(Gap {
            start: last_finish,
            end: f64::INFINITY,
        });
        gaps
    }

    /// Billing periods overlapped by at least one occupancy.
    pub fn rented_periods(&self, billing_period: BillingPeriod) -> BTreeSet<i64> {
        self.occupancies
            .iter()
            .flat_map(|o| billing_period.periods(o.start, o.end))
            .collect()
    }

    /// Inserts an occupancy, keeping start order. Equal starts keep
    /// insertion order.
    pub fn insert(&mut self, occupancy: Occupancy) {
        let index = self
            .occupancies
            .partition_point(|o| o.start <= occupancy.start);
        self.occupancies.insert(index, occupancy);
    }

    /// Commits `duration` at the earliest available start `>= not_before`.
    pub fn place(
        &mut self,
        task_id: TaskId,
        duration: f64,
        not_before: f64,
        deadline: f64,
        cost: f64,
    ) -> Occupancy {
        let start = self.earliest_available_start(duration, not_before);
        let occupancy = Occupancy::new(task_id, start, start + duration, deadline, cost);
        self.insert(occupancy.clone());
        occupancy
    }

    /// Removes and returns the occupancy of `task_id`.
    pub fn remove(&mut self, task_id: TaskId) -> Option<Occupancy> {
        let index = self.occupancies.iter().position(|o| o.task_id == task_id)?;
        Some(self.occupancies.remove(index))
    }

    /// Sum of occupied durations.
    pub fn busy_time(&self) -> f64 {
        self.occupancies.iter().map(Occupancy::duration).sum()
    }

    /// Span from the first start to the last end (0 when empty).
    pub fn busy_span(&self) -> f64 {
        match self.occupancies.first() {
            Some(first) => self.last_end() - first.start,
            None => 0.0,
        }
    }
}
