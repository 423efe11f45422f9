//! Billed compute resource model.
//!
//! A resource is a rentable machine with fixed throughput attributes, a
//! per-billing-period rate, a hardware class, and a mutable [`Timeline`].
//!
//! # Cost model
//! A billing period is "rented" once any occupancy overlaps it. Placing a
//! task inside already-rented periods is free; only newly touched periods
//! are charged (see [`Resource::marginal_cost`]).

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{BillingPeriod, Occupancy, TaskId, Timeline};

/// Resource identifier.
pub type ResourceId = usize;

/// Hardware affinity shared by tasks and resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HardwareClass {
    /// General-purpose processor.
    Cpu,
    /// Accelerator.
    Gpu,
}

impl HardwareClass {
    /// All classes, in calibration order.
    pub const ALL: [HardwareClass; 2] = [HardwareClass::Cpu, HardwareClass::Gpu];
}

impl fmt::Display for HardwareClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => write!(f, "CPU"),
            Self::Gpu => write!(f, "GPU"),
        }
    }
}

/// A billed compute resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    /// Unique resource identifier.
    pub id: ResourceId,
    /// Human-readable name.
    pub name: String,
    /// Rate charged per billing period.
    pub cost: f64,
    /// Compute throughput (TFLOP per time unit).
    pub compute: f64,
    /// Read throughput (GB per time unit).
    pub read: f64,
    /// Write throughput (GB per time unit).
    pub write: f64,
    /// Hardware class.
    pub hardware: HardwareClass,
    /// Placed tasks.
    #[serde(default)]
    pub timeline: Timeline,
}

impl Resource {
    /// Creates a resource with unit throughputs and zero cost.
    pub fn new(id: ResourceId, hardware: HardwareClass) -> Self {
        Self {
            id,
            name: String::new(),
            cost: 0.0,
            compute: 1.0,
            read: 1.0,
            write: 1.0,
            hardware,
            timeline: Timeline::new(),
        }
    }

    /// Creates a CPU resource.
    pub fn cpu(id: ResourceId) -> Self {
        Self::new(id, HardwareClass::Cpu)
    }

    /// Creates a GPU resource.
    pub fn gpu(id: ResourceId) -> Self {
        Self::new(id, HardwareClass::Gpu)
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the per-period rate.
    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    /// Sets compute, read, and write throughput.
    pub fn with_throughput(mut self, compute: f64, read: f64, write: f64) -> Self {
        self.compute = compute;
        self.read = read;
        self.write = write;
        self
    }

    /// Whether this resource can run tasks of `hardware`.
    #[inline]
    pub fn matches(&self, hardware: HardwareClass) -> bool {
        self.hardware == hardware
    }

    /// Cost of occupying `[start, finish)` given what is already rented.
    ///
    /// Infinite when either bound is not finite.
    pub fn marginal_cost(&self, start: f64, finish: f64, billing_period: BillingPeriod) -> f64 {
        if !(start.is_finite() && finish.is_finite()) {
            return f64::INFINITY;
        }
        let rented = self.timeline.rented_periods(billing_period);
        let additional = billing_period
            .periods(start, finish)
            .filter(|period| !rented.contains(period))
            .count();
        additional as f64 * self.cost
    }

    /// Real aggregate bill: distinct rented periods times the rate.
    pub fn total_cost(&self, billing_period: BillingPeriod) -> f64 {
        self.timeline.rented_periods(billing_period).len() as f64 * self.cost
    }

    /// Cheapest feasible placement of `duration` on this resource.
    ///
    /// Every idle gap is tried at two start times: the earliest feasible
    /// start in the gap, and the next billing-period boundary after it (when
    /// that boundary still lies inside the gap). A candidate is valid if it
    /// finishes by both the gap end and `deadline`. Among valid candidates
    /// the first one found with the lowest marginal cost wins; gaps are
    /// visited in ascending order and the earliest start before the aligned
    /// one.
    pub fn best_slot_for(
        &self,
        task_id: TaskId,
        duration: f64,
        not_before: f64,
        deadline: f64,
        billing_period: BillingPeriod,
    ) -> Option<Occupancy> {
        if !duration.is_finite() {
            return None;
        }
        let mut best: Option<Occupancy> = None;

        for gap in self.timeline.idle_gaps() {
            let earliest = not_before.max(gap.start);
            let aligned = billing_period.boundary_at_or_after(earliest);

            let mut starts = vec![earliest];
            if aligned > earliest && aligned < gap.end {
                starts.push(aligned);
            }

            for start in starts {
                let finish = start + duration;
                if finish > deadline || finish > gap.end {
                    continue;
                }
                let cost = self.marginal_cost(start, finish, billing_period);
                if best.as_ref().map_or(true, |b| cost < b.cost) {
                    best = Some(Occupancy::new(task_id, start, finish, deadline, cost));
                }
            }
        }

        best
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
        self.timeline
            .place(task_id, duration, not_before, deadline, cost)
    }

    /// Empties the timeline.
    pub fn clear(&mut self) {
        self.timeline.clear();
    }
}

/// Clears every timeline in the pool.
pub fn clear_all(resources: &mut [Resource]) {
    for resource in resources {
        resource.clear();
    }
}
