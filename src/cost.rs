//! Execution and communication cost model.
//!
//! All schedulers share the same duration formula:
//!
//! ```text
//! duration(t, r) = t.data_in / r.read + t.compute_demand / r.compute + t.data_out / r.write
//! ```
//!
//! A zero amount contributes nothing; a non-positive rate with a positive
//! amount makes the duration infinite.

use crate::models::{Resource, Task};

/// Throughput attributes a duration can be computed against.
///
/// Implemented by pool resources and by the synthetic calibration resource
/// of the deadline-aware scheduler.
pub trait Throughput {
    /// Compute throughput.
    fn compute(&self) -> f64;
    /// Read throughput.
    fn read(&self) -> f64;
    /// Write throughput.
    fn write(&self) -> f64;
}

impl Throughput for Resource {
    fn compute(&self) -> f64 {
        self.compute
    }

    fn read(&self) -> f64 {
        self.read
    }

    fn write(&self) -> f64 {
        self.write
    }
}

#[inline]
fn transfer(amount: f64, rate: f64) -> f64 {
    if amount == 0.0 {
        0.0
    } else if rate <= 0.0 {
        f64::INFINITY
    } else {
        amount / rate
    }
}

/// Duration of `task` on `target`.
pub fn execution_time<R: Throughput + ?Sized>(task: &Task, target: &R) -> f64 {
    transfer(task.data_in, target.read())
        + transfer(task.compute_demand, target.compute())
        + transfer(task.data_out, target.write())
}

/// Delay before `target` can read the output of `parent` when the parent ran
/// on a different resource.
pub fn communication_cost<R: Throughput + ?Sized>(parent: &Task, target: &R) -> f64 {
    transfer(parent.data_out, target.read())
}

/// Mean duration of `task` over every resource in the pool (0 for an empty pool).
pub fn average_execution_time(task: &Task, resources: &[Resource]) -> f64 {
    if resources.is_empty() {
        return 0.0;
    }
    let total: f64 = resources.iter().map(|r| execution_time(task, r)).sum();
    total / resources.len() as f64
}

/// Mean I/O time of `task` over every resource in the pool (0 for an empty pool).
pub fn average_communication_cost(task: &Task, resources: &[Resource]) -> f64 {
    if resources.is_empty() {
        return 0.0;
    }
    let total: f64 = resources
        .iter()
        .map(|r| transfer(task.data_in, r.read) + transfer(task.data_out, r.write))
        .sum();
    total / resources.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HardwareClass;

    fn sample_task() -> Task {
        Task::new(0, HardwareClass::Cpu)
            .with_data(100.0, 50.0)
            .with_compute(20.0)
    }

    #[test]
    fn test_execution_time() {
        let r = Resource::cpu(0).with_throughput(4.0, 10.0, 5.0);
        // 100/10 + 20/4 + 50/5
        assert!((execution_time(&sample_task(), &r) - 25.0).abs() < 1e-10);
    }

    #[test]
    fn test_execution_time_degenerate_rates() {
        let idle = Task::new(0, HardwareClass::Cpu);
        let broken = Resource::cpu(0).with_throughput(0.0, 0.0, 0.0);
        assert!((execution_time(&idle, &broken) - 0.0).abs() < 1e-10);
        assert!(execution_time(&sample_task(), &broken).is_infinite());
    }

    #[test]
    fn test_communication_cost() {
        let r = Resource::cpu(0).with_throughput(1.0, 25.0, 1.0);
        assert!((communication_cost(&sample_task(), &r) - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_averages() {
        let pool = vec![
            Resource::cpu(0).with_throughput(4.0, 10.0, 5.0),
            Resource::gpu(1).with_throughput(20.0, 100.0, 50.0),
        ];
        let task = sample_task();
        // 25 and 100/100 + 20/20 + 50/50 = 3
        assert!((average_execution_time(&task, &pool) - 14.0).abs() < 1e-10);
        // (10 + 10) and (1 + 1)
        assert!((average_communication_cost(&task, &pool) - 11.0).abs() < 1e-10);
        assert!((average_execution_time(&task, &[]) - 0.0).abs() < 1e-10);
        assert!((average_communication_cost(&task, &[]) - 0.0).abs() < 1e-10);
    }
}
