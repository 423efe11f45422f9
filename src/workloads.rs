//! Workflow fixtures and generators.
//!
//! # Epigenomics
//!
//! Both Epigenomics-shaped workflows have 19 tasks: an entry task fans out
//! into four pipelines of four stages each (GPU, CPU, GPU, CPU), the
//! pipelines merge into one task, and a final exit task follows.
//!
//! - [`epigenomics_skewed`]: pipeline `k` grows its compute demand with `k`,
//!   so one pipeline dominates.
//! - [`epigenomics_balanced`]: demands rotate across pipelines, so every
//!   pipeline carries a similar total load.
//!
//! # Random layered workflows
//!
//! [`LayeredWorkflow`] generates DAGs whose tasks are arranged in layers;
//! each task outside the first layer depends on one or more tasks of the
//! layer just above it.

use rand::prelude::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::{connect, HardwareClass, Task, TaskId};

/// Base deadline of the Epigenomics evaluation runs (seconds).
pub const EPIGENOMICS_BASE_DEADLINE: f64 = 500_000_000.0;

/// Demand levels of one Epigenomics variant.
#[derive(Debug, Clone, Copy)]
struct Levels {
    compute: [f64; 4],
    data: [f64; 4],
}

const LOW: usize = 0;
const MID: usize = 1;
const LARGE: usize = 2;
const ULTRA: usize = 3;

/// `(data_in, data_out, compute)` level indices of one task.
type Demand = (usize, usize, usize);

/// Builds the shared Epigenomics topology from per-task demand levels.
///
/// `stages[s][k]` is the demand of stage `s` in pipeline `k`.
fn epigenomics(
    levels: Levels,
    entry: Demand,
    stages: [[Demand; 4]; 4],
    merge: Demand,
    exit: Demand,
) -> Vec<Task> {
    let task = |id: TaskId, (din, dout, compute): Demand, hardware: HardwareClass| {
        Task::new(id, hardware)
            .with_data(levels.data[din], levels.data[dout])
            .with_compute(levels.compute[compute])
    };
    let stage_hardware = [
        HardwareClass::Gpu,
        HardwareClass::Cpu,
        HardwareClass::Gpu,
        HardwareClass::Cpu,
    ];

    let mut tasks = vec![task(0, entry, HardwareClass::Cpu)];
    for (s, stage) in stages.iter().enumerate() {
        for (k, &demand) in stage.iter().enumerate() {
            tasks.push(task(1 + 4 * s + k, demand, stage_hardware[s]));
        }
    }
    tasks.push(task(17, merge, HardwareClass::Cpu));
    tasks.push(task(18, exit, HardwareClass::Cpu));

    for k in 0..4 {
        connect(&mut tasks, 0, 1 + k);
        for s in 0..3 {
            connect(&mut tasks, 1 + 4 * s + k, 1 + 4 * (s + 1) + k);
        }
        connect(&mut tasks, 13 + k, 17);
    }
    connect(&mut tasks, 17, 18);
    tasks
}

/// Epigenomics workflow with strongly uneven pipelines.
pub fn epigenomics_skewed() -> Vec<Task> {
    let levels = Levels {
        compute: [0.1, 0.5, 5.0, 100.0],
        data: [10.0, 50.0, 500.0, 10_000.0],
    };
    let by_pipeline = |din: usize, dout: usize| [LOW, MID, LARGE, ULTRA].map(|c| (din, dout, c));
    epigenomics(
        levels,
        (ULTRA, ULTRA, MID),
        [
            by_pipeline(LARGE, MID),
            by_pipeline(MID, LOW),
            by_pipeline(LOW, LOW),
            by_pipeline(MID, MID),
        ],
        (ULTRA, LARGE, ULTRA),
        (LARGE, LARGE, ULTRA),
    )
}

/// Epigenomics workflow whose pipelines carry comparable load.
pub fn epigenomics_balanced() -> Vec<Task> {
    let levels = Levels {
        compute: [100.0, 500.0, 500.0, 10_000.0],
        data: [1_000.0, 5_000.0, 50_000.0, 1_000_000.0],
    };
    let uniform = |level: usize| (level, level, level);
    let rotated = |order: [usize; 4]| order.map(uniform);
    epigenomics(
        levels,
        (ULTRA, ULTRA, MID),
        [
            rotated([LOW, MID, LARGE, ULTRA]),
            rotated([ULTRA, LOW, MID, LARGE]),
            rotated([LARGE, ULTRA, LOW, MID]),
            rotated([MID, LARGE, ULTRA, LOW]),
        ],
        (ULTRA, MID, LOW),
        (MID, LOW, LOW),
    )
}

/// Random layered DAG generator.
///
/// # Example
///
/// ```
/// use rand::SeedableRng;
/// use rand::rngs::SmallRng;
/// use u_workflow::workloads::LayeredWorkflow;
///
/// let mut rng = SmallRng::seed_from_u64(7);
/// let tasks = LayeredWorkflow::default().with_layers(3).with_width(4).generate(&mut rng);
/// assert!(tasks.len() >= 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayeredWorkflow {
    /// Number of layers.
    pub layers: usize,
    /// Maximum tasks per layer (at least one per layer).
    pub width: usize,
    /// Maximum parents of a non-entry task.
    pub max_parents: usize,
    /// Probability that a task needs a GPU.
    pub gpu_share: f64,
    /// Upper bound of the uniform compute demand.
    pub max_compute: f64,
    /// Upper bound of the uniform data volumes.
    pub max_data: f64,
}

impl Default for LayeredWorkflow {
    fn default() -> Self {
        Self {
            layers: 5,
            width: 4,
            max_parents: 2,
            gpu_share: 0.5,
            max_compute: 100.0,
            max_data: 1_000.0,
        }
    }
}

impl LayeredWorkflow {
    /// Sets the number of layers.
    pub fn with_layers(mut self, layers: usize) -> Self {
        self.layers = layers;
        self
    }

    /// Sets the maximum layer width.
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Sets the maximum number of parents per task.
    pub fn with_max_parents(mut self, max_parents: usize) -> Self {
        self.max_parents = max_parents;
        self
    }

    /// Sets the probability that a task is GPU-bound.
    pub fn with_gpu_share(mut self, gpu_share: f64) -> Self {
        self.gpu_share = gpu_share;
        self
    }

    /// Generates a workflow with dense ids, in layer order.
    ///
    /// Every task outside the first layer gets between 1 and `max_parents`
    /// distinct parents from the previous layer, so the result is acyclic
    /// and every task is reachable from an entry task.
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Vec<Task> {
        let gpu_share = self.gpu_share.clamp(0.0, 1.0);
        let mut tasks: Vec<Task> = Vec::new();
        let mut previous: Vec<TaskId> = Vec::new();

        for _ in 0..self.layers {
            let size = rng.random_range(1..=self.width.max(1));
            let mut layer = Vec::with_capacity(size);
            for _ in 0..size {
                let id = tasks.len();
                let hardware = if rng.random_bool(gpu_share) {
                    HardwareClass::Gpu
                } else {
                    HardwareClass::Cpu
                };
                tasks.push(
                    Task::new(id, hardware)
                        .with_data(
                            rng.random_range(0.0..=self.max_data.max(0.0)),
                            rng.random_range(0.0..=self.max_data.max(0.0)),
                        )
                        .with_compute(rng.random_range(0.0..=self.max_compute.max(0.0))),
                );

                if !previous.is_empty() {
                    let count = rng.random_range(1..=self.max_parents.clamp(1, previous.len()));
                    let parents: Vec<TaskId> = previous.choose_multiple(rng, count).copied().collect();
                    for parent in parents {
                        connect(&mut tasks, parent, id);
                    }
                }
                layer.push(id);
            }
            previous = layer;
        }
        tasks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use crate::graph::{depths, Topology};
    use crate::models::catalog_pool;
    use crate::validation::validate_input;

    #[test]
    fn test_epigenomics_shape() {
        for tasks in [epigenomics_skewed(), epigenomics_balanced()] {
            assert_eq!(tasks.len(), 19);
            assert!(validate_input(&tasks, &catalog_pool(1)).is_ok());
            assert_eq!(tasks[0].children, vec![1, 2, 3, 4]);
            assert_eq!(tasks[17].parents, vec![13, 14, 15, 16]);
            assert_eq!(tasks[18].parents, vec![17]);
            assert!(tasks[18].is_exit());

            let topology = Topology::of(&tasks);
            let depth = depths(&tasks, &topology);
            assert_eq!(depth[18], Some(6));
            assert_eq!(depth[9], Some(3));
        }
    }

    #[test]
    fn test_epigenomics_hardware_alternates() {
        let tasks = epigenomics_skewed();
        assert_eq!(tasks[1].hardware, HardwareClass::Gpu);
        assert_eq!(tasks[5].hardware, HardwareClass::Cpu);
        assert_eq!(tasks[9].hardware, HardwareClass::Gpu);
        assert_eq!(tasks[13].hardware, HardwareClass::Cpu);
        assert_eq!(tasks[17].hardware, HardwareClass::Cpu);
    }

    #[test]
    fn test_epigenomics_skewed_demands() {
        let tasks = epigenomics_skewed();
        assert_eq!((tasks[0].data_in, tasks[0].data_out, tasks[0].compute_demand), (10_000.0, 10_000.0, 0.5));
        // Pipeline 4 carries the ultra stages.
        assert_eq!(tasks[4].compute_demand, 100.0);
        assert_eq!((tasks[4].data_in, tasks[4].data_out), (500.0, 50.0));
        assert_eq!((tasks[8].data_in, tasks[8].data_out), (50.0, 10.0));
        assert_eq!(tasks[9].compute_demand, 0.1);
        assert_eq!((tasks[17].data_in, tasks[17].data_out, tasks[17].compute_demand), (10_000.0, 500.0, 100.0));
        assert_eq!((tasks[18].data_in, tasks[18].data_out, tasks[18].compute_demand), (500.0, 500.0, 100.0));
    }

    #[test]
    fn test_epigenomics_balanced_pipelines() {
        let tasks = epigenomics_balanced();
        let pipeline_load = |k: usize| -> f64 { (0..4).map(|s| tasks[1 + 4 * s + k].compute_demand).sum() };
        // Every pipeline passes through each level exactly once.
        for k in 0..4 {
            assert_eq!(pipeline_load(k), 100.0 + 500.0 + 500.0 + 10_000.0);
        }
        assert_eq!(tasks[5].data_in, 1_000_000.0);
        assert_eq!((tasks[17].data_in, tasks[17].data_out, tasks[17].compute_demand), (1_000_000.0, 5_000.0, 100.0));
        assert_eq!((tasks[18].data_in, tasks[18].data_out, tasks[18].compute_demand), (5_000.0, 1_000.0, 100.0));
    }

    #[test]
    fn test_generated_workflows_are_valid_dags() {
        let mut rng = SmallRng::seed_from_u64(42);
        let config = LayeredWorkflow::default().with_layers(6).with_width(5).with_max_parents(3);
        for _ in 0..20 {
            let tasks = config.generate(&mut rng);
            assert!(tasks.len() >= 6 && tasks.len() <= 30);
            assert!(validate_input(&tasks, &catalog_pool(1)).is_ok());
            assert!(Topology::of(&tasks).is_complete());
            for task in tasks.iter().filter(|t| !t.is_entry()) {
                assert!(!task.parents.is_empty() && task.parents.len() <= 3);
            }
        }
    }

    #[test]
    fn test_generation_is_reproducible() {
        let config = LayeredWorkflow::default();
        let a = config.generate(&mut SmallRng::seed_from_u64(9));
        let b = config.generate(&mut SmallRng::seed_from_u64(9));
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.parents, y.parents);
            assert_eq!(x.hardware, y.hardware);
            assert_eq!(x.compute_demand, y.compute_demand);
        }
    }

    #[test]
    fn test_gpu_share_extremes() {
        let mut rng = SmallRng::seed_from_u64(1);
        let cpu_only = LayeredWorkflow::default().with_gpu_share(0.0).generate(&mut rng);
        assert!(cpu_only.iter().all(|t| t.hardware == HardwareClass::Cpu));
        let gpu_only = LayeredWorkflow::default().with_gpu_share(1.0).generate(&mut rng);
        assert!(gpu_only.iter().all(|t| t.hardware == HardwareClass::Gpu));
    }

    #[test]
    fn test_config_from_json() {
        let config: LayeredWorkflow = serde_json::from_str(r#"{"layers":2}"#).unwrap();
        assert_eq!(config.layers, 2);
        assert_eq!(config.width, 4);
    }
}
