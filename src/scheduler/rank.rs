//! Upward rank.
//!
//! `rank(t) = avg_exec(t) + max over children c of (avg_comm(t) + rank(c))`,
//! or `avg_exec(t)` for exit tasks. Averages run over every resource in the
//! pool, regardless of hardware class.
//!
//! # Reference
//! Topcuoglu et al. (2002), "Performance-effective and low-complexity task
//! scheduling for heterogeneous computing", Sec. 4.1

use crate::cost::{average_communication_cost, average_execution_time};
use crate::graph::Topology;
use crate::models::{Resource, Task, TaskId};

/// Upward rank of every task; unreached tasks get 0.
///
/// Children outside the topological order are ignored.
pub fn upward_ranks(tasks: &[Task], resources: &[Resource], topology: &Topology) -> Vec<f64> {
    let positions = topology.positions(tasks.len());
    let mut ranks = vec![0.0; tasks.len()];

    for &id in topology.order.iter().rev() {
        let task = &tasks[id];
        let exec = average_execution_time(task, resources);
        let comm = average_communication_cost(task, resources);
        let successor_path = task
            .children
            .iter()
            .filter(|&&c| positions[c].is_some())
            .map(|&c| comm + ranks[c])
            .fold(0.0, f64::max);
        ranks[id] = exec + successor_path;
    }

    ranks
}

/// Reachable tasks sorted by descending rank; ties keep topological order.
pub fn rank_order(ranks: &[f64], topology: &Topology) -> Vec<TaskId> {
    let mut order = topology.order.clone();
    // Stable: equal ranks stay in topological order, so parents precede children.
    order.sort_by(|&a, &b| ranks[b].total_cmp(&ranks[a]));
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::fixtures;
    use crate::models::{connect, HardwareClass};

    fn pool() -> Vec<Resource> {
        vec![
            Resource::cpu(0).with_throughput(10.0, 10.0, 10.0),
            Resource::cpu(1).with_throughput(20.0, 5.0, 5.0),
            Resource::gpu(2).with_throughput(100.0, 50.0, 50.0),
        ]
    }

    #[test]
    fn test_exit_rank_is_average_execution() {
        let tasks = fixtures::diamond();
        let resources = pool();
        let topology = Topology::of(&tasks);
        let ranks = upward_ranks(&tasks, &resources, &topology);
        let exit_exec = average_execution_time(&tasks[3], &resources);
        assert!((ranks[3] - exit_exec).abs() < 1e-10);
    }

    #[test]
    fn test_rank_dominates_children() {
        let tasks = fixtures::diamond();
        let resources = pool();
        let ranks = upward_ranks(&tasks, &resources, &Topology::of(&tasks));
        for task in &tasks {
            for &child in &task.children {
                assert!(ranks[task.id] >= ranks[child]);
            }
        }
        assert!(ranks[0] > ranks[1]);
    }

    #[test]
    fn test_rank_order_keeps_parents_first() {
        // Zero-demand chain: every rank ties at 0.
        let mut tasks: Vec<Task> = (0..3).map(|i| Task::new(i, HardwareClass::Cpu)).collect();
        connect(&mut tasks, 0, 1);
        connect(&mut tasks, 1, 2);
        let topology = Topology::of(&tasks);
        let ranks = upward_ranks(&tasks, &pool(), &topology);
        assert!(ranks.iter().all(|&r| r == 0.0));
        assert_eq!(rank_order(&ranks, &topology), vec![0, 1, 2]);
    }

    #[test]
    fn test_cycle_members_excluded() {
        let tasks = fixtures::with_cycle();
        let topology = Topology::of(&tasks);
        let ranks = upward_ranks(&tasks, &pool(), &topology);
        assert_eq!(rank_order(&ranks, &topology), vec![0]);
        // Task 0's only child is unreached, so it ranks as an exit task.
        let exec = average_execution_time(&tasks[0], &pool());
        assert!((ranks[0] - exec).abs() < 1e-10);
    }
}
