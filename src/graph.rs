//! Workflow graph traversal.
//!
//! Schedulers walk the task DAG in topological order. Tasks caught in a
//! cycle (or downstream of one) are never reached; they are reported
//! separately so a run can schedule what it can and surface the rest.
//!
//! # Algorithm
//! Kahn's algorithm with a FIFO queue seeded with entry tasks in id order.
//!
//! # Reference
//! Kahn (1962), "Topological sorting of large networks"

use std::collections::VecDeque;

use crate::models::{Task, TaskId};

/// Result of a topological traversal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topology {
    /// Reachable tasks, parents before children.
    pub order: Vec<TaskId>,
    /// Tasks never released (cycle members and their descendants).
    pub unreached: Vec<TaskId>,
}

impl Topology {
    /// Computes the topological order of `tasks`.
    ///
    /// Ids must be positional; see [`check_task_ids`](crate::validation::check_task_ids).
    pub fn of(tasks: &[Task]) -> Self {
        let mut pending: Vec<usize> = tasks.iter().map(|t| t.parents.len()).collect();
        let mut queue: VecDeque<TaskId> = tasks
            .iter()
            .filter(|t| t.is_entry())
            .map(|t| t.id)
            .collect();
        let mut order = Vec::with_capacity(tasks.len());

        while let Some(id) = queue.pop_front() {
            order.push(id);
            for &child in &tasks[id].children {
                pending[child] = pending[child].saturating_sub(1);
                if pending[child] == 0 {
                    queue.push_back(child);
                }
            }
        }

        let mut reached = vec![false; tasks.len()];
        for &id in &order {
            reached[id] = true;
        }
        let unreached = (0..tasks.len()).filter(|&i| !reached[i]).collect();

        Self { order, unreached }
    }

    /// Whether every task is reachable.
    pub fn is_complete(&self) -> bool {
        self.unreached.is_empty()
    }

    /// Position of each reachable task in `order`; `None` for unreached tasks.
    pub fn positions(&self, task_count: usize) -> Vec<Option<usize>> {
        let mut positions = vec![None; task_count];
        for (index, &id) in self.order.iter().enumerate() {
            positions[id] = Some(index);
        }
        positions
    }
}

/// Longest-path depth of every reachable task from an entry task.
///
/// Entry tasks have depth 0; every other reachable task sits one level
/// below its deepest parent. Unreached tasks get `None`.
pub fn depths(tasks: &[Task], topology: &Topology) -> Vec<Option<usize>> {
    let mut depth: Vec<Option<usize>> = vec![None; tasks.len()];
    for &id in &topology.order {
        let level = tasks[id]
            .parents
            .iter()
            .filter_map(|&p| depth[p])
            .map(|d| d + 1)
            .max()
            .unwrap_or(0);
        depth[id] = Some(level);
    }
    depth
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{connect, HardwareClass};

    #[test]
    fn test_diamond_order() {
        let tasks = fixtures::diamond();
        let topology = Topology::of(&tasks);
        assert_eq!(topology.order, vec![0, 1, 2, 3]);
        assert!(topology.is_complete());
        assert_eq!(
            topology.positions(4),
            vec![Some(0), Some(1), Some(2), Some(3)]
        );
    }

    #[test]
    fn test_cycle_is_unreached() {
        let tasks = fixtures::with_cycle();
        let topology = Topology::of(&tasks);
        assert_eq!(topology.order, vec![0]);
        assert_eq!(topology.unreached, vec![1, 2, 3]);
        assert!(!topology.is_complete());
    }

    #[test]
    fn test_depths_follow_longest_path() {
        // 0 → 1 → 2, plus a shortcut 0 → 2; 3 is a second entry feeding 2.
        let mut tasks: Vec<Task> = (0..4).map(|i| Task::new(i, HardwareClass::Cpu)).collect();
        connect(&mut tasks, 0, 1);
        connect(&mut tasks, 1, 2);
        connect(&mut tasks, 0, 2);
        connect(&mut tasks, 3, 2);

        let topology = Topology::of(&tasks);
        let depth = depths(&tasks, &topology);
        assert_eq!(depth, vec![Some(0), Some(1), Some(2), Some(0)]);

        for task in &tasks {
            let expected = task
                .parents
                .iter()
                .map(|&p| depth[p].unwrap() + 1)
                .max()
                .unwrap_or(0);
            assert_eq!(depth[task.id], Some(expected));
        }
    }

    #[test]
    fn test_empty_graph() {
        let topology = Topology::of(&[]);
        assert!(topology.order.is_empty());
        assert!(topology.is_complete());
    }
}
