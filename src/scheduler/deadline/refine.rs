//! Post-placement migration pass.
//!
//! Walks the tasks in reverse topological order and moves each paid task to
//! the cheapest other matching resource whose best slot is strictly
//! cheaper than what the task currently pays. The slot must start after
//! every parent ends and finish before every child starts and before the
//! task's level subdeadline.

use tracing::debug;

use crate::cost::execution_time;
use crate::graph::Topology;
use crate::models::{BillingPeriod, Occupancy, Resource, Task, TaskId};

/// Current host and occupancy of each task.
struct Placements {
    at: Vec<Option<(usize, Occupancy)>>,
}

impl Placements {
    fn collect(task_count: usize, resources: &[Resource]) -> Self {
        let mut at = vec![None; task_count];
        for (index, resource) in resources.iter().enumerate() {
            for occupancy in resource.timeline.occupancies() {
                if let Some(slot) = at.get_mut(occupancy.task_id) {
                    *slot = Some((index, occupancy.clone()));
                }
            }
        }
        Self { at }
    }

    fn occupancy(&self, task: TaskId) -> Option<&Occupancy> {
        self.at[task].as_ref().map(|(_, o)| o)
    }
}

/// Runs one migration sweep; returns the number of tasks moved.
///
/// `subdeadlines` holds the level subdeadline of each task as assigned
/// before greedy placement.
pub(crate) fn sweep(
    tasks: &[Task],
    resources: &mut [Resource],
    topology: &Topology,
    subdeadlines: &[Option<f64>],
    billing_period: BillingPeriod,
) -> usize {
    let mut placements = Placements::collect(tasks.len(), resources);
    let mut migrations = 0;

    for &id in topology.order.iter().rev() {
        let Some((source, current)) = placements.at[id].clone() else {
            continue;
        };
        if current.cost == 0.0 {
            continue;
        }
        let Some(subdeadline) = subdeadlines[id] else {
            continue;
        };

        let task = &tasks[id];
        let parents_end = task
            .parents
            .iter()
            .filter_map(|&p| placements.occupancy(p))
            .map(|o| o.end)
            .fold(0.0, f64::max);
        let children_start = task
            .children
            .iter()
            .filter_map(|&c| placements.occupancy(c))
            .map(|o| o.start)
            .fold(f64::INFINITY, f64::min);
        let window_end = children_start.min(subdeadline);

        let mut best: Option<(usize, Occupancy)> = None;
        for (index, target) in resources.iter().enumerate() {
            if index == source || !target.matches(task.hardware) {
                continue;
            }
            let duration = execution_time(task, target);
            let Some(slot) =
                target.best_slot_for(id, duration, parents_end, window_end, billing_period)
            else {
                continue;
            };
            if slot.cost < current.cost && best.as_ref().map_or(true, |(_, b)| slot.cost < b.cost) {
                best = Some((index, slot));
            }
        }

        if let Some((target, slot)) = best {
            debug!(
                task = id,
                from = resources[source].id,
                to = resources[target].id,
                saved = current.cost - slot.cost,
                "migrated"
            );
            resources[source].timeline.remove(id);
            resources[target].timeline.insert(slot.clone());
            placements.at[id] = Some((target, slot));
            migrations += 1;
        }
    }

    migrations
}
