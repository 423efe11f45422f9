//! Greedy cost-minimizing placement.
//!
//! Repeatedly evaluates every (ready task, matching resource) pair, commits
//! the cheapest one that meets its level subdeadline (ties go to the
//! earlier finish), and otherwise the pair that finishes earliest. A
//! committed finish that raises its level's high-water mark relaxes that
//! level's subdeadline proportionally.

use tracing::{debug, trace, warn};

use super::levels::{subdeadline, LevelPlan};
use crate::cost::execution_time;
use crate::models::{BillingPeriod, Resource, Task, TaskId, TaskStatus};

/// One (task, resource) pairing under evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    task: TaskId,
    /// Index of the resource in the pool.
    resource: usize,
    cost: f64,
    start: f64,
    finish: f64,
    duration: f64,
}

fn candidates<'a>(
    ready: &'a [TaskId],
    earliest_start: &'a [f64],
    tasks: &'a [Task],
    resources: &'a [Resource],
    billing_period: BillingPeriod,
) -> impl Iterator<Item = Candidate> + 'a {
    ready.iter().flat_map(move |&task_id| {
        let task = &tasks[task_id];
        resources
            .iter()
            .enumerate()
            .filter(move |(_, r)| r.matches(task.hardware))
            .filter_map(move |(index, resource)| {
                let duration = execution_time(task, resource);
                if !duration.is_finite() {
                    return None;
                }
                let start = resource
                    .timeline
                    .earliest_available_start(duration, earliest_start[task_id]);
                let finish = start + duration;
                Some(Candidate {
                    task: task_id,
                    resource: index,
                    cost: resource.marginal_cost(start, finish, billing_period),
                    start,
                    finish,
                    duration,
                })
            })
    })
}

/// Places every reachable task; returns the tasks left unplaced.
///
/// A resource on which a task would never finish is not a candidate for it.
/// Stops early when no ready task has a candidate, or when the ready queue
/// drains before every task is placed.
pub(crate) fn place(
    tasks: &mut [Task],
    resources: &mut [Resource],
    plan: &mut LevelPlan,
    te_exit: f64,
    deadline: f64,
    billing_period: BillingPeriod,
) -> Vec<TaskId> {
    let mut earliest_start = vec![0.0; tasks.len()];
    let mut ready: Vec<TaskId> = tasks
        .iter()
        .filter(|t| t.remaining_dependencies() == 0)
        .map(|t| t.id)
        .collect();

    while !ready.is_empty() {
        let mut best: Option<Candidate> = None;
        for candidate in candidates(&ready, &earliest_start, tasks, resources, billing_period) {
            let Some(group) = plan.group_of(candidate.task) else {
                continue;
            };
            if candidate.finish > group.subdeadline {
                continue;
            }
            trace!(task = candidate.task, resource = candidate.resource, cost = candidate.cost, "feasible");
            let better = match best {
                None => true,
                Some(b) => {
                    candidate.cost < b.cost || (candidate.cost == b.cost && candidate.finish < b.finish)
                }
            };
            if better {
                best = Some(candidate);
            }
        }

        if best.is_none() {
            best = candidates(&ready, &earliest_start, tasks, resources, billing_period)
                .fold(None, |best: Option<Candidate>, c| match best {
                    Some(b) if b.finish <= c.finish => Some(b),
                    _ => Some(c),
                });
            if let Some(choice) = best {
                warn!(task = choice.task, finish = choice.finish, "no placement meets its subdeadline");
            }
        }

        let Some(choice) = best else {
            warn!(ready = ?ready, "no ready task has a usable resource");
            break;
        };

        let level_deadline = plan
            .group_of(choice.task)
            .map_or(deadline, |g| g.subdeadline);
        let resource = &mut resources[choice.resource];
        let occupancy = resource.place(
            choice.task,
            choice.duration,
            choice.start,
            level_deadline,
            choice.cost,
        );
        debug!(
            task = choice.task,
            resource = resource.id,
            start = occupancy.start,
            finish = occupancy.end,
            cost = choice.cost,
            "placed"
        );
        tasks[choice.task].status = TaskStatus::Scheduled;
        ready.retain(|&t| t != choice.task);

        if let Some(group) = plan.group_of_mut(choice.task) {
            if occupancy.end > group.high_water {
                group.high_water = occupancy.end;
                group.subdeadline = subdeadline(occupancy.end, te_exit, deadline);
                debug!(level = group.level, subdeadline = group.subdeadline, "subdeadline relaxed");
            }
        }

        let children = tasks[choice.task].children.clone();
        for child in children {
            earliest_start[child] = earliest_start[child].max(occupancy.end);
            if tasks[child].release_dependency() == 0 && !tasks[child].is_scheduled() {
                ready.push(child);
            }
        }
    }

    tasks
        .iter()
        .filter(|t| !t.is_scheduled())
        .map(|t| t.id)
        .collect()
}
