//! Workflow scheduling on billed heterogeneous resources.
//!
//! Places the tasks of a DAG workflow onto a pool of CPU and GPU resources
//! that are rented in fixed billing periods, trading makespan against rental
//! cost.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Task`, `Resource`, `Timeline`,
//!   `Occupancy`, `BillingPeriod`, preset `MachineType`s
//! - **`cost`**: Execution-time and transfer-delay estimates
//! - **`graph`**: Topological order and depths of the task DAG
//! - **`scheduler`**: HEFT, load-balanced HEFT, and the deadline-aware
//!   scheduler, plus KPI evaluation and deadline sweeps
//! - **`validation`**: Input integrity checks (dense ids, symmetric links,
//!   hardware coverage, DAG cycles)
//! - **`workloads`**: Epigenomics workflows and a random layered generator
//!
//! # Example
//!
//! ```
//! use u_workflow::models::{catalog_pool, BillingPeriod};
//! use u_workflow::scheduler::{
//!     DeadlineAwareScheduler, ScheduleKpi, ScheduleRequest, WorkflowScheduler,
//! };
//! use u_workflow::workloads::epigenomics_balanced;
//!
//! let mut tasks = epigenomics_balanced();
//! let mut pool = catalog_pool(1);
//! let request = ScheduleRequest::new(BillingPeriod::HOUR).with_deadline(5.0e8);
//!
//! let report = DeadlineAwareScheduler::new().schedule(&mut tasks, &mut pool, &request)?;
//! assert!(report.is_complete());
//!
//! let kpi = ScheduleKpi::calculate(&pool, tasks.len(), request.billing_period, request.deadline);
//! assert!(kpi.total_cost > 0.0);
//! # Ok::<(), u_workflow::ScheduleError>(())
//! ```
//!
//! # References
//!
//! - Topcuoglu, Hariri & Wu (2002), "Performance-effective and low-complexity
//!   task scheduling for heterogeneous computing"
//! - Samadi et al. (2018), "E-HEFT: Enhancement Heterogeneous Earliest Finish
//!   Time algorithm for Task Scheduling based on Load Balancing in Cloud
//!   Computing"
//! - Zhou et al. (2021), "Cost-efficient task scheduling for workflows on
//!   heterogeneous IaaS clouds with deadline constraints"

pub mod cost;
pub mod error;
pub mod graph;
pub mod models;
pub mod scheduler;
pub mod validation;
pub mod workloads;

pub use error::{Result, ScheduleError};
