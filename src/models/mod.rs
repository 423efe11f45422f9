//! Workflow scheduling domain models.
//!
//! Tasks form a DAG with positional ids; resources are billed machines that
//! each own a timeline of occupancies. Schedulers mutate task status and
//! resource timelines in place.
//!
//! | Type | Role |
//! |------|------|
//! | [`Task`] | DAG node with data/compute demand and hardware affinity |
//! | [`Resource`] | Billed machine with throughputs and a [`Timeline`] |
//! | [`Occupancy`] | A committed placement on a timeline |
//! | [`BillingPeriod`] | Validated rental quantum |
//! | [`MachineType`] | Preset machine offerings |

mod billing;
mod catalog;
mod resource;
mod task;
mod timeline;

pub use billing::BillingPeriod;
pub use catalog::{catalog_pool, MachineType};
pub use resource::{clear_all, HardwareClass, Resource, ResourceId};
pub use task::{connect, reset_all, Task, TaskId, TaskStatus};
pub use timeline::{Gap, Occupancy, Timeline};
