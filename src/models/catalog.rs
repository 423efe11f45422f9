//! Preset machine offerings.
//!
//! Hourly rates, FP64 TFLOPS, and storage throughput (GB/s) of common cloud
//! instance types, usable as a reference pool for evaluation runs.

use serde::{Deserialize, Serialize};

use super::{HardwareClass, Resource, ResourceId};

/// A preset machine offering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineType {
    E2Micro,
    E2Small,
    CascadeLake,
    EmeraldRapids,
    NvidiaP100,
    NvidiaV100,
    NvidiaH200,
}

impl MachineType {
    /// Every offering, CPUs first.
    pub const ALL: [MachineType; 7] = [
        MachineType::E2Micro,
        MachineType::E2Small,
        MachineType::CascadeLake,
        MachineType::EmeraldRapids,
        MachineType::NvidiaP100,
        MachineType::NvidiaV100,
        MachineType::NvidiaH200,
    ];

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::E2Micro => "CPU-E2-MICRO",
            Self::E2Small => "CPU-E2-SMALL",
            Self::CascadeLake => "CPU-C2",
            Self::EmeraldRapids => "CPU-C4",
            Self::NvidiaP100 => "GPU-P100",
            Self::NvidiaV100 => "GPU-V100",
            Self::NvidiaH200 => "GPU-H200",
        }
    }

    /// Hardware class.
    pub fn hardware(self) -> HardwareClass {
        match self {
            Self::E2Micro | Self::E2Small | Self::CascadeLake | Self::EmeraldRapids => {
                HardwareClass::Cpu
            }
            Self::NvidiaP100 | Self::NvidiaV100 | Self::NvidiaH200 => HardwareClass::Gpu,
        }
    }

    /// `(rate per hour, FP64 TFLOPS, read GB/s, write GB/s)`.
    fn profile(self) -> (f64, f64, f64, f64) {
        match self {
            Self::E2Micro => (0.0092215, 0.024, 42.0, 42.0),
            Self::E2Small => (0.01844301, 0.048, 42.0, 42.0),
            Self::CascadeLake => (0.033982, 2.42, 140.78, 140.78),
            Self::EmeraldRapids => (0.03938, 4.10, 307.2, 307.2),
            Self::NvidiaP100 => (1.6, 4.763, 732.2, 732.2),
            Self::NvidiaV100 => (2.55, 7.066, 897.0, 897.0),
            Self::NvidiaH200 => (3.72, 30.16, 4890.0, 4890.0),
        }
    }

    /// Builds a resource of this type with an empty timeline.
    pub fn resource(self, id: ResourceId) -> Resource {
        let (cost, compute, read, write) = self.profile();
        Resource::new(id, self.hardware())
            .with_name(self.name())
            .with_cost(cost)
            .with_throughput(compute, read, write)
    }
}

/// A pool holding `copies` of every offering, in catalog order, with ids
/// starting at 1.
pub fn catalog_pool(copies: usize) -> Vec<Resource> {
    (0..copies)
        .flat_map(|_| MachineType::ALL)
        .enumerate()
        .map(|(i, machine)| machine.resource(i + 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_machine_resource() {
        let r = MachineType::NvidiaH200.resource(9);
        assert_eq!(r.id, 9);
        assert_eq!(r.name, "GPU-H200");
        assert_eq!(r.hardware, HardwareClass::Gpu);
        assert!((r.cost - 3.72).abs() < 1e-10);
        assert!((r.compute - 30.16).abs() < 1e-10);
        assert!((r.read - 4890.0).abs() < 1e-10);
    }

    #[test]
    fn test_catalog_pool() {
        let pool = catalog_pool(2);
        assert_eq!(pool.len(), 14);
        assert_eq!(pool[0].id, 1);
        assert_eq!(pool[13].id, 14);
        assert_eq!(pool[7].name, "CPU-E2-MICRO");
        let gpus = pool.iter().filter(|r| r.hardware == HardwareClass::Gpu).count();
        assert_eq!(gpus, 6);
        assert!(catalog_pool(0).is_empty());
    }
}
