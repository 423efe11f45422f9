//! Standard-resource calibration.
//!
//! Each hardware class gets a synthetic "standard" resource that sits
//! between the slowest and fastest members of the class, weighted by how
//! heterogeneous the class is. Finish-time analysis runs against it.
//!
//! # Formula
//!
//! For each metric k in (compute, read, write, rate) over the m members of
//! a class:
//!
//! ```text
//! term_k = sqrt(Σ (x_k − mean_k)²) / (m · max_k)      (0 when max_k ≤ 0)
//! phi    = Σ w_k · term_k
//! std_k  = phi · min_k + (1 − phi) · max_k
//! ```
//!
//! # Reference
//! Zhou et al. (2021), "Cost-efficient task scheduling for workflows on
//! heterogeneous IaaS clouds with deadline constraints"

use serde::{Deserialize, Serialize};

use crate::cost::Throughput;
use crate::models::{HardwareClass, Resource};

/// Weights of the heterogeneity factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationWeights {
    pub compute: f64,
    pub read: f64,
    pub write: f64,
    pub rate: f64,
}

impl Default for CalibrationWeights {
    fn default() -> Self {
        Self {
            compute: 0.4,
            read: 0.25,
            write: 0.25,
            rate: 0.1,
        }
    }
}

/// Synthetic calibration resource of one hardware class.
///
/// Never part of the pool; only used to estimate durations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StandardResource {
    pub hardware: HardwareClass,
    /// Heterogeneity factor of the class.
    pub phi: f64,
    pub compute: f64,
    pub read: f64,
    pub write: f64,
    pub rate: f64,
}

impl Throughput for StandardResource {
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

fn dispersion(values: &[f64]) -> f64 {
    let m = values.len() as f64;
    let mean = values.iter().sum::<f64>() / m;
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max <= 0.0 {
        return 0.0;
    }
    let squares: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    squares.sqrt() / (m * max)
}

fn blend(phi: f64, values: &[f64]) -> f64 {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    phi * min + (1.0 - phi) * max
}

/// Heterogeneity factor of `members`; 0 for an empty class.
pub fn heterogeneity(members: &[&Resource], weights: &CalibrationWeights) -> f64 {
    if members.is_empty() {
        return 0.0;
    }
    let metric = |f: fn(&Resource) -> f64| members.iter().map(|r| f(r)).collect::<Vec<_>>();
    weights.compute * dispersion(&metric(|r| r.compute))
        + weights.read * dispersion(&metric(|r| r.read))
        + weights.write * dispersion(&metric(|r| r.write))
        + weights.rate * dispersion(&metric(|r| r.cost))
}

impl StandardResource {
    /// Calibrates the standard resource of `hardware` from the pool.
    ///
    /// A class with no members yields all-zero metrics.
    pub fn calibrate(
        hardware: HardwareClass,
        resources: &[Resource],
        weights: &CalibrationWeights,
    ) -> Self {
        let members: Vec<&Resource> = resources.iter().filter(|r| r.matches(hardware)).collect();
        if members.is_empty() {
            return Self {
                hardware,
                phi: 0.0,
                compute: 0.0,
                read: 0.0,
                write: 0.0,
                rate: 0.0,
            };
        }

        let phi = heterogeneity(&members, weights);
        let metric = |f: fn(&Resource) -> f64| members.iter().map(|r| f(r)).collect::<Vec<_>>();
        Self {
            hardware,
            phi,
            compute: blend(phi, &metric(|r| r.compute)),
            read: blend(phi, &metric(|r| r.read)),
            write: blend(phi, &metric(|r| r.write)),
            rate: blend(phi, &metric(|r| r.cost)),
        }
    }
}

/// Standard resources of every hardware class.
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    cpu: StandardResource,
    gpu: StandardResource,
}

impl Calibration {
    /// Calibrates every hardware class against the pool.
    pub fn new(resources: &[Resource], weights: &CalibrationWeights) -> Self {
        Self {
            cpu: StandardResource::calibrate(HardwareClass::Cpu, resources, weights),
            gpu: StandardResource::calibrate(HardwareClass::Gpu, resources, weights),
        }
    }

    /// Standard resource of `hardware`.
    pub fn standard(&self, hardware: HardwareClass) -> &StandardResource {
        match hardware {
            HardwareClass::Cpu => &self.cpu,
            HardwareClass::Gpu => &self.gpu,
        }
    }
}
