//! Billing-period arithmetic.
//!
//! Resources are rented in fixed periods of length `tau`. Period `k` covers
//! `[k·tau, (k+1)·tau)`. An interval `[start, end)` touches periods
//! `floor(start/tau) .. ceil(end/tau)`; partial use of a period is billed as
//! a full period.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};

/// Length of one billing period, guaranteed positive and finite.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct BillingPeriod(f64);

impl BillingPeriod {
    /// One hour, in seconds.
    pub const HOUR: BillingPeriod = BillingPeriod(3600.0);

    /// Creates a billing period, rejecting zero, negative, and non-finite lengths.
    pub fn new(length: f64) -> Result<Self> {
        if length.is_finite() && length > 0.0 {
            Ok(Self(length))
        } else {
            Err(ScheduleError::InvalidBillingPeriod(length))
        }
    }

    /// Period length.
    #[inline]
    pub fn length(self) -> f64 {
        self.0
    }

    /// Indices of the periods touched by `[start, end)`.
    ///
    /// Empty when `end <= start` lands inside a single boundary, and when
    /// either bound is not finite.
    pub fn periods(self, start: f64, end: f64) -> Range<i64> {
        if !(start.is_finite() && end.is_finite()) {
            return 0..0;
        }
        let first = (start / self.0).floor() as i64;
        let last = (end / self.0).ceil() as i64;
        first..last.max(first)
    }

    /// First period boundary at or after `time`.
    #[inline]
    pub fn boundary_at_or_after(self, time: f64) -> f64 {
        (time / self.0).ceil() * self.0
    }
}

impl TryFrom<f64> for BillingPeriod {
    type Error = ScheduleError;

    fn try_from(length: f64) -> Result<Self> {
        Self::new(length)
    }
}

impl From<BillingPeriod> for f64 {
    fn from(period: BillingPeriod) -> f64 {
        period.0
    }
}
