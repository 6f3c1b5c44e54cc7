//! Interval resampling of day series.
//!
//! Converts discrete, possibly irregularly spaced samples into a
//! representative price or an integrated energy quantity for any half-open
//! `(last, now]` interval on the wrapping 1440-minute clock.

use crate::data::series::{MINUTES_PER_DAY, Series, TimePoint};
use crate::error::SimError;

/// Resamples one physical quantity over arbitrary sub-intervals of a day.
///
/// One resampler exists per quantity: prices are averaged over an interval,
/// power series are integrated into kWh. All methods are read-only and
/// deterministic, so a rejected validation attempt can be retried against
/// the same instance without observing different data.
#[derive(Debug, Clone, Copy)]
pub struct Resampler<'a> {
    series: &'a Series,
    quantity: &'static str,
}

impl<'a> Resampler<'a> {
    /// Wraps a series; `quantity` names it in data-gap errors.
    pub fn new(series: &'a Series, quantity: &'static str) -> Self {
        Self { series, quantity }
    }

    /// Representative price over `(last, now]`.
    ///
    /// Mean of the samples inside the interval; when the interval holds
    /// none, the average of the interpolated values at both endpoints. A
    /// degenerate interval (`now == last`) yields the value at `last`.
    ///
    /// # Errors
    ///
    /// `SimError::DataGap` when the series is empty.
    pub fn average_over(&self, last: TimePoint, now: TimePoint) -> Result<f32, SimError> {
        let (last_m, now_m) = unwrap_interval(last, now);
        self.average_over_minutes(last_m, now_m)
    }

    /// Integrated energy in kWh over `(last, now]` for a power series.
    ///
    /// Mean power of the samples inside the interval (or the endpoint
    /// interpolation average when there are none) multiplied by the
    /// interval duration in hours. A degenerate interval yields 0.
    ///
    /// # Errors
    ///
    /// `SimError::DataGap` when the series is empty.
    pub fn energy_over(&self, last: TimePoint, now: TimePoint) -> Result<f32, SimError> {
        let (last_m, now_m) = unwrap_interval(last, now);
        self.energy_over_minutes(last_m, now_m)
    }

    /// [`Self::average_over`] on an already-unwrapped minute axis.
    ///
    /// `now_m` may exceed 1440 for intervals crossing midnight;
    /// `last_m` must be below 1440.
    pub fn average_over_minutes(&self, last_m: u32, now_m: u32) -> Result<f32, SimError> {
        if now_m == last_m {
            return self.value_at(last_m);
        }
        let matched = self.samples_in(last_m, now_m);
        if matched.is_empty() {
            self.endpoint_average(last_m, now_m)
        } else {
            Ok(matched.iter().sum::<f32>() / matched.len() as f32)
        }
    }

    /// [`Self::energy_over`] on an already-unwrapped minute axis.
    pub fn energy_over_minutes(&self, last_m: u32, now_m: u32) -> Result<f32, SimError> {
        if now_m == last_m {
            return Ok(0.0);
        }
        // Duration uses the unwrapped difference; only sample selection
        // wraps around the day boundary.
        let duration_hours = (now_m - last_m) as f32 / 60.0;
        let matched = self.samples_in(last_m, now_m);
        let power = if matched.is_empty() {
            self.endpoint_average(last_m, now_m)?
        } else {
            matched.iter().sum::<f32>() / matched.len() as f32
        };
        Ok(power * duration_hours)
    }

    /// Sample values with total-minutes inside the unwrapped
    /// `(last_m, now_m]`.
    ///
    /// A span reaching past minute 1440 is split into the masks
    /// `(last_m, 1440]` and `(0, now_m - 1440]`, concatenated in that
    /// order.
    fn samples_in(&self, last_m: u32, now_m: u32) -> Vec<f32> {
        let mut matched = Vec::new();
        if now_m <= MINUTES_PER_DAY {
            for &(m, v) in self.series.points() {
                if m > last_m && m <= now_m {
                    matched.push(v);
                }
            }
        } else {
            for &(m, v) in self.series.points() {
                if m > last_m {
                    matched.push(v);
                }
            }
            let remainder = now_m - MINUTES_PER_DAY;
            for &(m, v) in self.series.points() {
                if m > 0 && m <= remainder {
                    matched.push(v);
                }
            }
        }
        matched
    }

    /// Average of the interpolated values at both interval endpoints.
    fn endpoint_average(&self, last_m: u32, now_m: u32) -> Result<f32, SimError> {
        let start = self.value_at(last_m)?;
        let end = self.value_at(now_m)?;
        Ok((start + end) / 2.0)
    }

    fn value_at(&self, minute: u32) -> Result<f32, SimError> {
        self.series
            .interpolate_at(minute % MINUTES_PER_DAY)
            .ok_or(SimError::DataGap {
                quantity: self.quantity,
                from: TimePoint::from_total_minutes(minute),
                to: TimePoint::from_total_minutes(minute),
            })
    }
}

/// Unwraps `(last, now]` onto a monotonic minute axis.
///
/// A `now` strictly before `last` crosses midnight and gains a day;
/// equality passes through so the degenerate zero-length interval stays
/// degenerate.
fn unwrap_interval(last: TimePoint, now: TimePoint) -> (u32, u32) {
    let last_m = last.total_minutes();
    let mut now_m = now.total_minutes();
    if now_m < last_m {
        now_m += MINUTES_PER_DAY;
    }
    (last_m, now_m)
}
