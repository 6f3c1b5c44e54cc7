//! Minute-of-day time keeping and raw sample series.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Number of minutes in one simulated day.
pub const MINUTES_PER_DAY: u32 = 1440;

/// A clock reading on the wrapping 24-hour day.
///
/// Arithmetic wraps modulo 1440 minutes: advancing past 23:59 lands back
/// at 00:00. There is no day counter; a simulation spans exactly one
/// wrapped day.
///
/// # Examples
///
/// ```
/// use hems_sim::data::series::TimePoint;
///
/// let t = TimePoint::new(23, 45);
/// assert_eq!(t.advance(30), TimePoint::new(0, 15));
/// assert_eq!(t.to_string(), "23:45");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimePoint {
    hour: u8,
    minute: u8,
}

impl TimePoint {
    /// The start of the simulated day.
    pub const MIDNIGHT: Self = Self { hour: 0, minute: 0 };

    /// Creates a time point.
    ///
    /// # Panics
    ///
    /// Panics if `hour > 23` or `minute > 59`.
    pub fn new(hour: u8, minute: u8) -> Self {
        assert!(hour < 24, "hour must be < 24");
        assert!(minute < 60, "minute must be < 60");
        Self { hour, minute }
    }

    /// Builds a time point from total minutes, wrapping modulo one day.
    pub fn from_total_minutes(minutes: u32) -> Self {
        let m = minutes % MINUTES_PER_DAY;
        Self {
            hour: (m / 60) as u8,
            minute: (m % 60) as u8,
        }
    }

    /// Hour component, `0..=23`.
    pub fn hour(self) -> u8 {
        self.hour
    }

    /// Minute component, `0..=59`.
    pub fn minute(self) -> u8 {
        self.minute
    }

    /// Total minutes since midnight, in `[0, 1439]`.
    pub fn total_minutes(self) -> u32 {
        u32::from(self.hour) * 60 + u32::from(self.minute)
    }

    /// Advances by `minutes`, wrapping past midnight.
    pub fn advance(self, minutes: u32) -> Self {
        Self::from_total_minutes(self.total_minutes() + minutes)
    }
}

impl fmt::Display for TimePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Error returned when an `HH:MM` timestamp cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid timestamp \"{0}\", expected HH:MM")]
pub struct ParseTimeError(pub String);

impl FromStr for TimePoint {
    type Err = ParseTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseTimeError(s.to_string());
        let (h, m) = s.trim().split_once(':').ok_or_else(err)?;
        let hour: u8 = h.trim().parse().map_err(|_| err())?;
        let minute: u8 = m.trim().parse().map_err(|_| err())?;
        if hour > 23 || minute > 59 {
            return Err(err());
        }
        Ok(Self { hour, minute })
    }
}

/// An ordered day series of `(total-minutes, value)` samples.
///
/// Samples are sorted by minute and unique; a series need not cover the
/// whole day. Series are owned by the dataset that resolved them and are
/// read-only for the duration of a simulation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    points: Vec<(u32, f32)>,
}

impl Series {
    /// Builds a series from `(total-minutes, value)` pairs.
    ///
    /// Minutes are wrapped into `[0, 1439]` and sorted; when the same
    /// minute appears more than once the last pair wins.
    pub fn new(points: Vec<(u32, f32)>) -> Self {
        let mut points: Vec<(u32, f32)> = points
            .into_iter()
            .map(|(m, v)| (m % MINUTES_PER_DAY, v))
            .collect();
        points.sort_by_key(|&(m, _)| m);
        // Stable sort keeps insertion order within a minute; keep the last.
        points.reverse();
        points.dedup_by_key(|&mut (m, _)| m);
        points.reverse();
        Self { points }
    }

    /// Builds a series from `(TimePoint, value)` pairs.
    pub fn from_time_values(pairs: impl IntoIterator<Item = (TimePoint, f32)>) -> Self {
        Self::new(
            pairs
                .into_iter()
                .map(|(t, v)| (t.total_minutes(), v))
                .collect(),
        )
    }

    /// Returns `true` when the series holds no samples.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// The sorted `(total-minutes, value)` samples.
    pub fn points(&self) -> &[(u32, f32)] {
        &self.points
    }

    /// Linearly interpolated value at `minute`, clamped to the nearest
    /// sample outside the covered range. `None` for an empty series.
    pub fn interpolate_at(&self, minute: u32) -> Option<f32> {
        let first = self.points.first()?;
        let last = self.points.last()?;
        if minute <= first.0 {
            return Some(first.1);
        }
        if minute >= last.0 {
            return Some(last.1);
        }
        let idx = self.points.partition_point(|&(m, _)| m < minute);
        let (m2, v2) = self.points[idx];
        if m2 == minute {
            return Some(v2);
        }
        let (m1, v1) = self.points[idx - 1];
        let frac = (minute - m1) as f32 / (m2 - m1) as f32;
        Some(v1 + frac * (v2 - v1))
    }
}
