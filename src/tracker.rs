use crate::duration::FlightDuration;
use crate::timepoint::TimePoint;
use chrono::{DateTime, FixedOffset};
use std::fmt;

/// Where a flight stands relative to wall-clock time. Derived on every
/// evaluation, never stored; the caller owns the clock and must feed
/// non-decreasing `now` values across a tracking session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    Scheduled,
    EnRoute,
    Landed,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Progress::Scheduled => write!(f, "scheduled"),
            Progress::EnRoute => write!(f, "en route"),
            Progress::Landed => write!(f, "landed"),
        }
    }
}

/// Estimated current aircraft position, or `Unavailable` when either
/// airport lacks coordinates or the scheduled duration is not positive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Projection {
    Unavailable,
    Position {
        latitude: f64,
        longitude: f64,
        state: Progress,
    },
}

/// Fraction of the flight elapsed at `now`, clamped to `[0, 1]`.
/// Monotonically non-decreasing in `now` for a fixed departure/duration.
pub fn fraction_elapsed(
    departure: DateTime<FixedOffset>,
    duration_minutes: i64,
    now: DateTime<FixedOffset>,
) -> f64 {
    if duration_minutes <= 0 {
        return 0.0;
    }
    let elapsed = (now - departure).num_seconds() as f64 / 60.0;
    (elapsed / duration_minutes as f64).clamp(0.0, 1.0)
}

/// Linear interpolation in geographic-coordinate space. An approximation,
/// not a great circle: accurate for short-to-medium segments and symmetric
/// near the midpoint.
pub fn interpolate(origin: (f64, f64), destination: (f64, f64), t: f64) -> (f64, f64) {
    (
        origin.0 + (destination.0 - origin.0) * t,
        origin.1 + (destination.1 - origin.1) * t,
    )
}

pub fn project_position(
    departure: &TimePoint,
    duration: &FlightDuration,
    origin: Option<(f64, f64)>,
    destination: Option<(f64, f64)>,
    now: DateTime<FixedOffset>,
) -> Projection {
    let (Some(origin), Some(destination)) = (origin, destination) else {
        return Projection::Unavailable;
    };
    if duration.minutes <= 0 {
        return Projection::Unavailable;
    }
    let fraction = fraction_elapsed(departure.instant, duration.minutes, now);
    let state = if fraction >= 1.0 {
        Progress::Landed
    } else if fraction > 0.0 || now >= departure.instant {
        // The exact instant of departure reads as en-route, not scheduled.
        Progress::EnRoute
    } else {
        Progress::Scheduled
    };
    let (latitude, longitude) = interpolate(origin, destination, fraction);
    Projection::Position {
        latitude,
        longitude,
        state,
    }
}
