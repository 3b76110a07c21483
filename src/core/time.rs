//! Simulation Time
//!
//! The host loop advances in fixed ticks. Configuration speaks seconds;
//! everything stored or compared internally is in ticks.

use crate::TICK_RATE;

/// Simulation tick counter.
pub type Tick = u64;

/// Tolerance when snapping a seconds value onto a whole tick.
///
/// `f32` seconds like `1.1` land a hair above the exact tick count once
/// widened, which would otherwise round up to an extra tick.
const TICK_SNAP_EPSILON: f64 = 1e-3;

/// Convert seconds to ticks, rounding up.
///
/// A window is never shorter than configured. Non-positive and non-finite
/// inputs map to zero ticks.
pub fn secs_to_ticks(secs: f32) -> Tick {
    if !secs.is_finite() || secs <= 0.0 {
        return 0;
    }
    let raw = secs as f64 * TICK_RATE as f64;
    let nearest = raw.round();
    if (raw - nearest).abs() < TICK_SNAP_EPSILON {
        nearest as Tick
    } else {
        raw.ceil() as Tick
    }
}

/// Convert ticks back to seconds (for logging).
pub fn ticks_to_secs(ticks: Tick) -> f32 {
    ticks as f32 / TICK_RATE as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_seconds() {
        assert_eq!(secs_to_ticks(3.0), 180);
        assert_eq!(secs_to_ticks(8.0), 480);
    }

    #[test]
    fn test_fractional_seconds_snap() {
        assert_eq!(secs_to_ticks(0.5), 30);
        assert_eq!(secs_to_ticks(1.1), 66);
    }

    #[test]
    fn test_rounds_up_between_ticks() {
        // 0.01s = 0.6 ticks
        assert_eq!(secs_to_ticks(0.01), 1);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(secs_to_ticks(0.0), 0);
        assert_eq!(secs_to_ticks(-2.0), 0);
        assert_eq!(secs_to_ticks(f32::NAN), 0);
        assert_eq!(secs_to_ticks(f32::INFINITY), 0);
    }

    #[test]
    fn test_ticks_to_secs() {
        assert_eq!(ticks_to_secs(120), 2.0);
    }
}
