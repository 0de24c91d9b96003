//! Fixed-timestep accumulator.
//!
//! Frame callbacks arrive at whatever rate the host manages. Each call to
//! [`FixedStepClock::advance`] adds the (capped) wall time since the previous
//! frame to an accumulator and reports how many whole simulation steps are
//! due. Whatever is left over becomes the render interpolation fraction.

use tracing::trace;

#[derive(Debug, Clone, PartialEq)]
pub struct FixedStepClock {
    step_duration_ms: f64,
    max_frame_delta_ms: f64,
    elapsed_ms: f64,
    last_timestamp: Option<f64>,
}

impl FixedStepClock {
    pub fn new(step_duration_ms: u32, max_frame_delta_ms: f64) -> Self {
        Self {
            step_duration_ms: f64::from(step_duration_ms.max(1)),
            max_frame_delta_ms,
            elapsed_ms: 0.0,
            last_timestamp: None,
        }
    }

    /// Feed a frame timestamp; returns the number of steps now due.
    ///
    /// The first frame after construction or [`reset`](Self::reset) only
    /// records its timestamp.
    pub fn advance(&mut self, now_ms: f64) -> u32 {
        let last = *self.last_timestamp.get_or_insert(now_ms);
        let raw = (now_ms - last).max(0.0);
        let delta = raw.min(self.max_frame_delta_ms);
        if raw > delta {
            trace!(raw_ms = raw, capped_ms = delta, "frame delta capped");
        }
        self.last_timestamp = Some(now_ms);
        self.elapsed_ms += delta;

        let mut due = 0;
        while self.elapsed_ms >= self.step_duration_ms {
            self.elapsed_ms -= self.step_duration_ms;
            due += 1;
        }
        due
    }

    /// Fraction of the way from the last step to the next, in `[0, 1]`
    pub fn alpha(&self) -> f64 {
        (self.elapsed_ms / self.step_duration_ms).min(1.0)
    }

    /// Takes effect on the next comparison; accumulated time is kept.
    pub fn set_step_duration(&mut self, step_duration_ms: u32) {
        self.step_duration_ms = f64::from(step_duration_ms.max(1));
    }

    pub fn step_duration_ms(&self) -> f64 {
        self.step_duration_ms
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Drop accumulated time but keep the frame timestamp
    pub fn reset_accumulator(&mut self) {
        self.elapsed_ms = 0.0;
    }

    /// Forget everything, as if freshly created
    pub fn reset(&mut self) {
        self.elapsed_ms = 0.0;
        self.last_timestamp = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_only_records_timestamp() {
        let mut clock = FixedStepClock::new(95, 40.0);
        assert_eq!(clock.advance(5_000.0), 0);
        assert_eq!(clock.elapsed_ms(), 0.0);
        assert_eq!(clock.alpha(), 0.0);
    }

    #[test]
    fn test_steps_fire_on_accumulated_time() {
        let mut clock = FixedStepClock::new(100, 40.0);
        clock.advance(0.0);

        let mut total = 0;
        let mut now = 0.0;
        for _ in 0..10 {
            now += 30.0;
            total += clock.advance(now);
        }
        // 300ms of frames at 100ms per step
        assert_eq!(total, 3);
        assert!(clock.elapsed_ms() < 1e-9);
    }

    #[test]
    fn test_large_gap_is_capped() {
        let mut clock = FixedStepClock::new(70, 40.0);
        clock.advance(0.0);

        // tab was in the background for ten seconds
        assert_eq!(clock.advance(10_000.0), 0);
        assert_eq!(clock.elapsed_ms(), 40.0);
        assert_eq!(clock.advance(10_040.0), 1);
        assert!((clock.elapsed_ms() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_alpha_tracks_leftover() {
        let mut clock = FixedStepClock::new(100, 40.0);
        clock.advance(0.0);
        clock.advance(25.0);
        assert!((clock.alpha() - 0.25).abs() < 1e-9);
        clock.advance(50.0);
        assert!((clock.alpha() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_step_duration_change_keeps_accumulation() {
        let mut clock = FixedStepClock::new(130, 40.0);
        clock.advance(0.0);
        clock.advance(40.0);
        clock.advance(80.0);
        assert_eq!(clock.elapsed_ms(), 80.0);

        clock.set_step_duration(70);
        // 80 + 30 = 110 -> one 70ms step, 40 left over
        assert_eq!(clock.advance(110.0), 1);
        assert!((clock.elapsed_ms() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_alpha_clamped_when_duration_shrinks() {
        let mut clock = FixedStepClock::new(130, 40.0);
        clock.advance(0.0);
        clock.advance(40.0);
        clock.advance(80.0);
        clock.set_step_duration(70);
        assert_eq!(clock.alpha(), 1.0);
    }

    #[test]
    fn test_reset_accumulator_and_reset() {
        let mut clock = FixedStepClock::new(100, 40.0);
        clock.advance(0.0);
        clock.advance(30.0);
        clock.reset_accumulator();
        assert_eq!(clock.elapsed_ms(), 0.0);
        assert_eq!(clock.advance(60.0), 0);
        assert_eq!(clock.elapsed_ms(), 30.0);

        clock.reset();
        assert_eq!(clock.advance(1_000.0), 0);
        assert_eq!(clock.elapsed_ms(), 0.0);
    }
}
