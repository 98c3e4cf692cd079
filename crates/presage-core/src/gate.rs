//! Movement gate: displacement-based liveness progress.
//!
//! A static photograph held in front of the camera produces a nose landmark
//! that never strays from its first observed position. A live subject asked
//! to move their head produces measurable displacement against that fixed
//! baseline. The gate converts a stream of nose positions into a bounded
//! progress signal: per-axis displacement from the baseline is summed,
//! doubled, and clamped at 100, giving a fast-filling but saturating
//! progress bar.
//!
//! The baseline is recorded on the first observation and never re-baselined
//! mid-session. Progress is recomputed from that fixed baseline on every
//! observation, so it can decrease if the subject moves back toward the
//! starting position.
//!
//! # Threat Coverage
//!
//! - **Blocks:** Static photographs, which cannot produce sustained nose
//!   displacement.
//! - **Does not block:** Video replay, masks, or any moving presentation —
//!   this is a UX-grade gate, not a biometric-security-grade one.

use crate::geometry::Point;

/// Raw movement (pixels, pre-clamp) at which movement counts as validated.
/// Compared against the unclamped value, not the stored progress.
pub const MOVEMENT_THRESHOLD: f32 = 20.0;

/// Multiplier applied to the summed per-axis displacement before clamping.
/// Doubling makes small head motions fill the bar quickly.
pub const PROGRESS_SCALE: f32 = 2.0;

/// Progress value at which the gate saturates and capture fires.
pub const PROGRESS_COMPLETE: f32 = 100.0;

/// Converts a stream of nose positions into a bounded 0–100 progress value.
#[derive(Debug, Default)]
pub struct MovementGate {
    baseline: Option<Point>,
    progress: f32,
    movement_validated: bool,
}

impl MovementGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one nose observation.
    ///
    /// The first observation becomes the immutable baseline and leaves
    /// progress at 0. Every later observation recomputes
    /// `min(100, (|dx| + |dy|) * 2)` against that baseline and stores it.
    /// Returns the progress after this observation.
    pub fn update(&mut self, nose: Point) -> f32 {
        let Some(baseline) = self.baseline else {
            self.baseline = Some(nose);
            return self.progress;
        };

        let raw = baseline.manhattan(&nose) * PROGRESS_SCALE;
        if raw >= MOVEMENT_THRESHOLD {
            // Latches: moving back toward the baseline does not un-validate.
            self.movement_validated = true;
        }
        self.progress = raw.min(PROGRESS_COMPLETE);
        self.progress
    }

    /// The first observed nose position, if any observation has been made.
    pub fn baseline(&self) -> Option<Point> {
        self.baseline
    }

    /// Progress after the most recent observation, in `[0, 100]`.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Whether raw movement has reached [`MOVEMENT_THRESHOLD`] at least once.
    pub fn movement_validated(&self) -> bool {
        self.movement_validated
    }

    /// Whether progress has reached [`PROGRESS_COMPLETE`].
    pub fn is_saturated(&self) -> bool {
        self.progress >= PROGRESS_COMPLETE
    }

    /// Clear the baseline, progress, and validation flag. The only way to
    /// re-baseline is a full reset.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_observation_sets_baseline_and_returns_zero() {
        let mut gate = MovementGate::new();
        let p = Point::new(321.5, 198.0);
        assert_eq!(gate.update(p), 0.0);
        assert_eq!(gate.baseline(), Some(p));
        assert!(!gate.movement_validated());
    }

    #[test]
    fn progress_is_doubled_manhattan_displacement() {
        // baseline (100,100), next (110,108): dx=10, dy=8, raw=36
        let mut gate = MovementGate::new();
        gate.update(Point::new(100.0, 100.0));
        assert_eq!(gate.update(Point::new(110.0, 108.0)), 36.0);
    }

    #[test]
    fn progress_clamps_at_one_hundred() {
        // baseline (100,100), next (150,150): raw=200, clamped to 100
        let mut gate = MovementGate::new();
        gate.update(Point::new(100.0, 100.0));
        assert_eq!(gate.update(Point::new(150.0, 150.0)), 100.0);
        assert!(gate.is_saturated());
    }

    #[test]
    fn progress_stays_in_bounds_for_out_of_frame_coordinates() {
        let mut gate = MovementGate::new();
        gate.update(Point::new(-500.0, -500.0));
        for p in [
            Point::new(10_000.0, 10_000.0),
            Point::new(-500.0, -500.0),
            Point::new(0.0, -1.0e9),
        ] {
            let progress = gate.update(p);
            assert!((0.0..=100.0).contains(&progress));
        }
    }

    #[test]
    fn progress_can_decrease_when_returning_toward_baseline() {
        // Recomputed from the fixed baseline each time — deliberately not
        // monotonic.
        let mut gate = MovementGate::new();
        gate.update(Point::new(100.0, 100.0));
        assert_eq!(gate.update(Point::new(130.0, 100.0)), 60.0);
        assert_eq!(gate.update(Point::new(105.0, 100.0)), 10.0);
    }

    #[test]
    fn baseline_never_moves_after_first_observation() {
        let mut gate = MovementGate::new();
        let first = Point::new(100.0, 100.0);
        gate.update(first);
        gate.update(Point::new(200.0, 200.0));
        gate.update(Point::new(300.0, 300.0));
        assert_eq!(gate.baseline(), Some(first));
    }

    #[test]
    fn validation_compares_raw_movement_and_latches() {
        let mut gate = MovementGate::new();
        gate.update(Point::new(100.0, 100.0));

        // raw = 19.0 — just under threshold
        gate.update(Point::new(104.75, 104.75));
        assert!(!gate.movement_validated());

        // raw = 20.0 — exactly at threshold
        gate.update(Point::new(105.0, 105.0));
        assert!(gate.movement_validated());

        // Back toward baseline: progress drops, validation stays latched.
        assert_eq!(gate.update(Point::new(101.0, 100.0)), 2.0);
        assert!(gate.movement_validated());
    }

    #[test]
    fn reset_clears_everything() {
        let mut gate = MovementGate::new();
        gate.update(Point::new(100.0, 100.0));
        gate.update(Point::new(150.0, 150.0));
        gate.reset();
        assert_eq!(gate.baseline(), None);
        assert_eq!(gate.progress(), 0.0);
        assert!(!gate.movement_validated());
        assert!(!gate.is_saturated());
    }
}
