//! Session lifecycle for a single liveness check.

use crate::gate::MovementGate;
use crate::geometry::Point;
use crate::snapshot::Snapshot;

/// Lifecycle phase of a liveness session.
///
/// `Idle → Capturing → Tracking → Completed`; `Completed` is terminal for a
/// session instance. The operator may discard the result and restart, which
/// constructs a fresh session via [`Session::reset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No camera stream yet.
    #[default]
    Idle,
    /// Camera live, baseline not yet observed.
    Capturing,
    /// Baseline set, progress advancing.
    Tracking,
    /// Image captured.
    Completed,
}

/// Owned state of one liveness check: phase, gate, and captured image.
///
/// All mutation goes through the session controller and the gate — no shared
/// ambient state.
#[derive(Debug, Default)]
pub struct Session {
    phase: SessionPhase,
    gate: MovementGate,
    captured: Option<Snapshot>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn progress(&self) -> f32 {
        self.gate.progress()
    }

    pub fn baseline(&self) -> Option<Point> {
        self.gate.baseline()
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.captured.as_ref()
    }

    pub fn is_completed(&self) -> bool {
        self.phase == SessionPhase::Completed
    }

    /// Mark the camera live. Only meaningful from `Idle`.
    pub fn start(&mut self) {
        if self.phase == SessionPhase::Idle {
            self.phase = SessionPhase::Capturing;
        }
    }

    /// Feed one nose observation through the gate. The first observation
    /// moves the session from `Capturing` to `Tracking`. Returns progress
    /// after the observation.
    pub fn observe_nose(&mut self, nose: Point) -> f32 {
        let progress = self.gate.update(nose);
        if self.phase == SessionPhase::Capturing && self.gate.baseline().is_some() {
            self.phase = SessionPhase::Tracking;
        }
        progress
    }

    /// Whether the gate has saturated and no image has been captured yet.
    /// The controller checks this before invoking the snapshot emitter, so
    /// capture runs at most once even though saturation re-fires every tick.
    pub fn ready_for_capture(&self) -> bool {
        self.gate.is_saturated() && self.phase != SessionPhase::Completed
    }

    /// Record the captured image and make `Completed` permanent. Returns
    /// false (and keeps the original image) if the session was already
    /// completed.
    pub fn complete(&mut self, snapshot: Snapshot) -> bool {
        if self.phase == SessionPhase::Completed {
            return false;
        }
        self.captured = Some(snapshot);
        self.phase = SessionPhase::Completed;
        true
    }

    /// Full reset: baseline, progress, captured image, phase.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_snapshot() -> Snapshot {
        Snapshot {
            png: vec![0x89],
            width: 1,
            height: 1,
        }
    }

    #[test]
    fn phases_advance_idle_capturing_tracking_completed() {
        let mut session = Session::new();
        assert_eq!(session.phase(), SessionPhase::Idle);

        session.start();
        assert_eq!(session.phase(), SessionPhase::Capturing);

        session.observe_nose(Point::new(100.0, 100.0));
        assert_eq!(session.phase(), SessionPhase::Tracking);

        session.observe_nose(Point::new(150.0, 150.0));
        assert!(session.ready_for_capture());

        assert!(session.complete(dummy_snapshot()));
        assert_eq!(session.phase(), SessionPhase::Completed);
    }

    #[test]
    fn start_is_only_meaningful_from_idle() {
        let mut session = Session::new();
        session.start();
        session.observe_nose(Point::new(100.0, 100.0));
        session.start();
        assert_eq!(session.phase(), SessionPhase::Tracking);
    }

    #[test]
    fn complete_is_rejected_after_completion() {
        let mut session = Session::new();
        session.start();
        session.observe_nose(Point::new(100.0, 100.0));
        session.observe_nose(Point::new(200.0, 200.0));

        assert!(session.complete(dummy_snapshot()));
        let replacement = Snapshot {
            png: vec![0xFF],
            width: 2,
            height: 2,
        };
        assert!(!session.complete(replacement));
        // Original image kept.
        assert_eq!(session.snapshot().unwrap().png, vec![0x89]);
    }

    #[test]
    fn ready_for_capture_stops_firing_once_completed() {
        let mut session = Session::new();
        session.start();
        session.observe_nose(Point::new(0.0, 0.0));
        session.observe_nose(Point::new(100.0, 100.0));
        assert!(session.ready_for_capture());

        session.complete(dummy_snapshot());
        // Gate is still saturated, but the completed phase debounces capture.
        session.observe_nose(Point::new(100.0, 100.0));
        assert!(!session.ready_for_capture());
    }

    #[test]
    fn reset_constructs_a_fresh_session() {
        let mut session = Session::new();
        session.start();
        session.observe_nose(Point::new(100.0, 100.0));
        session.observe_nose(Point::new(200.0, 200.0));
        session.complete(dummy_snapshot());

        session.reset();
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.progress(), 0.0);
        assert!(session.baseline().is_none());
        assert!(session.snapshot().is_none());
    }
}
