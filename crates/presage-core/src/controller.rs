//! Session controller: camera lifecycle, detector readiness, and the
//! detection tick loop.
//!
//! One repeating timer drives detection; there are no worker threads. The
//! interval skips missed ticks, so a detection call that overruns the cadence
//! simply delays the next tick — ticks never overlap the gate state.

use std::path::Path;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::camera::{CameraError, CameraProvider, StreamConstraints, VideoStream};
use crate::detector::{LandmarkDetector, ModelLoadError};
use crate::session::Session;
use crate::snapshot::{Snapshot, SnapshotEmitter};
use crate::surface::DrawSurface;

/// Fixed cadence of detection ticks.
pub const TICK_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("camera error: {0}")]
    Camera(#[from] CameraError),
    #[error("model load error: {0}")]
    Model(#[from] ModelLoadError),
    #[error("session has no live camera stream")]
    NotStarted,
    #[error("landmark models were never loaded")]
    DetectorUnavailable,
}

/// Summary of a finished run loop.
#[derive(Debug)]
pub struct SessionOutcome {
    pub completed: bool,
    pub progress: f32,
    pub ticks: u64,
    pub snapshot: Option<Snapshot>,
}

/// Owns the camera stream, the external detector, and the session state, and
/// routes each tick's detection result into the movement gate.
pub struct SessionController<C, D, S>
where
    C: CameraProvider,
    D: LandmarkDetector,
    S: DrawSurface,
{
    camera: C,
    detector: D,
    surface: S,
    session: Session,
    stream: Option<C::Stream>,
    detector_ready: bool,
    tick_interval: Duration,
}

impl<C, D, S> SessionController<C, D, S>
where
    C: CameraProvider,
    D: LandmarkDetector,
    S: DrawSurface,
{
    pub fn new(camera: C, detector: D, surface: S) -> Self {
        Self {
            camera,
            detector,
            surface,
            session: Session::new(),
            stream: None,
            detector_ready: false,
            tick_interval: TICK_INTERVAL,
        }
    }

    /// Override the tick cadence (replay and tests).
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Request a 640×480 stream from the camera provider.
    ///
    /// On failure the error is logged, the session stays `Idle`, and no
    /// timer will start. There is no automatic retry.
    pub fn start(&mut self) -> Result<(), ControllerError> {
        let constraints = StreamConstraints::default();
        match self.camera.request_stream(constraints) {
            Ok(stream) => {
                let (width, height) = stream.resolution();
                tracing::info!(width, height, "camera stream acquired");
                self.stream = Some(stream);
                self.session.start();
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "camera acquisition failed; session stays idle");
                Err(e.into())
            }
        }
    }

    /// Load the face locator and landmark models.
    ///
    /// On failure the error is logged and detection stays permanently
    /// unavailable for this session — no retry, no fallback.
    pub fn load_detector(&mut self, resource_base: &Path) -> Result<(), ControllerError> {
        match self.detector.load_models(resource_base) {
            Ok(()) => {
                tracing::info!(resource_base = %resource_base.display(), "landmark models loaded");
                self.detector_ready = true;
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "model load failed; detection unavailable for this session");
                Err(e.into())
            }
        }
    }

    /// Drive detection ticks until the session completes or `shutdown`
    /// flips to true. The stream is always released on the way out.
    pub async fn run(
        &mut self,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<SessionOutcome, ControllerError> {
        if self.stream.is_none() {
            return Err(ControllerError::NotStarted);
        }
        if !self.detector_ready {
            self.teardown();
            return Err(ControllerError::DetectorUnavailable);
        }

        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut ticks = 0u64;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    ticks += 1;
                    self.tick();
                    if self.session.is_completed() {
                        break;
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!(ticks, "shutdown requested; stopping session");
                        break;
                    }
                }
            }
        }

        self.teardown();

        Ok(SessionOutcome {
            completed: self.session.is_completed(),
            progress: self.session.progress(),
            ticks,
            snapshot: self.session.snapshot().cloned(),
        })
    }

    /// One detection tick: grab a frame, ask the detector, feed the first
    /// face's nose into the gate, and capture once on saturation.
    ///
    /// Per-tick failures are transient — they are logged and the tick
    /// becomes a no-op. Zero faces is "no data this cycle": baseline and
    /// progress are left untouched.
    fn tick(&mut self) {
        let Some(stream) = self.stream.as_mut() else {
            // Torn down while a tick was pending — safely ignorable.
            return;
        };

        let frame = match stream.frame() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(error = %e, "frame grab failed; skipping tick");
                return;
            }
        };

        let faces = match self.detector.detect(&frame) {
            Ok(faces) => faces,
            Err(e) => {
                tracing::warn!(error = %e, "detection failed this tick");
                return;
            }
        };

        let Some(face) = faces.first() else {
            tracing::debug!("no face this tick");
            return;
        };

        let progress = self.session.observe_nose(face.nose);
        tracing::debug!(progress, confidence = face.confidence, "nose observed");

        if self.session.ready_for_capture() {
            match SnapshotEmitter::capture(stream, &mut self.surface) {
                Ok(snapshot) => {
                    tracing::info!(bytes = snapshot.png.len(), "liveness confirmed; frame captured");
                    self.session.complete(snapshot);
                }
                Err(e) => {
                    // Session stays uncompleted; the next saturated tick
                    // retries the capture.
                    tracing::error!(error = %e, "snapshot capture failed");
                }
            }
        }
    }

    /// Discard the result and construct a fresh session. The stream must be
    /// re-acquired with [`start`](Self::start).
    pub fn reset(&mut self) {
        self.teardown();
        self.session.reset();
    }

    fn teardown(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            tracing::debug!("camera stream released");
        }
    }
}

impl<C, D, S> Drop for SessionController<C, D, S>
where
    C: CameraProvider,
    D: LandmarkDetector,
    S: DrawSurface,
{
    fn drop(&mut self) {
        self.teardown();
    }
}
