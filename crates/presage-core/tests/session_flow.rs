//! End-to-end session flow against scripted collaborators.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use presage_core::{
    CameraError, CameraProvider, ControllerError, DetectionError, Face, Frame, LandmarkDetector,
    ModelLoadError, PixmapSurface, Point, SessionController, SessionPhase, StreamConstraints,
    VideoStream,
};
use tokio::sync::watch;

struct ScriptedStream {
    width: u32,
    height: u32,
    stopped: Arc<AtomicBool>,
    frames_served: Arc<AtomicU32>,
}

impl VideoStream for ScriptedStream {
    fn frame(&mut self) -> Result<Frame, CameraError> {
        self.frames_served.fetch_add(1, Ordering::SeqCst);
        Ok(Frame {
            data: vec![0x60; (self.width * self.height * 3) as usize],
            width: self.width,
            height: self.height,
        })
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn stop(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

struct ScriptedCamera {
    fail_with: Option<CameraError>,
    stopped: Arc<AtomicBool>,
    frames_served: Arc<AtomicU32>,
}

impl ScriptedCamera {
    fn working() -> Self {
        Self {
            fail_with: None,
            stopped: Arc::new(AtomicBool::new(false)),
            frames_served: Arc::new(AtomicU32::new(0)),
        }
    }

    fn denied() -> Self {
        Self {
            fail_with: Some(CameraError::PermissionDenied),
            stopped: Arc::new(AtomicBool::new(false)),
            frames_served: Arc::new(AtomicU32::new(0)),
        }
    }
}

impl CameraProvider for ScriptedCamera {
    type Stream = ScriptedStream;

    fn request_stream(
        &mut self,
        constraints: StreamConstraints,
    ) -> Result<Self::Stream, CameraError> {
        if let Some(err) = self.fail_with.take() {
            return Err(err);
        }
        Ok(ScriptedStream {
            width: constraints.width,
            height: constraints.height,
            stopped: Arc::clone(&self.stopped),
            frames_served: Arc::clone(&self.frames_served),
        })
    }
}

/// Detector that plays back a scripted sequence of per-tick results.
/// `None` means a tick with zero faces; once the script runs out it keeps
/// reporting zero faces.
struct ScriptedDetector {
    script: VecDeque<Option<Point>>,
    loaded: bool,
    fail_load: bool,
}

impl ScriptedDetector {
    fn with_noses(noses: Vec<Option<Point>>) -> Self {
        Self {
            script: noses.into(),
            loaded: false,
            fail_load: false,
        }
    }

    fn failing_load() -> Self {
        Self {
            script: VecDeque::new(),
            loaded: false,
            fail_load: true,
        }
    }
}

impl LandmarkDetector for ScriptedDetector {
    fn load_models(&mut self, _resource_base: &Path) -> Result<(), ModelLoadError> {
        if self.fail_load {
            return Err(ModelLoadError::LoadFailure("scripted failure".into()));
        }
        self.loaded = true;
        Ok(())
    }

    fn detect(&mut self, _frame: &Frame) -> Result<Vec<Face>, DetectionError> {
        assert!(self.loaded, "detect called before load_models succeeded");
        match self.script.pop_front().flatten() {
            Some(nose) => Ok(vec![Face {
                confidence: 0.97,
                nose,
            }]),
            None => Ok(Vec::new()),
        }
    }
}

fn fast_controller(
    camera: ScriptedCamera,
    detector: ScriptedDetector,
) -> SessionController<ScriptedCamera, ScriptedDetector, PixmapSurface> {
    SessionController::new(camera, detector, PixmapSurface::new())
        .with_tick_interval(Duration::from_millis(1))
}

#[tokio::test]
async fn session_completes_and_captures_exactly_once() {
    let camera = ScriptedCamera::working();
    let stopped = Arc::clone(&camera.stopped);

    // Tick 1 sets the baseline, tick 2 reaches 36, tick 3 saturates.
    let detector = ScriptedDetector::with_noses(vec![
        Some(Point::new(100.0, 100.0)),
        Some(Point::new(110.0, 108.0)),
        Some(Point::new(150.0, 150.0)),
        Some(Point::new(150.0, 150.0)),
    ]);

    let mut controller = fast_controller(camera, detector);
    controller.start().unwrap();
    controller.load_detector(Path::new("/nonexistent")).unwrap();

    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let outcome = controller.run(shutdown_rx).await.unwrap();

    assert!(outcome.completed);
    assert_eq!(outcome.progress, 100.0);
    assert_eq!(outcome.ticks, 3);

    let snapshot = outcome.snapshot.expect("snapshot present");
    assert_eq!((snapshot.width, snapshot.height), (640, 480));
    assert_eq!(&snapshot.png[..4], &[0x89, b'P', b'N', b'G']);

    assert_eq!(controller.session().phase(), SessionPhase::Completed);
    assert!(stopped.load(Ordering::SeqCst), "stream released on teardown");
}

#[tokio::test]
async fn zero_face_ticks_leave_baseline_and_progress_untouched() {
    let camera = ScriptedCamera::working();
    let detector = ScriptedDetector::with_noses(vec![
        None,
        Some(Point::new(100.0, 100.0)),
        None,
        Some(Point::new(110.0, 108.0)),
        None,
        Some(Point::new(150.0, 150.0)),
    ]);

    let mut controller = fast_controller(camera, detector);
    controller.start().unwrap();
    controller.load_detector(Path::new("/nonexistent")).unwrap();

    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let outcome = controller.run(shutdown_rx).await.unwrap();

    assert!(outcome.completed);
    // Empty ticks count as ticks but advance nothing.
    assert_eq!(outcome.ticks, 6);
    assert_eq!(
        controller.session().baseline(),
        Some(Point::new(100.0, 100.0))
    );
}

#[tokio::test]
async fn permission_denial_leaves_session_idle_with_no_timer() {
    let camera = ScriptedCamera::denied();
    let frames_served = Arc::clone(&camera.frames_served);
    let detector = ScriptedDetector::with_noses(vec![]);

    let mut controller = fast_controller(camera, detector);
    let err = controller.start().unwrap_err();
    assert!(matches!(
        err,
        ControllerError::Camera(CameraError::PermissionDenied)
    ));
    assert_eq!(controller.session().phase(), SessionPhase::Idle);

    // Running without a stream refuses rather than ticking.
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    assert!(matches!(
        controller.run(shutdown_rx).await,
        Err(ControllerError::NotStarted)
    ));
    assert_eq!(frames_served.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn model_load_failure_makes_detection_permanently_unavailable() {
    let camera = ScriptedCamera::working();
    let stopped = Arc::clone(&camera.stopped);
    let detector = ScriptedDetector::failing_load();

    let mut controller = fast_controller(camera, detector);
    controller.start().unwrap();
    assert!(matches!(
        controller.load_detector(Path::new("/nonexistent")),
        Err(ControllerError::Model(_))
    ));

    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    assert!(matches!(
        controller.run(shutdown_rx).await,
        Err(ControllerError::DetectorUnavailable)
    ));
    // The acquired stream is still released.
    assert!(stopped.load(Ordering::SeqCst));
}

#[tokio::test]
async fn shutdown_signal_stops_an_incomplete_session() {
    let camera = ScriptedCamera::working();
    let stopped = Arc::clone(&camera.stopped);
    // Baseline only — the session can never complete.
    let detector = ScriptedDetector::with_noses(vec![Some(Point::new(100.0, 100.0))]);

    let mut controller = fast_controller(camera, detector);
    controller.start().unwrap();
    controller.load_detector(Path::new("/nonexistent")).unwrap();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        let _ = shutdown_tx.send(true);
    });

    let outcome = controller.run(shutdown_rx).await.unwrap();
    assert!(!outcome.completed);
    assert!(outcome.snapshot.is_none());
    assert!(stopped.load(Ordering::SeqCst));
}
