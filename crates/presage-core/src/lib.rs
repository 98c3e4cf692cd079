//! presage-core — movement-based liveness session engine.
//!
//! A liveness check asks the user to perform a small physical action (move
//! their head) to reduce the chance the camera is looking at a static photo.
//! The engine polls an external face-landmark detector on a fixed cadence,
//! measures nose displacement against the first observed position, maps it
//! onto a 0–100 progress value, and captures a still PNG frame exactly once
//! when progress saturates.
//!
//! Camera access, landmark inference, and display are external collaborators
//! behind the [`CameraProvider`], [`LandmarkDetector`], and [`DrawSurface`]
//! traits; this crate owns only the orchestration and the gate arithmetic.

pub mod camera;
pub mod controller;
pub mod detector;
pub mod gate;
pub mod geometry;
pub mod ring;
pub mod session;
pub mod snapshot;
pub mod surface;

pub use camera::{CameraError, CameraProvider, Frame, StreamConstraints, VideoStream};
pub use controller::{ControllerError, SessionController, SessionOutcome, TICK_INTERVAL};
pub use detector::{DetectionError, Face, LandmarkDetector, ModelLoadError};
pub use gate::{MovementGate, MOVEMENT_THRESHOLD, PROGRESS_COMPLETE};
pub use geometry::Point;
pub use ring::ProgressRing;
pub use session::{Session, SessionPhase};
pub use snapshot::{Snapshot, SnapshotEmitter, SnapshotError};
pub use surface::{DrawSurface, EncodingError, ImageFormat, PixmapSurface};
