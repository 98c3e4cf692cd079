//! `presage replay` — drives a full liveness session from a recorded
//! detection trace.
//!
//! The trace stands in for the external landmark detector: one entry per
//! tick, each carrying zero or more faces. Frames come either from a
//! directory of PNGs (replayed in filename order, last frame repeated) or
//! from a synthetic grey source when no directory is given. This exercises
//! the whole controller path — baseline, gate, saturation, snapshot —
//! without a physical camera.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tokio::sync::watch;

use presage_core::{
    CameraError, CameraProvider, DetectionError, Face, Frame, LandmarkDetector, ModelLoadError,
    PixmapSurface, Point, SessionController, StreamConstraints, VideoStream,
};

/// On-disk trace format: one entry per tick.
///
/// ```json
/// { "ticks": [ { "faces": [ { "confidence": 0.98, "nose": [213.0, 188.5] } ] },
///              { "faces": [] } ] }
/// ```
#[derive(Debug, Deserialize)]
pub struct TraceFile {
    pub ticks: Vec<TraceTick>,
}

#[derive(Debug, Deserialize)]
pub struct TraceTick {
    #[serde(default)]
    pub faces: Vec<TraceFace>,
}

#[derive(Debug, Deserialize)]
pub struct TraceFace {
    #[serde(default = "default_confidence")]
    pub confidence: f32,
    /// `[x, y]` in frame-pixel coordinates.
    pub nose: [f32; 2],
}

fn default_confidence() -> f32 {
    1.0
}

impl TraceFile {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read trace {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse trace {}", path.display()))
    }
}

/// Detector that plays back trace entries instead of running inference.
/// Ticks beyond the end of the trace report zero faces.
pub struct TraceDetector {
    ticks: VecDeque<TraceTick>,
}

impl TraceDetector {
    pub fn new(trace: TraceFile) -> Self {
        Self {
            ticks: trace.ticks.into(),
        }
    }
}

impl LandmarkDetector for TraceDetector {
    fn load_models(&mut self, _resource_base: &Path) -> Result<(), ModelLoadError> {
        // The trace already is the detector output; nothing to load.
        Ok(())
    }

    fn detect(&mut self, _frame: &Frame) -> Result<Vec<Face>, DetectionError> {
        let Some(tick) = self.ticks.pop_front() else {
            return Ok(Vec::new());
        };
        Ok(tick
            .faces
            .into_iter()
            .map(|f| Face {
                confidence: f.confidence,
                nose: Point::new(f.nose[0], f.nose[1]),
            })
            .collect())
    }
}

/// Replay camera: serves PNG frames from a directory in filename order,
/// repeating the last one, or synthetic mid-grey frames when no directory
/// is given.
pub struct ReplayCamera {
    frames_dir: Option<PathBuf>,
}

impl ReplayCamera {
    pub fn new(frames_dir: Option<PathBuf>) -> Self {
        Self { frames_dir }
    }
}

#[derive(Debug)]
pub struct ReplayStream {
    frames: Vec<Frame>,
    cursor: usize,
    width: u32,
    height: u32,
}

impl CameraProvider for ReplayCamera {
    type Stream = ReplayStream;

    fn request_stream(
        &mut self,
        constraints: StreamConstraints,
    ) -> Result<Self::Stream, CameraError> {
        let frames = match &self.frames_dir {
            None => Vec::new(),
            Some(dir) => {
                if !dir.is_dir() {
                    return Err(CameraError::NoDevice);
                }
                let mut paths: Vec<PathBuf> = fs::read_dir(dir)
                    .map_err(|e| CameraError::Unknown(e.to_string()))?
                    .filter_map(|entry| entry.ok().map(|e| e.path()))
                    .filter(|p| p.extension().is_some_and(|ext| ext == "png"))
                    .collect();
                paths.sort();
                let mut frames = Vec::with_capacity(paths.len());
                for path in paths {
                    let img = image::open(&path)
                        .map_err(|e| CameraError::Unknown(format!("{}: {e}", path.display())))?
                        .into_rgb8();
                    frames.push(Frame {
                        width: img.width(),
                        height: img.height(),
                        data: img.into_raw(),
                    });
                }
                frames
            }
        };

        Ok(ReplayStream {
            frames,
            cursor: 0,
            width: constraints.width,
            height: constraints.height,
        })
    }
}

impl VideoStream for ReplayStream {
    fn frame(&mut self) -> Result<Frame, CameraError> {
        if self.frames.is_empty() {
            // Synthetic mid-grey frame at the requested resolution.
            return Ok(Frame {
                data: vec![0x80; (self.width * self.height * 3) as usize],
                width: self.width,
                height: self.height,
            });
        }
        let frame = self.frames[self.cursor].clone();
        if self.cursor + 1 < self.frames.len() {
            self.cursor += 1;
        }
        Ok(frame)
    }

    fn resolution(&self) -> (u32, u32) {
        match self.frames.first() {
            Some(frame) => (frame.width, frame.height),
            None => (self.width, self.height),
        }
    }

    fn stop(&mut self) {
        self.frames.clear();
    }
}

pub struct ReplayArgs {
    pub trace: PathBuf,
    pub frames: Option<PathBuf>,
    pub out: PathBuf,
    pub tick_interval: Duration,
    pub timeout: Duration,
    pub model_dir: PathBuf,
}

/// Run a full session over the trace and write the captured still to
/// `args.out`. Prints a JSON summary to stdout.
pub async fn run(args: ReplayArgs) -> Result<()> {
    let trace = TraceFile::load(&args.trace)?;
    let trace_len = trace.ticks.len();

    let mut controller = SessionController::new(
        ReplayCamera::new(args.frames.clone()),
        TraceDetector::new(trace),
        PixmapSurface::new(),
    )
    .with_tick_interval(args.tick_interval);

    controller.start().context("camera acquisition failed")?;
    controller
        .load_detector(&args.model_dir)
        .context("detector load failed")?;

    // Abandon the session if the trace never saturates the gate.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let timeout = args.timeout;
    tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        let _ = shutdown_tx.send(true);
    });

    let outcome = controller.run(shutdown_rx).await?;

    if let Some(snapshot) = &outcome.snapshot {
        fs::write(&args.out, &snapshot.png)
            .with_context(|| format!("failed to write {}", args.out.display()))?;
        tracing::info!(out = %args.out.display(), bytes = snapshot.png.len(), "captured still written");
    } else {
        tracing::warn!(trace_ticks = trace_len, "session ended without a capture");
    }

    let summary = serde_json::json!({
        "completed": outcome.completed,
        "progress": outcome.progress,
        "ticks": outcome.ticks,
        "output": outcome.snapshot.as_ref().map(|_| args.out.display().to_string()),
    });
    println!("{summary}");

    Ok(())
}
