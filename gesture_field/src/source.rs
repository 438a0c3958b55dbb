//! Input boundaries: frame sources and the asynchronous hand detector.
//!
//! The camera and the landmark model are external collaborators, so both
//! sit behind traits.  Frames come from a deterministic synthetic blob or
//! from an image folder played back as a feed.  Hand landmarks come from
//! a [`HandDetector`] running on its own worker thread; the handle tracks
//! the in-flight request explicitly and drops new requests while one is
//! pending (drop-latest-if-busy, never a queue).

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use hand_gesture::{poses, HandLandmarks};
use motion_grid::Frame;

// ════════════════════════════════════════════════════════════════════════════
// FrameSource
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver a frame per tick.  `None` means "not yet
/// ready" and the tick proceeds without motion input.
pub trait FrameSource {
    fn next_frame(&mut self) -> Option<Frame>;
    fn describe(&self) -> String;
}

// ── SyntheticSource ──────────────────────────────────────────────────────────

/// Deterministic stand-in feed: a bright disc orbiting the frame center
/// over a dark background.  Enough pixel change per tick to light up the
/// motion grid.
pub struct SyntheticSource {
    width:  u32,
    height: u32,
    t:      u32,
}

impl SyntheticSource {
    pub fn new(width: u32, height: u32) -> Self {
        SyntheticSource { width, height, t: 0 }
    }
}

impl FrameSource for SyntheticSource {
    fn next_frame(&mut self) -> Option<Frame> {
        let mut frame = Frame::new(self.width, self.height);
        for px in frame.data.chunks_exact_mut(4) {
            px.copy_from_slice(&[8, 10, 16, 255]);
        }

        let a = self.t as f32 * 0.05;
        let cx = self.width as f32 * 0.5 + a.cos() * self.width as f32 * 0.25;
        let cy = self.height as f32 * 0.5 + a.sin() * self.height as f32 * 0.25;
        let r = self.height as f32 / 8.0;

        let x0 = (cx - r).max(0.0) as u32;
        let x1 = ((cx + r) as u32).min(self.width.saturating_sub(1));
        let y0 = (cy - r).max(0.0) as u32;
        let y1 = ((cy + r) as u32).min(self.height.saturating_sub(1));
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f32 - cx;
                let dy = y as f32 - cy;
                if dx * dx + dy * dy <= r * r {
                    frame.put_pixel(x, y, [230, 240, 250, 255]);
                }
            }
        }

        self.t = self.t.wrapping_add(1);
        Some(frame)
    }

    fn describe(&self) -> String {
        format!("synthetic {}x{}", self.width, self.height)
    }
}

// ── ImageFolderSource ────────────────────────────────────────────────────────

/// Plays a directory of image files as the feed, looping forever.
pub struct ImageFolderSource {
    frames: Vec<PathBuf>,
    next:   usize,
}

impl ImageFolderSource {
    pub fn new(dir: &Path) -> anyhow::Result<Self> {
        let mut frames: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                matches!(
                    p.extension().and_then(|e| e.to_str()),
                    Some("png") | Some("jpg") | Some("jpeg") | Some("bmp")
                )
            })
            .collect();
        frames.sort();
        if frames.is_empty() {
            anyhow::bail!("no image files in {}", dir.display());
        }
        Ok(ImageFolderSource { frames, next: 0 })
    }
}

impl FrameSource for ImageFolderSource {
    fn next_frame(&mut self) -> Option<Frame> {
        for _ in 0..self.frames.len() {
            let path = &self.frames[self.next];
            self.next = (self.next + 1) % self.frames.len();
            match image::open(path) {
                Ok(img) => {
                    let rgba = img.to_rgba8();
                    let (w, h) = rgba.dimensions();
                    return Some(Frame { width: w, height: h, data: rgba.into_raw() });
                }
                Err(e) => {
                    log::warn!("skipping unreadable frame {}: {}", path.display(), e);
                }
            }
        }
        None
    }

    fn describe(&self) -> String {
        format!("image folder ({} frames)", self.frames.len())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Simulated poses
// ════════════════════════════════════════════════════════════════════════════

/// Keyboard-selected hand pose standing in for the landmark model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SimPose {
    #[default]
    NoHands,
    Point,
    Open,
    Fist,
    Thumbs,
    Heart,
    TrianglePair,
    Square,
}

impl SimPose {
    pub fn hands(&self) -> Vec<HandLandmarks> {
        match self {
            SimPose::NoHands      => Vec::new(),
            SimPose::Point        => poses::point(),
            SimPose::Open         => poses::open(),
            SimPose::Fist         => poses::fist(),
            SimPose::Thumbs       => poses::thumbs_up(),
            SimPose::Heart        => poses::heart(),
            SimPose::TrianglePair => poses::triangle_pair(),
            SimPose::Square       => poses::square(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandDetector — async landmark boundary
// ════════════════════════════════════════════════════════════════════════════

/// The landmark model boundary: given a frame, yield zero or more hands.
pub trait HandDetector: Send + 'static {
    fn detect(&mut self, frame: &Frame) -> anyhow::Result<Vec<HandLandmarks>>;
}

/// Detector that ignores the pixels and reports whatever pose the
/// keyboard simulator currently holds.
pub struct SimPoseDetector {
    pub board: Arc<Mutex<SimPose>>,
}

impl HandDetector for SimPoseDetector {
    fn detect(&mut self, _frame: &Frame) -> anyhow::Result<Vec<HandLandmarks>> {
        Ok(self
            .board
            .lock()
            .map(|pose| pose.hands())
            .unwrap_or_default())
    }
}

enum DetectorCommand {
    Detect(Frame),
    Quit,
}

/// One reply per accepted request.  A failed detection still produces a
/// reply so the in-flight slot frees up; gesture state is simply left
/// untouched for that tick.
#[derive(Debug)]
pub enum DetectorReply {
    Hands(Vec<HandLandmarks>),
    Failed,
}

/// Handle to the detector worker thread.
pub struct DetectorHandle {
    cmd_tx:    Sender<DetectorCommand>,
    reply_rx:  Receiver<DetectorReply>,
    in_flight: usize,
    worker:    Option<thread::JoinHandle<()>>,
}

impl DetectorHandle {
    pub fn spawn<D: HandDetector>(mut detector: D) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<DetectorCommand>();
        let (reply_tx, reply_rx) = mpsc::channel::<DetectorReply>();

        let worker = thread::spawn(move || {
            for cmd in cmd_rx {
                match cmd {
                    DetectorCommand::Detect(frame) => {
                        let reply = match detector.detect(&frame) {
                            Ok(hands) => DetectorReply::Hands(hands),
                            Err(e) => {
                                log::warn!("hand detection failed: {:#}", e);
                                DetectorReply::Failed
                            }
                        };
                        if reply_tx.send(reply).is_err() {
                            return;
                        }
                    }
                    DetectorCommand::Quit => return,
                }
            }
        });

        DetectorHandle {
            cmd_tx,
            reply_rx,
            in_flight: 0,
            worker: Some(worker),
        }
    }

    /// Submit a frame for detection.  Returns false (and drops the frame)
    /// when a previous request is still in flight — the next tick retries
    /// naturally.
    pub fn request(&mut self, frame: Frame) -> bool {
        if self.in_flight > 0 {
            return false;
        }
        if self.cmd_tx.send(DetectorCommand::Detect(frame)).is_ok() {
            self.in_flight += 1;
            true
        } else {
            false
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Drain pending replies (non-blocking).  With at most one request in
    /// flight the most recent reply wins by construction.
    pub fn drain(&mut self) -> Vec<DetectorReply> {
        let mut out = Vec::new();
        while let Ok(reply) = self.reply_rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            out.push(reply);
        }
        out
    }
}

impl Drop for DetectorHandle {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(DetectorCommand::Quit);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
