//! Orchestrator.
//!
//! `AppState` owns the four simulation pieces (motion grid, gesture
//! classifier, attractor builder, particle field) with single-writer
//! ownership per field, and advances them once per render tick:
//! sample motion, shape targets by the debounced gesture, spawn, update.
//! The landmark detector runs on a slower cadence through its worker
//! thread; `run()` wires everything to the window and drives the loop.

use std::sync::{Arc, Mutex};

use hand_gesture::{ClassifierConfig, Gesture, GestureClassifier, HandLandmarks};
use motion_grid::{AnalysisConfig, Frame, MotionCell, MotionGrid};

use crate::attractor::{shape_targets, AttractorBuilder};
use crate::particle::ParticleField;
use crate::source::{DetectorHandle, DetectorReply, FrameSource, SimPose, SimPoseDetector};
use crate::visualizer::{PixelCanvas, Visualizer};

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
pub struct AppConfig {
    pub analysis:        AnalysisConfig,
    pub classifier:      ClassifierConfig,
    /// Hard particle population cap (FIFO eviction above it).
    pub particle_cap:    usize,
    /// How many of the strongest targets spawn particles each tick.
    pub spawn_top:       usize,
    /// The detector is fed every Nth tick.
    pub gesture_cadence: u64,
    /// Word rasterized for the thumbs-up silhouette.
    pub word:            String,
    pub width:           usize,
    pub height:          usize,
    /// Fixed RNG seed for reproducible runs; `None` seeds from entropy.
    pub seed:            Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            analysis:        AnalysisConfig::default(),
            classifier:      ClassifierConfig::default(),
            particle_cap:    1200,
            spawn_top:       32,
            gesture_cadence: 3,
            word:            "FLOW".to_string(),
            width:           960,
            height:          540,
            seed:            None,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    motion:          MotionGrid,
    classifier:      GestureClassifier,
    attractors:      AttractorBuilder,
    field:           ParticleField,
    gesture_cadence: u64,
    tick_count:      u64,
}

impl AppState {
    pub fn new(cfg: &AppConfig) -> Self {
        let field = match cfg.seed {
            Some(seed) => ParticleField::with_seed(cfg.particle_cap, cfg.spawn_top, seed),
            None => ParticleField::new(cfg.particle_cap, cfg.spawn_top),
        };
        AppState {
            motion: MotionGrid::new(cfg.analysis),
            classifier: GestureClassifier::new(cfg.classifier),
            attractors: AttractorBuilder::new(&cfg.word, cfg.width as f32, cfg.height as f32),
            field,
            gesture_cadence: cfg.gesture_cadence.max(1),
            tick_count: 0,
        }
    }

    pub fn gesture(&self) -> Gesture {
        self.classifier.state()
    }

    pub fn confidence(&self) -> f32 {
        self.classifier.confidence()
    }

    pub fn particle_count(&self) -> usize {
        self.field.len()
    }

    pub fn attractors(&self) -> &AttractorBuilder {
        &self.attractors
    }

    /// True on the ticks where a detector request should be made.
    pub fn wants_gesture_sample(&self) -> bool {
        self.tick_count % self.gesture_cadence == 0
    }

    /// Feed one detector result.  Called whenever a reply arrives; stale
    /// results simply update the classifier late (most recent wins).
    pub fn observe_hands(&mut self, hands: &[HandLandmarks]) {
        self.classifier.observe(hands, self.tick_count);
    }

    /// Advance one render tick.  Returns the shaped target list the
    /// particles steered toward (useful for status display and tests).
    pub fn tick(&mut self, frame: Option<&Frame>, viewport: (f32, f32)) -> Vec<MotionCell> {
        self.tick_count += 1;

        if viewport != self.attractors.viewport() {
            self.attractors.rebuild(viewport.0, viewport.1);
        }

        let motion = match frame {
            Some(f) => self.motion.compute_motion(f, viewport),
            None => Vec::new(),
        };

        let targets = shape_targets(self.classifier.state(), &motion, &self.attractors);

        self.field.spawn(&targets);
        self.field
            .update(&targets, self.classifier.state(), viewport, self.tick_count);

        targets
    }

    pub fn render(&self, canvas: &mut PixelCanvas) {
        self.field.render(canvas);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application until the window closes or the user quits.
///
/// Per-tick failures (frame not ready, detector busy or failed) never
/// abort the loop; stopping halts ticking synchronously and joins the
/// detector thread.
pub fn run(cfg: AppConfig, mut source: Box<dyn FrameSource>) -> anyhow::Result<()> {
    let board = Arc::new(Mutex::new(SimPose::default()));
    let mut detector = DetectorHandle::spawn(SimPoseDetector { board: board.clone() });
    let mut vis = Visualizer::new(cfg.width, cfg.height, board)?;
    let mut app = AppState::new(&cfg);

    log::info!("frame source: {}", source.describe());

    while vis.is_open() {
        if !vis.poll_input() {
            break;
        }

        let (w, h) = vis.sync_size();
        let viewport = (w as f32, h as f32);

        let frame = source.next_frame();

        // Cadenced landmark sampling with drop-latest-if-busy backpressure.
        if app.wants_gesture_sample() {
            if let Some(f) = &frame {
                if !detector.request(f.clone()) {
                    log::trace!("detector busy, skipping this tick's request");
                }
            }
        }
        for reply in detector.drain() {
            match reply {
                DetectorReply::Hands(hands) => app.observe_hands(&hands),
                // Failure leaves gesture state untouched for this tick.
                DetectorReply::Failed => {}
            }
        }

        let targets = app.tick(frame.as_ref(), viewport);

        app.render(vis.canvas_mut());
        let status = format!(
            "gesture: {} ({:.2})  targets: {}  particles: {}",
            app.gesture().name(),
            app.confidence(),
            targets.len(),
            app.particle_count(),
        );
        vis.present(&status);
    }

    // Dropping the handle sends Quit and joins the worker; no tick runs
    // after this point.
    drop(detector);
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SyntheticSource;
    use hand_gesture::poses;

    fn make_app() -> AppState {
        AppState::new(&AppConfig {
            seed: Some(7),
            ..AppConfig::default()
        })
    }

    #[test]
    fn thumbs_up_renders_text_silhouette() {
        let mut app = make_app();
        let thumbs = poses::thumbs_up();
        for _ in 0..10 {
            app.observe_hands(&thumbs);
            app.tick(None, (960.0, 540.0));
        }
        assert_eq!(app.gesture(), Gesture::Thumbs);

        let targets = app.tick(None, (960.0, 540.0));
        let text = app.attractors().text_targets().to_vec();
        assert_eq!(targets.len(), text.len());
        for (cell, (x, y)) in targets.iter().zip(text) {
            assert_eq!(cell.strength, 1050.0);
            assert_eq!((cell.x, cell.y), (x, y));
        }
    }

    #[test]
    fn no_motion_no_hands_stays_neutral() {
        let mut app = make_app();
        for _ in 0..20 {
            app.observe_hands(&[]);
            let targets = app.tick(None, (960.0, 540.0));
            assert!(targets.is_empty());
        }
        assert_eq!(app.gesture(), Gesture::Scatter);
        assert_eq!(app.particle_count(), 0);
    }

    #[test]
    fn existing_particles_keep_decaying_without_input() {
        let mut app = make_app();
        let mut source = SyntheticSource::new(320, 180);
        // First frame seeds the diff buffer, later frames produce motion.
        for _ in 0..10 {
            let frame = source.next_frame();
            app.tick(frame.as_ref(), (960.0, 540.0));
        }
        let populated = app.particle_count();
        assert!(populated > 0, "synthetic motion should spawn particles");

        for _ in 0..5 {
            app.tick(None, (960.0, 540.0));
        }
        assert!(app.particle_count() <= populated);
    }

    #[test]
    fn resize_rebuilds_attractors() {
        let mut app = make_app();
        app.tick(None, (960.0, 540.0));
        app.tick(None, (400.0, 300.0));
        assert_eq!(app.attractors().viewport(), (400.0, 300.0));
    }

    #[test]
    fn gesture_sampling_follows_cadence() {
        let mut app = AppState::new(&AppConfig {
            gesture_cadence: 3,
            seed: Some(1),
            ..AppConfig::default()
        });
        let mut pattern = Vec::new();
        for _ in 0..6 {
            pattern.push(app.wants_gesture_sample());
            app.tick(None, (960.0, 540.0));
        }
        assert_eq!(pattern, vec![true, false, false, true, false, false]);
    }

    #[test]
    fn particle_cap_holds_under_shape_gestures() {
        let mut app = AppState::new(&AppConfig {
            particle_cap: 300,
            seed: Some(2),
            ..AppConfig::default()
        });
        let thumbs = poses::thumbs_up();
        for _ in 0..30 {
            app.observe_hands(&thumbs);
            app.tick(None, (960.0, 540.0));
            assert!(app.particle_count() <= 300);
        }
    }
}
