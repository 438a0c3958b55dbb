//! Particle simulation.
//!
//! [`ParticleField`] owns every live particle.  Each tick it spawns from
//! the strongest targets, steers velocities toward a pseudo-randomly
//! cycled target, applies gesture-shaped jitter/swirl/damping, integrates,
//! wraps positions toroidally, and retires expired particles.  The
//! population is hard-capped with oldest-first eviction.

use std::collections::VecDeque;

use hand_gesture::Gesture;
use motion_grid::MotionCell;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::visualizer::{hsl_to_argb, PixelCanvas, BG_COLOR};

// ── Tuning constants (see also AppConfig) ────────────────────────────────────

/// Steering coefficient toward the chosen target.
const PULL:          f32 = 0.08;
/// Pull saturates at strength / 480, capped here.
const PULL_CAP:      f32 = 1.4;
/// Base random velocity jitter per axis.
const JITTER:        f32 = 0.08;
/// Jitter while the `Open` gesture is active.
const JITTER_OPEN:   f32 = 0.18;
/// Tangential swirl speed for the `Triangle` gesture.
const SWIRL:         f32 = 0.08;
/// Positions wrap once they exceed the viewport by this margin.
const WRAP_MARGIN:   f32 = 10.0;
/// Trail-fade alpha applied before drawing each frame.
const FADE_ALPHA:    f32 = 0.24;
/// Life fraction denominator for render opacity.
const LIFE_FULL:     f32 = 200.0;

/// One particle.  Owned exclusively by the field; never shared.
#[derive(Clone, Copy, Debug)]
pub struct Particle {
    pub x:    f32,
    pub y:    f32,
    pub vx:   f32,
    pub vy:   f32,
    /// Remaining ticks.
    pub life: f32,
    pub size: f32,
    /// Fixed at spawn, degrees in [180, 300).
    pub hue:  f32,
}

// ════════════════════════════════════════════════════════════════════════════
// ParticleField
// ════════════════════════════════════════════════════════════════════════════

pub struct ParticleField {
    particles: VecDeque<Particle>,
    cap:       usize,
    spawn_top: usize,
    rng:       StdRng,
}

impl ParticleField {
    pub fn new(cap: usize, spawn_top: usize) -> Self {
        Self::with_rng(cap, spawn_top, StdRng::from_entropy())
    }

    /// Deterministic field for tests.
    pub fn with_seed(cap: usize, spawn_top: usize, seed: u64) -> Self {
        Self::with_rng(cap, spawn_top, StdRng::seed_from_u64(seed))
    }

    fn with_rng(cap: usize, spawn_top: usize, rng: StdRng) -> Self {
        ParticleField {
            particles: VecDeque::with_capacity(cap),
            cap,
            spawn_top,
            rng,
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    // ── Spawning ─────────────────────────────────────────────────────────

    /// Emit new particles at the strongest targets.  Each of the top
    /// `spawn_top` targets contributes `ceil(strength / 90)` particles,
    /// at most 6.  Over-cap, the oldest particles are evicted first.
    pub fn spawn(&mut self, targets: &[MotionCell]) {
        for cell in targets.iter().take(self.spawn_top) {
            let count = ((cell.strength / 90.0).ceil() as usize).clamp(1, 6);
            for _ in 0..count {
                let p = self.birth(cell.x, cell.y, cell.strength);
                self.particles.push_back(p);
            }
        }
        while self.particles.len() > self.cap {
            self.particles.pop_front();
        }
    }

    fn birth(&mut self, x: f32, y: f32, impulse: f32) -> Particle {
        let rng = &mut self.rng;
        let angle = rng.gen::<f32>() * std::f32::consts::TAU;
        let speed = (0.4 + rng.gen::<f32>() * 0.8) * (1.0 + impulse * 0.02);
        Particle {
            x: x + (rng.gen::<f32>() - 0.5) * 14.0,
            y: y + (rng.gen::<f32>() - 0.5) * 14.0,
            vx: angle.cos() * speed,
            vy: angle.sin() * speed,
            life: 90.0 + rng.gen::<f32>() * 110.0,
            size: 1.2 + rng.gen::<f32>() * 1.6,
            hue: 180.0 + rng.gen::<f32>() * 120.0,
        }
    }

    // ── Per-tick physics ─────────────────────────────────────────────────

    pub fn update(
        &mut self,
        targets: &[MotionCell],
        gesture: Gesture,
        viewport: (f32, f32),
        tick: u64,
    ) {
        let (vw, vh) = viewport;
        let jitter = if gesture == Gesture::Open { JITTER_OPEN } else { JITTER };
        let damping = match gesture {
            Gesture::Point => 0.99,
            Gesture::Fist  => 0.96,
            _              => 0.985,
        };

        for p in self.particles.iter_mut() {
            // Steer toward a pseudo-randomly cycled target.
            if !targets.is_empty() {
                let idx =
                    (tick as usize + self.rng.gen_range(0..targets.len())) % targets.len();
                let target = targets[idx];
                let dx = target.x - p.x;
                let dy = target.y - p.y;
                let dist = (dx * dx + dy * dy).sqrt() + 1e-4;
                let pull = (target.strength / 480.0).min(PULL_CAP);
                p.vx += (dx / dist) * PULL * pull;
                p.vy += (dy / dist) * PULL * pull;
            }

            // Random drift keeps the motion organic.
            p.vx += (self.rng.gen::<f32>() - 0.5) * jitter;
            p.vy += (self.rng.gen::<f32>() - 0.5) * jitter;

            // Spiral swirl around the viewport center.
            if gesture == Gesture::Triangle {
                let rx = p.x - vw * 0.5;
                let ry = p.y - vh * 0.5;
                let d = (rx * rx + ry * ry).sqrt() + 1e-4;
                p.vx += (-ry / d) * SWIRL;
                p.vy += (rx / d) * SWIRL;
            }

            p.vx *= damping;
            p.vy *= damping;
            p.x += p.vx;
            p.y += p.vy;
            p.life -= 1.0;

            // Toroidal wraparound keeps the canvas filled.
            if p.x < -WRAP_MARGIN {
                p.x = vw + WRAP_MARGIN;
            } else if p.x > vw + WRAP_MARGIN {
                p.x = -WRAP_MARGIN;
            }
            if p.y < -WRAP_MARGIN {
                p.y = vh + WRAP_MARGIN;
            } else if p.y > vh + WRAP_MARGIN {
                p.y = -WRAP_MARGIN;
            }
        }

        self.particles.retain(|p| p.life > 0.0);
    }

    // ── Rendering ────────────────────────────────────────────────────────

    /// Fade the previous frame toward the background, then draw each
    /// particle as a filled circle whose opacity follows its remaining
    /// life fraction.
    pub fn render(&self, canvas: &mut PixelCanvas) {
        canvas.fade(BG_COLOR, FADE_ALPHA);
        for p in &self.particles {
            let alpha = (p.life / LIFE_FULL).clamp(0.0, 1.0);
            let color = hsl_to_argb(p.hue, 0.9, 0.7);
            canvas.fill_circle(p.x, p.y, p.size, color, alpha);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(x: f32, y: f32, strength: f32) -> MotionCell {
        MotionCell { x, y, strength }
    }

    #[test]
    fn spawn_count_follows_strength() {
        let mut f = ParticleField::with_seed(1200, 32, 1);
        f.spawn(&[cell(100.0, 100.0, 90.0)]);
        assert_eq!(f.len(), 1);

        let mut f = ParticleField::with_seed(1200, 32, 1);
        f.spawn(&[cell(100.0, 100.0, 500.0)]);
        assert_eq!(f.len(), 6);

        // Very strong cells still cap at 6.
        let mut f = ParticleField::with_seed(1200, 32, 1);
        f.spawn(&[cell(100.0, 100.0, 5000.0)]);
        assert_eq!(f.len(), 6);
    }

    #[test]
    fn only_top_targets_spawn() {
        let mut f = ParticleField::with_seed(1200, 32, 2);
        let targets: Vec<MotionCell> =
            (0..40).map(|i| cell(i as f32, 0.0, 30.0)).collect();
        f.spawn(&targets);
        assert_eq!(f.len(), 32);
    }

    #[test]
    fn population_never_exceeds_cap() {
        let mut f = ParticleField::with_seed(100, 32, 3);
        let targets: Vec<MotionCell> =
            (0..32).map(|i| cell(i as f32, 0.0, 600.0)).collect();
        for _ in 0..10 {
            f.spawn(&targets);
            assert!(f.len() <= 100);
        }
        assert_eq!(f.len(), 100);
    }

    #[test]
    fn eviction_is_oldest_first() {
        let mut f = ParticleField::with_seed(6, 32, 4);
        f.spawn(&[cell(0.0, 0.0, 500.0)]); // fills the cap with gen-0
        let survivor_hues: Vec<f32> = f.iter().map(|p| p.hue).collect();
        f.spawn(&[cell(500.0, 500.0, 90.0)]); // one gen-1 particle
        assert_eq!(f.len(), 6);
        // The front (oldest) particle fell off; the newest sits at the back.
        let hues: Vec<f32> = f.iter().map(|p| p.hue).collect();
        assert_eq!(&hues[..5], &survivor_hues[1..]);
    }

    #[test]
    fn life_strictly_decreases_until_removal() {
        let mut f = ParticleField::with_seed(1200, 32, 5);
        f.spawn(&[cell(400.0, 300.0, 90.0)]);
        let mut last = f.iter().next().map(|p| p.life);
        let mut ticks = 0u64;
        while !f.is_empty() {
            f.update(&[], Gesture::Scatter, (800.0, 600.0), ticks);
            if let Some(p) = f.iter().next() {
                let prev = last.take().expect("had a previous life value");
                assert_eq!(p.life, prev - 1.0);
                last = Some(p.life);
            }
            ticks += 1;
            assert!(ticks < 300, "particle must expire within its max life");
        }
    }

    #[test]
    fn expired_particles_are_gone_next_tick() {
        let mut f = ParticleField::with_seed(1200, 32, 6);
        f.particles.push_back(Particle {
            x: 10.0, y: 10.0, vx: 0.0, vy: 0.0, life: 1.0, size: 2.0, hue: 200.0,
        });
        f.update(&[], Gesture::Scatter, (800.0, 600.0), 0);
        assert!(f.is_empty());
    }

    #[test]
    fn wraparound_right_edge() {
        let mut f = ParticleField::with_seed(10, 32, 7);
        f.particles.push_back(Particle {
            x: 810.0, y: 300.0, vx: 5.0, vy: 0.0, life: 50.0, size: 2.0, hue: 200.0,
        });
        f.update(&[], Gesture::Scatter, (800.0, 600.0), 0);
        assert_eq!(f.iter().next().unwrap().x, -10.0);
    }

    #[test]
    fn wraparound_left_edge() {
        let mut f = ParticleField::with_seed(10, 32, 8);
        f.particles.push_back(Particle {
            x: -10.0, y: 300.0, vx: -5.0, vy: 0.0, life: 50.0, size: 2.0, hue: 200.0,
        });
        f.update(&[], Gesture::Scatter, (800.0, 600.0), 0);
        assert_eq!(f.iter().next().unwrap().x, 810.0);
    }

    #[test]
    fn wraparound_vertical() {
        let mut f = ParticleField::with_seed(10, 32, 9);
        f.particles.push_back(Particle {
            x: 400.0, y: 610.0, vx: 0.0, vy: 5.0, life: 50.0, size: 2.0, hue: 200.0,
        });
        f.update(&[], Gesture::Scatter, (800.0, 600.0), 0);
        assert_eq!(f.iter().next().unwrap().y, -10.0);
    }

    #[test]
    fn spawn_ranges_hold() {
        let mut f = ParticleField::with_seed(1200, 32, 10);
        let targets: Vec<MotionCell> =
            (0..32).map(|i| cell(i as f32 * 10.0, 50.0, 540.0)).collect();
        f.spawn(&targets);
        for p in f.iter() {
            assert!(p.hue >= 180.0 && p.hue < 300.0);
            assert!(p.size >= 1.2 && p.size < 2.8);
            assert!(p.life >= 90.0 && p.life < 200.0);
        }
    }

    #[test]
    fn seeded_fields_evolve_identically() {
        let run = || {
            let mut f = ParticleField::with_seed(1200, 32, 42);
            f.spawn(&[cell(100.0, 100.0, 300.0)]);
            for t in 0..20 {
                f.update(&[cell(200.0, 200.0, 400.0)], Gesture::Point, (800.0, 600.0), t);
            }
            f.iter().map(|p| (p.x, p.y)).collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn render_draws_live_particles() {
        let mut f = ParticleField::with_seed(10, 32, 11);
        f.particles.push_back(Particle {
            x: 10.0, y: 10.0, vx: 0.0, vy: 0.0, life: 200.0, size: 2.0, hue: 200.0,
        });
        let mut canvas = PixelCanvas::new(32, 32);
        f.render(&mut canvas);
        assert_ne!(canvas.pixel(10, 10), BG_COLOR);
    }
}
