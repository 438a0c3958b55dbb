//! Attractor geometry.
//!
//! Shape attractors come in two flavors: silhouettes (a rasterized word
//! and an implicit heart curve) that are precomputed once per viewport
//! size, and cheap closed-form sets (center, corners, square outline,
//! triangle) computed on demand.  [`shape_targets`] maps the current
//! debounced gesture plus this tick's motion cells to the target list the
//! particle field steers toward.

use hand_gesture::Gesture;
use motion_grid::MotionCell;

use crate::font;

// ── Attractor strengths ──────────────────────────────────────────────────────

const CENTER_STRENGTH:          f32 = 1200.0;
const TEXT_STRENGTH:            f32 = 1050.0;
const HEART_STRENGTH:           f32 = 1000.0;
const CORNER_STRENGTH:          f32 = 950.0;
const SQUARE_STRENGTH:          f32 = 900.0;
const TRIANGLE_STRENGTH:        f32 = 850.0;
const TRIANGLE_CENTER_STRENGTH: f32 = 200.0;

// ── Silhouette rasterization parameters ──────────────────────────────────────

/// Mask pixels per font bit when rasterizing the word.
const GLYPH_SCALE:     usize = 12;
/// Stride between sampled mask pixels.
const TEXT_STRIDE:     usize = 3;
/// Minimum mask alpha for a pixel to join the silhouette.
const ALPHA_THRESHOLD: u8    = 16;
/// Word silhouette fills this fraction of the smaller viewport dimension.
const TEXT_FIT:        f32   = 0.60;
/// Heart silhouette scale as a fraction of the smaller viewport dimension.
const HEART_FIT:       f32   = 0.32;
/// Grid step over [-1, 1]² when sampling the heart curve.
const HEART_STEP:      f32   = 0.035;

// ════════════════════════════════════════════════════════════════════════════
// AttractorBuilder
// ════════════════════════════════════════════════════════════════════════════

/// Precomputed silhouette point clouds plus on-demand geometric sets,
/// all in screen coordinates for the current viewport.
pub struct AttractorBuilder {
    width:  f32,
    height: f32,
    word:   String,
    text:   Vec<(f32, f32)>,
    heart:  Vec<(f32, f32)>,
}

impl AttractorBuilder {
    pub fn new(word: &str, width: f32, height: f32) -> Self {
        let mut b = AttractorBuilder {
            width,
            height,
            word: word.to_string(),
            text: Vec::new(),
            heart: Vec::new(),
        };
        b.rebuild(width, height);
        b
    }

    /// Recompute both silhouettes for a new viewport size.  Call on
    /// initialization and on every window resize.
    pub fn rebuild(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.text = self.build_text_targets();
        self.heart = self.build_heart_targets();
        log::debug!(
            "attractors rebuilt for {}x{}: {} text, {} heart points",
            width, height, self.text.len(), self.heart.len()
        );
    }

    pub fn viewport(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn text_targets(&self) -> &[(f32, f32)] {
        &self.text
    }

    pub fn heart_targets(&self) -> &[(f32, f32)] {
        &self.heart
    }

    // ── Text silhouette ───────────────────────────────────────────────────

    /// Rasterize the word with the scaled bitmap font into an offscreen
    /// alpha mask, sample covered pixels at a fixed stride, then fit the
    /// cloud to the viewport (uniform scale, centered).
    fn build_text_targets(&self) -> Vec<(f32, f32)> {
        let chars: Vec<char> = self.word.chars().collect();
        if chars.is_empty() {
            // Degenerate word: fall back to a single center point so the
            // target set is never empty.
            return vec![(self.width * 0.5, self.height * 0.5)];
        }

        let mask_w = chars.len() * font::ADVANCE * GLYPH_SCALE;
        let mask_h = font::GLYPH_H * GLYPH_SCALE;
        let mut mask = vec![0u8; mask_w * mask_h];

        for (ci, &c) in chars.iter().enumerate() {
            let gl = font::glyph(c);
            let ox = ci * font::ADVANCE * GLYPH_SCALE;
            for (row, &bits) in gl.iter().enumerate() {
                for col in 0..font::GLYPH_W {
                    if bits & (1 << (font::GLYPH_W - 1 - col)) == 0 {
                        continue;
                    }
                    for dy in 0..GLYPH_SCALE {
                        for dx in 0..GLYPH_SCALE {
                            let x = ox + col * GLYPH_SCALE + dx;
                            let y = row * GLYPH_SCALE + dy;
                            mask[y * mask_w + x] = 255;
                        }
                    }
                }
            }
        }

        let scale = TEXT_FIT * self.width.min(self.height) / mask_w.max(mask_h) as f32;
        let x0 = (self.width - mask_w as f32 * scale) * 0.5;
        let y0 = (self.height - mask_h as f32 * scale) * 0.5;

        let mut points = Vec::new();
        let mut my = 0;
        while my < mask_h {
            let mut mx = 0;
            while mx < mask_w {
                if mask[my * mask_w + mx] > ALPHA_THRESHOLD {
                    points.push((x0 + mx as f32 * scale, y0 + my as f32 * scale));
                }
                mx += TEXT_STRIDE;
            }
            my += TEXT_STRIDE;
        }

        if points.is_empty() {
            points.push((self.width * 0.5, self.height * 0.5));
        }
        points
    }

    // ── Heart silhouette ──────────────────────────────────────────────────

    /// Sample the implicit curve `(x²+y²−1)³ − x²y³ ≤ 0` over [-1,1]²,
    /// scaled and translated to sit slightly above vertical center.
    fn build_heart_targets(&self) -> Vec<(f32, f32)> {
        let s = HEART_FIT * self.width.min(self.height);
        let cx = self.width * 0.5;
        let cy = self.height * 0.44;

        let mut points = Vec::new();
        let mut y = -1.0f32;
        while y <= 1.0 {
            let mut x = -1.0f32;
            while x <= 1.0 {
                let q = x * x + y * y - 1.0;
                if q * q * q - x * x * y * y * y <= 0.0 {
                    // Curve space has y up; screen y grows downward.
                    points.push((cx + x * s, cy - y * s));
                }
                x += HEART_STEP;
            }
            y += HEART_STEP;
        }

        if points.is_empty() {
            points.push((cx, cy));
        }
        points
    }

    // ── Closed-form geometric sets ────────────────────────────────────────

    pub fn center(&self) -> (f32, f32) {
        (self.width * 0.5, self.height * 0.5)
    }

    /// Four corners of a centered square spanning 60% of the smaller
    /// viewport dimension.
    pub fn corners(&self) -> Vec<(f32, f32)> {
        let half = 0.30 * self.width.min(self.height);
        let (cx, cy) = self.center();
        vec![
            (cx - half, cy - half),
            (cx + half, cy - half),
            (cx - half, cy + half),
            (cx + half, cy + half),
        ]
    }

    /// Square outline: corners plus edge midpoints.
    pub fn square(&self) -> Vec<(f32, f32)> {
        let half = 0.28 * self.width.min(self.height);
        let (cx, cy) = self.center();
        vec![
            (cx - half, cy - half),
            (cx, cy - half),
            (cx + half, cy - half),
            (cx + half, cy),
            (cx + half, cy + half),
            (cx, cy + half),
            (cx - half, cy + half),
            (cx - half, cy),
        ]
    }

    /// Three vertices equally spaced on a circle, apex up.
    pub fn triangle(&self) -> Vec<(f32, f32)> {
        let r = 0.32 * self.width.min(self.height);
        let (cx, cy) = self.center();
        [-90.0f32, 30.0, 150.0]
            .iter()
            .map(|deg| {
                let a = deg.to_radians();
                (cx + r * a.cos(), cy + r * a.sin())
            })
            .collect()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Gesture-conditioned target shaping
// ════════════════════════════════════════════════════════════════════════════

fn cells(points: &[(f32, f32)], strength: f32) -> Vec<MotionCell> {
    points
        .iter()
        .map(|&(x, y)| MotionCell { x, y, strength })
        .collect()
}

/// Shape this tick's target list.
///
/// Free-flow gestures (`Scatter`, `Open`) pass the live motion cells
/// through unchanged; shape gestures replace them with the matching
/// attractor set so residual camera motion cannot tug the silhouette
/// apart.
pub fn shape_targets(
    gesture: Gesture,
    motion: &[MotionCell],
    builder: &AttractorBuilder,
) -> Vec<MotionCell> {
    match gesture {
        Gesture::Scatter | Gesture::Open => motion.to_vec(),
        Gesture::Point => {
            let (x, y) = builder.center();
            vec![MotionCell { x, y, strength: CENTER_STRENGTH }]
        }
        Gesture::Fist => cells(&builder.corners(), CORNER_STRENGTH),
        Gesture::Square => cells(&builder.square(), SQUARE_STRENGTH),
        Gesture::Triangle => {
            let mut t = cells(&builder.triangle(), TRIANGLE_STRENGTH);
            let (x, y) = builder.center();
            t.push(MotionCell { x, y, strength: TRIANGLE_CENTER_STRENGTH });
            t
        }
        Gesture::Thumbs => cells(builder.text_targets(), TEXT_STRENGTH),
        Gesture::Heart => cells(builder.heart_targets(), HEART_STRENGTH),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
