//! # motion_grid
//!
//! Cheap per-frame motion detection over a fixed low-resolution analysis
//! grid.  Incoming frames of any size are resampled into a small RGBA
//! buffer (180×100 by default), partitioned into grid cells, and each
//! cell's average per-channel delta against the previous frame is
//! measured.  Cells whose average change exceeds a threshold are emitted
//! as [`MotionCell`]s in screen coordinates, ranked strongest-first so
//! consumers can cheaply take a top-K subset.
//!
//! The analysis resolution is decoupled from both the video resolution
//! and the display resolution: two independent scale factors are applied
//! only when converting a cell's grid position to screen space.

use std::cmp::Ordering;

// ════════════════════════════════════════════════════════════════════════════
// Frame — a full-resolution RGBA input frame
// ════════════════════════════════════════════════════════════════════════════

/// One video frame as a flat RGBA8 buffer.
///
/// A frame with zero width or height signals "not yet ready" (the capture
/// side has not produced pixels); motion analysis treats it as a no-op.
#[derive(Clone, Debug)]
pub struct Frame {
    pub width:  u32,
    pub height: u32,
    /// RGBA8, row-major, `width * height * 4` bytes.
    pub data:   Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32) -> Self {
        Frame {
            width,
            height,
            data: vec![0; (width * height * 4) as usize],
        }
    }

    /// True when the frame carries pixels.
    pub fn is_ready(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.data.len() >= (self.width * self.height * 4) as usize
    }

    /// Set one RGBA pixel.  Out-of-bounds coordinates are ignored.
    pub fn put_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x < self.width && y < self.height {
            let i = ((y * self.width + x) * 4) as usize;
            self.data[i..i + 4].copy_from_slice(&rgba);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AnalysisConfig
// ════════════════════════════════════════════════════════════════════════════

/// Parameters of the analysis grid.
#[derive(Clone, Copy, Debug)]
pub struct AnalysisConfig {
    /// Analysis buffer width in pixels.
    pub width:       u32,
    /// Analysis buffer height in pixels.
    pub height:      u32,
    /// Stride between sampled pixels inside a cell.
    pub sample_step: u32,
    pub grid_cols:   u32,
    pub grid_rows:   u32,
    /// Minimum average |Δr|+|Δg|+|Δb| for a cell to count as motion.
    pub threshold:   f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            width:       180,
            height:      100,
            sample_step: 2,
            grid_cols:   24,
            grid_rows:   14,
            threshold:   26.0,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MotionCell
// ════════════════════════════════════════════════════════════════════════════

/// A grid cell whose average color change exceeded the threshold.
///
/// `x`/`y` are the cell's center in screen coordinates; `strength` is the
/// average per-sample channel delta (always ≥ 0).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionCell {
    pub x:        f32,
    pub y:        f32,
    pub strength: f32,
}

// ════════════════════════════════════════════════════════════════════════════
// MotionGrid
// ════════════════════════════════════════════════════════════════════════════

/// Frame-differencing engine.  Owns the previous-frame analysis buffer;
/// each call overwrites it in place after the deltas are computed.
pub struct MotionGrid {
    config:  AnalysisConfig,
    current: Vec<u8>,
    prev:    Option<Vec<u8>>,
}

impl MotionGrid {
    pub fn new(config: AnalysisConfig) -> Self {
        let len = (config.width * config.height * 4) as usize;
        MotionGrid {
            config,
            current: vec![0; len],
            prev:    None,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Forget the previous frame.  The next `compute_motion` call seeds
    /// the buffer again and returns no cells.
    pub fn reset(&mut self) {
        self.prev = None;
    }

    /// Analyse one frame against the previous one.
    ///
    /// Returns motion cells in screen coordinates (for the given viewport),
    /// sorted descending by strength.  Empty when the frame is not ready,
    /// on the first call after a reset, or when nothing moved.
    pub fn compute_motion(&mut self, frame: &Frame, viewport: (f32, f32)) -> Vec<MotionCell> {
        if !frame.is_ready() {
            return Vec::new();
        }

        self.resample(frame);

        if self.prev.is_none() {
            // Bootstrap: seed the buffer, report nothing.
            self.prev = Some(self.current.clone());
            return Vec::new();
        }
        let prev = match self.prev.as_mut() {
            Some(p) => p,
            None => return Vec::new(),
        };

        let cfg = self.config;
        let cell_w = (cfg.width / cfg.grid_cols).max(1);
        let cell_h = (cfg.height / cfg.grid_rows).max(1);
        let scale_x = viewport.0 / cfg.width as f32;
        let scale_y = viewport.1 / cfg.height as f32;
        let step = cfg.sample_step.max(1);

        let mut cells = Vec::new();

        for gy in 0..cfg.grid_rows {
            for gx in 0..cfg.grid_cols {
                let start_x = gx * cell_w;
                let start_y = gy * cell_h;
                let mut sum = 0u32;
                let mut count = 0u32;

                let mut y = start_y;
                while y < (start_y + cell_h).min(cfg.height) {
                    let mut x = start_x;
                    while x < (start_x + cell_w).min(cfg.width) {
                        let i = ((y * cfg.width + x) * 4) as usize;
                        let dr = self.current[i].abs_diff(prev[i]) as u32;
                        let dg = self.current[i + 1].abs_diff(prev[i + 1]) as u32;
                        let db = self.current[i + 2].abs_diff(prev[i + 2]) as u32;
                        sum += dr + dg + db;
                        count += 1;
                        x += step;
                    }
                    y += step;
                }

                let avg = sum as f32 / count.max(1) as f32;
                if avg > cfg.threshold {
                    cells.push(MotionCell {
                        x: (start_x as f32 + cell_w as f32 * 0.5) * scale_x,
                        y: (start_y as f32 + cell_h as f32 * 0.5) * scale_y,
                        strength: avg,
                    });
                }
            }
        }

        // Carry the current frame forward for the next tick.
        prev.copy_from_slice(&self.current);

        cells.sort_by(|a, b| {
            b.strength
                .partial_cmp(&a.strength)
                .unwrap_or(Ordering::Equal)
        });

        if !cells.is_empty() {
            log::debug!("motion: {} cells, peak {:.1}", cells.len(), cells[0].strength);
        }

        cells
    }

    /// Nearest-neighbor resample of the frame into the analysis buffer.
    fn resample(&mut self, frame: &Frame) {
        let cfg = self.config;
        for ay in 0..cfg.height {
            let sy = ay * frame.height / cfg.height;
            for ax in 0..cfg.width {
                let sx = ax * frame.width / cfg.width;
                let src = ((sy * frame.width + sx) * 4) as usize;
                let dst = ((ay * cfg.width + ax) * 4) as usize;
                self.current[dst..dst + 4].copy_from_slice(&frame.data[src..src + 4]);
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Frame {
        let mut f = Frame::new(width, height);
        for y in 0..height {
            for x in 0..width {
                f.put_pixel(x, y, [rgb[0], rgb[1], rgb[2], 255]);
            }
        }
        f
    }

    #[test]
    fn first_frame_seeds_and_returns_empty() {
        let mut grid = MotionGrid::new(AnalysisConfig::default());
        let cells = grid.compute_motion(&solid(360, 200, [200, 10, 10]), (1280.0, 720.0));
        assert!(cells.is_empty());
    }

    #[test]
    fn identical_frames_produce_no_motion() {
        let mut grid = MotionGrid::new(AnalysisConfig::default());
        let f = solid(360, 200, [120, 80, 40]);
        grid.compute_motion(&f, (1280.0, 720.0));
        let cells = grid.compute_motion(&f, (1280.0, 720.0));
        assert!(cells.is_empty());
    }

    #[test]
    fn full_frame_change_lights_every_cell() {
        let cfg = AnalysisConfig::default();
        let mut grid = MotionGrid::new(cfg);
        grid.compute_motion(&solid(360, 200, [0, 0, 0]), (1280.0, 720.0));
        let cells = grid.compute_motion(&solid(360, 200, [255, 255, 255]), (1280.0, 720.0));
        assert_eq!(cells.len(), (cfg.grid_cols * cfg.grid_rows) as usize);
    }

    #[test]
    fn cells_are_sorted_descending_by_strength() {
        let mut grid = MotionGrid::new(AnalysisConfig::default());
        grid.compute_motion(&solid(360, 200, [0, 0, 0]), (1280.0, 720.0));

        // Strong change on the left half, weaker on the right.
        let mut f = solid(360, 200, [0, 0, 0]);
        for y in 0..200 {
            for x in 0..180 {
                f.put_pixel(x, y, [255, 255, 255, 255]);
            }
            for x in 180..360 {
                f.put_pixel(x, y, [40, 40, 40, 255]);
            }
        }
        let cells = grid.compute_motion(&f, (1280.0, 720.0));
        assert!(!cells.is_empty());
        for w in cells.windows(2) {
            assert!(w[0].strength >= w[1].strength);
        }
    }

    #[test]
    fn not_ready_frame_is_a_no_op() {
        let mut grid = MotionGrid::new(AnalysisConfig::default());
        let empty = Frame::new(0, 0);
        assert!(grid.compute_motion(&empty, (1280.0, 720.0)).is_empty());
        // A not-ready frame must not seed the previous buffer either.
        let f = solid(360, 200, [90, 90, 90]);
        assert!(grid.compute_motion(&f, (1280.0, 720.0)).is_empty()); // seeds now
        assert!(grid.compute_motion(&f, (1280.0, 720.0)).is_empty()); // no change
    }

    #[test]
    fn reset_forgets_previous_frame() {
        let mut grid = MotionGrid::new(AnalysisConfig::default());
        grid.compute_motion(&solid(360, 200, [0, 0, 0]), (1280.0, 720.0));
        grid.reset();
        // First call after reset is a seed call again.
        let cells = grid.compute_motion(&solid(360, 200, [255, 255, 255]), (1280.0, 720.0));
        assert!(cells.is_empty());
    }

    #[test]
    fn cell_centers_scale_to_viewport() {
        let cfg = AnalysisConfig::default();
        let mut grid = MotionGrid::new(cfg);
        grid.compute_motion(&solid(360, 200, [0, 0, 0]), (1800.0, 1000.0));
        let cells = grid.compute_motion(&solid(360, 200, [255, 255, 255]), (1800.0, 1000.0));

        // Analysis is 180×100, viewport 1800×1000 — exactly 10× on each axis.
        let cell_w = (cfg.width / cfg.grid_cols) as f32;
        let cell_h = (cfg.height / cfg.grid_rows) as f32;
        let first = cells
            .iter()
            .find(|c| c.x == cell_w * 0.5 * 10.0 && c.y == cell_h * 0.5 * 10.0);
        assert!(first.is_some(), "top-left cell center should land at 10× scale");
        for c in &cells {
            assert!(c.x <= 1800.0 && c.y <= 1000.0);
        }
    }

    #[test]
    fn deterministic_for_fixed_frames() {
        let run = || {
            let mut grid = MotionGrid::new(AnalysisConfig::default());
            let a = solid(360, 200, [10, 20, 30]);
            let b = solid(360, 200, [90, 120, 150]);
            grid.compute_motion(&a, (1280.0, 720.0));
            grid.compute_motion(&b, (1280.0, 720.0))
        };
        let first = run();
        let second = run();
        assert_eq!(first.len(), second.len());
        for (x, y) in first.iter().zip(second.iter()) {
            assert_eq!(x, y);
        }
    }
}
