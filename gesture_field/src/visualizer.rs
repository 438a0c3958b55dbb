//! Software-rendered visualizer using `minifb`.
//!
//! [`PixelCanvas`] is a plain ARGB framebuffer with the drawing
//! primitives the particle field needs (trail fade, alpha-blended filled
//! circles, labels); it has no window dependency so rendering is testable
//! headless.  [`Visualizer`] owns the window, pushes the canvas each
//! frame, and translates keyboard input into simulated hand poses for the
//! detector.

use std::sync::{Arc, Mutex};

use minifb::{Key, KeyRepeat, Window, WindowOptions};

use crate::font;
use crate::source::SimPose;

/// Trail background, rgb(3, 7, 15).
pub const BG_COLOR: u32 = 0xFF03070F;
const STATUS_BG:    u32 = 0xFF0F3460;
const STATUS_FG:    u32 = 0xFFEEEEEE;
const LEGEND_FG:    u32 = 0xFF888888;
const STATUS_H:     usize = 30;

// ════════════════════════════════════════════════════════════════════════════
// Color helpers
// ════════════════════════════════════════════════════════════════════════════

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
pub fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0 - t) + cb as f32 * t) as u32;
    let ar = (a >> 16) & 0xFF;
    let br = (b >> 16) & 0xFF;
    let ag = (a >> 8) & 0xFF;
    let bg = (b >> 8) & 0xFF;
    let ab = a & 0xFF;
    let bb = b & 0xFF;
    0xFF000000 | (lerp(ar, br) << 16) | (lerp(ag, bg) << 8) | lerp(ab, bb)
}

/// Convert HSL → packed ARGB (0xAARRGGBB, A=0xFF).  Hue in degrees.
pub fn hsl_to_argb(h: f32, s: f32, l: f32) -> u32 {
    let h = h.rem_euclid(360.0);
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = l - c * 0.5;
    let (r, g, b) = match (h / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let ri = ((r + m) * 255.0) as u32;
    let gi = ((g + m) * 255.0) as u32;
    let bi = ((b + m) * 255.0) as u32;
    0xFF000000 | (ri << 16) | (gi << 8) | bi
}

// ════════════════════════════════════════════════════════════════════════════
// PixelCanvas
// ════════════════════════════════════════════════════════════════════════════

/// ARGB framebuffer with the primitives the renderer needs.
pub struct PixelCanvas {
    buf:    Vec<u32>,
    width:  usize,
    height: usize,
}

impl PixelCanvas {
    pub fn new(width: usize, height: usize) -> Self {
        PixelCanvas {
            buf: vec![BG_COLOR; width * height],
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn buffer(&self) -> &[u32] {
        &self.buf
    }

    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.buf[y * self.width + x]
    }

    /// Re-allocate for a new window size, clearing to the background.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.buf = vec![BG_COLOR; width * height];
    }

    /// Trail fade: pull every pixel toward `color` by `alpha`, leaving
    /// ghosts of the previous frame behind moving particles.
    pub fn fade(&mut self, color: u32, alpha: f32) {
        for px in &mut self.buf {
            *px = blend(*px, color, alpha);
        }
    }

    pub fn blend_pixel(&mut self, x: i32, y: i32, color: u32, alpha: f32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            let i = y as usize * self.width + x as usize;
            self.buf[i] = blend(self.buf[i], color, alpha);
        }
    }

    /// Alpha-blended filled circle.
    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: u32, alpha: f32) {
        let r = radius.max(0.5);
        let r2 = r * r;
        let x0 = (cx - r).floor() as i32;
        let x1 = (cx + r).ceil() as i32;
        let y0 = (cy - r).floor() as i32;
        let y1 = (cy + r).ceil() as i32;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                if dx * dx + dy * dy <= r2 {
                    self.blend_pixel(x, y, color, alpha);
                }
            }
        }
    }

    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.height) {
            for col in x..(x + w).min(self.width) {
                self.buf[row * self.width + col] = color;
            }
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < self.width && y < self.height {
            self.buf[y * self.width + x] = color;
        }
    }

    /// Render text with the 3×5 bitmap font.
    pub fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let gl = font::glyph(ch);
            for (row, &bits) in gl.iter().enumerate() {
                for col in 0..font::GLYPH_W {
                    if bits & (1 << (font::GLYPH_W - 1 - col)) != 0 {
                        self.set_pixel(cx + col, y + row, color);
                    }
                }
            }
            cx += font::ADVANCE;
            if cx + font::ADVANCE > self.width {
                break;
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:    Window,
    canvas:    PixelCanvas,
    sim_board: Arc<Mutex<SimPose>>,
}

impl Visualizer {
    pub fn new(
        width: usize,
        height: usize,
        sim_board: Arc<Mutex<SimPose>>,
    ) -> anyhow::Result<Self> {
        let mut window = Window::new(
            "Gesture Field — motion-driven particles",
            width,
            height,
            WindowOptions {
                resize: true,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| anyhow::anyhow!("failed to open window: {}", e))?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            canvas: PixelCanvas::new(width, height),
            sim_board,
        })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Match the canvas to the current window size and report it.  The
    /// caller rebuilds viewport-dependent state when the size changed.
    pub fn sync_size(&mut self) -> (usize, usize) {
        let (w, h) = self.window.get_size();
        if w != self.canvas.width() || h != self.canvas.height() {
            self.canvas.resize(w.max(1), h.max(1));
        }
        (self.canvas.width(), self.canvas.height())
    }

    pub fn canvas_mut(&mut self) -> &mut PixelCanvas {
        &mut self.canvas
    }

    /// Poll keyboard input, updating the simulated pose board.
    /// Returns false when the user asked to quit.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() {
            return false;
        }

        let pressed = |w: &Window, k: Key| w.is_key_pressed(k, KeyRepeat::No);

        if pressed(&self.window, Key::Q) || pressed(&self.window, Key::Escape) {
            return false;
        }

        let pose = if pressed(&self.window, Key::P) {
            Some(SimPose::Point)
        } else if pressed(&self.window, Key::O) {
            Some(SimPose::Open)
        } else if pressed(&self.window, Key::F) {
            Some(SimPose::Fist)
        } else if pressed(&self.window, Key::T) {
            Some(SimPose::Thumbs)
        } else if pressed(&self.window, Key::H) {
            Some(SimPose::Heart)
        } else if pressed(&self.window, Key::Y) {
            Some(SimPose::TrianglePair)
        } else if pressed(&self.window, Key::U) {
            Some(SimPose::Square)
        } else if pressed(&self.window, Key::N) {
            Some(SimPose::NoHands)
        } else {
            None
        };

        if let Some(p) = pose {
            if let Ok(mut board) = self.sim_board.lock() {
                log::info!("sim pose: {:?}", p);
                *board = p;
            }
        }

        true
    }

    /// Draw the status bar + key legend and push the frame.
    pub fn present(&mut self, status: &str) {
        let h = self.canvas.height();
        let w = self.canvas.width();
        if h > STATUS_H {
            self.canvas.fill_rect(0, h - STATUS_H, w, STATUS_H, STATUS_BG);
            self.canvas.draw_label(status, 8, h - STATUS_H + 5, STATUS_FG);
            self.canvas.draw_label(
                "p=point o=open f=fist t=thumbs h=heart y=triangle u=square n=none q=quit",
                8,
                h - 11,
                LEGEND_FG,
            );
        }
        self.window
            .update_with_buffer(self.canvas.buffer(), w, h)
            .ok();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
