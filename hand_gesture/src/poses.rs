//! Canonical synthetic hand poses.
//!
//! Used by the keyboard simulator (to stand in for a real landmark
//! detector) and by the tests.  Coordinates are normalized with y growing
//! downward and assume the mirrored front-camera convention, matching
//! [`finger_flags`](crate::finger_flags) with `mirrored = true`.

use crate::{FingerFlags, HandLandmarks, Landmark};

/// Build a synthetic hand showing the given finger-extension flags.
///
/// Joint placement is schematic, not anatomical: each finger is a column
/// of landmarks whose tip is raised above the PIP joint when extended,
/// and the thumb tip is pulled left of its IP joint (and well above the
/// wrist) when extended.
pub fn hand(flags: FingerFlags) -> HandLandmarks {
    let mut pts = [Landmark::default(); 21];
    let p = |x: f32, y: f32| Landmark { x, y };

    pts[HandLandmarks::WRIST] = p(0.50, 0.80);

    // Thumb: CMC, MCP, IP, TIP.
    pts[1] = p(0.42, 0.74);
    pts[2] = p(0.40, 0.68);
    pts[3] = p(0.38, 0.64);
    pts[4] = if flags.thumb { p(0.32, 0.60) } else { p(0.42, 0.66) };

    // Four fingers: MCP, PIP, DIP, TIP columns.
    let fingers = [
        (5, 0.44, flags.index),
        (9, 0.48, flags.middle),
        (13, 0.52, flags.ring),
        (17, 0.56, flags.pinky),
    ];
    for (base, x, extended) in fingers {
        pts[base]     = p(x, 0.62);
        pts[base + 1] = p(x, 0.54);
        pts[base + 2] = p(x, 0.47);
        pts[base + 3] = if extended { p(x, 0.40) } else { p(x, 0.60) };
    }

    HandLandmarks(pts)
}

fn flags(thumb: bool, index: bool, middle: bool, ring: bool, pinky: bool) -> FingerFlags {
    FingerFlags { thumb, index, middle, ring, pinky }
}

/// Index finger only.
pub fn point() -> Vec<HandLandmarks> {
    vec![hand(flags(false, true, false, false, false))]
}

/// Four fingers extended, thumb tucked.
pub fn open() -> Vec<HandLandmarks> {
    vec![hand(flags(false, true, true, true, true))]
}

/// Everything curled.
pub fn fist() -> Vec<HandLandmarks> {
    vec![hand(flags(false, false, false, false, false))]
}

/// Thumb alone, tip raised well above the wrist.
pub fn thumbs_up() -> Vec<HandLandmarks> {
    vec![hand(flags(true, false, false, false, false))]
}

/// Exactly index + middle.
pub fn heart() -> Vec<HandLandmarks> {
    vec![hand(flags(false, true, true, false, false))]
}

/// All five fingers extended.
pub fn square() -> Vec<HandLandmarks> {
    vec![hand(flags(true, true, true, true, true))]
}

/// Two hands, each pinching thumb + index.
pub fn triangle_pair() -> Vec<HandLandmarks> {
    let pinch = flags(true, true, false, false, false);
    let left = hand(pinch);
    let mut right = hand(pinch);
    for pt in right.0.iter_mut() {
        pt.x += 0.25;
    }
    vec![left, right]
}
