//! # hand_gesture
//!
//! Turns noisy per-frame hand-landmark input into a stable discrete
//! gesture state.
//!
//! The input contract is the standard 21-point hand model: an ordered
//! array of normalized (x, y) landmarks per detected hand, 0–2 hands per
//! frame, produced by an external detector.  Per hand we derive five
//! finger-extension flags, classify a [`Gesture`] by precedence, and feed
//! the result into a [`GestureClassifier`] that debounces transitions via
//! a confidence accumulator — a single mismatched frame never flips the
//! visible state.
//!
//! ## Gesture → meaning
//!
//! | Gesture | Hand pose |
//! |---|---|
//! | `Thumbs` | thumb alone extended, tip well above the wrist |
//! | `Heart` | exactly index + middle extended |
//! | `Triangle` | two hands, each pinching (thumb + index only) |
//! | `Square` | any hand with all five fingers extended |
//! | `Point` | only index extended |
//! | `Open` | four or more fingers extended |
//! | `Fist` | at most one finger extended |
//! | `Scatter` | anything else, and the no-hands resting state |

pub mod poses;

// ════════════════════════════════════════════════════════════════════════════
// Landmarks
// ════════════════════════════════════════════════════════════════════════════

/// One normalized landmark point (0.0–1.0 in both axes, y grows downward).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

/// The ordered 21-point landmark set for one detected hand.
#[derive(Clone, Copy, Debug)]
pub struct HandLandmarks(pub [Landmark; 21]);

impl HandLandmarks {
    pub const WRIST:      usize = 0;
    pub const THUMB_IP:   usize = 3;
    pub const THUMB_TIP:  usize = 4;
    pub const INDEX_PIP:  usize = 6;
    pub const INDEX_TIP:  usize = 8;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_PIP:   usize = 14;
    pub const RING_TIP:   usize = 16;
    pub const PINKY_PIP:  usize = 18;
    pub const PINKY_TIP:  usize = 20;

    pub fn point(&self, idx: usize) -> Landmark {
        self.0[idx]
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Finger extension flags
// ════════════════════════════════════════════════════════════════════════════

/// Per-finger extension test results for one hand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FingerFlags {
    pub thumb:  bool,
    pub index:  bool,
    pub middle: bool,
    pub ring:   bool,
    pub pinky:  bool,
}

impl FingerFlags {
    pub fn count(&self) -> usize {
        [self.thumb, self.index, self.middle, self.ring, self.pinky]
            .iter()
            .filter(|&&f| f)
            .count()
    }
}

/// Derive extension flags from a hand's landmarks.
///
/// The thumb test compares tip x against the IP joint x and assumes a
/// horizontally mirrored, front-facing camera feed; pass
/// `mirrored = false` to flip the comparison for an unmirrored feed.
/// The other four fingers count as extended when the tip sits higher on
/// screen (smaller y) than the corresponding PIP joint.
pub fn finger_flags(hand: &HandLandmarks, mirrored: bool) -> FingerFlags {
    let tip = hand.point(HandLandmarks::THUMB_TIP);
    let ip = hand.point(HandLandmarks::THUMB_IP);
    let thumb = if mirrored { tip.x < ip.x } else { tip.x > ip.x };

    let up = |tip_idx: usize, pip_idx: usize| {
        hand.point(tip_idx).y < hand.point(pip_idx).y
    };

    FingerFlags {
        thumb,
        index:  up(HandLandmarks::INDEX_TIP, HandLandmarks::INDEX_PIP),
        middle: up(HandLandmarks::MIDDLE_TIP, HandLandmarks::MIDDLE_PIP),
        ring:   up(HandLandmarks::RING_TIP, HandLandmarks::RING_PIP),
        pinky:  up(HandLandmarks::PINKY_TIP, HandLandmarks::PINKY_PIP),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Gesture
// ════════════════════════════════════════════════════════════════════════════

/// The discrete gesture vocabulary.  `Scatter` doubles as the resting
/// state when no hands are visible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Gesture {
    Scatter,
    Point,
    Open,
    Fist,
    Triangle,
    Square,
    Thumbs,
    Heart,
}

impl Gesture {
    pub fn name(&self) -> &'static str {
        match self {
            Gesture::Scatter  => "scatter",
            Gesture::Point    => "point",
            Gesture::Open     => "open",
            Gesture::Fist     => "fist",
            Gesture::Triangle => "triangle",
            Gesture::Square   => "square",
            Gesture::Thumbs   => "thumbs",
            Gesture::Heart    => "heart",
        }
    }
}

/// Minimum normalized height of the thumb tip above the wrist for a
/// thumbs-up.
const THUMBS_LIFT: f32 = 0.05;

/// Classify the raw gesture shown by this frame's hands.
///
/// Precedence, first match wins: thumbs → heart → triangle → square →
/// single-hand fallback on the first hand.  Returns `Scatter` when no
/// rule matches.  An empty slice is the caller's concern (see
/// [`GestureClassifier::observe`]).
pub fn classify(hands: &[HandLandmarks], mirrored: bool) -> Gesture {
    let flags: Vec<FingerFlags> = hands.iter().map(|h| finger_flags(h, mirrored)).collect();

    // Thumbs-up: thumb alone, tip clearly above the wrist.
    for (hand, f) in hands.iter().zip(&flags) {
        let lift = hand.point(HandLandmarks::WRIST).y - hand.point(HandLandmarks::THUMB_TIP).y;
        if f.thumb && f.count() == 1 && lift >= THUMBS_LIFT {
            return Gesture::Thumbs;
        }
    }

    // Heart: exactly index + middle.
    for f in &flags {
        if f.index && f.middle && !f.thumb && !f.ring && !f.pinky {
            return Gesture::Heart;
        }
    }

    // Triangle: two hands, each pinching thumb + index only.
    if flags.len() >= 2
        && flags
            .iter()
            .all(|f| f.thumb && f.index && !f.middle && !f.ring && !f.pinky)
    {
        return Gesture::Triangle;
    }

    // Square: any fully open hand.
    if flags.iter().any(|f| f.count() == 5) {
        return Gesture::Square;
    }

    // Fallback on the first hand.
    match flags.first() {
        Some(f) if f.index && f.count() == 1 => Gesture::Point,
        Some(f) if f.count() >= 4 => Gesture::Open,
        Some(f) if f.count() <= 1 => Gesture::Fist,
        _ => Gesture::Scatter,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureClassifier — confidence-debounced state machine
// ════════════════════════════════════════════════════════════════════════════

/// Tuning knobs for the debounce accumulator.
#[derive(Clone, Copy, Debug)]
pub struct ClassifierConfig {
    /// Confidence gained per frame that confirms the current state.
    pub gain:         f32,
    /// Confidence lost per frame that contradicts the current state.
    pub penalty:      f32,
    /// Confidence lost per frame with no hands visible.
    pub decay:        f32,
    /// State switches only once confidence falls below this.
    pub switch_floor: f32,
    /// Confidence re-seed after a switch, so one further mismatched frame
    /// cannot flip the state right back.
    pub reseed:       f32,
    /// Front-facing mirrored camera assumption for the thumb test.
    pub mirrored:     bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig {
            gain:         0.08,
            penalty:      0.1,
            decay:        0.05,
            switch_floor: 0.2,
            reseed:       0.3,
            mirrored:     true,
        }
    }
}

/// Debounced gesture state.
///
/// Raw per-frame classifications only reach the visible state once the
/// confidence in the current state has been worn down below the switch
/// floor, absorbing per-frame detector flicker.
pub struct GestureClassifier {
    config:           ClassifierConfig,
    state:            Gesture,
    confidence:       f32,
    last_change_tick: u64,
}

impl GestureClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        GestureClassifier {
            config,
            state: Gesture::Scatter,
            confidence: 0.0,
            last_change_tick: 0,
        }
    }

    pub fn state(&self) -> Gesture {
        self.state
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn last_change_tick(&self) -> u64 {
        self.last_change_tick
    }

    /// Feed one frame's worth of detected hands.
    pub fn observe(&mut self, hands: &[HandLandmarks], tick: u64) {
        let cfg = self.config;

        if hands.is_empty() {
            self.confidence = (self.confidence - cfg.decay).max(0.0);
            if self.confidence < cfg.switch_floor && self.state != Gesture::Scatter {
                self.switch_to(Gesture::Scatter, tick);
            }
            return;
        }

        let seen = classify(hands, cfg.mirrored);
        if seen == self.state {
            self.confidence = (self.confidence + cfg.gain).min(1.0);
        } else {
            self.confidence = (self.confidence - cfg.penalty).max(0.0);
            if self.confidence < cfg.switch_floor {
                self.switch_to(seen, tick);
                self.confidence = cfg.reseed;
            }
        }
    }

    fn switch_to(&mut self, next: Gesture, tick: u64) {
        log::info!("gesture: {} -> {} (tick {})", self.state.name(), next.name(), tick);
        self.state = next;
        self.last_change_tick = tick;
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        GestureClassifier::new(ClassifierConfig::default())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poses;

    #[test]
    fn pose_flags_match_intent() {
        let open = poses::open();
        let f = finger_flags(&open[0], true);
        assert!(!f.thumb && f.index && f.middle && f.ring && f.pinky);

        let fist = poses::fist();
        assert_eq!(finger_flags(&fist[0], true).count(), 0);
    }

    #[test]
    fn classify_each_canonical_pose() {
        assert_eq!(classify(&poses::point(), true), Gesture::Point);
        assert_eq!(classify(&poses::open(), true), Gesture::Open);
        assert_eq!(classify(&poses::fist(), true), Gesture::Fist);
        assert_eq!(classify(&poses::thumbs_up(), true), Gesture::Thumbs);
        assert_eq!(classify(&poses::heart(), true), Gesture::Heart);
        assert_eq!(classify(&poses::square(), true), Gesture::Square);
        assert_eq!(classify(&poses::triangle_pair(), true), Gesture::Triangle);
    }

    #[test]
    fn triangle_needs_two_hands() {
        let one = vec![poses::triangle_pair()[0]];
        assert_ne!(classify(&one, true), Gesture::Triangle);
    }

    #[test]
    fn unmirrored_feed_flips_thumb_test() {
        let hand = poses::thumbs_up();
        assert!(finger_flags(&hand[0], true).thumb);
        assert!(!finger_flags(&hand[0], false).thumb);
    }

    #[test]
    fn debounce_absorbs_single_mismatched_frame() {
        let mut cl = GestureClassifier::default();
        let open = poses::open();
        let fist = poses::fist();

        for t in 0..5 {
            cl.observe(&open, t);
        }
        assert_eq!(cl.state(), Gesture::Open);

        cl.observe(&fist, 5);
        assert_eq!(cl.state(), Gesture::Open, "one fist frame must not flip the state");

        let mut flipped_at = None;
        for t in 6..20 {
            cl.observe(&fist, t);
            if cl.state() == Gesture::Fist {
                flipped_at = Some(t);
                break;
            }
        }
        // 0.3 reseed + 4×0.08 gain = 0.62; five 0.1 penalties cross 0.2.
        assert_eq!(flipped_at, Some(9));
    }

    #[test]
    fn confidence_saturates_at_one() {
        let mut cl = GestureClassifier::default();
        let open = poses::open();
        for t in 0..100 {
            cl.observe(&open, t);
        }
        assert!(cl.confidence() <= 1.0);
        assert!(cl.confidence() > 0.99);
    }

    #[test]
    fn no_hands_decays_to_scatter() {
        let mut cl = GestureClassifier::default();
        let open = poses::open();
        for t in 0..10 {
            cl.observe(&open, t);
        }
        assert_eq!(cl.state(), Gesture::Open);

        let mut t = 10;
        while cl.state() == Gesture::Open {
            cl.observe(&[], t);
            t += 1;
            assert!(t < 100, "decay must eventually reset to scatter");
        }
        assert_eq!(cl.state(), Gesture::Scatter);
    }

    #[test]
    fn no_hands_on_fresh_classifier_stays_scatter() {
        let mut cl = GestureClassifier::default();
        for t in 0..50 {
            cl.observe(&[], t);
        }
        assert_eq!(cl.state(), Gesture::Scatter);
        assert_eq!(cl.confidence(), 0.0);
    }

    #[test]
    fn last_change_tick_records_switch() {
        let mut cl = GestureClassifier::default();
        cl.observe(&poses::point(), 7);
        assert_eq!(cl.state(), Gesture::Point);
        assert_eq!(cl.last_change_tick(), 7);
    }
}
