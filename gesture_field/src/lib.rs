//! # gesture_field
//!
//! Real-time particle field driven by a live video feed.  Raw pixel change
//! (via `motion_grid`) spawns particles, and debounced hand gestures (via
//! `hand_gesture`) reshape the field toward attractor geometries.
//!
//! ## Gesture → attractor mapping
//!
//! | Gesture | Attractor set |
//! |---|---|
//! | Scatter | live motion cells (free flow) |
//! | Open | live motion cells, doubled jitter |
//! | Point | single center point, tight slow convergence |
//! | Fist | corners of a centered square, fast settling |
//! | Square | square outline + edge midpoints |
//! | Triangle | triangle vertices + swirl around the center |
//! | Thumbs | word silhouette rasterized from the bitmap font |
//! | Heart | implicit heart-curve point cloud |
//!
//! ## Modes
//!
//! The landmark detector and the camera are external collaborators; this
//! crate ships a keyboard simulator (pose keys drive synthetic landmark
//! sets) and two frame sources (a deterministic synthetic blob and an
//! image-folder playback via the `image` crate).
//!
//! ### Simulation keyboard shortcuts
//!
//! | Key | Pose |
//! |---|---|
//! | `P` | point |
//! | `O` | open |
//! | `F` | fist |
//! | `T` | thumbs-up |
//! | `H` | heart |
//! | `Y` | triangle (two hands) |
//! | `U` | square |
//! | `N` | no hands |
//! | `Q` / `Escape` | quit |

pub mod app;
pub mod attractor;
pub mod font;
pub mod particle;
pub mod source;
pub mod visualizer;
