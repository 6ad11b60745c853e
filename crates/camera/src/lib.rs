//! Camera controller: a scripted dolly-in followed by free-look.
//!
//! # Invariants
//! - The Intro → Interactive transition is one-way and fires exactly once.
//! - `forward` stays unit length; yaw and pitch stay wrapped in [0, 2π).
//! - The capture/fallback sensitivity asymmetry is deliberate: captured
//!   deltas scale by frame time, fallback deltas by a fixed 0.35.

pub mod rig;

pub use rig::{CameraRig, Phase, WORLD_UP, clamp_pitch, wrap_angle};
