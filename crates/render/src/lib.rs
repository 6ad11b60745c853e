//! Frame composition: the GPU-agnostic half of the render pipeline.
//!
//! Each frame this crate turns (view matrix, viewport, depth, elapsed
//! time) into a [`FramePlan`]: the projection and lighting uniforms plus
//! an ordered list of draw commands with their model-view and normal
//! matrices. A backend then uploads and draws; nothing here touches a
//! device, so all of it is unit-testable.
//!
//! # Invariants
//! - The matrix stack is balanced at the end of every composed frame;
//!   imbalance is a programming error, asserted in development.
//! - Draw order is fixed: primary pyramid, ornament (depth ≠ 0), cube.

pub mod frame;
pub mod stack;

pub use frame::{DrawCommand, FrameComposer, FramePlan, MeshId};
pub use stack::MatrixStack;
