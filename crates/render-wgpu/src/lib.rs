//! wgpu render backend for the pyramid scene.
//!
//! Consumes the frame plans composed by `sierpinski-render` and the mesh
//! buffers produced by `sierpinski-geometry`; owns every GPU resource.
//!
//! # Invariants
//! - The fractal vertex buffer is replaced wholesale on depth change,
//!   never mutated in place; in-flight draws keep the old buffer alive.
//! - Uniforms are re-uploaded per draw; draw order follows the plan.

mod gpu;
mod shaders;

pub use gpu::PyramidRenderer;
