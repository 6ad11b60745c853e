//! Fractal geometry: recursive Sierpinski tetrahedron subdivision and the
//! static light-marker cube.
//!
//! # Invariants
//! - Generated buffers are parallel: `positions/3 == normals/3 == colors/4`.
//! - Triangles are wound counter-clockwise as seen from outside the solid.
//! - Generation is a pure function of (depth, normal mode); no shared state.

pub mod cube;
pub mod fractal;

pub use cube::{IndexedMesh, light_marker_cube};
pub use fractal::{DepthOutOfRange, MeshBuffers, NormalMode, SubdivisionDepth, face_normal, generate};
