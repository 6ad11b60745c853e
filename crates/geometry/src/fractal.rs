use glam::Vec3;
use thiserror::Error;

/// Maximum number of recursive subdivisions. Depth 7 already emits
/// 4^8 = 65536 triangles; anything beyond stops being interactive.
pub const MAX_DEPTH: u8 = 7;

/// Subdivision depth attempted outside `0..=MAX_DEPTH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("subdivision depth {0} exceeds maximum {MAX_DEPTH}")]
pub struct DepthOutOfRange(pub u8);

/// Bounded subdivision depth in `0..=MAX_DEPTH`.
///
/// Stepping up or down saturates at the bounds, so repeated clicks past
/// either end are no-ops rather than errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubdivisionDepth(u8);

impl SubdivisionDepth {
    pub const MIN: Self = Self(0);
    pub const MAX: Self = Self(MAX_DEPTH);

    pub fn new(depth: u8) -> Result<Self, DepthOutOfRange> {
        if depth > MAX_DEPTH {
            return Err(DepthOutOfRange(depth));
        }
        Ok(Self(depth))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// One step finer, capped at `MAX_DEPTH`.
    pub fn increased(self) -> Self {
        Self((self.0 + 1).min(MAX_DEPTH))
    }

    /// One step coarser, floored at zero.
    pub fn decreased(self) -> Self {
        Self(self.0.saturating_sub(1))
    }
}

impl Default for SubdivisionDepth {
    fn default() -> Self {
        Self(2)
    }
}

/// How per-vertex normals are derived from face normals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalMode {
    /// Every vertex of a face carries that face's normal. Faceted look.
    #[default]
    Flat,
    /// Each vertex carries the normalized average of the normals of its
    /// three adjacent faces within one tetrahedron. Rounded look.
    Smooth,
}

/// Flat, parallel vertex attribute arrays ready for upload.
///
/// Positions and normals are 3 floats per vertex, colors 4. Vertices are
/// grouped in triangles of three; there is no index buffer.
#[derive(Debug, Clone, Default)]
pub struct MeshBuffers {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub colors: Vec<f32>,
}

impl MeshBuffers {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.vertex_count() / 3
    }
}

/// One recursion unit: four corners with their corner colors. Exists only
/// during generation.
#[derive(Debug, Clone, Copy)]
struct Tetrahedron {
    points: [Vec3; 4],
    colors: [Vec3; 4],
}

/// The base solid: a regular tetrahedron of circumradius-ish dimension 3,
/// apex up, one corner toward +X.
fn base_tetrahedron() -> Tetrahedron {
    let b = 3.0_f32;
    let c = b * 2.0_f32.sqrt() * 2.0 / 3.0;
    let d = -b / 3.0;
    let e = -b * 2.0_f32.sqrt() / 3.0;
    let f = b * 2.0_f32.sqrt() / 3.0_f32.sqrt();

    Tetrahedron {
        points: [
            Vec3::new(0.0, b, 0.0),
            Vec3::new(c, d, 0.0),
            Vec3::new(e, d, f),
            Vec3::new(e, d, -f),
        ],
        colors: [
            Vec3::new(0.212, 0.816, 0.678),
            Vec3::new(0.267, 0.498, 0.820),
            Vec3::new(1.0, 0.722, 0.259),
            Vec3::new(1.0, 0.541, 0.259),
        ],
    }
}

/// Generate the fractal mesh for the given depth.
///
/// Pure function of its arguments: depth 0 emits the base tetrahedron's
/// four faces; each further level splits every tetrahedron into four
/// children at the edge midpoints, so the output holds `4^(depth+1)`
/// triangles.
pub fn generate(depth: SubdivisionDepth, mode: NormalMode) -> MeshBuffers {
    let mut out = MeshBuffers::default();
    subdivide(&base_tetrahedron(), depth.get(), mode, &mut out);
    out
}

fn subdivide(tetra: &Tetrahedron, count: u8, mode: NormalMode, out: &mut MeshBuffers) {
    if count == 0 {
        emit_tetrahedron(tetra, mode, out);
        return;
    }

    let [p1, p2, p3, p4] = tetra.points;
    let [c1, c2, c3, c4] = tetra.colors;

    // Midpoints of the six edges. Colors interpolate the same way: a raw
    // component average, not gamma-correct.
    let p12 = p1.midpoint(p2);
    let p13 = p1.midpoint(p3);
    let p14 = p1.midpoint(p4);
    let p23 = p2.midpoint(p3);
    let p24 = p2.midpoint(p4);
    let p34 = p3.midpoint(p4);

    let c12 = c1.midpoint(c2);
    let c13 = c1.midpoint(c3);
    let c14 = c1.midpoint(c4);
    let c23 = c2.midpoint(c3);
    let c24 = c2.midpoint(c4);
    let c34 = c3.midpoint(c4);

    // One child per parent corner; the central octahedron is left empty,
    // which is what makes the solid a Sierpinski fractal.
    let children = [
        Tetrahedron { points: [p1, p12, p13, p14], colors: [c1, c12, c13, c14] },
        Tetrahedron { points: [p12, p2, p23, p24], colors: [c12, c2, c23, c24] },
        Tetrahedron { points: [p13, p23, p3, p34], colors: [c13, c23, c3, c34] },
        Tetrahedron { points: [p14, p24, p34, p4], colors: [c14, c24, c34, c4] },
    ];

    for child in &children {
        subdivide(child, count - 1, mode, out);
    }
}

/// Emit one tetrahedron as four triangular faces.
fn emit_tetrahedron(tetra: &Tetrahedron, mode: NormalMode, out: &mut MeshBuffers) {
    let [p1, p2, p3, p4] = tetra.points;
    let [c1, c2, c3, c4] = tetra.colors;

    // Face point order is paired with a color order that does not match it
    // for the right and bottom faces. Kept as-is: it is part of the look.
    let n1 = emit_face(p1, p2, p3, c1, c2, c3, mode, out); // front
    let n2 = emit_face(p1, p4, p2, c1, c2, c4, mode, out); // right
    let n3 = emit_face(p1, p3, p4, c1, c3, c4, mode, out); // left
    let n4 = emit_face(p2, p4, p3, c2, c3, c4, mode, out); // bottom

    if mode == NormalMode::Smooth {
        // One normal per emitted vertex, in emission order: the normalized
        // average of the three face normals adjacent to that corner.
        let vertex_normals = [
            averaged(n1, n3, n4), // p3
            averaged(n1, n4, n2), // p2
            averaged(n1, n2, n3), // p1
            averaged(n1, n4, n2), // p2
            averaged(n2, n4, n3), // p4
            averaged(n1, n2, n3), // p1
            averaged(n2, n4, n3), // p4
            averaged(n1, n3, n4), // p3
            averaged(n1, n2, n3), // p1
            averaged(n1, n3, n4), // p3
            averaged(n2, n4, n3), // p4
            averaged(n1, n4, n2), // p2
        ];
        for normal in vertex_normals {
            out.normals.extend_from_slice(&normal.to_array());
        }
    }
}

/// Emit one face, vertices reversed (3, 2, 1) so the front is
/// counter-clockwise as seen from outside. Returns the face normal.
fn emit_face(
    p1: Vec3,
    p2: Vec3,
    p3: Vec3,
    c1: Vec3,
    c2: Vec3,
    c3: Vec3,
    mode: NormalMode,
    out: &mut MeshBuffers,
) -> Vec3 {
    for point in [p3, p2, p1] {
        out.positions.extend_from_slice(&point.to_array());
    }
    for color in [c3, c2, c1] {
        out.colors.extend_from_slice(&[color.x, color.y, color.z, 1.0]);
    }

    let normal = face_normal(p1, p2, p3);
    if mode == NormalMode::Flat {
        for _ in 0..3 {
            out.normals.extend_from_slice(&normal.to_array());
        }
    }
    normal
}

/// Unit normal of the triangle `(p1, p2, p3)`, pointing out of a face
/// whose front is the reversed (3, 2, 1) winding.
///
/// Degenerate (collinear) input yields a zero vector rather than NaN;
/// shading silently flattens there instead of crashing.
pub fn face_normal(p1: Vec3, p2: Vec3, p3: Vec3) -> Vec3 {
    let normal = (p3 - p1).cross(p2 - p1);
    if normal.length_squared() == 0.0 {
        Vec3::ZERO
    } else {
        normal.normalize()
    }
}

fn averaged(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    let mean = (a + b + c) / 3.0;
    if mean.length_squared() == 0.0 {
        Vec3::ZERO
    } else {
        mean.normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn depth(d: u8) -> SubdivisionDepth {
        SubdivisionDepth::new(d).unwrap()
    }

    #[test]
    fn depth_bounds() {
        assert!(SubdivisionDepth::new(7).is_ok());
        assert_eq!(SubdivisionDepth::new(8), Err(DepthOutOfRange(8)));
        assert_eq!(SubdivisionDepth::MAX.increased(), SubdivisionDepth::MAX);
        assert_eq!(SubdivisionDepth::MIN.decreased(), SubdivisionDepth::MIN);
        assert_eq!(depth(2).increased().get(), 3);
        assert_eq!(depth(2).decreased().get(), 1);
    }

    #[test]
    fn buffers_are_parallel_and_grow_four_to_the_depth_plus_one() {
        // 4^d tetrahedra, 4 faces each, 3 vertices per face: the triangle
        // count is 4^(d+1) and the vertex count 3 * 4^(d+1).
        for d in 0..=MAX_DEPTH {
            let mesh = generate(depth(d), NormalMode::Flat);
            let expected_triangles = 4_usize.pow(u32::from(d) + 1);

            assert_eq!(mesh.triangle_count(), expected_triangles, "depth {d}");
            assert_eq!(mesh.positions.len() % 9, 0);
            assert_eq!(mesh.vertex_count(), mesh.normals.len() / 3);
            assert_eq!(mesh.vertex_count(), mesh.colors.len() / 4);
        }
    }

    #[test]
    fn depth_zero_is_the_bare_tetrahedron() {
        let mesh = generate(depth(0), NormalMode::Flat);
        assert_eq!(mesh.triangle_count(), 4);
        assert_eq!(mesh.vertex_count(), 12);
    }

    #[test]
    fn smooth_mode_fills_the_same_number_of_normals() {
        let flat = generate(depth(1), NormalMode::Flat);
        let smooth = generate(depth(1), NormalMode::Smooth);
        assert_eq!(flat.normals.len(), smooth.normals.len());
        assert_eq!(flat.positions, smooth.positions);
        assert_eq!(flat.colors, smooth.colors);
    }

    #[test]
    fn smooth_normals_are_unit_length() {
        let mesh = generate(depth(0), NormalMode::Smooth);
        for normal in mesh.normals.chunks_exact(3) {
            let length = (normal[0] * normal[0] + normal[1] * normal[1] + normal[2] * normal[2]).sqrt();
            assert!((length - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn smooth_normals_average_each_corners_adjacent_faces() {
        let mesh = generate(depth(0), NormalMode::Smooth);

        let tetra = base_tetrahedron();
        let [p1, p2, p3, p4] = tetra.points;
        let faces = [
            face_normal(p1, p2, p3), // front
            face_normal(p1, p4, p2), // right
            face_normal(p1, p3, p4), // left
            face_normal(p2, p4, p3), // bottom
        ];
        // Faces adjacent to each corner, indexed like `points`.
        let adjacent = [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];

        for (i, (position, normal)) in mesh
            .positions
            .chunks_exact(3)
            .zip(mesh.normals.chunks_exact(3))
            .enumerate()
        {
            let position = Vec3::new(position[0], position[1], position[2]);
            let normal = Vec3::new(normal[0], normal[1], normal[2]);
            let corner = tetra
                .points
                .iter()
                .position(|p| (*p - position).length() < 1e-5)
                .unwrap();
            let [a, b, c] = adjacent[corner];
            let expected = averaged(faces[a], faces[b], faces[c]);
            assert!(
                (normal - expected).length() < 1e-5,
                "vertex {i} (corner {corner}): normal {normal}, expected {expected}"
            );
        }
    }

    #[test]
    fn flat_normals_are_unit_and_face_outward() {
        // Depth 0 front face lies in the z > 0 half and should face +Z-ish;
        // every flat normal must be unit length.
        let mesh = generate(depth(0), NormalMode::Flat);
        for normal in mesh.normals.chunks_exact(3) {
            let length = (normal[0] * normal[0] + normal[1] * normal[1] + normal[2] * normal[2]).sqrt();
            assert!((length - 1.0).abs() < 1e-5);
        }
        // First emitted face is the front face.
        assert!(mesh.normals[2] > 0.0, "front face normal should point toward +Z");
    }

    #[test]
    fn face_normal_is_scale_invariant() {
        let p1 = Vec3::new(0.0, 0.0, 0.0);
        let p2 = Vec3::new(1.0, 0.0, 0.0);
        let p3 = Vec3::new(0.0, 1.0, 0.0);

        let base = face_normal(p1, p2, p3);

        let centroid = (p1 + p2 + p3) / 3.0;
        let scale = |p: Vec3| centroid + (p - centroid) * 7.5;
        let scaled = face_normal(scale(p1), scale(p2), scale(p3));

        assert!((base - scaled).length() < 1e-5);
        assert!((base.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_face_normal_is_zero() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(face_normal(p, p, p), Vec3::ZERO);

        // Collinear points too.
        let a = Vec3::ZERO;
        let b = Vec3::new(1.0, 1.0, 1.0);
        let c = Vec3::new(2.0, 2.0, 2.0);
        assert_eq!(face_normal(a, b, c), Vec3::ZERO);
    }

    #[test]
    fn click_sequences_cap_and_floor() {
        // One step up from the default depth 2 regenerates with 4^4
        // triangles; five steps down from 2 floor at 0 (the last three are
        // no-ops) and regenerate with 4 triangles.
        let mut d = depth(2);
        d = d.increased();
        assert_eq!(d.get(), 3);
        assert_eq!(generate(d, NormalMode::Flat).triangle_count(), 256);

        let mut d = depth(2);
        for _ in 0..5 {
            d = d.decreased();
        }
        assert_eq!(d, SubdivisionDepth::MIN);
        assert_eq!(generate(d, NormalMode::Flat).triangle_count(), 4);
    }
}
