/// An indexed mesh: the same parallel attribute layout as the fractal
/// buffers plus a `u16` index list, for meshes with shared vertices.
#[derive(Debug, Clone)]
pub struct IndexedMesh {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub colors: Vec<f32>,
    pub indices: Vec<u16>,
}

impl IndexedMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }
}

/// The axis-aligned unit cube that marks the point light's position.
///
/// 24 vertices (4 per face, so each face keeps its own normal) and 36
/// indices. Generated once; it never changes. Every face is a muted
/// blue-gray except the +X face, which glows in the light's own color
/// since it faces the scene.
pub fn light_marker_cube() -> IndexedMesh {
    #[rustfmt::skip]
    let positions = vec![
        // Front face (+Z)
        -1.0, -1.0,  1.0,
         1.0, -1.0,  1.0,
         1.0,  1.0,  1.0,
        -1.0,  1.0,  1.0,
        // Back face (-Z)
        -1.0, -1.0, -1.0,
        -1.0,  1.0, -1.0,
         1.0,  1.0, -1.0,
         1.0, -1.0, -1.0,
        // Top face (+Y)
        -1.0,  1.0, -1.0,
        -1.0,  1.0,  1.0,
         1.0,  1.0,  1.0,
         1.0,  1.0, -1.0,
        // Bottom face (-Y)
        -1.0, -1.0, -1.0,
         1.0, -1.0, -1.0,
         1.0, -1.0,  1.0,
        -1.0, -1.0,  1.0,
        // Right face (+X)
         1.0, -1.0, -1.0,
         1.0,  1.0, -1.0,
         1.0,  1.0,  1.0,
         1.0, -1.0,  1.0,
        // Left face (-X)
        -1.0, -1.0, -1.0,
        -1.0, -1.0,  1.0,
        -1.0,  1.0,  1.0,
        -1.0,  1.0, -1.0,
    ];

    #[rustfmt::skip]
    let normals = vec![
         0.0,  0.0,  1.0,    0.0,  0.0,  1.0,    0.0,  0.0,  1.0,    0.0,  0.0,  1.0,
         0.0,  0.0, -1.0,    0.0,  0.0, -1.0,    0.0,  0.0, -1.0,    0.0,  0.0, -1.0,
         0.0,  1.0,  0.0,    0.0,  1.0,  0.0,    0.0,  1.0,  0.0,    0.0,  1.0,  0.0,
         0.0, -1.0,  0.0,    0.0, -1.0,  0.0,    0.0, -1.0,  0.0,    0.0, -1.0,  0.0,
         1.0,  0.0,  0.0,    1.0,  0.0,  0.0,    1.0,  0.0,  0.0,    1.0,  0.0,  0.0,
        -1.0,  0.0,  0.0,   -1.0,  0.0,  0.0,   -1.0,  0.0,  0.0,   -1.0,  0.0,  0.0,
    ];

    let body = [0.5, 0.5, 0.7, 1.0];
    let glow = [1.0, 0.796, 0.671, 1.0];
    let mut colors = Vec::with_capacity(24 * 4);
    for face in 0..6 {
        let color = if face == 4 { glow } else { body };
        for _ in 0..4 {
            colors.extend_from_slice(&color);
        }
    }

    #[rustfmt::skip]
    let indices = vec![
         0,  1,  2,    0,  2,  3, // Front
         4,  5,  6,    4,  6,  7, // Back
         8,  9, 10,    8, 10, 11, // Top
        12, 13, 14,   12, 14, 15, // Bottom
        16, 17, 18,   16, 18, 19, // Right
        20, 21, 22,   20, 22, 23, // Left
    ];

    IndexedMesh {
        positions,
        normals,
        colors,
        indices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_shared_index_layout() {
        let cube = light_marker_cube();
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.index_count(), 36);
        assert_eq!(cube.normals.len(), 24 * 3);
        assert_eq!(cube.colors.len(), 24 * 4);
        assert!(cube.indices.iter().all(|&i| usize::from(i) < 24));
    }

    #[test]
    fn only_the_light_facing_side_glows() {
        let cube = light_marker_cube();
        let glowing = cube
            .colors
            .chunks_exact(4)
            .filter(|c| c[0] == 1.0 && c[1] == 0.796)
            .count();
        assert_eq!(glowing, 4);
    }
}
