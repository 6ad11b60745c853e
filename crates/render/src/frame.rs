use std::f32::consts::{PI, TAU};

use glam::{Mat3, Mat4, Vec2, Vec3};

use crate::stack::MatrixStack;

/// Vertical field of view in radians (28°).
const FOV: f32 = 28.0 * (PI / 180.0);
const NEAR: f32 = 0.1;
const FAR: f32 = 500.0;

/// Angular rate of the tumbling rotation, radians per second.
const ROTATION_RATE: f32 = 0.17;

/// Fixed tilt applied to both pyramids before the tumble.
const BASE_TILT: f32 = -0.5;

/// The point light's position in world space. It is transformed by the
/// view matrix each frame, so it rides along with the camera's view
/// transform rather than staying put in the world. Intentional.
const LIGHT_POSITION: Vec3 = Vec3::new(-4.2, 1.0, 0.0);

const AMBIENT_COLOR: Vec3 = Vec3::new(0.123, 0.154, 0.182);
const LIGHT_COLOR: Vec3 = Vec3::new(1.0, 0.796, 0.671);

const ORNAMENT_SCALE: f32 = 0.3;
const CUBE_SCALE: f32 = 0.2;
const CUBE_OFFSET: Vec3 = Vec3::new(-5.0, 1.0, 0.0);

/// Which uploaded mesh a draw command refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshId {
    /// The fractal pyramid, non-indexed triangles.
    Fractal,
    /// The light-marker cube, drawn through its index buffer.
    LightMarker,
}

/// One draw: a mesh plus the matrices the shading stage needs for it.
#[derive(Debug, Clone, Copy)]
pub struct DrawCommand {
    pub mesh: MeshId,
    pub model_view: Mat4,
    /// Inverse-transpose of the model-view upper 3×3, so lighting stays
    /// correct under the ornament's non-uniform-looking scale.
    pub normal_matrix: Mat3,
}

/// Everything a backend needs to render one frame.
#[derive(Debug, Clone)]
pub struct FramePlan {
    pub projection: Mat4,
    pub ambient_color: Vec3,
    /// Light position already transformed into view space.
    pub light_position: Vec3,
    pub light_color: Vec3,
    pub viewport: Vec2,
    pub draws: Vec<DrawCommand>,
}

/// Per-frame orchestration: projection, animation time, model placement.
#[derive(Debug, Default)]
pub struct FrameComposer {
    rotation: f32,
}

impl FrameComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current tumble angle in radians, wrapped at 2π.
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Compose the next frame.
    ///
    /// The projection aspect is rebuilt from the viewport every call so
    /// resizes take effect on the next frame. `depth` only gates the
    /// ornament draw; mesh contents are the backend's concern.
    pub fn compose(&mut self, view: Mat4, viewport: Vec2, depth: u8, dt: f32) -> FramePlan {
        let aspect = viewport.x / viewport.y.max(1.0);
        let projection = Mat4::perspective_rh(FOV, aspect, NEAR, FAR);

        self.rotation += ROTATION_RATE * dt;
        if self.rotation > TAU {
            self.rotation = 0.0;
        }
        let rotation = self.rotation;

        let light_position = view.transform_point3(LIGHT_POSITION);

        let mut stack = MatrixStack::new();
        let mut draws = Vec::with_capacity(3);

        // Primary pyramid: fixed tilt plus the tumble, opposing signs on
        // two axes.
        stack.push();
        stack.rotate(BASE_TILT, Vec3::Y);
        stack.rotate(-rotation, Vec3::Y);
        stack.rotate(rotation, Vec3::Z);
        stack.rotate(-rotation, Vec3::X);
        draws.push(command(MeshId::Fractal, view, stack.current()));
        stack.pop();

        // Ornament: a scaled-down copy tumbling the opposite way. At
        // depth 0 the two would z-fight inside one another, so it is
        // skipped.
        if depth != 0 {
            stack.push();
            stack.scale(Vec3::splat(ORNAMENT_SCALE));
            stack.rotate(BASE_TILT, Vec3::Y);
            stack.rotate(rotation, Vec3::Y);
            stack.rotate(-rotation, Vec3::Z);
            stack.rotate(rotation, Vec3::X);
            draws.push(command(MeshId::Fractal, view, stack.current()));
            stack.pop();
        }

        // Light-marker cube at the light's world offset.
        stack.push();
        stack.scale(Vec3::splat(CUBE_SCALE));
        stack.translate(CUBE_OFFSET);
        draws.push(command(MeshId::LightMarker, view, stack.current()));
        stack.pop();

        debug_assert!(stack.is_balanced(), "matrix stack unbalanced at frame end");
        if !stack.is_balanced() {
            tracing::error!(depth = stack.depth(), "matrix stack unbalanced at frame end");
        }

        FramePlan {
            projection,
            ambient_color: AMBIENT_COLOR,
            light_position,
            light_color: LIGHT_COLOR,
            viewport,
            draws,
        }
    }
}

fn command(mesh: MeshId, view: Mat4, model: Mat4) -> DrawCommand {
    let model_view = view * model;
    DrawCommand {
        mesh,
        model_view,
        normal_matrix: Mat3::from_mat4(model_view).inverse().transpose(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan_at(depth: u8, dt: f32) -> (FrameComposer, FramePlan) {
        let mut composer = FrameComposer::new();
        let view = Mat4::look_at_rh(Vec3::new(-8.0, 0.9, 0.0), Vec3::ZERO, Vec3::Y);
        let plan = composer.compose(view, Vec2::new(1280.0, 720.0), depth, dt);
        (composer, plan)
    }

    #[test]
    fn draw_list_skips_the_ornament_at_depth_zero() {
        let (_, plan) = plan_at(0, 0.016);
        assert_eq!(plan.draws.len(), 2);
        assert_eq!(plan.draws[0].mesh, MeshId::Fractal);
        assert_eq!(plan.draws[1].mesh, MeshId::LightMarker);

        let (_, plan) = plan_at(3, 0.016);
        assert_eq!(plan.draws.len(), 3);
        assert_eq!(plan.draws[1].mesh, MeshId::Fractal);
    }

    #[test]
    fn rotation_accumulates_and_wraps() {
        let mut composer = FrameComposer::new();
        let view = Mat4::IDENTITY;
        let viewport = Vec2::new(100.0, 100.0);

        composer.compose(view, viewport, 1, 1.0);
        assert!((composer.rotation() - ROTATION_RATE).abs() < 1e-6);

        // Push past 2π; the accumulator resets to zero.
        for _ in 0..40 {
            composer.compose(view, viewport, 1, 1.0);
        }
        assert!(composer.rotation() < TAU);
        assert!(composer.rotation() >= 0.0);
    }

    #[test]
    fn first_frame_with_zero_dt_does_not_advance_animation() {
        let (composer, _) = plan_at(2, 0.0);
        assert_eq!(composer.rotation(), 0.0);
    }

    #[test]
    fn light_is_transformed_into_view_space() {
        let view = Mat4::from_translation(Vec3::new(0.0, 0.0, -10.0));
        let mut composer = FrameComposer::new();
        let plan = composer.compose(view, Vec2::new(640.0, 480.0), 2, 0.016);
        assert_eq!(plan.light_position, Vec3::new(-4.2, 1.0, -10.0));
    }

    #[test]
    fn normal_matrix_is_the_inverse_transpose_of_model_view() {
        let (_, plan) = plan_at(2, 0.016);
        for draw in &plan.draws {
            let expected = Mat3::from_mat4(draw.model_view).inverse().transpose();
            assert!((draw.normal_matrix.x_axis - expected.x_axis).length() < 1e-6);
            assert!((draw.normal_matrix.y_axis - expected.y_axis).length() < 1e-6);
            assert!((draw.normal_matrix.z_axis - expected.z_axis).length() < 1e-6);
        }
    }

    #[test]
    fn projection_tracks_the_viewport_aspect() {
        let mut composer = FrameComposer::new();
        let wide = composer.compose(Mat4::IDENTITY, Vec2::new(1600.0, 800.0), 1, 0.0);
        let tall = composer.compose(Mat4::IDENTITY, Vec2::new(800.0, 1600.0), 1, 0.0);
        // x-scale of a perspective matrix is f / aspect.
        assert!(wide.projection.x_axis.x < tall.projection.x_axis.x);
        assert!(wide.projection.is_finite());
    }
}
