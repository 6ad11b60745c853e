use std::f32::consts::{PI, TAU};

use glam::{Mat4, Quat, Vec3};
use sierpinski_input::{InputState, MoveKey};

/// World-space up. The rig never rolls.
pub const WORLD_UP: Vec3 = Vec3::Y;

/// The fixed heading that yaw and pitch rotate away from.
const REFERENCE_FORWARD: Vec3 = Vec3::X;

/// Scripted pitch held during the intro dolly, in radians (354°).
const INTRO_PITCH: f32 = 354.0 * (PI / 180.0);

/// The intro ends the first time the camera's x coordinate reaches this.
const INTRO_END_X: f32 = -5.7;

/// Smoothed pointer deltas are interpreted as degrees.
const DELTA_TO_RADIANS: f32 = PI / 180.0;

/// Extra scale applied in fallback (uncaptured) mode. Captured mode
/// scales by frame time instead; the asymmetry is deliberate.
const FALLBACK_SCALE: f32 = 0.35;

const PITCH_SNAP_LOW: f32 = 45.0 * (PI / 180.0);
const PITCH_DEAD_MID: f32 = 180.0 * (PI / 180.0);
const PITCH_SNAP_HIGH: f32 = 315.0 * (PI / 180.0);

/// Camera controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Scripted dolly-in; input is ignored.
    Intro,
    /// User-controlled free-look.
    Interactive,
}

/// Free-look camera over {scripted intro, interactive} with smoothed
/// yaw/pitch and additive key translation.
#[derive(Debug, Clone)]
pub struct CameraRig {
    position: Vec3,
    yaw: f32,
    pitch: f32,
    forward: Vec3,
    phase: Phase,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.9, 0.0),
            yaw: 0.0,
            pitch: 0.0,
            forward: REFERENCE_FORWARD,
            phase: Phase::Intro,
        }
    }
}

impl CameraRig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Advance one frame. `input` must already be drained; the smoother is
    /// read and consumed here, once per interactive frame.
    pub fn advance(&mut self, input: &mut InputState, dt: f32) {
        match self.phase {
            Phase::Intro => self.advance_intro(dt),
            Phase::Interactive => {
                if input.controls_enabled() {
                    self.advance_interactive(input, dt);
                }
            }
        }
    }

    /// Dolly backward along the scripted 354°-pitched heading until the
    /// x threshold is crossed. The crossing frame only flips the phase.
    fn advance_intro(&mut self, dt: f32) {
        if self.position.x <= INTRO_END_X {
            self.phase = Phase::Interactive;
            tracing::debug!(position = ?self.position, "intro dolly complete");
            return;
        }

        self.pitch = INTRO_PITCH;
        // Sideways axis as of the animation start: forward × up.
        let sideways = REFERENCE_FORWARD.cross(WORLD_UP);
        self.forward = (Quat::from_axis_angle(sideways, self.pitch) * REFERENCE_FORWARD).normalize();
        self.position -= self.forward * dt;
    }

    fn advance_interactive(&mut self, input: &mut InputState, dt: f32) {
        // Rightward pointer motion turns the view right, which is a
        // negative rotation about the up axis; hence the negation.
        let scale = if input.pointer_captured() {
            dt
        } else {
            FALLBACK_SCALE
        };
        self.yaw += -(input.smoother.average_x() * DELTA_TO_RADIANS) * scale;
        self.pitch += -(input.smoother.average_y() * DELTA_TO_RADIANS) * scale;

        self.yaw = wrap_angle(self.yaw, TAU);
        self.pitch = clamp_pitch(wrap_angle(self.pitch, TAU));

        input.smoother.consume();

        // Yaw about world up from the fixed reference heading, then pitch
        // about the right vector derived after the yaw is applied.
        self.forward = (Quat::from_axis_angle(WORLD_UP, self.yaw) * REFERENCE_FORWARD).normalize();
        let right = self.forward.cross(WORLD_UP);
        self.forward = (Quat::from_axis_angle(right, self.pitch) * self.forward).normalize();

        // Held keys combine additively; diagonal motion is deliberately
        // not renormalized.
        if input.key_held(MoveKey::Forward) {
            self.position += self.forward * dt;
        }
        if input.key_held(MoveKey::Back) {
            self.position -= self.forward * dt;
        }
        if input.key_held(MoveKey::Left) {
            self.position -= self.forward.cross(WORLD_UP) * dt;
        }
        if input.key_held(MoveKey::Right) {
            self.position += self.forward.cross(WORLD_UP) * dt;
        }
        if input.key_held(MoveKey::Up) {
            self.position += WORLD_UP * dt;
        }
        if input.key_held(MoveKey::Down) {
            self.position -= WORLD_UP * dt;
        }
    }

    /// Standard look-at view matrix from the current pose.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward, WORLD_UP)
    }
}

/// Floored modulo: the result is in `[0, period)` for any finite input,
/// including negative ones.
pub fn wrap_angle(angle: f32, period: f32) -> f32 {
    ((angle % period) + period) % period
}

/// Snap a wrapped pitch out of the unsupported hemisphere: `[45°, 180°]`
/// maps to 45°, `(180°, 315°]` maps to 315°, everything else passes
/// through. Keeps the rig from inverting over the poles.
pub fn clamp_pitch(pitch: f32) -> f32 {
    if (PITCH_SNAP_LOW..=PITCH_DEAD_MID).contains(&pitch) {
        PITCH_SNAP_LOW
    } else if pitch > PITCH_DEAD_MID && pitch <= PITCH_SNAP_HIGH {
        PITCH_SNAP_HIGH
    } else {
        pitch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sierpinski_input::InputEvent;

    fn interactive_rig() -> (CameraRig, InputState) {
        let mut rig = CameraRig::new();
        let mut input = InputState::new();
        input.push(InputEvent::ToggleControls);
        input.drain();
        // Run the intro to completion at a coarse timestep.
        for _ in 0..200 {
            rig.advance(&mut input, 0.1);
            if rig.phase() == Phase::Interactive {
                break;
            }
        }
        assert_eq!(rig.phase(), Phase::Interactive);
        (rig, input)
    }

    #[test]
    fn wrap_angle_is_always_non_negative() {
        assert!((wrap_angle(-1.0, TAU) - (TAU - 1.0)).abs() < 1e-6);
        assert_eq!(wrap_angle(0.0, TAU), 0.0);
        assert!((wrap_angle(TAU + 0.5, TAU) - 0.5).abs() < 1e-6);
        for x in [-1000.0, -0.001, 123.456] {
            let wrapped = wrap_angle(x, TAU);
            assert!((0.0..TAU).contains(&wrapped), "wrap({x}) = {wrapped}");
        }
    }

    #[test]
    fn pitch_clamp_snaps_and_passes_through() {
        let degrees = |d: f32| d * PI / 180.0;
        assert_eq!(clamp_pitch(degrees(45.0)), degrees(45.0));
        assert_eq!(clamp_pitch(degrees(90.0)), degrees(45.0));
        assert_eq!(clamp_pitch(degrees(180.0)), degrees(45.0));
        assert_eq!(clamp_pitch(degrees(181.0)), degrees(315.0));
        assert_eq!(clamp_pitch(degrees(315.0)), degrees(315.0));
        assert_eq!(clamp_pitch(degrees(44.0)), degrees(44.0));
        assert_eq!(clamp_pitch(degrees(316.0)), degrees(316.0));
        assert_eq!(clamp_pitch(0.0), 0.0);
    }

    #[test]
    fn intro_moves_backward_then_hands_over_exactly_once() {
        let mut rig = CameraRig::new();
        let mut input = InputState::new();
        assert_eq!(rig.phase(), Phase::Intro);

        rig.advance(&mut input, 0.016);
        // The 354° pitch tips the dolly slightly; x must decrease.
        assert!(rig.position().x < 0.0);
        assert_eq!(rig.phase(), Phase::Intro);

        let mut transitions = 0;
        for _ in 0..2000 {
            let before = rig.phase();
            rig.advance(&mut input, 0.05);
            if before == Phase::Intro && rig.phase() == Phase::Interactive {
                transitions += 1;
            }
        }
        assert_eq!(transitions, 1);
        assert!(rig.position().x <= INTRO_END_X);
        assert_eq!(rig.phase(), Phase::Interactive);
    }

    #[test]
    fn forward_stays_unit_length() {
        let (mut rig, mut input) = interactive_rig();
        input.push(InputEvent::CaptureChanged(true));
        input.drain();
        for i in 0..50 {
            input.push(InputEvent::PointerRelative {
                dx: (i as f32) - 20.0,
                dy: 7.0,
            });
            input.drain();
            rig.advance(&mut input, 0.016);
            assert!((rig.forward().length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn rightward_motion_is_a_negative_rotation_about_up() {
        let (mut rig, mut input) = interactive_rig();
        input.push(InputEvent::CaptureChanged(true));
        input.drain();

        input.push(InputEvent::PointerRelative { dx: 40.0, dy: 0.0 });
        input.drain();
        let yaw_before = rig.yaw();
        rig.advance(&mut input, 0.016);
        // Positive x-delta is a negative rotation about up; the result
        // wraps into [0, 2π).
        assert!(rig.yaw() > yaw_before);
        assert!(rig.yaw() > TAU - 0.1);
    }

    #[test]
    fn held_keys_translate_additively() {
        let (mut rig, mut input) = interactive_rig();
        let start = rig.position();

        input.push(InputEvent::KeyDown(MoveKey::Up));
        input.push(InputEvent::KeyDown(MoveKey::Forward));
        input.drain();
        rig.advance(&mut input, 0.5);

        let moved = rig.position() - start;
        assert!((moved.dot(WORLD_UP) - 0.5).abs() < 0.2);
        assert!(moved.length() > 0.5);
    }

    #[test]
    fn view_matrix_is_finite() {
        let (rig, _input) = interactive_rig();
        let view = rig.view_matrix();
        assert!(view.is_finite());
        // Looking from the pose toward pose + forward maps the eye to the
        // origin of view space.
        let eye_in_view = view.transform_point3(rig.position());
        assert!(eye_in_view.length() < 1e-4);
    }
}
