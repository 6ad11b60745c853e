use glam::{Mat4, Vec3};

/// LIFO of model transforms with save/restore around object placement.
///
/// Transforms post-multiply (`current = current × T`), so nested
/// placements compose the way a scene graph walk would. Every `push`
/// must be matched by a `pop` within the same frame; popping an empty
/// stack is an integrity violation handled defensively in release.
#[derive(Debug, Clone)]
pub struct MatrixStack {
    saved: Vec<Mat4>,
    current: Mat4,
}

impl Default for MatrixStack {
    fn default() -> Self {
        Self::new()
    }
}

impl MatrixStack {
    pub fn new() -> Self {
        Self {
            saved: Vec::new(),
            current: Mat4::IDENTITY,
        }
    }

    /// Save the current model matrix.
    pub fn push(&mut self) {
        self.saved.push(self.current);
    }

    /// Restore the most recently saved model matrix. Underflow keeps the
    /// current matrix and logs loudly.
    pub fn pop(&mut self) {
        match self.saved.pop() {
            Some(saved) => self.current = saved,
            None => {
                debug_assert!(false, "model matrix stack underflow");
                tracing::error!("model matrix stack underflow; keeping current transform");
            }
        }
    }

    pub fn current(&self) -> Mat4 {
        self.current
    }

    pub fn rotate(&mut self, angle: f32, axis: Vec3) {
        self.current *= Mat4::from_axis_angle(axis, angle);
    }

    pub fn scale(&mut self, factor: Vec3) {
        self.current *= Mat4::from_scale(factor);
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.current *= Mat4::from_translation(offset);
    }

    /// True when every push has been matched by a pop.
    pub fn is_balanced(&self) -> bool {
        self.saved.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }
}
