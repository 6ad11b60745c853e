use crate::smoother::InputSmoother;

/// The six directional camera movements, each a held-state boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKey {
    Forward,
    Back,
    Left,
    Right,
    Up,
    Down,
}

impl MoveKey {
    fn index(self) -> usize {
        match self {
            MoveKey::Forward => 0,
            MoveKey::Back => 1,
            MoveKey::Left => 2,
            MoveKey::Right => 3,
            MoveKey::Up => 4,
            MoveKey::Down => 5,
        }
    }
}

/// A raw input occurrence, queued by the platform event handlers and
/// applied during the per-frame drain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown(MoveKey),
    KeyUp(MoveKey),
    /// The M key: flip free-look controls on or off. The host requests or
    /// releases exclusive pointer capture in response.
    ToggleControls,
    /// The host reports whether exclusive capture is actually in effect.
    /// Capture implies controls on; losing capture turns them off.
    CaptureChanged(bool),
    /// Absolute pointer position; the fallback delta source when
    /// exclusive capture is unavailable.
    PointerAbsolute { x: f32, y: f32 },
    /// Native relative motion; the delta source while captured.
    PointerRelative { dx: f32, dy: f32 },
    /// Left button released: one step finer.
    LeftRelease,
    /// Right button released: one step coarser.
    RightRelease,
}

/// A depth change requested by a mouse click, at most one regeneration
/// per click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthAction {
    Increase,
    Decrease,
}

/// Per-session input state: the event queue, held keys, the capture mode,
/// and the delta smoother.
///
/// Platform handlers call `push`; the frame loop calls `drain` exactly
/// once before advancing the camera, so all input lands in deterministic
/// per-frame order.
#[derive(Debug, Default)]
pub struct InputState {
    queue: Vec<InputEvent>,
    keys: [bool; 6],
    controls_enabled: bool,
    pointer_captured: bool,
    previous_pointer: [f32; 2],
    pub smoother: InputSmoother,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue one event. Never does blocking work and never regenerates
    /// anything; safe to call from any platform callback.
    pub fn push(&mut self, event: InputEvent) {
        self.queue.push(event);
    }

    /// Apply all queued events in arrival order. Returns the depth
    /// actions requested by mouse clicks this frame.
    pub fn drain(&mut self) -> Vec<DepthAction> {
        let mut actions = Vec::new();
        for event in std::mem::take(&mut self.queue) {
            match event {
                InputEvent::KeyDown(key) => self.keys[key.index()] = true,
                InputEvent::KeyUp(key) => self.keys[key.index()] = false,
                InputEvent::ToggleControls => {
                    self.controls_enabled = !self.controls_enabled;
                    tracing::debug!(enabled = self.controls_enabled, "controls toggled");
                }
                InputEvent::CaptureChanged(captured) => {
                    self.pointer_captured = captured;
                    self.controls_enabled = captured;
                    tracing::debug!(captured, "pointer capture changed");
                }
                InputEvent::PointerAbsolute { x, y } => {
                    if self.controls_enabled && !self.pointer_captured {
                        self.smoother.push_x(x - self.previous_pointer[0]);
                        self.smoother.push_y(y - self.previous_pointer[1]);
                    }
                    self.previous_pointer = [x, y];
                }
                InputEvent::PointerRelative { dx, dy } => {
                    if self.controls_enabled && self.pointer_captured {
                        self.smoother.push_x(dx);
                        self.smoother.push_y(dy);
                    }
                }
                // Depth clicks only count while controls are enabled, and
                // only on release.
                InputEvent::LeftRelease => {
                    if self.controls_enabled {
                        actions.push(DepthAction::Increase);
                    }
                }
                InputEvent::RightRelease => {
                    if self.controls_enabled {
                        actions.push(DepthAction::Decrease);
                    }
                }
            }
        }
        actions
    }

    pub fn key_held(&self, key: MoveKey) -> bool {
        self.keys[key.index()]
    }

    pub fn controls_enabled(&self) -> bool {
        self.controls_enabled
    }

    pub fn pointer_captured(&self) -> bool {
        self.pointer_captured
    }
}
