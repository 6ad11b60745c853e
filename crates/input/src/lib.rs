//! Input plumbing: bounded delta queues that smooth raw pointer motion,
//! and a typed event queue drained once per frame.
//!
//! # Invariants
//! - Event handlers only enqueue; all state changes happen in `drain`,
//!   once per frame, in arrival order.
//! - Exactly one pointer-delta source is active at a time, selected by
//!   the capture mode.

pub mod event;
pub mod smoother;

pub use event::{DepthAction, InputEvent, InputState, MoveKey};
pub use smoother::{DeltaQueue, InputSmoother};
