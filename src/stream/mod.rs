pub mod capture;
pub mod classify;
pub mod hits;
pub mod listener;
pub mod timing;

pub use capture::{
    CompletedGesture, GestureCapture, GesturePath, NoRouting, PointerEvent, PointerId,
    PointerPhase, PointerRouter, PointerSample,
};
pub use classify::{classify, Gesture};
pub use hits::{map_path, KeySequence};
pub use listener::{PointerListener, RawInput, Signal, TouchAssembler};
pub use timing::{ShiftMode, ShiftTiming};
