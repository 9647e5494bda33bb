use std::{fmt, sync::Arc, time::Duration};

use crate::layout::{KeyCap, KeyboardLayout};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointerId(pub u32);

/// One recorded position, relative to the keyboard container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
    pub t: Duration,
}

impl PointerSample {
    pub fn new(x: f32, y: f32, t: Duration) -> Self {
        Self { x, y, t }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub pointer: PointerId,
    pub phase: PointerPhase,
    pub sample: PointerSample,
}

impl PointerEvent {
    pub fn new(pointer: PointerId, phase: PointerPhase, sample: PointerSample) -> Self {
        Self { pointer, phase, sample }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GesturePath {
    samples: Vec<PointerSample>,
}

impl GesturePath {
    pub fn samples(&self) -> &[PointerSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    fn push(&mut self, sample: PointerSample) {
        self.samples.push(sample);
    }
}

impl FromIterator<PointerSample> for GesturePath {
    fn from_iter<I: IntoIterator<Item = PointerSample>>(iter: I) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}

/// A frozen path handed over on pointer release.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedGesture {
    pub seed: KeyCap,
    pub path: GesturePath,
    pub released_at: Duration,
}

/// Exclusive routing of a pointer's events to the keyboard surface.
pub trait PointerRouter: Send + Sync {
    fn capture(&self, _pointer: PointerId) {}
    fn release(&self, _pointer: PointerId) {}
}

/// Router for sources that already deliver a single pointer stream.
#[derive(Debug, Default)]
pub struct NoRouting;

impl PointerRouter for NoRouting {}

struct CaptureGuard {
    router: Arc<dyn PointerRouter>,
    pointer: PointerId,
}

impl CaptureGuard {
    fn acquire(router: Arc<dyn PointerRouter>, pointer: PointerId) -> Self {
        router.capture(pointer);
        Self { router, pointer }
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        self.router.release(self.pointer);
    }
}

struct Session {
    pointer: PointerId,
    seed: KeyCap,
    path: GesturePath,
    _capture: CaptureGuard,
}

enum CaptureState {
    Idle,
    Tracking(Session),
}

/// Tracks at most one pointer session from press to release.
///
/// A pointer-down while a session is open is ignored; the open session keeps
/// its capture until it ends.
pub struct GestureCapture {
    state: CaptureState,
    router: Arc<dyn PointerRouter>,
}

impl GestureCapture {
    pub fn new() -> Self {
        Self::with_router(Arc::new(NoRouting))
    }

    pub fn with_router(router: Arc<dyn PointerRouter>) -> Self {
        Self {
            state: CaptureState::Idle,
            router,
        }
    }

    pub fn is_tracking(&self) -> bool {
        matches!(self.state, CaptureState::Tracking(_))
    }

    /// Samples of the open session, for trail rendering.
    pub fn current_path(&self) -> Option<&GesturePath> {
        match &self.state {
            CaptureState::Tracking(session) => Some(&session.path),
            CaptureState::Idle => None,
        }
    }

    /// Feeds one event. Returns the frozen gesture when a session ends with a release.
    pub fn handle(&mut self, event: PointerEvent, layout: &KeyboardLayout) -> Option<CompletedGesture> {
        match event.phase {
            PointerPhase::Down => {
                self.begin(event, layout);
                None
            }
            PointerPhase::Move => {
                if let CaptureState::Tracking(session) = &mut self.state {
                    if session.pointer == event.pointer {
                        session.path.push(event.sample);
                    }
                }
                None
            }
            PointerPhase::Up => {
                let session = self.take_session(event.pointer)?;
                log::debug!(
                    "Gesture released after {} samples (seed {})",
                    session.path.len(),
                    session.seed
                );
                Some(CompletedGesture {
                    seed: session.seed,
                    path: session.path,
                    released_at: event.sample.t,
                })
            }
            PointerPhase::Cancel | PointerPhase::Leave => {
                if let Some(session) = self.take_session(event.pointer) {
                    log::debug!("Gesture {:?}, discarding {} samples", event.phase, session.path.len());
                }
                None
            }
        }
    }

    fn begin(&mut self, event: PointerEvent, layout: &KeyboardLayout) {
        if self.is_tracking() {
            log::debug!("Ignoring pointer-down from {:?} while tracking", event.pointer);
            return;
        }

        let Some(key) = layout.key_at(event.sample.x, event.sample.y) else {
            return;
        };

        let mut path = GesturePath::default();
        path.push(event.sample);
        self.state = CaptureState::Tracking(Session {
            pointer: event.pointer,
            seed: key.cap,
            path,
            _capture: CaptureGuard::acquire(Arc::clone(&self.router), event.pointer),
        });
    }

    fn take_session(&mut self, pointer: PointerId) -> Option<Session> {
        match &self.state {
            CaptureState::Tracking(session) if session.pointer == pointer => {}
            _ => return None,
        }
        match std::mem::replace(&mut self.state, CaptureState::Idle) {
            CaptureState::Tracking(session) => Some(session),
            CaptureState::Idle => None,
        }
    }
}

impl Default for GestureCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GestureCapture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureCapture")
            .field("tracking", &self.is_tracking())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutVariant;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingRouter {
        log: Mutex<Vec<(&'static str, PointerId)>>,
    }

    impl PointerRouter for RecordingRouter {
        fn capture(&self, pointer: PointerId) {
            self.log.lock().unwrap().push(("capture", pointer));
        }

        fn release(&self, pointer: PointerId) {
            self.log.lock().unwrap().push(("release", pointer));
        }
    }

    fn layout() -> KeyboardLayout {
        KeyboardLayout::standard(LayoutVariant::Lowercase, 1000.0, 400.0).unwrap()
    }

    fn event(pointer: u32, phase: PointerPhase, x: f32, y: f32, ms: u64) -> PointerEvent {
        PointerEvent::new(
            PointerId(pointer),
            phase,
            PointerSample::new(x, y, Duration::from_millis(ms)),
        )
    }

    #[test]
    fn test_down_outside_keys_stays_idle() {
        let layout = layout();
        let mut capture = GestureCapture::new();
        assert!(capture.handle(event(0, PointerPhase::Down, -5.0, 50.0, 0), &layout).is_none());
        assert!(!capture.is_tracking());
        assert!(capture.handle(event(0, PointerPhase::Up, -5.0, 50.0, 10), &layout).is_none());
    }

    #[test]
    fn test_records_path_until_release() {
        let layout = layout();
        let mut capture = GestureCapture::new();
        capture.handle(event(0, PointerPhase::Down, 50.0, 50.0, 0), &layout);
        capture.handle(event(0, PointerPhase::Move, 150.0, 50.0, 10), &layout);
        capture.handle(event(0, PointerPhase::Move, 250.0, 50.0, 20), &layout);
        assert_eq!(capture.current_path().map(GesturePath::len), Some(3));

        let done = capture.handle(event(0, PointerPhase::Up, 250.0, 50.0, 30), &layout).unwrap();
        assert_eq!(done.seed, KeyCap::Char('q'));
        assert_eq!(done.path.len(), 3);
        assert_eq!(done.released_at, Duration::from_millis(30));
        assert!(!capture.is_tracking());
        assert!(capture.current_path().is_none());
    }

    #[test]
    fn test_cancel_and_leave_discard() {
        let layout = layout();
        let mut capture = GestureCapture::new();
        for phase in [PointerPhase::Cancel, PointerPhase::Leave] {
            capture.handle(event(0, PointerPhase::Down, 50.0, 50.0, 0), &layout);
            capture.handle(event(0, PointerPhase::Move, 150.0, 50.0, 10), &layout);
            assert!(capture.handle(event(0, phase, 150.0, 50.0, 20), &layout).is_none());
            assert!(!capture.is_tracking());
            // A later release has nothing to hand over
            assert!(capture.handle(event(0, PointerPhase::Up, 150.0, 50.0, 30), &layout).is_none());
        }
    }

    #[test]
    fn test_second_pointer_down_is_ignored() {
        let layout = layout();
        let mut capture = GestureCapture::new();
        capture.handle(event(0, PointerPhase::Down, 50.0, 50.0, 0), &layout);
        capture.handle(event(1, PointerPhase::Down, 950.0, 50.0, 5), &layout);
        capture.handle(event(1, PointerPhase::Move, 850.0, 50.0, 6), &layout);
        assert!(capture.handle(event(1, PointerPhase::Up, 850.0, 50.0, 7), &layout).is_none());
        assert!(capture.is_tracking());

        let done = capture.handle(event(0, PointerPhase::Up, 50.0, 50.0, 10), &layout).unwrap();
        assert_eq!(done.seed, KeyCap::Char('q'));
        assert_eq!(done.path.len(), 1);
    }

    #[test]
    fn test_capture_released_on_every_exit() {
        let layout = layout();
        let router = Arc::new(RecordingRouter::default());
        let mut capture = GestureCapture::with_router(router.clone());

        capture.handle(event(3, PointerPhase::Down, 50.0, 50.0, 0), &layout);
        capture.handle(event(3, PointerPhase::Up, 50.0, 50.0, 1), &layout);
        capture.handle(event(4, PointerPhase::Down, 50.0, 50.0, 2), &layout);
        capture.handle(event(4, PointerPhase::Cancel, 50.0, 50.0, 3), &layout);
        capture.handle(event(5, PointerPhase::Down, 50.0, 50.0, 4), &layout);
        drop(capture);

        let log = router.log.lock().unwrap().clone();
        assert_eq!(
            log,
            vec![
                ("capture", PointerId(3)),
                ("release", PointerId(3)),
                ("capture", PointerId(4)),
                ("release", PointerId(4)),
                ("capture", PointerId(5)),
                ("release", PointerId(5)),
            ]
        );
    }
}
