use std::{sync::Arc, time::Duration};

use crate::layout::{KeyCap, KeyboardLayout, LayoutError, LayoutVariant};
use crate::scorer::WordScorer;
use crate::stream::{
    classify, Gesture, GestureCapture, GesturePath, PointerEvent, PointerRouter, ShiftMode,
    ShiftTiming,
};
use crate::Dictionary;

/// What the surrounding application should do after a gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutput {
    Char(char),
    Word(String),
    Backspace,
    Space,
    Send,
}

impl KeyOutput {
    /// The output a tap on `cap` produces; page and shift keys produce none.
    pub fn from_cap(cap: KeyCap) -> Option<Self> {
        match cap {
            KeyCap::Char(c) => Some(KeyOutput::Char(c)),
            KeyCap::Backspace => Some(KeyOutput::Backspace),
            KeyCap::Space => Some(KeyOutput::Space),
            KeyCap::Send => Some(KeyOutput::Send),
            KeyCap::Shift | KeyCap::Symbols | KeyCap::Letters => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Letters,
    Symbols,
}

struct Layouts {
    lowercase: KeyboardLayout,
    uppercase: KeyboardLayout,
    symbols: KeyboardLayout,
}

impl Layouts {
    fn select(&self, page: Page, shifted: bool) -> &KeyboardLayout {
        match (page, shifted) {
            (Page::Symbols, _) => &self.symbols,
            (Page::Letters, true) => &self.uppercase,
            (Page::Letters, false) => &self.lowercase,
        }
    }
}

/// One on-screen keyboard surface: layouts, the active gesture and shift state.
///
/// The keyboard is the session owner for everything outliving a single
/// gesture. The shift double-tap timer lives here rather than on
/// [`GestureCapture`], which only holds the path of the gesture in progress.
pub struct Keyboard {
    layouts: Layouts,
    page: Page,
    shift: ShiftTiming,
    capture: GestureCapture,
    dictionary: Arc<Dictionary>,
    scorer: WordScorer,
}

impl Keyboard {
    pub fn new(
        width: f32,
        height: f32,
        dictionary: Arc<Dictionary>,
        scorer: WordScorer,
    ) -> Result<Self, LayoutError> {
        Ok(Self {
            layouts: Layouts {
                lowercase: KeyboardLayout::standard(LayoutVariant::Lowercase, width, height)?,
                uppercase: KeyboardLayout::standard(LayoutVariant::Uppercase, width, height)?,
                symbols: KeyboardLayout::standard(LayoutVariant::Symbols, width, height)?,
            },
            page: Page::Letters,
            shift: ShiftTiming::default(),
            capture: GestureCapture::new(),
            dictionary,
            scorer,
        })
    }

    pub fn with_double_tap_window(mut self, window: Duration) -> Self {
        self.shift = ShiftTiming::new(window);
        self
    }

    pub fn with_router(mut self, router: Arc<dyn PointerRouter>) -> Self {
        self.capture = GestureCapture::with_router(router);
        self
    }

    pub fn active_layout(&self) -> &KeyboardLayout {
        self.layouts.select(self.page, self.shift.is_active())
    }

    pub fn shift_mode(&self) -> ShiftMode {
        self.shift.mode()
    }

    pub fn current_path(&self) -> Option<&GesturePath> {
        self.capture.current_path()
    }

    pub fn handle(&mut self, event: PointerEvent) -> Option<KeyOutput> {
        let layout = self.layouts.select(self.page, self.shift.is_active());
        let gesture = self.capture.handle(event, layout)?;

        match classify(&gesture, layout) {
            Gesture::Tap(cap) => {
                log::debug!("Tap: {}", cap);
                self.press(cap, gesture.released_at)
            }
            Gesture::Swipe(sequence) => match self.scorer.best_match(&sequence, &self.dictionary) {
                Some(word) => {
                    log::debug!("Swipe {:?} -> {}", sequence.keys(), word);
                    Some(KeyOutput::Word(word.to_string()))
                }
                None => {
                    log::debug!("Swipe {:?} matched no word", sequence.keys());
                    None
                }
            },
        }
    }

    fn press(&mut self, cap: KeyCap, t: Duration) -> Option<KeyOutput> {
        match cap {
            KeyCap::Shift => {
                let mode = self.shift.tap(t);
                log::debug!("Shift mode: {:?}", mode);
                None
            }
            KeyCap::Symbols => {
                self.page = Page::Symbols;
                self.shift.reset();
                None
            }
            KeyCap::Letters => {
                self.page = Page::Letters;
                None
            }
            KeyCap::Char(_) => {
                self.shift.consume();
                KeyOutput::from_cap(cap)
            }
            _ => KeyOutput::from_cap(cap),
        }
    }
}
