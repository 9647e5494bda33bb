use super::capture::CompletedGesture;
use super::hits::{map_path, KeySequence};
use crate::layout::{KeyCap, KeyboardLayout};

#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    /// A discrete press of the key the gesture started on.
    Tap(KeyCap),
    /// Two or more distinct letter keys, to be resolved into a word.
    Swipe(KeySequence),
}

/// Decides between tap and swipe. Only the number of distinct letter keys
/// visited counts, so jitter over a single key stays a tap.
pub fn classify(gesture: &CompletedGesture, layout: &KeyboardLayout) -> Gesture {
    if gesture.path.len() < 2 {
        return Gesture::Tap(gesture.seed);
    }

    let sequence = map_path(&gesture.path, layout);
    if sequence.distinct_count() > 1 {
        Gesture::Swipe(sequence)
    } else {
        Gesture::Tap(gesture.seed)
    }
}
