use std::collections::HashSet;

use super::capture::GesturePath;
use crate::layout::{KeyCap, KeyKind, KeyboardLayout};

/// Ordered letter keys crossed by a gesture, with adjacent repeats collapsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySequence {
    keys: Vec<char>,
}

impl KeySequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `key` unless it repeats the last one.
    pub fn push(&mut self, key: char) {
        if self.keys.last() != Some(&key) {
            self.keys.push(key);
        }
    }

    pub fn keys(&self) -> &[char] {
        &self.keys
    }

    pub fn first(&self) -> Option<char> {
        self.keys.first().copied()
    }

    pub fn last(&self) -> Option<char> {
        self.keys.last().copied()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn distinct(&self) -> HashSet<char> {
        self.keys.iter().copied().collect()
    }

    pub fn distinct_count(&self) -> usize {
        self.distinct().len()
    }
}

impl FromIterator<char> for KeySequence {
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> Self {
        let mut sequence = Self::new();
        for key in iter {
            sequence.push(key);
        }
        sequence
    }
}

impl From<&str> for KeySequence {
    fn from(keys: &str) -> Self {
        keys.chars().collect()
    }
}

/// Maps every sample to the letter key under it. Samples over no key or over
/// modifier/action keys contribute nothing.
pub fn map_path(path: &GesturePath, layout: &KeyboardLayout) -> KeySequence {
    path.samples()
        .iter()
        .filter_map(|sample| {
            let key = layout.key_at(sample.x, sample.y)?;
            match (key.kind(), key.cap) {
                (KeyKind::Letter, KeyCap::Char(c)) => Some(c),
                _ => None,
            }
        })
        .collect()
}
