//! Dictionary word matching for swipe key sequences.
//!
//! A candidate's score is the sum of four terms:
//! - coverage: share of the word's distinct letters the swipe touched
//! - end match: bonus when the word ends on the swipe's last key, penalty otherwise
//! - extra letters: distinct word letters the swipe never touched, per word length
//! - length difference: word length against the number of distinct keys swiped
//!
//! Only words starting with the swipe's first key are considered.

use std::{cmp::Ordering, collections::HashSet, str::FromStr};

use crate::stream::KeySequence;
use crate::Dictionary;

pub const COVERAGE_WEIGHT: f32 = 1.0;
pub const END_MATCH_BONUS: f32 = 1.5;
pub const END_MISMATCH_PENALTY: f32 = 0.5;
pub const EXTRA_LETTER_WEIGHT: f32 = 0.8;
pub const LENGTH_DIFF_WEIGHT: f32 = 0.1;

/// What wins when two candidates reach the same score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// The word listed first in the dictionary.
    #[default]
    DictionaryOrder,
    /// The shorter word, then dictionary order.
    ShorterWord,
}

impl FromStr for TieBreak {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dictionary" | "dictionary_order" => Ok(TieBreak::DictionaryOrder),
            "shorter" | "shorter_word" => Ok(TieBreak::ShorterWord),
            other => Err(format!("unknown tie break '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub coverage: f32,
    pub end_match_bonus: f32,
    pub end_mismatch_penalty: f32,
    pub extra_letter: f32,
    pub length_diff: f32,
    pub tie_break: TieBreak,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            coverage: COVERAGE_WEIGHT,
            end_match_bonus: END_MATCH_BONUS,
            end_mismatch_penalty: END_MISMATCH_PENALTY,
            extra_letter: EXTRA_LETTER_WEIGHT,
            length_diff: LENGTH_DIFF_WEIGHT,
            tie_break: TieBreak::DictionaryOrder,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate<'d> {
    pub word: &'d str,
    pub score: f32,
}

/// Stateless scorer; share it freely across threads.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WordScorer {
    weights: ScoringWeights,
}

impl WordScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Scores `word` against `sequence`. Does not apply the first-letter filter.
    pub fn score(&self, word: &str, sequence: &KeySequence) -> f32 {
        let swiped: HashSet<char> = sequence
            .keys()
            .iter()
            .map(char::to_ascii_lowercase)
            .collect();
        self.score_against(word, &swiped, sequence.last().map(|c| c.to_ascii_lowercase()))
    }

    fn score_against(&self, word: &str, swiped: &HashSet<char>, end: Option<char>) -> f32 {
        let letters: HashSet<char> = word.chars().collect();
        if letters.is_empty() {
            return f32::NEG_INFINITY;
        }
        let word_len = word.chars().count() as f32;

        let covered = letters.iter().filter(|c| swiped.contains(*c)).count() as f32;
        let extra = letters.len() as f32 - covered;

        let mut score = self.weights.coverage * covered / letters.len() as f32;

        score += if end.is_some() && word.chars().last() == end {
            self.weights.end_match_bonus
        } else {
            -self.weights.end_mismatch_penalty
        };

        score -= self.weights.extra_letter * extra / word_len;
        score -= self.weights.length_diff * (word_len - swiped.len() as f32).abs();
        score
    }

    /// All candidates sharing the sequence's first key, best first.
    pub fn rank<'d>(&self, sequence: &KeySequence, dictionary: &'d Dictionary) -> Vec<ScoredCandidate<'d>> {
        let Some(first) = sequence.first().map(|c| c.to_ascii_lowercase()) else {
            return Vec::new();
        };
        let swiped: HashSet<char> = sequence
            .keys()
            .iter()
            .map(char::to_ascii_lowercase)
            .collect();
        let end = sequence.last().map(|c| c.to_ascii_lowercase());

        let mut ranked: Vec<ScoredCandidate<'d>> = dictionary
            .starting_with(first)
            .map(|word| ScoredCandidate {
                word,
                score: self.score_against(word, &swiped, end),
            })
            .collect();

        // Stable sort keeps dictionary order among equal entries
        ranked.sort_by(|a, b| self.compare(b, a));
        ranked
    }

    /// The best dictionary word for a swipe, or `None` when nothing matches.
    /// Sequences shorter than two keys never match.
    pub fn best_match<'d>(&self, sequence: &KeySequence, dictionary: &'d Dictionary) -> Option<&'d str> {
        if sequence.len() < 2 {
            return None;
        }

        let best = self.rank(sequence, dictionary).into_iter().next()?;
        if best.score == f32::NEG_INFINITY {
            return None;
        }
        log::debug!("Best match for {:?}: {} ({:.3})", sequence.keys(), best.word, best.score);
        Some(best.word)
    }

    /// Orders `a` against `b`; greater is better.
    fn compare(&self, a: &ScoredCandidate<'_>, b: &ScoredCandidate<'_>) -> Ordering {
        let by_score = a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal);
        match (by_score, self.weights.tie_break) {
            (Ordering::Equal, TieBreak::ShorterWord) => {
                b.word.chars().count().cmp(&a.word.chars().count())
            }
            (ordering, _) => ordering,
        }
    }
}
