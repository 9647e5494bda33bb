use anyhow::{Context, Result};
use std::{collections::HashSet, fs, path::Path};

pub mod compose;
pub mod keyboard;
pub mod layout;
pub mod scorer;
pub mod stream;
pub mod suggest;

pub use keyboard::{Keyboard, KeyOutput};
pub use layout::{KeyCap, KeyboardLayout, LayoutVariant};
pub use scorer::{ScoringWeights, TieBreak, WordScorer};
pub use stream::{GestureCapture, KeySequence};

const BUILTIN_WORDS: &str = "
hello world keyboard typing swipe the be to of and a in that have
i it for not on with he as you do at this but his by from
they we say her she or an will my one all would there their what
so up out if about who get which go me when make can like time
no just him know take person into year your good some could them
see other than then now look only come its over think also back
after use two how our work first well way even new want because
any these give day most us home today feeling unwell request
planning weekend sometime from are help please thanks again message
";

/// Ordered, read-only list of lowercase candidate words.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    words: Vec<String>,
}

impl Dictionary {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let mut parser = DictionaryParser::default();
        parser.parse(&content);

        let dictionary = parser.into_dictionary();
        log::info!("Loaded {} words from {}", dictionary.len(), path.display());
        Ok(dictionary)
    }

    /// The small word list shipped with the crate.
    pub fn builtin() -> Self {
        Self::from_words(BUILTIN_WORDS.split_whitespace())
    }

    /// Builds a dictionary keeping first-occurrence order. Words are lowercased
    /// and repeats dropped.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parser = DictionaryParser::default();
        for word in words {
            parser.add(word.as_ref());
        }
        parser.into_dictionary()
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    /// Words whose first character is `first`, in dictionary order.
    pub fn starting_with(&self, first: char) -> impl Iterator<Item = &str> {
        self.words().filter(move |word| word.starts_with(first))
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.iter().any(|w| w == word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[derive(Default)]
struct DictionaryParser {
    seen: HashSet<String>,
    words: Vec<String>,
}

impl DictionaryParser {
    fn parse(&mut self, content: &str) {
        for line in content.lines() {
            // Remove inline comments and trim
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            self.add(line);
        }
    }

    fn add(&mut self, word: &str) {
        let word = word.trim().to_lowercase();
        if word.is_empty() {
            return;
        }
        if !word.chars().all(char::is_alphabetic) {
            log::warn!("Ignoring dictionary entry: {}", word);
            return;
        }
        if self.seen.insert(word.clone()) {
            self.words.push(word);
        }
    }

    fn into_dictionary(self) -> Dictionary {
        Dictionary { words: self.words }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_keeps_first_occurrence() {
        let dict = Dictionary::builtin();
        assert!(dict.contains("hello"));
        assert!(dict.contains("message"));
        assert_eq!(dict.words().filter(|w| *w == "from").count(), 1);
        assert_eq!(dict.words().next(), Some("hello"));
    }

    #[test]
    fn test_from_words_normalises() {
        let dict = Dictionary::from_words(["Hello", "hello", " World ", "", "it's", "hi"]);
        assert_eq!(dict.words().collect::<Vec<_>>(), vec!["hello", "world", "hi"]);
    }

    #[test]
    fn test_starting_with_preserves_order() {
        let dict = Dictionary::from_words(["two", "the", "an", "then"]);
        assert_eq!(dict.starting_with('t').collect::<Vec<_>>(), vec!["two", "the", "then"]);
        assert_eq!(dict.starting_with('z').count(), 0);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# greetings").unwrap();
        writeln!(file, "Hello").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "world  # planet").unwrap();
        writeln!(file, "hello").unwrap();
        writeln!(file, "x1").unwrap();

        let dict = Dictionary::load(file.path()).unwrap();
        assert_eq!(dict.words().collect::<Vec<_>>(), vec!["hello", "world"]);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Dictionary::load(&dir.path().join("missing.txt")).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn test_empty_dictionary() {
        let dict = Dictionary::from_words(Vec::<String>::new());
        assert!(dict.is_empty());
        assert_eq!(dict.len(), 0);
    }
}
