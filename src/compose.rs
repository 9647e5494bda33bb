use crate::keyboard::KeyOutput;

/// Change to mirror into the target application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Insert(String),
    DeleteBackward,
    /// Erase `erase` characters before the cursor, then type `text`.
    Replace { erase: usize, text: String },
    /// The composed message was sent; the buffer is now empty.
    Submit(String),
}

/// The text composed so far.
#[derive(Debug, Clone, Default)]
pub struct Composer {
    text: String,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn apply(&mut self, output: &KeyOutput) -> Option<Edit> {
        match output {
            KeyOutput::Backspace => self.text.pop().map(|_| Edit::DeleteBackward),
            KeyOutput::Space => Some(self.insert(" ".to_string())),
            KeyOutput::Char(c) => Some(self.insert(c.to_string())),
            KeyOutput::Word(word) => {
                // Swiped words are separated from what precedes them
                let needs_space = self.text.chars().last().is_some_and(|c| c != ' ');
                let insert = if needs_space {
                    format!(" {}", word)
                } else {
                    word.clone()
                };
                Some(self.insert(insert))
            }
            KeyOutput::Send => Some(Edit::Submit(std::mem::take(&mut self.text))),
        }
    }

    /// Swaps the whole composed text for a chosen suggestion.
    pub fn accept(&mut self, sentence: &str) -> Edit {
        let erase = self.text.chars().count();
        self.text = sentence.to_string();
        Edit::Replace {
            erase,
            text: self.text.clone(),
        }
    }

    fn insert(&mut self, insert: String) -> Edit {
        self.text.push_str(&insert);
        Edit::Insert(insert)
    }
}
