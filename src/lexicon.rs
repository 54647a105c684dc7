use std::collections::HashMap;

/// Canonical value of an observed string
///
/// Two raw strings canonize to the same `Word` iff they are equal, so words
/// compare by identifier instead of by content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Word(u32);

impl Word {
    /// Numeric identifier of the word
    pub fn index(self) -> u32 {
        self.0
    }

    pub(crate) fn from_index(index: u32) -> Self {
        Self(index)
    }
}

/// A bidirectional mapping between raw strings and canonical values
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    /// Map from string to word
    str_to_word: HashMap<String, Word>,
    /// Map from word to string
    word_to_str: Vec<String>,
}

impl Lexicon {
    /// Create a new empty lexicon
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of distinct strings
    pub fn len(&self) -> usize {
        self.word_to_str.len()
    }

    /// Returns `true` if the lexicon contains no strings
    pub fn is_empty(&self) -> bool {
        self.word_to_str.is_empty()
    }

    /// Look up the canonical value of `raw` without inserting it
    pub fn get(&self, raw: &str) -> Option<Word> {
        self.str_to_word.get(raw).copied()
    }

    /// Get or create the canonical value of `raw`
    pub fn canonize(&mut self, raw: &str) -> Word {
        if let Some(&word) = self.str_to_word.get(raw) {
            word
        } else {
            let word = Word(self.word_to_str.len() as u32);
            self.str_to_word.insert(raw.to_string(), word);
            self.word_to_str.push(raw.to_string());
            word
        }
    }

    /// The raw string a word was canonized from
    pub fn str(&self, word: Word) -> &str {
        &self.word_to_str[word.0 as usize]
    }

    /// Iterate over all (string, word) pairs in canonization order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Word)> + '_ {
        self.word_to_str
            .iter()
            .enumerate()
            .map(|(id, s)| (s.as_str(), Word(id as u32)))
    }
}
