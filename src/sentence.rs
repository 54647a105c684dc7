/// A sentence consists of a sequence of words and their gold tags
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sentence {
    /// Observed words
    pub words: Vec<String>,
    /// Gold tag of each word
    pub tags: Vec<String>,
}

impl Sentence {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            words: Vec::with_capacity(cap),
            tags: Vec::with_capacity(cap),
        }
    }

    pub fn push<W: Into<String>, T: Into<String>>(&mut self, word: W, tag: T) {
        self.words.push(word.into());
        self.tags.push(tag.into());
    }

    /// Number of tokens
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl<W: Into<String>, T: Into<String>> FromIterator<(W, T)> for Sentence {
    fn from_iter<I: IntoIterator<Item = (W, T)>>(iter: I) -> Self {
        let mut sent = Sentence::default();
        for (word, tag) in iter {
            sent.push(word, tag);
        }
        sent
    }
}
