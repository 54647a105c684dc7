use crate::lexicon::{Lexicon, Word};

/// Name of the "no tag" value
pub const NONE_STR: &str = "__NONE__";
/// Name of the sentence start tag
pub const SENTINEL_STR: &str = "__SENTINEL__";

/// Canonical tag identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(u32);

impl Tag {
    /// The distinguished "no tag" value.
    ///
    /// A tag pair whose previous tag is `NONE` is a state feature.
    pub const NONE: Tag = Tag(0);
    /// Previous tag at the start of a sentence
    pub const SENTINEL: Tag = Tag(1);

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }
}

/// A (previous tag, current tag) transition label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagPair {
    pub prev: Tag,
    pub curr: Tag,
}

impl TagPair {
    pub fn new(prev: Tag, curr: Tag) -> Self {
        Self { prev, curr }
    }

    /// The state-only pair for `curr`
    pub fn state(curr: Tag) -> Self {
        Self::new(Tag::NONE, curr)
    }

    pub fn is_state(&self) -> bool {
        self.prev == Tag::NONE
    }
}

impl Default for TagPair {
    fn default() -> Self {
        Self::new(Tag::NONE, Tag::NONE)
    }
}

/// The set of tags a model can assign
///
/// Tag `0` is always [`Tag::NONE`] and tag `1` is always [`Tag::SENTINEL`].
#[derive(Debug, Clone)]
pub struct TagSet {
    names: Lexicon,
}

impl TagSet {
    pub fn new() -> Self {
        let mut names = Lexicon::new();
        names.canonize(NONE_STR);
        names.canonize(SENTINEL_STR);
        Self { names }
    }

    /// Total number of tags, reserved ones included
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if only the reserved tags are present
    pub fn is_empty(&self) -> bool {
        self.names.len() <= 2
    }

    /// Add a tag, returning its identifier
    pub fn insert(&mut self, raw: &str) -> Tag {
        Tag(self.names.canonize(raw).index())
    }

    /// Canonical tag of `raw`, `Tag::NONE` when unknown
    pub fn canonize(&self, raw: &str) -> Tag {
        self.get(raw).unwrap_or(Tag::NONE)
    }

    /// Canonical tag of `raw` if it is part of the set
    pub fn get(&self, raw: &str) -> Option<Tag> {
        self.names.get(raw).map(|w| Tag(w.index()))
    }

    /// Name of a tag
    pub fn str(&self, tag: Tag) -> &str {
        self.names.str(word_of(tag))
    }

    /// Iterate over the assignable tags, reserved ones excluded
    pub fn tags(&self) -> impl Iterator<Item = (&str, Tag)> + '_ {
        self.names
            .iter()
            .skip(2)
            .map(|(s, w)| (s, Tag(w.index())))
    }
}

impl Default for TagSet {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> FromIterator<&'a str> for TagSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut tags = TagSet::new();
        for raw in iter {
            tags.insert(raw);
        }
        tags
    }
}

fn word_of(tag: Tag) -> Word {
    Word::from_index(tag.0)
}
