use std::ops::{Index, IndexMut};

use crate::attribute::FeatureId;
use crate::tagset::{Tag, TagPair};

/// Features active at one position of a sentence
///
/// Holds the observed tag pair(s) at `index` along with references to every
/// feature the observations there activate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    pub features: Vec<FeatureId>,
    pub klasses: Vec<TagPair>,
    pub index: usize,
}

impl Context {
    pub fn new(klasses: TagPair, index: usize) -> Self {
        Self {
            features: Vec::new(),
            klasses: vec![klasses],
            index,
        }
    }

    /// Returns `true` if `other` equals one of the candidate tag pairs
    pub fn klasses_match(&self, other: &TagPair) -> bool {
        self.klasses.iter().any(|k| k == other)
    }

    /// Like [`klasses_match`](Self::klasses_match), but a state pair
    /// (previous tag `NONE`) also matches any candidate with the same
    /// current tag.
    pub fn klasses_match_or_none(&self, other: &TagPair) -> bool {
        self.klasses
            .iter()
            .any(|k| k == other || (other.prev == Tag::NONE && other.curr == k.curr))
    }
}

/// One training instance: the i'th context belongs to the i'th token
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contexts {
    contexts: Vec<Context>,
}

impl Contexts {
    /// Create `size` empty contexts, one per token
    pub fn new(size: usize) -> Self {
        Self {
            contexts: vec![Context::default(); size],
        }
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Context> {
        self.contexts.get(index)
    }

    /// Iterate over contexts; `.rev()` walks the sentence backwards
    pub fn iter(&self) -> std::slice::Iter<'_, Context> {
        self.contexts.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Context> {
        self.contexts.iter_mut()
    }
}

impl Index<usize> for Contexts {
    type Output = Context;

    fn index(&self, index: usize) -> &Context {
        &self.contexts[index]
    }
}

impl IndexMut<usize> for Contexts {
    fn index_mut(&mut self, index: usize) -> &mut Context {
        &mut self.contexts[index]
    }
}

impl<'a> IntoIterator for &'a Contexts {
    type Item = &'a Context;
    type IntoIter = std::slice::Iter<'a, Context>;

    fn into_iter(self) -> Self::IntoIter {
        self.contexts.iter()
    }
}

/// Contexts of every sentence in a corpus pass
pub type Instances = Vec<Contexts>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagset::TagSet;

    fn tagset() -> (Tag, Tag, Tag) {
        let mut tags = TagSet::new();
        (tags.insert("PER"), tags.insert("LOC"), tags.insert("O"))
    }

    #[test]
    fn test_klasses_match() {
        let (per, loc, o) = tagset();
        let mut ctx = Context::new(TagPair::new(per, loc), 1);
        ctx.klasses.push(TagPair::new(o, o));

        assert!(ctx.klasses_match(&TagPair::new(per, loc)));
        assert!(ctx.klasses_match(&TagPair::new(o, o)));
        assert!(!ctx.klasses_match(&TagPair::new(loc, per)));
        assert!(!ctx.klasses_match(&TagPair::state(loc)));
    }

    #[test]
    fn test_klasses_match_or_none() {
        let (per, loc, o) = tagset();
        let ctx = Context::new(TagPair::new(per, loc), 1);

        assert!(ctx.klasses_match_or_none(&TagPair::new(per, loc)));
        assert!(ctx.klasses_match_or_none(&TagPair::state(loc)));
        assert!(!ctx.klasses_match_or_none(&TagPair::state(per)));
        // Only a NONE previous tag acts as a wildcard
        assert!(!ctx.klasses_match_or_none(&TagPair::new(o, loc)));
    }

    #[test]
    fn test_contexts_traversal() {
        let mut contexts = Contexts::new(3);
        for (i, ctx) in contexts.iter_mut().enumerate() {
            ctx.index = i;
        }
        assert_eq!(contexts.len(), 3);
        assert_eq!(contexts[2].index, 2);
        assert!(contexts.get(3).is_none());

        let backwards: Vec<_> = contexts.iter().rev().map(|c| c.index).collect();
        assert_eq!(backwards, vec![2, 1, 0]);
    }
}
