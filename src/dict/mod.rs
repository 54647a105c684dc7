//! Feature dictionaries mapping (type, value) keys to attributes.

mod tag;
mod word;

pub use self::tag::TagDict;
pub use self::word::WordDict;

use crate::attribute::Attribute;
use crate::error::Result;
use crate::shared::Shared;
use crate::tokens::Tokens;
use crate::types::Type;

/// One key of a dictionary together with its attribute
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DictEntry<'a> {
    pub r#type: Type,
    pub value: &'a str,
    pub attrib: Attribute,
}

/// Bucket usage of a word dictionary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DictStats {
    pub nbuckets: usize,
    /// Buckets holding at least one entry
    pub used: usize,
    pub entries: usize,
    /// Length of the longest chain
    pub max_chain: usize,
}

impl DictStats {
    /// Average chain length over used buckets
    pub fn mean_chain(&self) -> f64 {
        if self.used == 0 {
            0.0
        } else {
            self.entries as f64 / self.used as f64
        }
    }
}

/// A dictionary variant
///
/// The word dictionary sits behind a [`Shared`] handle so that forked
/// stores read one arena; a store detaches onto its own copy on its first
/// write.
#[derive(Debug, Clone)]
pub enum FeatureDict {
    Word(Shared<WordDict>),
    Tag(TagDict),
}

impl FeatureDict {
    /// Read one value from `tokens` and return the attribute to fill in.
    pub(crate) fn load(&mut self, r#type: Type, tokens: &mut Tokens<'_>) -> Result<&mut Attribute> {
        match self {
            FeatureDict::Word(dict) => Shared::make_mut(dict).load(r#type, tokens),
            FeatureDict::Tag(dict) => dict.load(r#type, tokens),
        }
    }

    /// Read-only lookup, the empty attribute on a miss
    pub fn get(&self, r#type: Type, raw: &str) -> Attribute {
        match self {
            FeatureDict::Word(dict) => dict.get(r#type, raw),
            FeatureDict::Tag(dict) => dict.get(r#type, raw),
        }
    }

    /// Find or create the attribute of `raw`
    pub fn insert(&mut self, r#type: Type, raw: &str) -> &mut Attribute {
        match self {
            FeatureDict::Word(dict) => Shared::make_mut(dict).insert(r#type, raw),
            FeatureDict::Tag(dict) => dict.insert(r#type, raw),
        }
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        match self {
            FeatureDict::Word(dict) => dict.len(),
            FeatureDict::Tag(dict) => dict.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn entries(&self) -> Box<dyn Iterator<Item = DictEntry<'_>> + '_> {
        match self {
            FeatureDict::Word(dict) => Box::new(dict.entries()),
            FeatureDict::Tag(dict) => Box::new(dict.entries()),
        }
    }

    pub(crate) fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(Type, &mut Attribute) -> bool,
    {
        match self {
            FeatureDict::Word(dict) => Shared::make_mut(dict).retain(keep),
            FeatureDict::Tag(dict) => dict.retain(keep),
        }
    }
}
