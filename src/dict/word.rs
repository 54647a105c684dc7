use crate::attribute::Attribute;
use crate::error::Result;
use crate::lexicon::{Lexicon, Word};
use crate::pool::Pool;
use crate::shared::Shared;
use crate::tokens::Tokens;
use crate::types::Type;

use super::{DictEntry, DictStats};

/// Entry of the word hashtable
///
/// One dictionary serves several feature types, so the entry keeps the type
/// next to the canonical value. Entries live in the dictionary's pool and
/// chain to the next entry of the same bucket by slot.
#[derive(Debug, Clone)]
struct WordEntry {
    r#type: Type,
    value: Word,
    attrib: Attribute,
    next: Option<u32>,
}

impl WordEntry {
    #[inline]
    fn hash(r#type: Type, value: Word) -> u64 {
        (value.index() as u64)
            .wrapping_mul(31)
            .wrapping_add((r#type.id as u64).wrapping_mul(37))
    }

    #[inline]
    fn equal(&self, r#type: Type, value: Word) -> bool {
        self.r#type == r#type && self.value == value
    }
}

/// Hashtable over pooled entries keyed by (type, canonical value)
///
/// The bucket count is fixed at construction; chains grow without bound
/// when it is too small for the number of distinct values.
#[derive(Debug, Clone)]
pub struct WordDict {
    lexicon: Lexicon,
    buckets: Vec<Option<u32>>,
    entries: Pool<WordEntry>,
}

impl WordDict {
    /// Create a dictionary with `nbuckets` chains and a `pool_size` byte hint.
    pub fn new(nbuckets: usize, pool_size: usize) -> Self {
        Self {
            lexicon: Lexicon::new(),
            buckets: vec![None; nbuckets.max(1)],
            entries: Pool::with_bytes(pool_size),
        }
    }

    /// Number of entries, duplicates created by [`load`](Self::load) included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn nbuckets(&self) -> usize {
        self.buckets.len()
    }

    /// Canonical values seen so far
    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    #[inline]
    fn bucket(&self, r#type: Type, value: Word) -> usize {
        (WordEntry::hash(r#type, value) % self.buckets.len() as u64) as usize
    }

    fn find(&self, r#type: Type, value: Word) -> Option<usize> {
        let mut cursor = self.buckets[self.bucket(r#type, value)];
        while let Some(slot) = cursor {
            let entry = &self.entries[slot as usize];
            if entry.equal(r#type, value) {
                return Some(slot as usize);
            }
            cursor = entry.next;
        }
        None
    }

    /// Prepend a new entry to its bucket's chain.
    fn push(&mut self, r#type: Type, value: Word, attrib: Attribute) -> usize {
        let bucket = self.bucket(r#type, value);
        let slot = self.entries.alloc(WordEntry {
            r#type,
            value,
            attrib,
            next: self.buckets[bucket],
        });
        self.buckets[bucket] = Some(slot as u32);
        slot
    }

    /// Read the next value from `tokens` and create an entry for it.
    ///
    /// Always creates a new entry, even if the key is already present. Load
    /// is meant for rebuilding a saved model whose keys are unique; callers
    /// feeding duplicate keys get duplicate chain entries, and lookups see
    /// the most recently loaded one.
    pub(crate) fn load(&mut self, r#type: Type, tokens: &mut Tokens<'_>) -> Result<&mut Attribute> {
        let raw = tokens.next_value("feature value")?;
        let value = self.lexicon.canonize(&raw);
        let slot = self.push(r#type, value, Attribute::NONE);
        Ok(&mut self.entries[slot].attrib)
    }

    /// Look up the attribute of `raw`, the empty attribute on a miss
    pub fn get(&self, r#type: Type, raw: &str) -> Attribute {
        self.lexicon
            .get(raw)
            .and_then(|value| self.find(r#type, value))
            .map(|slot| self.entries[slot].attrib)
            .unwrap_or(Attribute::NONE)
    }

    /// Find or create the attribute of `raw`
    pub fn insert(&mut self, r#type: Type, raw: &str) -> &mut Attribute {
        let value = self.lexicon.canonize(raw);
        let slot = match self.find(r#type, value) {
            Some(slot) => slot,
            None => self.push(r#type, value, Attribute::NONE),
        };
        &mut self.entries[slot].attrib
    }

    /// Iterate over entries in insertion order
    pub fn entries(&self) -> impl Iterator<Item = DictEntry<'_>> + '_ {
        self.entries.iter().map(move |entry| DictEntry {
            r#type: entry.r#type,
            value: self.lexicon.str(entry.value),
            attrib: entry.attrib,
        })
    }

    /// Drop entries for which `keep` returns `false`.
    ///
    /// The pool and chains are rebuilt from the surviving entries; the
    /// lexicon keeps every value it has seen.
    pub(crate) fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(Type, &mut Attribute) -> bool,
    {
        let old = std::mem::replace(&mut self.entries, Pool::with_bytes(0));
        self.buckets.iter_mut().for_each(|b| *b = None);
        for mut entry in old.iter().cloned() {
            if keep(entry.r#type, &mut entry.attrib) {
                self.push(entry.r#type, entry.value, entry.attrib);
            }
        }
    }

    /// Chain statistics, used to spot a bucket count that is too small
    pub fn stats(&self) -> DictStats {
        let mut used = 0;
        let mut max_chain = 0;
        for head in &self.buckets {
            let mut chain = 0;
            let mut cursor = *head;
            while let Some(slot) = cursor {
                chain += 1;
                cursor = self.entries[slot as usize].next;
            }
            if chain > 0 {
                used += 1;
            }
            max_chain = max_chain.max(chain);
        }
        DictStats {
            nbuckets: self.buckets.len(),
            used,
            entries: self.entries.len(),
            max_chain,
        }
    }

    /// Freeze the dictionary into a read-only handle that can be shared.
    pub fn into_shared(self) -> Shared<Self> {
        Shared::new(self)
    }
}
