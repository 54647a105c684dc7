use crate::attribute::Attribute;
use crate::error::{Error, Result};
use crate::tagset::{Tag, TagSet};
use crate::tokens::Tokens;
use crate::types::Type;

use super::DictEntry;

/// Dense dictionary for feature types whose value is a tag
///
/// One attribute slot per tag, indexed directly by tag identity. Unknown
/// tag names resolve to the [`Tag::NONE`] slot.
#[derive(Debug, Clone)]
pub struct TagDict {
    r#type: Type,
    tags: TagSet,
    attributes: Vec<Attribute>,
}

impl TagDict {
    pub fn new(r#type: Type, tags: TagSet) -> Self {
        let attributes = vec![Attribute::NONE; tags.len()];
        Self {
            r#type,
            tags,
            attributes,
        }
    }

    /// Number of tags holding a non-empty attribute
    pub fn len(&self) -> usize {
        self.attributes.iter().filter(|a| !a.is_empty()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    /// Read a tag name from `tokens` and return its slot.
    ///
    /// Unlike [`insert`](Self::insert), an unknown tag is a parse error.
    pub(crate) fn load(&mut self, _type: Type, tokens: &mut Tokens<'_>) -> Result<&mut Attribute> {
        let raw = tokens.next_value("tag value")?;
        let tag = self
            .tags
            .get(&raw)
            .ok_or_else(|| Error::parse(tokens.line(), format!("unknown tag {:?}", raw)))?;
        Ok(self.slot_mut(tag))
    }

    pub fn get(&self, _type: Type, raw: &str) -> Attribute {
        self.attributes[self.tags.canonize(raw).index()]
    }

    pub fn insert(&mut self, _type: Type, raw: &str) -> &mut Attribute {
        let tag = self.tags.canonize(raw);
        self.slot_mut(tag)
    }

    /// Slot of a canonical tag.
    ///
    /// # Panics
    ///
    /// Panics if `tag` does not belong to the tag set the dictionary was
    /// built with.
    pub fn slot_mut(&mut self, tag: Tag) -> &mut Attribute {
        &mut self.attributes[tag.index()]
    }

    /// Iterate over non-empty slots in tag order
    pub fn entries(&self) -> impl Iterator<Item = DictEntry<'_>> + '_ {
        self.attributes
            .iter()
            .enumerate()
            .filter(|(_, attrib)| !attrib.is_empty())
            .map(move |(index, attrib)| DictEntry {
                r#type: self.r#type,
                value: self.tags.str(Tag::from_index(index)),
                attrib: *attrib,
            })
    }

    /// Empty the slots for which `keep` returns `false`.
    pub(crate) fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(Type, &mut Attribute) -> bool,
    {
        for attrib in self.attributes.iter_mut().filter(|a| !a.is_empty()) {
            if !keep(self.r#type, attrib) {
                *attrib = Attribute::NONE;
            }
        }
    }
}
