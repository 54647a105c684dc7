/// Value domain of a feature type, selecting the dictionary variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    /// Values are arbitrary observed strings
    Words = 0,
    /// Values are tags
    Tags = 1,
}

/// Identity of a feature type
///
/// Types compare by `id` only; `name` is what the model text uses.
#[derive(Debug, Clone, Copy)]
pub struct Type {
    pub id: u32,
    pub name: &'static str,
    pub domain: Domain,
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Type {}

impl std::hash::Hash for Type {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Current word
pub const WORD: Type = Type {
    id: 0,
    name: "w",
    domain: Domain::Words,
};

/// Previous word
pub const PREV_WORD: Type = Type {
    id: 1,
    name: "pw",
    domain: Domain::Words,
};

/// Next word
pub const NEXT_WORD: Type = Type {
    id: 2,
    name: "nw",
    domain: Domain::Words,
};

/// Transition into the current tag
pub const TRANS: Type = Type {
    id: 3,
    name: "t",
    domain: Domain::Tags,
};

/// Every known feature type, in id order
pub const ALL: [Type; 4] = [WORD, PREV_WORD, NEXT_WORD, TRANS];

impl Type {
    /// Resolve a type from its name in the model text
    pub fn from_name(name: &str) -> Option<Type> {
        ALL.iter().copied().find(|t| t.name == name)
    }
}
