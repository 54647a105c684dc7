use std::ops::Range;

use crate::tagset::TagPair;

/// One scalar parameter for a (feature value, tag transition) combination
#[derive(Debug, Clone, PartialEq)]
pub struct Weight {
    /// Tag transition the weight fires on
    pub klasses: TagPair,
    /// Current parameter value
    pub lambda: f64,
    /// Observed (empirical) count collected during extraction
    pub freq: u64,
    /// Model expectation accumulated during the current pass
    pub exp: f64,
}

impl Weight {
    pub fn new(klasses: TagPair, lambda: f64) -> Self {
        Self {
            klasses,
            lambda,
            freq: 0,
            exp: 0.0,
        }
    }

    /// Gradient of the negative penalized log-likelihood for this weight
    #[inline]
    pub fn gradient(&self, lambda: f64, inv_sigma_sq: f64) -> f64 {
        self.exp - self.freq as f64 + inv_sigma_sq * lambda
    }
}

/// Reference to a single weight inside an attributes store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId(pub u32);

impl FeatureId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// All weights for one observed feature value
///
/// A half-open range `[begin, end)` over the weight pool of the store that
/// handed it out. The attribute owns nothing; an empty range is the "none"
/// value returned on lookup misses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Attribute {
    pub begin: u32,
    pub end: u32,
}

impl Attribute {
    /// The empty attribute
    pub const NONE: Attribute = Attribute { begin: 0, end: 0 };

    pub fn new(begin: usize, end: usize) -> Self {
        debug_assert!(begin <= end);
        Self {
            begin: begin as u32,
            end: end as u32,
        }
    }

    /// Number of weights in the range
    pub fn len(&self) -> usize {
        (self.end - self.begin) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.begin as usize..self.end as usize
    }

    /// Ids of every weight in the range
    pub fn features(&self) -> impl Iterator<Item = FeatureId> {
        (self.begin..self.end).map(FeatureId)
    }

    /// Returns `true` if the two ranges share at least one weight
    pub fn overlaps(&self, other: &Attribute) -> bool {
        !self.is_empty() && !other.is_empty() && self.begin < other.end && other.begin < self.end
    }
}
