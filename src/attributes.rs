use bitflags::bitflags;
use log::{debug, warn};

use crate::attribute::{Attribute, FeatureId, Weight};
use crate::context::Context;
use crate::dict::{DictEntry, FeatureDict, TagDict, WordDict};
use crate::error::{Error, Result};
use crate::pool::{Pool, LARGE, MEDIUM};
use crate::shared::Shared;
use crate::tagset::{TagPair, TagSet};
use crate::types::{Domain, Type, TRANS};

mod cutoff;
mod gradient;
mod io;

/// Value whose attribute stands in for pruned values of a feature type
pub const DEFAULT_VALUE: &str = "__DEFAULT__";

/// Chains longer than this on average suggest too few buckets.
const MAX_MEAN_CHAIN: f64 = 4.0;

bitflags! {
    /// Features registered for one observation during extraction
    pub struct Activate: u32 {
        /// State feature, depends on the current tag only
        const STATE = 0x01;
        /// Transition feature, depends on the whole tag pair
        const TRANS = 0x02;
        const ALL = 0x03;
    }
}

/// Capacity parameters of an attributes store.
#[derive(Debug, Clone)]
pub struct AttributesParams {
    nbuckets: usize,
    pool_size: usize,
}

impl Default for AttributesParams {
    fn default() -> Self {
        Self {
            nbuckets: MEDIUM,
            pool_size: LARGE,
        }
    }
}

impl AttributesParams {
    pub fn nbuckets(&self) -> usize {
        self.nbuckets
    }

    pub fn set_nbuckets(&mut self, nbuckets: usize) -> Result<()> {
        if nbuckets == 0 {
            return Err(Error::invalid("nbuckets must be positive"));
        }
        self.nbuckets = nbuckets;
        Ok(())
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn set_pool_size(&mut self, pool_size: usize) -> Result<()> {
        if pool_size == 0 {
            return Err(Error::invalid("pool_size must be positive"));
        }
        self.pool_size = pool_size;
        Ok(())
    }

    /// Set the bucket count (builder pattern)
    pub fn with_nbuckets(mut self, nbuckets: usize) -> Result<Self> {
        self.set_nbuckets(nbuckets)?;
        Ok(self)
    }

    /// Set the pool size hint in bytes (builder pattern)
    pub fn with_pool_size(mut self, pool_size: usize) -> Result<Self> {
        self.set_pool_size(pool_size)?;
        Ok(self)
    }
}

/// Weight pool shared by every dictionary of a store
#[derive(Debug, Clone)]
struct WeightStore {
    weights: Pool<Weight>,
    /// Weights reachable from some attribute
    nfeatures: usize,
    /// Slots abandoned by relocations since the last rebuild
    holes: usize,
}

impl WeightStore {
    fn new(pool_size: usize) -> Self {
        Self {
            weights: Pool::with_bytes(pool_size),
            nfeatures: 0,
            holes: 0,
        }
    }

    /// Append `weight` to `attrib`, moving the attribute to the end of the
    /// pool first if something was allocated after it.
    fn push(&mut self, attrib: &mut Attribute, weight: Weight) -> FeatureId {
        if !attrib.is_empty() && attrib.end as usize != self.weights.len() {
            let moved = self.weights.relocate(attrib.range());
            self.holes += attrib.len();
            *attrib = Attribute::new(moved.start, moved.end);
        }
        let slot = self.weights.alloc(weight);
        if attrib.is_empty() {
            *attrib = Attribute::new(slot, slot + 1);
        } else {
            attrib.end += 1;
        }
        self.nfeatures += 1;
        FeatureId(slot as u32)
    }

    /// Bump the count of the `klasses` weight of `attrib`, creating it on
    /// first sight.
    fn count(&mut self, attrib: &mut Attribute, klasses: TagPair) {
        let existing = self
            .weights
            .slice_mut(attrib.range())
            .iter_mut()
            .find(|w| w.klasses == klasses);
        match existing {
            Some(weight) => weight.freq += 1,
            None => {
                let mut weight = Weight::new(klasses, 0.0);
                weight.freq = 1;
                self.push(attrib, weight);
            }
        }
    }
}

/// A live attribute together with the type it was registered under
#[derive(Debug, Clone, Copy)]
pub(crate) struct Live {
    pub r#type: Type,
    pub attrib: Attribute,
}

/// The feature store used in training
///
/// Owns one dictionary per value domain (word types share the word
/// dictionary, tag types the tag dictionary) and a single pool holding the
/// weights of every attribute. Pool order is the order of the vectors
/// exchanged with the optimizer.
///
/// Feature ids handed out through [`Context`]s are pool slots, so contexts
/// are only generated from a compact store and the optimizer methods never
/// move weights. See [`compact`](Self::compact).
#[derive(Debug)]
pub struct Attributes {
    params: AttributesParams,
    tags: TagSet,
    dicts: Vec<FeatureDict>,
    store: WeightStore,
    /// Keys registered as transition features
    trans: Vec<(Type, String)>,
    /// Next lambda to perturb, and the perturbation currently applied
    cursor: usize,
    perturbed: Option<(usize, f64)>,
}

impl Attributes {
    /// Create an empty store for the given tag set
    pub fn new(tags: TagSet, params: AttributesParams) -> Self {
        let dicts = vec![
            FeatureDict::Word(WordDict::new(params.nbuckets(), params.pool_size()).into_shared()),
            FeatureDict::Tag(TagDict::new(TRANS, tags.clone())),
        ];
        let store = WeightStore::new(params.pool_size());
        Self {
            params,
            tags,
            dicts,
            store,
            trans: Vec::new(),
            cursor: 0,
            perturbed: None,
        }
    }

    /// A store reading the same word dictionary arena, with its own copy of
    /// the weights.
    ///
    /// Lambdas, expectations and counts of the two stores evolve
    /// separately. The first call that changes the keys or the layout of
    /// either store (an [`add`](Self::add), a cutoff, a load) moves that
    /// store onto a private copy of the dictionary.
    pub fn fork(&self) -> Self {
        let mut fork = Self {
            params: self.params.clone(),
            tags: self.tags.clone(),
            dicts: self.dicts.clone(),
            store: self.store.clone(),
            trans: self.trans.clone(),
            cursor: 0,
            perturbed: None,
        };
        // The fork starts from unperturbed lambdas
        if let Some((index, val)) = self.perturbed {
            fork.store.weights[index].lambda -= val;
        }
        fork
    }

    pub fn params(&self) -> &AttributesParams {
        &self.params
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    /// Dictionary serving feature type `r#type`
    pub fn dict(&self, r#type: Type) -> &FeatureDict {
        &self.dicts[domain_index(r#type.domain)]
    }

    /// Total number of weights
    pub fn nfeatures(&self) -> usize {
        self.store.nfeatures
    }

    /// Total number of attribute keys
    pub fn size(&self) -> usize {
        self.dicts.iter().map(FeatureDict::len).sum()
    }

    /// Returns `true` if the pool holds no abandoned slots, so that feature
    /// ids equal positions in optimizer vectors.
    pub fn is_compact(&self) -> bool {
        self.store.holes == 0
    }

    /// Register an observation of `raw` for `r#type` with tag pair `tp`.
    ///
    /// With [`Activate::STATE`] the count of the `(NONE, tp.curr)` weight is
    /// bumped, with [`Activate::TRANS`] the count of the `tp` weight.
    pub fn add(&mut self, r#type: Type, raw: &str, tp: TagPair, flags: Activate) {
        let attrib = self.dicts[domain_index(r#type.domain)].insert(r#type, raw);
        if flags.contains(Activate::STATE) {
            self.store.count(attrib, TagPair::state(tp.curr));
        }
        if flags.contains(Activate::TRANS) {
            self.store.count(attrib, tp);
        }
    }

    /// Read-only lookup, the empty attribute on a miss
    pub fn get(&self, r#type: Type, raw: &str) -> Attribute {
        self.dict(r#type).get(r#type, raw)
    }

    /// Like [`get`](Self::get), but a miss resolves to the type's fallback
    /// attribute when a cutoff with default created one.
    pub fn lookup(&self, r#type: Type, raw: &str) -> Attribute {
        let attrib = self.get(r#type, raw);
        if attrib.is_empty() && raw != DEFAULT_VALUE {
            self.get(r#type, DEFAULT_VALUE)
        } else {
            attrib
        }
    }

    /// Append every feature of `raw`'s attribute to `ctx`.
    pub fn activate(&self, r#type: Type, raw: &str, ctx: &mut Context) {
        ctx.features.extend(self.lookup(r#type, raw).features());
    }

    /// Register `(r#type, raw)` as a transition feature.
    ///
    /// Transition features are not observed at a token: the tagger scores
    /// them at every position, and no [`Context`] ever activates them.
    /// Registering a key twice has no effect.
    pub fn load_trans_features(&mut self, r#type: Type, raw: &str) {
        if !self.trans.iter().any(|(t, v)| *t == r#type && v == raw) {
            self.trans.push((r#type, raw.to_string()));
        }
    }

    /// Weights of every registered transition feature, in registration
    /// order. Keys removed by a cutoff contribute nothing.
    pub fn trans_features(&self) -> Vec<FeatureId> {
        self.trans
            .iter()
            .flat_map(|(r#type, raw)| self.get(*r#type, raw).features())
            .collect()
    }

    /// Weights of an attribute handed out by this store
    pub fn weights(&self, attrib: Attribute) -> &[Weight] {
        self.store.weights.slice(attrib.range())
    }

    pub fn weight(&self, fid: FeatureId) -> &Weight {
        &self.store.weights[fid.index()]
    }

    /// Iterate over every key of every dictionary
    pub fn entries(&self) -> impl Iterator<Item = DictEntry<'_>> + '_ {
        self.dicts.iter().flat_map(FeatureDict::entries)
    }

    /// Freeze the store into a read-only handle that can be shared.
    pub fn into_shared(self) -> Shared<Self> {
        Shared::new(self)
    }

    /// Keys with a non-empty attribute, in pool order
    pub(crate) fn live(&self) -> Vec<DictEntry<'_>> {
        let mut live: Vec<_> = self.entries().filter(|e| !e.attrib.is_empty()).collect();
        live.sort_by_key(|e| e.attrib.begin);
        live
    }

    /// Same as [`live`](Self::live), without borrowing the store
    pub(crate) fn live_keys(&self) -> Vec<Live> {
        self.live()
            .into_iter()
            .map(|e| Live {
                r#type: e.r#type,
                attrib: e.attrib,
            })
            .collect()
    }

    /// Reachable weights in pool order, skipping abandoned slots
    pub(crate) fn live_weights(&self) -> Box<dyn Iterator<Item = &Weight> + '_> {
        if self.is_compact() {
            Box::new(self.store.weights.iter())
        } else {
            let ranges: Vec<_> = self.live().into_iter().map(|e| e.attrib.range()).collect();
            Box::new(
                ranges
                    .into_iter()
                    .flat_map(move |range| self.store.weights.slice(range).iter()),
            )
        }
    }

    fn log_stats(&self) {
        for dict in &self.dicts {
            if let FeatureDict::Word(dict) = dict {
                let stats = dict.stats();
                debug!(
                    "word dictionary: {} entries in {}/{} buckets, longest chain {}",
                    stats.entries, stats.used, stats.nbuckets, stats.max_chain
                );
                if stats.mean_chain() > MAX_MEAN_CHAIN {
                    warn!(
                        "word dictionary chains average {:.1} entries, consider more than {} buckets",
                        stats.mean_chain(),
                        stats.nbuckets
                    );
                }
            }
        }
    }
}

fn domain_index(domain: Domain) -> usize {
    domain as usize
}
