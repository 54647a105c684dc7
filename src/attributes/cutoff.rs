use std::cmp::Reverse;
use std::collections::BTreeMap;

use log::info;

use super::{Attributes, Live, WeightStore, DEFAULT_VALUE};
use crate::attribute::{Attribute, Weight};
use crate::pool::Pool;
use crate::tagset::TagPair;
use crate::types::Type;

impl Attributes {
    /// Reorder attributes by total frequency, most frequent first, and the
    /// weights inside each attribute the same way. Ties keep pool order.
    pub fn sort_by_freq(&mut self) {
        let mut order = self.live_keys();
        order.sort_by_cached_key(|l| Reverse(self.total_freq(l.attrib)));
        self.rebuild(&order, |_, _| true, true);
    }

    /// Remove every weight seen fewer than `freq` times.
    pub fn apply_cutoff(&mut self, freq: u64) {
        let before = self.nfeatures();
        let order = self.live_keys();
        self.rebuild(&order, |_, w| w.freq >= freq, false);
        info!("cutoff {}: {} -> {} features", freq, before, self.nfeatures());
    }

    /// Remove weights of `r#type` seen fewer than `freq` times; other types
    /// are left alone.
    pub fn apply_type_cutoff(&mut self, r#type: Type, freq: u64) {
        let before = self.nfeatures();
        let order = self.live_keys();
        self.rebuild(&order, |t, w| t != r#type || w.freq >= freq, false);
        info!(
            "cutoff {} on {}: {} -> {} features",
            freq,
            r#type.name,
            before,
            self.nfeatures()
        );
    }

    /// Like [`apply_type_cutoff`](Self::apply_type_cutoff), but the counts of
    /// pruned weights are folded per tag pair into the fallback attribute
    /// `(r#type, DEFAULT_VALUE)`.
    ///
    /// Fallback weights reaching `def` survive, keeping their lambda if the
    /// fallback existed before. Lookups through [`Attributes::lookup`] then
    /// resolve pruned values of the type to the fallback.
    pub fn apply_cutoff_with_default(&mut self, r#type: Type, freq: u64, def: u64) {
        let before = self.nfeatures();
        let fallback = self.get(r#type, DEFAULT_VALUE);

        let mut folded: BTreeMap<TagPair, (u64, f64)> = BTreeMap::new();
        for weight in self.weights(fallback) {
            let slot = folded.entry(weight.klasses).or_insert((0, 0.0));
            slot.0 += weight.freq;
            slot.1 = weight.lambda;
        }
        let mut order = Vec::new();
        for live in self.live_keys() {
            if live.r#type == r#type && live.attrib == fallback {
                continue;
            }
            if live.r#type == r#type {
                for weight in self.weights(live.attrib).iter().filter(|w| w.freq < freq) {
                    folded.entry(weight.klasses).or_insert((0, 0.0)).0 += weight.freq;
                }
            }
            order.push(live);
        }
        self.rebuild(&order, |t, w| t != r#type || w.freq >= freq, false);

        let survivors: Vec<_> = folded.into_iter().filter(|(_, (f, _))| *f >= def).collect();
        if !survivors.is_empty() {
            let attrib = self.dicts[super::domain_index(r#type.domain)].insert(r#type, DEFAULT_VALUE);
            for (klasses, (freq, lambda)) in survivors {
                let mut weight = Weight::new(klasses, lambda);
                weight.freq = freq;
                self.store.push(attrib, weight);
            }
        }
        info!(
            "cutoff {} on {} with default {}: {} -> {} features",
            freq,
            r#type.name,
            def,
            before,
            self.nfeatures()
        );
    }

    /// Remove whole attributes whose total frequency is below `freq`.
    pub fn apply_attrib_cutoff(&mut self, freq: u64) {
        let before = self.size();
        let order: Vec<Live> = self
            .live_keys()
            .into_iter()
            .filter(|l| self.total_freq(l.attrib) >= freq)
            .collect();
        self.rebuild(&order, |_, _| true, false);
        info!("attribute cutoff {}: {} -> {} attributes", freq, before, self.size());
    }

    /// Drop slots abandoned by growing attributes.
    pub fn compact(&mut self) {
        if self.is_compact() {
            return;
        }
        let order = self.live_keys();
        self.rebuild(&order, |_, _| true, false);
        self.log_stats();
    }

    fn total_freq(&self, attrib: Attribute) -> u64 {
        self.weights(attrib).iter().map(|w| w.freq).sum()
    }

    /// Rebuild the weight pool from the attributes in `order`.
    ///
    /// Each attribute keeps the weights `keep` accepts, in the new pool
    /// order. Keys whose attribute ends up empty, or that are missing from
    /// `order`, are removed from their dictionary. A pending finite
    /// difference perturbation is undone first.
    fn rebuild<K>(&mut self, order: &[Live], mut keep: K, sort_weights: bool)
    where
        K: FnMut(Type, &Weight) -> bool,
    {
        self.undo_perturbation();
        let old = std::mem::replace(&mut self.store, WeightStore::new(self.params.pool_size()));
        let mut weights = Pool::with_bytes(self.params.pool_size());
        let mut remap: Vec<(u32, Attribute)> = Vec::with_capacity(order.len());

        for live in order {
            let begin = weights.len();
            let mut kept: Vec<Weight> = old
                .weights
                .slice(live.attrib.range())
                .iter()
                .filter(|w| keep(live.r#type, *w))
                .cloned()
                .collect();
            if sort_weights {
                kept.sort_by(|a, b| b.freq.cmp(&a.freq));
            }
            for weight in kept {
                weights.alloc(weight);
            }
            remap.push((live.attrib.begin, Attribute::new(begin, weights.len())));
        }
        remap.sort_by_key(|(old_begin, _)| *old_begin);

        for dict in &mut self.dicts {
            dict.retain(|_, attrib| {
                if attrib.is_empty() {
                    return false;
                }
                match remap.binary_search_by_key(&attrib.begin, |(old_begin, _)| *old_begin) {
                    Ok(i) => {
                        *attrib = remap[i].1;
                        !attrib.is_empty()
                    }
                    Err(_) => false,
                }
            });
        }

        self.store = WeightStore {
            nfeatures: weights.len(),
            weights,
            holes: 0,
        };
        self.cursor = 0;
    }
}
