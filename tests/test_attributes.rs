use crfner::types::{NEXT_WORD, PREV_WORD, TRANS, WORD};
use crfner::{
    Activate, Attribute, Attributes, AttributesParams, Context, FeatureId, TagPair, TagSet,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn tags() -> TagSet {
    ["PER", "LOC", "ORG", "O"].iter().copied().collect()
}

fn params(nbuckets: usize) -> AttributesParams {
    AttributesParams::default()
        .with_nbuckets(nbuckets)
        .unwrap()
        .with_pool_size(4096)
        .unwrap()
}

fn pair(attrs: &Attributes, prev: &str, curr: &str) -> TagPair {
    TagPair::new(attrs.tags().canonize(prev), attrs.tags().canonize(curr))
}

/// Random observations over a small vocabulary, skewed towards low ids
fn random_store(seed: u64, n: usize) -> Attributes {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut attrs = Attributes::new(tags(), params(8));
    let names = ["PER", "LOC", "ORG", "O"];
    for _ in 0..n {
        let word = format!("w{}", rng.gen_range(0..40) * rng.gen_range(0..3));
        let prev = names[rng.gen_range(0..names.len())];
        let curr = names[rng.gen_range(0..names.len())];
        let tp = pair(&attrs, prev, curr);
        let r#type = [WORD, PREV_WORD, NEXT_WORD][rng.gen_range(0..3)];
        attrs.add(r#type, &word, tp, Activate::ALL);
        attrs.add(TRANS, curr, tp, Activate::TRANS);
    }
    attrs
}

fn reachable(attrs: &Attributes) -> usize {
    attrs.entries().map(|e| e.attrib.len()).sum()
}

#[test]
fn test_insert_is_idempotent() {
    let mut attrs = Attributes::new(tags(), params(16));
    let tp = pair(&attrs, "O", "PER");
    attrs.add(WORD, "John", tp, Activate::ALL);
    let first = attrs.get(WORD, "John");
    attrs.add(WORD, "John", tp, Activate::ALL);
    assert_eq!(attrs.get(WORD, "John"), first);
    assert_eq!(attrs.size(), 1);
    assert_eq!(attrs.nfeatures(), 2);
}

#[test]
fn test_dog_cat_bird() {
    let mut attrs = Attributes::new(tags(), params(16));
    let tp = pair(&attrs, "O", "O");
    attrs.add(WORD, "dog", tp, Activate::ALL);
    attrs.add(WORD, "cat", tp, Activate::ALL);

    let dog = attrs.get(WORD, "dog");
    let cat = attrs.get(WORD, "cat");
    assert!(!dog.is_empty());
    assert!(!cat.is_empty());
    assert!(!dog.overlaps(&cat));
    assert_eq!(attrs.get(WORD, "bird"), Attribute::NONE);
    // A miss registers nothing
    assert_eq!(attrs.size(), 2);
}

#[test]
fn test_same_value_different_types() {
    let mut attrs = Attributes::new(tags(), params(1));
    let tp = pair(&attrs, "O", "LOC");
    attrs.add(WORD, "Paris", tp, Activate::ALL);
    attrs.add(NEXT_WORD, "Paris", tp, Activate::STATE);
    let w = attrs.get(WORD, "Paris");
    let nw = attrs.get(NEXT_WORD, "Paris");
    assert_eq!(w.len(), 2);
    assert_eq!(nw.len(), 1);
    assert!(!w.overlaps(&nw));
    assert!(attrs.get(PREV_WORD, "Paris").is_empty());
}

#[test]
fn test_unknown_trans_value_uses_none_slot() {
    let mut attrs = Attributes::new(tags(), params(16));
    let tp = pair(&attrs, "O", "PER");
    attrs.add(TRANS, "MISC", tp, Activate::TRANS);
    assert_eq!(attrs.get(TRANS, "MISC"), attrs.get(TRANS, "__NONE__"));
    assert!(attrs.get(TRANS, "PER").is_empty());
}

#[test]
fn test_cutoff_is_monotone() {
    for seed in 0..8 {
        let mut attrs = random_store(seed, 500);
        attrs.compact();
        let mut last = attrs.nfeatures();
        assert_eq!(reachable(&attrs), last);
        for freq in 1..6 {
            attrs.apply_cutoff(freq);
            let now = attrs.nfeatures();
            assert!(now <= last, "seed {} freq {}: {} > {}", seed, freq, now, last);
            assert_eq!(reachable(&attrs), now);
            assert!(attrs
                .entries()
                .flat_map(|e| attrs.weights(e.attrib).to_vec())
                .all(|w| w.freq >= freq));
            last = now;
        }
    }
}

#[test]
fn test_cutoff_keeps_attribute_ranges_disjoint() {
    let mut attrs = random_store(42, 1000);
    attrs.apply_type_cutoff(WORD, 3);
    let mut ranges: Vec<_> = attrs.entries().map(|e| e.attrib).collect();
    ranges.sort_by_key(|a| a.begin);
    for window in ranges.windows(2) {
        assert!(window[0].end <= window[1].begin);
    }
    assert_eq!(ranges.last().unwrap().end as usize, attrs.nfeatures());
}

#[test]
fn test_fallback_resolves_pruned_words() {
    let mut attrs = random_store(7, 800);
    let before = attrs.nfeatures();
    attrs.apply_cutoff_with_default(WORD, 4, 1);
    assert!(attrs.nfeatures() <= before);
    let fallback = attrs.get(WORD, crfner::DEFAULT_VALUE);
    assert!(!fallback.is_empty());
    assert_eq!(attrs.lookup(WORD, "never-seen"), fallback);
    assert_eq!(reachable(&attrs), attrs.nfeatures());

    let mut ctx = Context::new(pair(&attrs, "O", "O"), 0);
    attrs.activate(WORD, "never-seen", &mut ctx);
    assert_eq!(ctx.features.len(), fallback.len());
}

#[test]
fn test_adagrad_with_identical_inputs() {
    let mut attrs = random_store(3, 200);
    attrs.compact();
    let n = attrs.nfeatures();
    let mut rng = StdRng::seed_from_u64(99);
    let start: Vec<f64> = (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect();
    let hist: Vec<f64> = (0..n).map(|_| rng.gen_range(0.0..2.0)).collect();

    let run = |attrs: &mut Attributes| {
        let mut w = start.clone();
        let mut h = hist.clone();
        attrs.adagrad_update(&mut w, &mut h, 0.1, 0.5, 1.0 / 200.0);
        (w, h)
    };
    let mut copy = attrs.fork();
    let first = run(&mut attrs);
    let second = run(&mut copy);
    assert_eq!(first, second);
    assert_eq!(attrs.lambdas(), first.0);
}

#[test]
fn test_gradients_follow_lambdas() {
    let mut attrs = random_store(5, 100);
    attrs.compact();
    let n = attrs.nfeatures();
    let lambdas: Vec<f64> = (0..n).map(|i| i as f64 * 0.01).collect();
    attrs.assign_lambdas(&lambdas);
    assert_eq!(attrs.lambdas(), lambdas);

    let mut g = vec![0.0; n];
    attrs.copy_gradients(&mut g, 1.0);
    let expected_sq: f64 = lambdas.iter().map(|l| l * l).sum();
    assert!((attrs.sum_lambda_sq() - expected_sq).abs() < 1e-12);
    for (i, g) in g.iter().enumerate() {
        let freq = attrs.weight(FeatureId(i as u32)).freq as f64;
        assert!((g - (lambdas[i] - freq)).abs() < 1e-12);
    }
}
