use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use crfner::types::WORD;
use crfner::{Activate, Attributes, AttributesParams, TagPair, TagSet};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn words(n: usize, vocab: usize) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(17);
    (0..n)
        .map(|_| format!("w{}", rng.gen_range(0..vocab)))
        .collect()
}

fn store(nbuckets: usize) -> Attributes {
    let tags: TagSet = ["PER", "LOC", "O"].iter().copied().collect();
    let params = AttributesParams::default().with_nbuckets(nbuckets).unwrap();
    Attributes::new(tags, params)
}

fn benchmark_insert_by_buckets(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_by_buckets");
    let corpus = words(20_000, 5_000);

    for nbuckets in [64, 1 << 10, 1 << 16] {
        group.bench_with_input(BenchmarkId::from_parameter(nbuckets), &nbuckets, |b, &n| {
            b.iter(|| {
                let mut attrs = store(n);
                let tp = TagPair::new(attrs.tags().canonize("O"), attrs.tags().canonize("PER"));
                for word in &corpus {
                    attrs.add(WORD, word, tp, Activate::ALL);
                }
                black_box(attrs.nfeatures());
            });
        });
    }

    group.finish();
}

fn benchmark_lookup(c: &mut Criterion) {
    let corpus = words(20_000, 5_000);
    let mut attrs = store(1 << 16);
    let tp = TagPair::new(attrs.tags().canonize("O"), attrs.tags().canonize("LOC"));
    for word in &corpus {
        attrs.add(WORD, word, tp, Activate::ALL);
    }
    let queries = words(1_000, 10_000);

    c.bench_function("lookup", |b| {
        b.iter(|| {
            for word in &queries {
                black_box(attrs.get(WORD, word));
            }
        });
    });
}

fn benchmark_cutoff(c: &mut Criterion) {
    let corpus = words(20_000, 5_000);
    let mut base = store(1 << 16);
    let tp = TagPair::new(base.tags().canonize("O"), base.tags().canonize("O"));
    for word in &corpus {
        base.add(WORD, word, tp, Activate::ALL);
    }

    c.bench_function("apply_cutoff", |b| {
        b.iter(|| {
            let mut attrs = base.fork();
            attrs.apply_cutoff(black_box(3));
            black_box(attrs.nfeatures());
        });
    });
}

criterion_group!(
    benches,
    benchmark_insert_by_buckets,
    benchmark_lookup,
    benchmark_cutoff
);
criterion_main!(benches);
