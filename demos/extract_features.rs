//! Extract features from a tiny tagged corpus, prune them and save the
//! store next to the current directory.

use crfner::types::WORD;
use crfner::{Attributes, AttributesParams, FeatureTypes, Sentence, TagSet};

fn main() -> crfner::Result<()> {
    let tags: TagSet = ["PER", "LOC", "ORG", "O"].iter().copied().collect();
    let params = AttributesParams::default().with_nbuckets(1 << 10)?;
    let mut attrs = Attributes::new(tags, params);

    let raw: &[&[(&str, &str)]] = &[
        &[("John", "PER"), ("works", "O"), ("at", "O"), ("Acme", "ORG")],
        &[("Mary", "PER"), ("lives", "O"), ("in", "O"), ("Paris", "LOC")],
        &[("Acme", "ORG"), ("opened", "O"), ("in", "O"), ("Paris", "LOC")],
    ];
    let corpus: Vec<Sentence> = raw.iter().map(|s| s.iter().copied().collect()).collect();

    let mut types = FeatureTypes::new();
    types.validate()?;
    types.extract_all(&mut attrs, &corpus)?;
    println!(
        "extracted {} attributes, {} features",
        attrs.size(),
        attrs.nfeatures()
    );

    attrs.apply_cutoff_with_default(WORD, 2, 1);
    println!(
        "after cutoff: {} attributes, {} features",
        attrs.size(),
        attrs.nfeatures()
    );

    let instances = types.instances(&attrs, &corpus)?;
    for (sent, contexts) in corpus.iter().zip(&instances) {
        let active: Vec<_> = contexts.iter().map(|c| c.features.len()).collect();
        println!("{:?}: {:?}", sent.words, active);
    }

    attrs.save_attributes("attributes.txt", "demo corpus")?;
    attrs.save_features("features.txt", "demo corpus")?;
    Ok(())
}
