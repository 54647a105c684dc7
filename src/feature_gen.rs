//! Feature generators and the extraction driver.

use std::fmt;

use log::{debug, info};

use crate::attributes::{Activate, Attributes};
use crate::context::{Context, Contexts, Instances};
use crate::error::{Error, Result};
use crate::sentence::Sentence;
use crate::tagset::{Tag, TagPair, TagSet};
use crate::types::{Type, NEXT_WORD, PREV_WORD, TRANS, WORD};

/// Observed value outside the sentence boundaries
pub const SENTINEL_WORD: &str = "__SENTINEL__";

/// A feature-type generator
///
/// A generator produces one raw value per token and registers or activates
/// it through [`Attributes`]; it never touches dictionaries directly.
pub trait FeatureGen: fmt::Debug + Send + Sync {
    /// Feature type the values belong to
    fn r#type(&self) -> Type;

    /// Raw value at token `i`
    fn value<'s>(&self, sent: &'s Sentence, i: usize) -> &'s str;

    /// Weights registered for one observation during extraction
    fn flags(&self) -> Activate {
        Activate::ALL
    }

    fn has_type(&self, r#type: Type) -> bool {
        self.r#type() == r#type
    }

    /// Count the observation at token `i` under tag pair `tp`.
    fn generate(&self, attrs: &mut Attributes, sent: &Sentence, tp: TagPair, i: usize) {
        attrs.add(self.r#type(), self.value(sent, i), tp, self.flags());
    }

    /// Append the features active at token `i` to `ctx`.
    fn generate_context(&self, attrs: &Attributes, sent: &Sentence, ctx: &mut Context, i: usize) {
        attrs.activate(self.r#type(), self.value(sent, i), ctx);
    }
}

/// Current word
#[derive(Debug, Clone, Copy, Default)]
pub struct WordGen;

impl FeatureGen for WordGen {
    fn r#type(&self) -> Type {
        WORD
    }

    fn value<'s>(&self, sent: &'s Sentence, i: usize) -> &'s str {
        &sent.words[i]
    }
}

/// Previous word, the sentinel at the first token
#[derive(Debug, Clone, Copy, Default)]
pub struct PrevWordGen;

impl FeatureGen for PrevWordGen {
    fn r#type(&self) -> Type {
        PREV_WORD
    }

    fn value<'s>(&self, sent: &'s Sentence, i: usize) -> &'s str {
        match i.checked_sub(1) {
            Some(prev) => &sent.words[prev],
            None => SENTINEL_WORD,
        }
    }
}

/// Next word, the sentinel at the last token
#[derive(Debug, Clone, Copy, Default)]
pub struct NextWordGen;

impl FeatureGen for NextWordGen {
    fn r#type(&self) -> Type {
        NEXT_WORD
    }

    fn value<'s>(&self, sent: &'s Sentence, i: usize) -> &'s str {
        sent.words.get(i + 1).map_or(SENTINEL_WORD, String::as_str)
    }
}

#[derive(Debug)]
struct FeatureOption {
    name: &'static str,
    desc: &'static str,
    enabled: bool,
    gen: Box<dyn FeatureGen>,
}

/// Feature-type options and the generators they enable
///
/// Options are toggled by name, then [`validate`](Self::validate) collects
/// the enabled generators, in option order, into the list every extraction
/// and generation pass walks.
#[derive(Debug)]
pub struct FeatureTypes {
    options: Vec<FeatureOption>,
    actives: Vec<usize>,
    validated: bool,
}

impl Default for FeatureTypes {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureTypes {
    /// Every feature type enabled, not yet validated
    pub fn new() -> Self {
        let option = |name: &'static str, desc: &'static str, gen: Box<dyn FeatureGen>| FeatureOption {
            name,
            desc,
            enabled: true,
            gen,
        };
        Self {
            options: vec![
                option("words", "current word", Box::new(WordGen)),
                option("prev_words", "previous word", Box::new(PrevWordGen)),
                option("next_words", "next word", Box::new(NextWordGen)),
            ],
            actives: Vec::new(),
            validated: false,
        }
    }

    /// Enable or disable a feature type by option name
    pub fn set(&mut self, name: &str, enabled: bool) -> Result<()> {
        let option = self
            .options
            .iter_mut()
            .find(|o| o.name == name)
            .ok_or_else(|| Error::invalid(format!("unknown feature type option {:?}", name)))?;
        option.enabled = enabled;
        self.validated = false;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<bool> {
        self.options
            .iter()
            .find(|o| o.name == name)
            .map(|o| o.enabled)
            .ok_or_else(|| Error::invalid(format!("unknown feature type option {:?}", name)))
    }

    /// Option names with their descriptions
    pub fn describe(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.options.iter().map(|o| (o.name, o.desc))
    }

    /// Collect the enabled generators.
    pub fn validate(&mut self) -> Result<()> {
        self.actives = self
            .options
            .iter()
            .enumerate()
            .filter(|(_, o)| o.enabled)
            .map(|(i, _)| i)
            .collect();
        if self.actives.is_empty() {
            return Err(Error::invalid("no feature type is enabled"));
        }
        self.validated = true;
        debug!(
            "active feature types: {:?}",
            self.actives().map(|g| g.r#type().name).collect::<Vec<_>>()
        );
        Ok(())
    }

    pub fn is_validated(&self) -> bool {
        self.validated
    }

    /// Generators collected by the last [`validate`](Self::validate)
    pub fn actives(&self) -> impl Iterator<Item = &dyn FeatureGen> + '_ {
        self.actives.iter().map(move |&i| self.options[i].gen.as_ref())
    }

    /// Tag pair of token `i`, the sentinel standing in as previous tag at the
    /// first token.
    pub fn get_tagpair(tags: &TagSet, raws: &[String], i: usize) -> Result<TagPair> {
        let tag = |raw: &str| {
            tags.get(raw)
                .ok_or_else(|| Error::invalid(format!("unknown tag {:?} at token {}", raw, i)))
        };
        let prev = match i.checked_sub(1) {
            Some(prev) => tag(&raws[prev])?,
            None => Tag::SENTINEL,
        };
        Ok(TagPair::new(prev, tag(&raws[i])?))
    }

    /// Register every observation of `sent` in `attrs`.
    ///
    /// Besides the observations of the active generators, the transition
    /// into each gold tag is counted under [`TRANS`] and registered as a
    /// transition feature. Growing attributes may leave the store
    /// fragmented; [`extract_all`](Self::extract_all) compacts it afterwards.
    pub fn extract(&self, attrs: &mut Attributes, sent: &Sentence) -> Result<()> {
        self.check(sent)?;
        for i in 0..sent.len() {
            let tp = Self::get_tagpair(attrs.tags(), &sent.tags, i)?;
            for gen in self.actives() {
                gen.generate(attrs, sent, tp, i);
            }
            attrs.add(TRANS, &sent.tags[i], tp, Activate::TRANS);
            attrs.load_trans_features(TRANS, &sent.tags[i]);
        }
        Ok(())
    }

    /// Extract a whole corpus, leaving the store compact.
    pub fn extract_all<'c, I>(&self, attrs: &mut Attributes, corpus: I) -> Result<()>
    where
        I: IntoIterator<Item = &'c Sentence>,
    {
        let mut nsents = 0;
        for sent in corpus {
            self.extract(attrs, sent)?;
            nsents += 1;
        }
        attrs.compact();
        info!(
            "extracted {} sentences: {} attributes, {} features",
            nsents,
            attrs.size(),
            attrs.nfeatures()
        );
        Ok(())
    }

    /// Build the contexts of `sent` without modifying the store.
    ///
    /// Only observations of the active generators are activated; the gold
    /// tags fill in [`Context::klasses`] and nothing else. The store must be
    /// compact, since the feature ids of a context are pool positions.
    pub fn generate(&self, attrs: &Attributes, sent: &Sentence) -> Result<Contexts> {
        self.check(sent)?;
        if !attrs.is_compact() {
            return Err(Error::invalid("attributes must be compacted before generating contexts"));
        }
        let mut contexts = Contexts::new(sent.len());
        for (i, ctx) in contexts.iter_mut().enumerate() {
            let tp = Self::get_tagpair(attrs.tags(), &sent.tags, i)?;
            ctx.klasses = vec![tp];
            ctx.index = i;
            for gen in self.actives() {
                gen.generate_context(attrs, sent, ctx, i);
            }
        }
        Ok(contexts)
    }

    /// Contexts of every sentence of a corpus pass
    pub fn instances<'c, I>(&self, attrs: &Attributes, corpus: I) -> Result<Instances>
    where
        I: IntoIterator<Item = &'c Sentence>,
    {
        corpus
            .into_iter()
            .map(|sent| self.generate(attrs, sent))
            .collect()
    }

    fn check(&self, sent: &Sentence) -> Result<()> {
        if !self.validated {
            return Err(Error::invalid("feature types must be validated first"));
        }
        if sent.words.len() != sent.tags.len() {
            return Err(Error::invalid(format!(
                "sentence has {} words but {} tags",
                sent.words.len(),
                sent.tags.len()
            )));
        }
        Ok(())
    }
}
