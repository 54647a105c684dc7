//! Feature store for training linear-chain CRF taggers
//!
//! Observations of a tagged corpus are registered as attributes: a
//! `(feature type, value)` key mapped to a contiguous range of weights, one
//! weight per tag transition seen with the value. All weights of a store
//! live in one pool, whose order is the order of the parameter vectors
//! exchanged with an optimizer.
//!
//! # Examples
//!
//! ```no_run
//! use crfner::{Attributes, AttributesParams, FeatureTypes, Sentence, TagSet};
//!
//! let tags: TagSet = ["PER", "LOC", "O"].iter().copied().collect();
//! let mut attrs = Attributes::new(tags, AttributesParams::default());
//!
//! let mut types = FeatureTypes::new();
//! types.set("next_words", false)?;
//! types.validate()?;
//!
//! let sent: Sentence = [("John", "PER"), ("lives", "O"), ("here", "O")]
//!     .iter()
//!     .copied()
//!     .collect();
//! types.extract_all(&mut attrs, [&sent])?;
//! attrs.apply_cutoff(1);
//! attrs.save_attributes("model.txt", "toy corpus")?;
//!
//! let contexts = types.generate(&attrs, &sent)?;
//! assert_eq!(contexts.len(), 3);
//! # Ok::<(), crfner::Error>(())
//! ```

mod attribute;
mod attributes;
mod context;
pub mod dict;
mod error;
mod feature_gen;
mod lexicon;
pub mod pool;
mod sentence;
mod shared;
mod tagset;
mod tokens;
pub mod types;

pub use self::attribute::{Attribute, FeatureId, Weight};
pub use self::attributes::{Activate, Attributes, AttributesParams, DEFAULT_VALUE};
pub use self::context::{Context, Contexts, Instances};
pub use self::dict::{DictEntry, DictStats, FeatureDict, TagDict, WordDict};
pub use self::error::{Error, Result};
pub use self::feature_gen::{
    FeatureGen, FeatureTypes, NextWordGen, PrevWordGen, WordGen, SENTINEL_WORD,
};
pub use self::lexicon::{Lexicon, Word};
pub use self::sentence::Sentence;
pub use self::shared::Shared;
pub use self::tagset::{Tag, TagPair, TagSet};
pub use self::types::{Domain, Type};
