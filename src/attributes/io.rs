//! Line-oriented text format of an attributes store.
//!
//! Both formats start with free preface lines prefixed by `#`.
//!
//! * attributes: `type value index n (prev curr freq lambda){n}`, one line
//!   per attribute in pool order; this is what [`Attributes::load`] reads.
//! * features: `type value prev curr freq lambda`, one line per weight.
//!
//! Values and tag names go through [`escape`] so that each stays a single
//! field, whitespace and empty values included.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use bstr::io::BufReadExt;
use bstr::ByteSlice;
use log::info;

use super::{Attributes, AttributesParams};
use crate::attribute::Weight;
use crate::error::{Error, Result};
use crate::tagset::{Tag, TagPair, TagSet};
use crate::tokens::{escape, Tokens};
use crate::types::{Domain, Type};

impl Attributes {
    /// Create a store and load a saved model from `path`
    pub fn open<P: AsRef<Path>>(path: P, tags: TagSet, params: AttributesParams) -> Result<Self> {
        let mut attrs = Self::new(tags, params);
        attrs.load(path)?;
        Ok(attrs)
    }

    /// Create a store and load a saved model from `reader`
    pub fn from_reader<R: BufRead>(reader: R, tags: TagSet, params: AttributesParams) -> Result<Self> {
        let mut attrs = Self::new(tags, params);
        attrs.load_from(reader)?;
        Ok(attrs)
    }

    /// Load attributes saved by [`save_attributes`](Self::save_attributes).
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(e, Some(path.to_path_buf())))?;
        self.load_from(BufReader::new(file))
            .map_err(|e| with_path(e, path))?;
        info!(
            "loaded {} attributes ({} features) from {}",
            self.size(),
            self.nfeatures(),
            path.display()
        );
        Ok(())
    }

    /// Load attributes from a stream.
    ///
    /// Every record creates new dictionary entries, so a stream must not
    /// repeat a (type, value) key. Records of tag-valued types are
    /// registered as transition features. A parse error aborts the load and
    /// leaves whatever was read so far in the store.
    pub fn load_from<R: BufRead>(&mut self, reader: R) -> Result<()> {
        let mut index = 0usize;
        for (lineno, line) in reader.byte_lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with(b"#") {
                continue;
            }
            let mut tokens = Tokens::new(line, lineno + 1);
            let name = tokens.next_str("feature type")?;
            let r#type = Type::from_name(name).ok_or_else(|| {
                Error::parse(tokens.line(), format!("unknown feature type {:?}", name))
            })?;

            let dict = &mut self.dicts[super::domain_index(r#type.domain)];
            let attrib = dict.load(r#type, &mut tokens)?;
            let found: usize = tokens.next_parse("attribute index")?;
            if found != index {
                return Err(Error::parse(
                    tokens.line(),
                    format!("expected attribute index {}, found {}", index, found),
                ));
            }
            let nweights: usize = tokens.next_parse("weight count")?;
            for _ in 0..nweights {
                let prev = parse_tag(&self.tags, &mut tokens, "previous tag")?;
                let curr = parse_tag(&self.tags, &mut tokens, "current tag")?;
                let mut weight = Weight::new(TagPair::new(prev, curr), 0.0);
                weight.freq = tokens.next_parse("frequency")?;
                weight.lambda = tokens.next_parse("lambda")?;
                self.store.push(attrib, weight);
            }
            let loaded = *attrib;
            tokens.finish()?;
            if r#type.domain == Domain::Tags {
                let tag = self
                    .dict(r#type)
                    .entries()
                    .find(|e| e.attrib == loaded)
                    .map(|e| e.value.to_string());
                if let Some(tag) = tag {
                    self.load_trans_features(r#type, &tag);
                }
            }
            index += 1;
        }
        self.log_stats();
        Ok(())
    }

    /// Save one line per attribute to `path`.
    pub fn save_attributes<P: AsRef<Path>>(&self, path: P, preface: &str) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Error::io(e, Some(path.to_path_buf())))?;
        let mut out = BufWriter::new(file);
        self.save_attributes_to(&mut out, preface)
            .and_then(|_| out.flush().map_err(Error::from))
            .map_err(|e| with_path(e, path))?;
        info!(
            "saved {} attributes ({} features) to {}",
            self.size(),
            self.nfeatures(),
            path.display()
        );
        Ok(())
    }

    pub fn save_attributes_to<W: Write>(&self, mut out: W, preface: &str) -> Result<()> {
        write_preface(&mut out, preface)?;
        for (index, entry) in self.live().into_iter().enumerate() {
            let weights = self.weights(entry.attrib);
            write!(
                out,
                "{} {} {} {}",
                entry.r#type.name,
                escape(entry.value),
                index,
                weights.len()
            )?;
            for weight in weights {
                write!(
                    out,
                    " {} {} {} {}",
                    escape(self.tags.str(weight.klasses.prev)),
                    escape(self.tags.str(weight.klasses.curr)),
                    weight.freq,
                    weight.lambda
                )?;
            }
            writeln!(out)?;
        }
        Ok(())
    }

    /// Save one line per weight to `path`.
    pub fn save_features<P: AsRef<Path>>(&self, path: P, preface: &str) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Error::io(e, Some(path.to_path_buf())))?;
        let mut out = BufWriter::new(file);
        self.save_features_to(&mut out, preface)
            .and_then(|_| out.flush().map_err(Error::from))
            .map_err(|e| with_path(e, path))?;
        info!("saved {} features to {}", self.nfeatures(), path.display());
        Ok(())
    }

    pub fn save_features_to<W: Write>(&self, mut out: W, preface: &str) -> Result<()> {
        write_preface(&mut out, preface)?;
        for entry in self.live() {
            for weight in self.weights(entry.attrib) {
                writeln!(
                    out,
                    "{} {} {} {} {} {}",
                    entry.r#type.name,
                    escape(entry.value),
                    escape(self.tags.str(weight.klasses.prev)),
                    escape(self.tags.str(weight.klasses.curr)),
                    weight.freq,
                    weight.lambda
                )?;
            }
        }
        Ok(())
    }
}

fn parse_tag(tags: &TagSet, tokens: &mut Tokens<'_>, what: &str) -> Result<Tag> {
    let raw = tokens.next_value(what)?;
    tags.get(&raw)
        .ok_or_else(|| Error::parse(tokens.line(), format!("unknown {} {:?}", what, raw)))
}

fn write_preface<W: Write>(out: &mut W, preface: &str) -> Result<()> {
    for line in preface.lines() {
        writeln!(out, "# {}", line)?;
    }
    Ok(())
}

fn with_path(err: Error, path: &Path) -> Error {
    match err {
        Error::Io { source, path: None } => Error::io(source, Some(path.to_path_buf())),
        other => other,
    }
}
