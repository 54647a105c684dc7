use std::borrow::Cow;
use std::str::FromStr;

use bstr::{ByteSlice, Fields};

use crate::error::{Error, Result};

/// Field standing for the empty value
const EMPTY_FIELD: &str = "\\e";

/// Render `value` as a single field of model text.
///
/// Whitespace is written as `\u{hex}` and a backslash as `\\`; the empty
/// value is written as `\e`. Other values are written as they are.
pub fn escape(value: &str) -> Cow<'_, str> {
    if value.is_empty() {
        return Cow::Borrowed(EMPTY_FIELD);
    }
    if !value.chars().any(|c| c == '\\' || c.is_whitespace()) {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        if c == '\\' {
            out.push_str("\\\\");
        } else if c.is_whitespace() {
            out.push_str(&format!("\\u{{{:x}}}", c as u32));
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

/// Inverse of [`escape`], `None` on a malformed escape
pub fn unescape(field: &str) -> Option<Cow<'_, str>> {
    if field == EMPTY_FIELD {
        return Some(Cow::Borrowed(""));
    }
    if !field.contains('\\') {
        return Some(Cow::Borrowed(field));
    }
    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            '\\' => out.push('\\'),
            'u' => {
                let rest = chars.as_str().strip_prefix('{')?;
                let end = rest.find('}')?;
                let code = u32::from_str_radix(&rest[..end], 16).ok()?;
                out.push(char::from_u32(code)?);
                chars = rest[end + 1..].chars();
            }
            _ => return None,
        }
    }
    Some(Cow::Owned(out))
}

/// Whitespace separated fields of one line of model text.
pub struct Tokens<'a> {
    fields: Fields<'a>,
    line: usize,
}

impl<'a> Tokens<'a> {
    pub fn new(text: &'a [u8], line: usize) -> Self {
        Self {
            fields: text.fields(),
            line,
        }
    }

    /// 1-based line number the fields come from
    pub fn line(&self) -> usize {
        self.line
    }

    /// Next field as a string; `what` names the field in the error message.
    pub fn next_str(&mut self, what: &str) -> Result<&'a str> {
        let field = self
            .fields
            .next()
            .ok_or_else(|| Error::parse(self.line, format!("missing {}", what)))?;
        field
            .to_str()
            .map_err(|_| Error::parse(self.line, format!("{} is not valid UTF-8", what)))
    }

    /// Next field with [`escape`] undone
    pub fn next_value(&mut self, what: &str) -> Result<Cow<'a, str>> {
        let field = self.next_str(what)?;
        unescape(field)
            .ok_or_else(|| Error::parse(self.line, format!("invalid escape in {} {:?}", what, field)))
    }

    pub fn next_parse<T: FromStr>(&mut self, what: &str) -> Result<T> {
        let field = self.next_str(what)?;
        field
            .parse()
            .map_err(|_| Error::parse(self.line, format!("invalid {} {:?}", what, field)))
    }

    /// Fail if any field is left over.
    pub fn finish(mut self) -> Result<()> {
        match self.fields.next() {
            Some(extra) => Err(Error::parse(
                self.line,
                format!("unexpected trailing field {:?}", extra.to_str_lossy()),
            )),
            None => Ok(()),
        }
    }
}
