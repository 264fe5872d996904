use crate::errors::AdapterResult;
use regex::Regex;
use std::fmt::{Debug, Display, Formatter};

/// A compiled regular expression usable as a filter value.
///
/// Two patterns are equal when their source text is equal.
#[derive(Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    /// Compiles `source` into a pattern.
    pub fn new(source: &str) -> AdapterResult<Pattern> {
        let regex = Regex::new(source)?;
        Ok(Pattern { regex })
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    #[inline]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    #[inline]
    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

impl From<Regex> for Pattern {
    fn from(regex: Regex) -> Self {
        Pattern { regex }
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Display for Pattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}/", self.as_str())
    }
}

impl Debug for Pattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "regex(/{}/)", self.as_str())
    }
}
