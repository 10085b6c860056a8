use std::fmt;
use std::ops::Deref;
use std::str;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrefixError {
    #[error("prefix can't be empty")]
    Empty,
    #[error("prefix `{0}` is too long, it can be at most {max} characters", max = Prefix::MAX_LEN)]
    TooLong(String),
    #[error("prefix can't contain whitespace")]
    Whitespace,
}

/// The text a guild uses to trigger text commands, like `?` or `!!`.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Prefix(Box<str>);

impl Prefix {
    /// Maximum number of characters in a prefix.
    pub const MAX_LEN: usize = 2;

    /// Construct a validated prefix.
    pub fn new(prefix: &str) -> Result<Self, PrefixError> {
        if prefix.is_empty() {
            return Err(PrefixError::Empty);
        }

        if prefix.chars().any(char::is_whitespace) {
            return Err(PrefixError::Whitespace);
        }

        if prefix.chars().count() > Self::MAX_LEN {
            return Err(PrefixError::TooLong(prefix.to_owned()));
        }

        Ok(Self(prefix.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Strip the prefix from the given message, returning the rest of it if
    /// it matched.
    pub fn strip<'a>(&self, message: &'a str) -> Option<&'a str> {
        message.strip_prefix(self.as_str())
    }
}

impl Default for Prefix {
    fn default() -> Self {
        Self("?".into())
    }
}

impl Deref for Prefix {
    type Target = str;

    #[inline]
    fn deref(&self) -> &str {
        &self.0
    }
}

impl str::FromStr for Prefix {
    type Err = PrefixError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Prefix {
    type Error = PrefixError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Prefix> for String {
    #[inline]
    fn from(value: Prefix) -> Self {
        value.0.into()
    }
}

impl fmt::Display for Prefix {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Debug for Prefix {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
