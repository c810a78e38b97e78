use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use crate::error::TypeError;

/// Identifier of a stored document.
///
/// Every backend picks its own native key form. Keys travel through URL
/// paths, so the textual form must round-trip: `K::from_str(&k.to_string())`
/// yields `k` again. Parsing is the only validation a key ever gets; a key
/// value that exists is structurally valid.
pub trait DocumentKey:
    Clone + Eq + Hash + fmt::Debug + fmt::Display + FromStr<Err = TypeError> + Send + Sync + 'static
{
}

/// Parse a path segment into an optional key.
///
/// An empty segment means "no key"; anything else must parse.
pub fn parse_key<K: DocumentKey>(segment: &str) -> Result<Option<K>, TypeError> {
    if segment.is_empty() {
        return Ok(None);
    }
    segment.parse().map(Some)
}

/// Free-form, non-empty string key.
///
/// Used by the in-memory backend, which generates decimal sequence numbers
/// but accepts any caller-supplied text on update.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TextKey(String);

impl TextKey {
    /// Key for the `seq`-th generated document.
    pub fn from_sequence(seq: u64) -> Self {
        Self(seq.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl DocumentKey for TextKey {}

impl FromStr for TextKey {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(TypeError::EmptyKey);
        }
        Ok(Self(s.to_string()))
    }
}

impl fmt::Debug for TextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TextKey({})", self.0)
    }
}

impl fmt::Display for TextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
