use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::Path;
pub use string_cache::DefaultAtom as Atom;

/// Interned reference to a piece of stage content (a word, a page, an image)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentRef(Atom);

impl ContentRef {
    pub fn new(s: &str) -> Self {
        Self(Atom::from(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the reference names a file (has an extension) rather than inline text
    pub fn is_asset(&self) -> bool {
        Path::new(self.as_str()).extension().is_some()
    }
}

impl From<&str> for ContentRef {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ContentRef {
    fn from(s: String) -> Self {
        Self(Atom::from(s))
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ContentRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ContentRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(ContentRef::from)
    }
}
