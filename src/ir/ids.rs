//! Newtype identifiers for drawing entities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of the drawing entity a region or text came from
/// (typically a CAD entity handle).
///
/// Only used for diagnostics and for keying output labels; the engine never
/// interprets its contents.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(pub String);

impl SourceId {
    /// Creates a new SourceId.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the underlying string.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceId({})", self.0)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_equality() {
        assert_eq!(SourceId::from("2A"), SourceId::new("2A"));
        assert_ne!(SourceId::from("2A"), SourceId::from("2B"));
    }

    #[test]
    fn test_id_hash() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(SourceId::from("1"));
        set.insert(SourceId::from("2"));
        set.insert(SourceId::from("1")); // duplicate
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_id_display_and_debug() {
        let id = SourceId::from("3F");
        assert_eq!(id.to_string(), "3F");
        assert_eq!(format!("{:?}", id), "SourceId(3F)");
    }
}
