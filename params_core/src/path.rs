//! Dotted paths into a value tree.

use crate::value::{Value, ValueMap};
use serde::Serialize;
use std::fmt;

/// A dotted path (`auth.action`) resolved against a value tree root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Path(Vec<String>);

impl Path {
    /// Parses a dotted path string. Empty segments are dropped.
    pub fn parse(raw: &str) -> Self {
        Path(
            raw.split('.')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Returns true if the path has no segments.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The path segments in order.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Resolves the path against a tree root, walking nested maps.
    ///
    /// Returns `None` when any segment is absent or an intermediate value is
    /// not a map. A `Null` leaf resolves to `None` as well; a null value is
    /// treated as absent for dependency and constraint purposes.
    pub fn resolve<'a>(&self, root: &'a ValueMap) -> Option<&'a Value> {
        let mut segments = self.0.iter();
        let first = segments.next()?;
        let mut current = root.get(first)?;

        for segment in segments {
            current = current.as_map()?.get(segment)?;
        }

        if current.is_null() {
            None
        } else {
            Some(current)
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}
