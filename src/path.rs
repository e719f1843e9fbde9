//! Locations in the body tree and the path-keyed policies applied to them.

use std::fmt;

/// Segment contributed by a wildcard label position.
pub const WILDCARD: &str = "_";

/// Ordered segments from the module root. Children are fresh copies, so sibling branches never
/// see each other's segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<String>);

impl Path {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    pub fn wildcard(&self) -> Self {
        self.child(WILDCARD)
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.clone()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Path {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        f.write_str(&self.0.join("."))
    }
}

// ————————————————————————————————————————————————————————————————————————————
// POLICY TABLES
// ————————————————————————————————————————————————————————————————————————————

/// One position in a [`PathPattern`].
#[derive(Debug, Clone, Copy)]
pub enum Seg {
    /// Matches exactly this segment (including the literal `"_"`).
    Lit(&'static str),
    /// Matches any single segment.
    Any,
}

/// Whole-path pattern: matches only paths of the same length.
#[derive(Debug, Clone, Copy)]
pub struct PathPattern(pub &'static [Seg]);

impl PathPattern {
    pub fn matches(&self, path: &Path) -> bool {
        self.0.len() == path.len()
            && self.0.iter().zip(path.segments()).all(|(seg, actual)| match seg {
                Seg::Lit(lit) => *lit == actual.as_str(),
                Seg::Any => true,
            })
    }
}

/// Objects at these paths accept keys beyond their declared members.
pub const OPEN_OBJECT_PATHS: &[PathPattern] = &[
    PathPattern(&[Seg::Lit("data")]),
    PathPattern(&[Seg::Lit("resource")]),
    PathPattern(&[Seg::Lit("provider")]),
    PathPattern(&[Seg::Lit("terraform"), Seg::Lit("backend")]),
    PathPattern(&[Seg::Lit("module"), Seg::Lit(WILDCARD)]),
];

/// Blocks at these paths are single objects whatever cardinality they declare.
pub const FORCED_OBJECT_PATHS: &[PathPattern] = &[
    PathPattern(&[Seg::Lit("terraform")]),
    PathPattern(&[Seg::Lit("terraform"), Seg::Lit("backend"), Seg::Any]),
];

fn lookup(table: &[PathPattern], path: &Path) -> bool {
    table.iter().any(|pattern| pattern.matches(path))
}

pub fn is_open_object(path: &Path) -> bool {
    lookup(OPEN_OBJECT_PATHS, path)
}

pub fn forces_object(path: &Path) -> bool {
    lookup(FORCED_OBJECT_PATHS, path)
}
