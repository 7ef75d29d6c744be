//! Structured representation of a telemetry path.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PathError;

/// The origin tag that selects the DME scanner.
pub const DME_ORIGIN: &str = "DME";

/// Bracket syntax used when scanning a path string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dialect {
    /// YANG XPath style: every `[k=v]` is a key.
    #[default]
    XPath,
    /// NX-OS DME style: brackets are literal path text unless they follow a
    /// `?` query marker.
    Dme,
}

impl Dialect {
    /// Pick the dialect for an origin tag. Only an exact `DME` selects
    /// [`Dialect::Dme`].
    pub fn from_origin(origin: Option<&str>) -> Self {
        match origin {
            Some(DME_ORIGIN) => Dialect::Dme,
            _ => Dialect::XPath,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::XPath => f.write_str("xpath"),
            Dialect::Dme => f.write_str(DME_ORIGIN),
        }
    }
}

/// One `/`-delimited segment of a [`Path`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathElem {
    /// Segment name, without any key brackets.
    pub name: String,

    /// Key attributes of this segment. A key defined twice keeps the later
    /// value.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub key: BTreeMap<String, String>,

    /// The segment exactly as it appeared in the input, brackets included.
    #[serde(default)]
    pub raw: String,
}

impl PathElem {
    /// An element with a name and no keys.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            raw: name.clone(),
            name,
            key: BTreeMap::new(),
        }
    }

    /// Add a key attribute, replacing any previous value for that key.
    pub fn with_key(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.key.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for PathElem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for (k, v) in &self.key {
            write!(f, "[{}={}]", k, v)?;
        }
        Ok(())
    }
}

/// A fully parsed telemetry path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    /// Namespace of the path. Also decides which dialect it was parsed with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,

    /// Opaque identifier of the device the path belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Segments in left-to-right order.
    #[serde(default)]
    pub elem: Vec<PathElem>,
}

impl Path {
    /// Build a path directly from its elements.
    pub fn from_elems(elem: impl IntoIterator<Item = PathElem>) -> Self {
        Self {
            origin: None,
            target: None,
            elem: elem.into_iter().collect(),
        }
    }

    /// Set the origin, treating an empty string as no origin.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into()).filter(|o| !o.is_empty());
        self
    }

    /// The dialect implied by this path's origin.
    pub fn dialect(&self) -> Dialect {
        Dialect::from_origin(self.origin.as_deref())
    }

    /// Element names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.elem.iter().map(|e| e.name.as_str())
    }

    /// True when the path has no elements.
    pub fn is_empty(&self) -> bool {
        self.elem.is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(origin) = &self.origin {
            write!(f, "{}:", origin)?;
        }
        for e in &self.elem {
            write!(f, "/{}", e)?;
        }
        Ok(())
    }
}

/// Parses the [`Display`](fmt::Display) form: an optional `origin:` before
/// the first `/`, then the elements. The origin picks the dialect.
impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let head = s.find('/').map_or(s, |i| &s[..i]);
        match head.strip_suffix(':') {
            Some(origin) => crate::parse::parse_path(Some(origin), &s[head.len()..], None),
            None => crate::parse::parse_path(None, s, None),
        }
    }
}
