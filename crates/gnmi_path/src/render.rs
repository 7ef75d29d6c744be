//! Flattening a [`Path`] into a metric identifier and a set of tags.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::BuildHasher;

use serde::Serialize;

use crate::path::Path;

/// Known path identifiers that have a configured short name.
pub trait AliasSet {
    /// True when `path` is a configured alias path.
    fn contains_alias(&self, path: &str) -> bool;
}

impl AliasSet for () {
    fn contains_alias(&self, _path: &str) -> bool {
        false
    }
}

impl<S: BuildHasher> AliasSet for HashSet<String, S> {
    fn contains_alias(&self, path: &str) -> bool {
        self.contains(path)
    }
}

impl AliasSet for BTreeSet<String> {
    fn contains_alias(&self, path: &str) -> bool {
        self.contains(path)
    }
}

impl<V, S: BuildHasher> AliasSet for HashMap<String, V, S> {
    fn contains_alias(&self, path: &str) -> bool {
        self.contains_key(path)
    }
}

impl<V> AliasSet for BTreeMap<String, V> {
    fn contains_alias(&self, path: &str) -> bool {
        self.contains_key(path)
    }
}

/// Destination for the key attributes found along a path.
pub trait TagSink {
    /// True when a tag with this name was already collected.
    fn contains_tag(&self, key: &str) -> bool;

    /// Store a tag, replacing any previous value.
    fn insert_tag(&mut self, key: String, value: String);
}

impl<S: BuildHasher> TagSink for HashMap<String, String, S> {
    fn contains_tag(&self, key: &str) -> bool {
        self.contains_key(key)
    }

    fn insert_tag(&mut self, key: String, value: String) {
        self.insert(key, value);
    }
}

impl TagSink for BTreeMap<String, String> {
    fn contains_tag(&self, key: &str) -> bool {
        self.contains_key(key)
    }

    fn insert_tag(&mut self, key: String, value: String) {
        self.insert(key, value);
    }
}

/// The identifiers produced by [`PathRenderer::render`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RenderedPath {
    /// Prefix, `origin:` when set, then `/name` for every named element.
    pub path: String,

    /// Same as `path` with the `origin:` part removed. Only present when the
    /// path had an origin.
    pub path_without_origin: Option<String>,

    /// The longest leading part of `path` found in the alias set.
    pub alias_path: Option<String>,
}

/// Renders paths under a fixed output prefix and alias set.
#[derive(Clone, Copy)]
pub struct PathRenderer<'a> {
    prefix: &'a str,
    aliases: &'a dyn AliasSet,
}

impl std::fmt::Debug for PathRenderer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathRenderer")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl Default for PathRenderer<'_> {
    fn default() -> Self {
        PathRenderer::new("")
    }
}

impl<'a> PathRenderer<'a> {
    /// A renderer with no aliases.
    pub fn new(prefix: &'a str) -> Self {
        Self {
            prefix,
            aliases: &(),
        }
    }

    /// Check every rendered prefix of a path against `aliases`.
    pub fn with_aliases(self, aliases: &'a dyn AliasSet) -> Self {
        Self { aliases, ..self }
    }

    /// Render `path`, merging its key attributes into `tags` when given.
    ///
    /// Keys have `-` replaced with `_`. The first time a key is seen it is
    /// stored under that short name; any later key with the same short name
    /// is stored as `<identifier so far>/<key>` instead. Elements are walked
    /// in order and each element's keys in lexicographic order.
    pub fn render(&self, path: &Path, mut tags: Option<&mut dyn TagSink>) -> RenderedPath {
        let origin = path.origin.as_deref().filter(|o| !o.is_empty());
        let mut builder = String::from(self.prefix);
        if let Some(origin) = origin {
            builder.push_str(origin);
            builder.push(':');
        }

        let mut alias_path = None;
        for elem in &path.elem {
            if !elem.name.is_empty() {
                builder.push('/');
                builder.push_str(&elem.name);
            }

            if self.aliases.contains_alias(&builder) {
                alias_path = Some(builder.clone());
            }

            if let Some(tags) = tags.as_deref_mut() {
                for (key, value) in &elem.key {
                    let key = key.replace('-', "_");
                    if tags.contains_tag(&key) {
                        tags.insert_tag(format!("{}/{}", builder, key), value.clone());
                    } else {
                        tags.insert_tag(key, value.clone());
                    }
                }
            }
        }

        let path_without_origin = origin.map(|origin| {
            let rest = &builder[self.prefix.len() + origin.len() + 1..];
            format!("{}{}", self.prefix, rest)
        });

        tracing::trace!(path = %builder, dialect = %path.dialect(), ?alias_path, "rendered path");

        RenderedPath {
            path: builder,
            path_without_origin,
            alias_path,
        }
    }
}
