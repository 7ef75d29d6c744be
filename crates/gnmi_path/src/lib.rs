#![deny(missing_docs)]
//! Parsing and rendering of gNMI telemetry paths.
//!
//! A path such as `/interfaces/interface[name=eth0]/state/counters` names a
//! subtree of device state. [`parse_path`] turns the string into a [`Path`]
//! of named elements, each carrying its `[key=value]` attributes.
//! [`PathRenderer`] flattens a parsed path back into a metric identifier,
//! collects the key attributes as tags and reports the longest prefix that
//! matches a configured alias.
//!
//! Two bracket dialects are understood. The default follows YANG XPath
//! rules; the `DME` origin selects NX-OS DME rules where brackets are part
//! of the name unless they follow a `?` query marker.
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use gnmi_path::{parse_path, PathRenderer};
//!
//! let path = parse_path(None, "/interfaces/interface[name=eth0]/state/counters", None).unwrap();
//! let mut tags: BTreeMap<String, String> = BTreeMap::new();
//! let rendered = PathRenderer::default().render(&path, Some(&mut tags));
//!
//! assert_eq!(rendered.path, "/interfaces/interface/state/counters");
//! assert_eq!(tags["name"], "eth0");
//! ```

pub mod config;
mod error;
mod parse;
mod path;
mod render;

pub use error::{PathError, PathResult};
pub use parse::parse_path;
pub use path::{Dialect, Path, PathElem, DME_ORIGIN};
pub use render::{AliasSet, PathRenderer, RenderedPath, TagSink};
